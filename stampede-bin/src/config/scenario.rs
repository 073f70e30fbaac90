use stampede_lib::config::Scenario;

/// Parse a `PATH[=WEIGHT]` scenario argument.
///
/// The weight defaults to `1.0` and must be greater than zero.
pub fn parse_scenario(input: &str) -> Result<Scenario, String> {
    let (path, weight) = match input.split_once('=') {
        Some((path, raw_weight)) => {
            let weight: f64 = raw_weight
                .trim()
                .parse()
                .map_err(|err| format!("invalid weight '{raw_weight}': {err}"))?;
            (path, weight)
        }
        None => (input, 1.0),
    };

    let path = path.trim();
    if path.is_empty() {
        return Err("path must not be empty".to_owned());
    }
    if !(weight > 0.0) {
        return Err(format!("weight must be greater than zero, got: {weight}"));
    }

    Ok(Scenario::new(path).with_weight(weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        for (input, expected) in [
            ("/", Some(Scenario::new("/"))),
            ("/health", Some(Scenario::new("/health"))),
            ("/search=2.5", Some(Scenario::new("/search").with_weight(2.5))),
            (
                "/search = 0.5",
                Some(Scenario::new("/search").with_weight(0.5)),
            ),
            ("", None),
            ("=1.0", None),
            ("/x=abc", None),
            ("/x=", None),
            ("/x=0", None),
            ("/x=-1", None),
            ("/x=NaN", None),
        ] {
            let result = parse_scenario(input);
            match (result, expected) {
                (Ok(result), Some(expected)) => assert_eq!(result, expected, "input: '{input}'"),
                (Err(_), None) => (),
                (result, expected) => panic!(
                    "input = '{input}', unexpected result '{result:?}', expected: '{expected:?}'"
                ),
            }
        }
    }
}
