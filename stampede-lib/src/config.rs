use std::time::Duration;

use crate::error::ConfigError;

/// A single request target within a load test.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    /// Request path, appended verbatim to the target url.
    pub path: String,

    /// Relative weight of this scenario, must be greater than zero.
    ///
    /// Carried for weighted scheduling later on; workers currently walk
    /// the scenario list in configured order.
    pub weight: f64,
}

impl Scenario {
    /// New scenario with the default weight of `1.0`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

/// Parameters of a single load test run.
/// This models how much traffic is produced, against what, for how long.
#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    /// Base url every scenario path is appended to.
    pub target_url: String,

    /// Number of concurrent simulated users.
    pub users: usize,

    /// Wall clock duration of the run.
    ///
    /// A zero duration is valid: workers are stopped right after start
    /// and only requests already in flight complete.
    pub duration: Duration,

    /// Request scenarios, walked in order and restarted once exhausted.
    pub scenarios: Vec<Scenario>,
}

impl LoadTestConfig {
    /// Reject configurations that cannot produce a meaningful run.
    ///
    /// Checked before any worker or client resource is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.is_empty() {
            return Err(ConfigError::EmptyTargetUrl);
        }
        if self.users == 0 {
            return Err(ConfigError::ZeroUsers);
        }
        if self.scenarios.is_empty() {
            return Err(ConfigError::NoScenarios);
        }
        for (index, scenario) in self.scenarios.iter().enumerate() {
            if scenario.path.is_empty() {
                return Err(ConfigError::EmptyScenarioPath { index });
            }
            // NaN fails this comparison as well.
            if !(scenario.weight > 0.0) {
                return Err(ConfigError::NonPositiveWeight { index });
            }
        }
        Ok(())
    }

    /// Full request url for the given scenario.
    pub fn request_url(&self, scenario: &Scenario) -> String {
        format!("{}{}", self.target_url, scenario.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> LoadTestConfig {
        LoadTestConfig {
            target_url: "http://127.0.0.1:8080".to_owned(),
            users: 3,
            duration: Duration::from_secs(2),
            scenarios: vec![Scenario::new("/")],
        }
    }

    #[test]
    fn valid_config_passes() {
        assert_eq!(base_config().validate(), Ok(()));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for (mutate, expected) in [
            (
                Box::new(|cfg: &mut LoadTestConfig| cfg.target_url.clear())
                    as Box<dyn Fn(&mut LoadTestConfig)>,
                ConfigError::EmptyTargetUrl,
            ),
            (
                Box::new(|cfg: &mut LoadTestConfig| cfg.users = 0),
                ConfigError::ZeroUsers,
            ),
            (
                Box::new(|cfg: &mut LoadTestConfig| cfg.scenarios.clear()),
                ConfigError::NoScenarios,
            ),
            (
                Box::new(|cfg: &mut LoadTestConfig| {
                    cfg.scenarios.push(Scenario::new(""));
                }),
                ConfigError::EmptyScenarioPath { index: 1 },
            ),
            (
                Box::new(|cfg: &mut LoadTestConfig| {
                    cfg.scenarios.push(Scenario::new("/sub").with_weight(0.0));
                }),
                ConfigError::NonPositiveWeight { index: 1 },
            ),
            (
                Box::new(|cfg: &mut LoadTestConfig| {
                    cfg.scenarios.push(Scenario::new("/sub").with_weight(-2.5));
                }),
                ConfigError::NonPositiveWeight { index: 1 },
            ),
            (
                Box::new(|cfg: &mut LoadTestConfig| {
                    cfg.scenarios
                        .push(Scenario::new("/sub").with_weight(f64::NAN));
                }),
                ConfigError::NonPositiveWeight { index: 1 },
            ),
        ] {
            let mut cfg = base_config();
            mutate(&mut cfg);
            assert_eq!(cfg.validate(), Err(expected.clone()), "case: {expected:?}");
        }
    }

    #[test]
    fn zero_duration_is_valid() {
        let mut cfg = base_config();
        cfg.duration = Duration::ZERO;
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn request_url_is_plain_concatenation() {
        let cfg = base_config();
        let url = cfg.request_url(&Scenario::new("/health"));
        assert_eq!(url, "http://127.0.0.1:8080/health");
    }

    #[test]
    fn default_weight_is_one() {
        assert_eq!(Scenario::new("/").weight, 1.0);
    }
}
