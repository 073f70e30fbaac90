use std::{io::IsTerminal as _, path::Path};

use tracing::metadata::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter};

use crate::error::BoxError;

/// Knobs for [`init_tracing`], typically fed from global CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct TelemetryConfig<'a> {
    /// Default to DEBUG instead of INFO.
    pub verbose: bool,
    /// Human oriented multi line output.
    pub pretty: bool,
    /// Append log output to this file instead of stderr.
    pub output: Option<&'a Path>,
}

/// Set up the global tracing subscriber.
///
/// Defaults to INFO level, DEBUG with `verbose`; both can be overridden
/// at runtime through the `RUST_LOG` environment variable.
pub fn init_tracing(cfg: TelemetryConfig<'_>) -> Result<(), BoxError> {
    let directive = if cfg.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    }
    .into();

    let make_writer = match cfg.output {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .append(true)
                .create(true)
                .open(path)
                .map_err(|err| format!("open log file '{}': {err}", path.display()))?;

            BoxMakeWriter::new(file)
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(cfg.output.is_none() && std::io::stderr().is_terminal())
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(directive)
                .from_env_lossy(),
        )
        .with_writer(make_writer);

    if cfg.pretty {
        subscriber.pretty().try_init()?;
    } else {
        subscriber.try_init()?;
    }

    tracing::info!("tracing is set up");
    Ok(())
}
