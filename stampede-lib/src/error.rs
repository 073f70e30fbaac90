/// Boxed error used at API boundaries where the concrete cause
/// does not matter to the caller.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Rejected load test configuration.
///
/// Raised by validation before any worker is started,
/// so a bad config never produces traffic.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("target url must not be empty")]
    EmptyTargetUrl,

    #[error("users must be at least 1")]
    ZeroUsers,

    #[error("at least one scenario is required")]
    NoScenarios,

    #[error("scenario #{index}: path must not be empty")]
    EmptyScenarioPath { index: usize },

    #[error("scenario #{index}: weight must be greater than zero")]
    NonPositiveWeight { index: usize },
}

/// Failure of a single issued request.
///
/// These are recorded per request and never abort a run.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),
}

/// Failure of a load test run as a whole.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("acquire http client: {0}")]
    Resource(#[source] BoxError),
}
