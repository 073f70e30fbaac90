use super::MockConfig;

/// High level mock upstream profiles.
/// Each profile is a preset of response behavior.
#[derive(Debug, Clone, Copy, clap::ValueEnum, Default)]
pub enum Profile {
    /// Ideal conditions.
    /// Used to measure pure engine overhead and regressions.
    #[default]
    Baseline,

    /// Variable response latency.
    /// Used to observe queuing and tail latency.
    LatencyJitter,

    /// Unstable upstream behavior.
    /// Used to test failure accounting and resilience.
    FlakyUpstream,
}

impl Profile {
    /// Construct the concrete mock configuration
    /// associated with this profile.
    pub fn mock_config(self) -> MockConfig {
        match self {
            Profile::Baseline => {
                // Fast and fully reliable upstream.
                MockConfig {
                    base_latency: Some(0.02),
                    jitter: None,
                    error_rate: None,
                    timeout_rate: None,
                }
            }

            Profile::LatencyJitter => {
                // Response time varies per request.
                // This is the main source of tail latency.
                MockConfig {
                    base_latency: Some(0.05),
                    jitter: Some(1.),
                    error_rate: None,
                    timeout_rate: None,
                }
            }

            Profile::FlakyUpstream => {
                // Upstream occasionally errors or stalls.
                // This exercises the failure paths of the engine.
                MockConfig {
                    base_latency: Some(0.1),
                    jitter: Some(2.),
                    error_rate: Some(0.05),
                    timeout_rate: Some(0.05),
                }
            }
        }
    }
}
