/// Mock upstream behavior configuration.
/// This models how the fake origin responds under load.
#[derive(Debug, Clone, clap::Args, Default)]
pub struct MockConfig {
    /// Base response delay in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub base_latency: Option<f64>,

    /// Random delay spread around the base latency, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub jitter: Option<f64>,

    /// Fraction of requests answered with a 500.
    #[arg(long, value_name = "RATE")]
    pub error_rate: Option<f32>,

    /// Fraction of requests answered with a 408.
    #[arg(long, value_name = "RATE")]
    pub timeout_rate: Option<f32>,
}
