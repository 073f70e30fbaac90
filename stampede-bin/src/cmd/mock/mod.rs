use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, extract::State, http::StatusCode};
use clap::Args;
use tokio_graceful::ShutdownGuard;

use stampede_lib::error::BoxError;

use crate::config::{MockConfig, Profile};

#[derive(Debug, Clone, Args)]
/// run a mock upstream server to load test against
pub struct MockCommand {
    #[clap(flatten)]
    config: Option<MockConfig>,

    #[arg(long, value_enum)]
    /// profile to run,
    /// manually defined parameters overwrite profile parameters.
    profile: Option<Profile>,

    /// socket address to bind to
    #[arg(long, short = 'b', value_name = "ADDRESS", default_value = "127.0.0.1:0")]
    pub bind: SocketAddr,
}

pub async fn exec(guard: ShutdownGuard, args: MockCommand) -> Result<(), BoxError> {
    let merged_cfg = merge_mock_cfg(args.profile, args.config);
    let behavior = Arc::new(MockBehavior::try_new(merged_cfg)?);

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .map_err(|err| format!("bind mock upstream server to {}: {err}", args.bind))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("get bound address for mock upstream server: {err}"))?;

    tracing::info!(%addr, "mock upstream server listening");

    axum::serve(listener, mock_router(behavior))
        .with_graceful_shutdown(guard.clone_weak().into_cancelled())
        .await?;

    Ok(())
}

pub(crate) fn mock_router(behavior: Arc<MockBehavior>) -> Router {
    // Every path gets the same treatment; the scenario paths of a load
    // test only have to exist, not differ.
    Router::new().fallback(respond).with_state(behavior)
}

async fn respond(State(behavior): State<Arc<MockBehavior>>) -> StatusCode {
    behavior.respond().await
}

/// Response behavior of the mock upstream.
#[derive(Debug)]
pub(crate) struct MockBehavior {
    base_latency: f64,
    jitter: f64,
    error_rate: f32,
    timeout_rate: f32,
}

#[derive(Debug, Clone, Copy)]
enum MockOutcome {
    Timeout,
    Error,
    Ok,
}

impl MockBehavior {
    pub(crate) fn try_new(cfg: MockConfig) -> Result<Self, BoxError> {
        let base_latency = cfg.base_latency.unwrap_or_default();
        let jitter = cfg.jitter.unwrap_or_default();
        let error_rate = cfg.error_rate.unwrap_or_default();
        let timeout_rate = cfg.timeout_rate.unwrap_or_default();

        let sum = timeout_rate + error_rate;
        if sum > 1. {
            return Err("timeout_rate + error_rate must be <= 1.0".into());
        }

        Ok(Self {
            base_latency,
            jitter,
            error_rate,
            timeout_rate,
        })
    }

    #[inline(always)]
    fn clamp_rate(v: f32) -> f32 {
        v.clamp(0., 1.0)
    }

    fn pick_outcome(&self) -> MockOutcome {
        let timeout_rate = Self::clamp_rate(self.timeout_rate);
        let error_rate = Self::clamp_rate(self.error_rate);

        let r: f32 = rand::random();

        let t_timeout = timeout_rate;
        let t_error = t_timeout + error_rate;

        if r < t_timeout {
            MockOutcome::Timeout
        } else if r < t_error {
            MockOutcome::Error
        } else {
            MockOutcome::Ok
        }
    }

    fn compute_delay(&self) -> Duration {
        let base = self.base_latency.max(0.0);
        let jitter = self.jitter.max(0.0);

        if jitter == 0.0 {
            return Duration::from_secs_f64(base);
        }

        let span = jitter * 2.0;
        let u: f64 = rand::random();
        let delta = (u * span) - jitter;

        let secs = (base + delta).max(0.0);
        Duration::from_secs_f64(secs)
    }

    async fn respond(&self) -> StatusCode {
        let delay = self.compute_delay();
        if delay.as_nanos() > 0 {
            tokio::time::sleep(delay).await;
        }

        match self.pick_outcome() {
            MockOutcome::Timeout => StatusCode::REQUEST_TIMEOUT,
            MockOutcome::Error => StatusCode::INTERNAL_SERVER_ERROR,
            MockOutcome::Ok => StatusCode::OK,
        }
    }
}

fn merge_mock_cfg(profile: Option<Profile>, config: Option<MockConfig>) -> MockConfig {
    let profile_cfg = profile
        .map(|p| {
            tracing::info!("use profile to define base config: {p:?}");
            p.mock_config()
        })
        .unwrap_or_else(|| {
            tracing::info!("no profile defined, use default as base config");
            Default::default()
        });

    let overwrite_cfg = config.unwrap_or_default();

    macro_rules! merge_config {
        ($profile:ident, $overwrite:ident, {$($property:ident),+ $(,)?}) => {
            MockConfig {
                $(
                    $property: if let Some(value) = $overwrite.$property {
                        tracing::info!("property '{}': use overwrite: {value}", stringify!($property));
                        Some(value)
                    } else if let Some(value) = $profile.$property {
                        tracing::info!("property '{}': use profile: {value}", stringify!($property));
                        Some(value)
                    } else {
                        tracing::info!("property '{}': undefined", stringify!($property));
                        None
                    },
                )+
            }
        };
    }

    merge_config!(
        profile_cfg, overwrite_cfg,
        {
            base_latency,
            jitter,
            error_rate,
            timeout_rate,
        }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_rate_sum_above_one() {
        let result = MockBehavior::try_new(MockConfig {
            error_rate: Some(0.6),
            timeout_rate: Some(0.6),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn corner_rates_pin_the_outcome() {
        let always_error = MockBehavior::try_new(MockConfig {
            error_rate: Some(1.0),
            ..Default::default()
        })
        .expect("behavior");
        let always_timeout = MockBehavior::try_new(MockConfig {
            timeout_rate: Some(1.0),
            ..Default::default()
        })
        .expect("behavior");
        let always_ok = MockBehavior::try_new(MockConfig::default()).expect("behavior");

        for _ in 0..100 {
            assert!(matches!(always_error.pick_outcome(), MockOutcome::Error));
            assert!(matches!(always_timeout.pick_outcome(), MockOutcome::Timeout));
            assert!(matches!(always_ok.pick_outcome(), MockOutcome::Ok));
        }
    }

    #[test]
    fn delay_without_jitter_is_exact() {
        let behavior = MockBehavior::try_new(MockConfig {
            base_latency: Some(0.05),
            ..Default::default()
        })
        .expect("behavior");

        assert_eq!(behavior.compute_delay(), Duration::from_millis(50));
    }

    #[test]
    fn jittered_delay_stays_in_bounds() {
        let behavior = MockBehavior::try_new(MockConfig {
            base_latency: Some(0.10),
            jitter: Some(0.05),
            ..Default::default()
        })
        .expect("behavior");

        for _ in 0..100 {
            let delay = behavior.compute_delay();
            assert!(delay >= Duration::from_millis(50), "delay: {delay:?}");
            assert!(delay <= Duration::from_millis(150), "delay: {delay:?}");
        }
    }

    #[test]
    fn negative_base_latency_clamps_to_zero() {
        let behavior = MockBehavior::try_new(MockConfig {
            base_latency: Some(-1.0),
            ..Default::default()
        })
        .expect("behavior");

        assert_eq!(behavior.compute_delay(), Duration::ZERO);
    }

    #[test]
    fn explicit_flags_overwrite_profile_values() {
        let merged = merge_mock_cfg(
            Some(Profile::FlakyUpstream),
            Some(MockConfig {
                error_rate: Some(0.5),
                ..Default::default()
            }),
        );

        // Overwrite wins where set, profile fills the rest.
        assert_eq!(merged.error_rate, Some(0.5));
        assert_eq!(merged.base_latency, Some(0.1));
        assert_eq!(merged.jitter, Some(2.));
        assert_eq!(merged.timeout_rate, Some(0.05));
    }
}
