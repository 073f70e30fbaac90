mod human;
mod json;

pub use self::{human::HumanReporter, json::JsonlReporter};

use stampede_lib::{engine::RequestEvent, metrics::FailureKind};

pub trait Reporter: Send + Sync + 'static {
    fn on_result(&mut self, now: std::time::Duration, ev: &RequestEvent);
    fn on_tick(&mut self, now: std::time::Duration);
    fn finish(&mut self);
}

#[derive(Debug, Default)]
pub struct Counters {
    total: u64,
    ok: u64,
    http_fail: u64,
    timeout_fail: u64,
    other_fail: u64,
    latency_sum_millis: f64,
}

impl Counters {
    fn apply(&mut self, ev: &RequestEvent) {
        self.total += 1;
        self.latency_sum_millis += ev.latency.as_secs_f64() * 1_000.0;
        if ev.outcome.ok {
            self.ok += 1;
            return;
        }
        match ev.outcome.failure {
            Some(FailureKind::HttpStatus) => self.http_fail += 1,
            Some(FailureKind::Timeout) => self.timeout_fail += 1,
            _ => self.other_fail += 1,
        }
    }

    fn mean_millis(&self) -> f64 {
        if self.total == 0 {
            0.
        } else {
            self.latency_sum_millis / self.total as f64
        }
    }

    fn fail(&self) -> u64 {
        self.total - self.ok
    }
}

fn failure_label(failure: Option<FailureKind>) -> Option<&'static str> {
    match failure {
        Some(FailureKind::HttpStatus) => Some("http_status"),
        Some(FailureKind::Timeout) => Some("timeout"),
        Some(FailureKind::Other) => Some("other"),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use stampede_lib::metrics::RequestOutcome;

    use super::*;

    fn event(latency_ms: u64, status: u16) -> RequestEvent {
        RequestEvent {
            user: 0,
            path: Arc::from("/"),
            latency: Duration::from_millis(latency_ms),
            outcome: RequestOutcome::from_status(status),
        }
    }

    #[test]
    fn counters_track_outcomes() {
        let mut counters = Counters::default();
        counters.apply(&event(10, 200));
        counters.apply(&event(30, 200));
        counters.apply(&event(20, 500));
        counters.apply(&RequestEvent {
            user: 1,
            path: Arc::from("/"),
            latency: Duration::from_millis(40),
            outcome: RequestOutcome::from_failure(FailureKind::Timeout),
        });

        assert_eq!(counters.total, 4);
        assert_eq!(counters.ok, 2);
        assert_eq!(counters.http_fail, 1);
        assert_eq!(counters.timeout_fail, 1);
        assert_eq!(counters.other_fail, 0);
        assert_eq!(counters.fail(), 2);
        assert_eq!(counters.mean_millis(), 25.0);
    }

    #[test]
    fn empty_counters_have_zero_mean() {
        assert_eq!(Counters::default().mean_millis(), 0.0);
    }

    #[test]
    fn failure_labels_are_stable() {
        assert_eq!(failure_label(Some(FailureKind::HttpStatus)), Some("http_status"));
        assert_eq!(failure_label(Some(FailureKind::Timeout)), Some("timeout"));
        assert_eq!(failure_label(Some(FailureKind::Other)), Some("other"));
        assert_eq!(failure_label(None), None);
    }
}
