use std::time::Duration;

use parking_lot::Mutex;

/// How a failed request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A response arrived, with a non success status.
    HttpStatus,
    /// The request ran into the client side timeout.
    Timeout,
    /// Transport level failure (connect, dns, io).
    Other,
}

/// Result of a single issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    pub ok: bool,
    pub status: Option<u16>,
    pub failure: Option<FailureKind>,
}

impl RequestOutcome {
    /// Classify a received response status.
    /// Every 2xx and 3xx counts as a success.
    pub fn from_status(status: u16) -> Self {
        if (200..400).contains(&status) {
            Self {
                ok: true,
                status: Some(status),
                failure: None,
            }
        } else {
            Self {
                ok: false,
                status: Some(status),
                failure: Some(FailureKind::HttpStatus),
            }
        }
    }

    /// Outcome for a request that produced no response at all.
    pub fn from_failure(kind: FailureKind) -> Self {
        Self {
            ok: false,
            status: None,
            failure: Some(kind),
        }
    }
}

#[derive(Debug, Default)]
struct Totals {
    count: u64,
    sum_millis: f64,
    ok: u64,
    http_fail: u64,
    timeout_fail: u64,
    other_fail: u64,
}

/// Concurrency safe collector of per request measurements.
///
/// Workers record through a shared reference; the critical section is a
/// handful of additions, so a plain mutex is enough even with hundreds
/// of recorders.
#[derive(Debug, Default)]
pub struct MetricsAggregator {
    totals: Mutex<Totals>,
}

impl MetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed request attempt.
    ///
    /// Failed attempts carry their elapsed time just like successes, so
    /// the mean reflects everything the run actually waited for.
    pub fn record_request(&self, latency: Duration, outcome: &RequestOutcome) {
        let mut totals = self.totals.lock();
        totals.count += 1;
        totals.sum_millis += latency.as_secs_f64() * 1_000.0;
        if outcome.ok {
            totals.ok += 1;
            return;
        }
        match outcome.failure {
            Some(FailureKind::HttpStatus) => totals.http_fail += 1,
            Some(FailureKind::Timeout) => totals.timeout_fail += 1,
            _ => totals.other_fail += 1,
        }
    }

    /// Snapshot of everything recorded so far.
    ///
    /// A fresh aggregator reports a count of zero and a mean of zero.
    pub fn summary(&self) -> RunSummary {
        let totals = self.totals.lock();
        let mean_millis = if totals.count == 0 {
            0.0
        } else {
            totals.sum_millis / totals.count as f64
        };
        RunSummary {
            count: totals.count,
            mean_millis,
            ok: totals.ok,
            http_fail: totals.http_fail,
            timeout_fail: totals.timeout_fail,
            other_fail: totals.other_fail,
        }
    }
}

/// Aggregate view over all recorded requests of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    /// Total number of completed request attempts, failures included.
    pub count: u64,
    /// Mean wall clock latency in milliseconds, `0.0` when nothing was
    /// recorded.
    pub mean_millis: f64,
    pub ok: u64,
    pub http_fail: u64,
    pub timeout_fail: u64,
    pub other_fail: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_aggregator_reports_zero() {
        let summary = MetricsAggregator::new().summary();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_millis, 0.0);
        assert_eq!(summary.ok, 0);
    }

    #[test]
    fn mean_is_sum_over_count() {
        let agg = MetricsAggregator::new();
        agg.record_request(Duration::from_millis(10), &RequestOutcome::from_status(200));
        agg.record_request(Duration::from_millis(20), &RequestOutcome::from_status(200));
        agg.record_request(Duration::from_micros(500), &RequestOutcome::from_status(200));

        let summary = agg.summary();
        assert_eq!(summary.count, 3);
        assert!((summary.mean_millis - 10.166666).abs() < 1e-3);
    }

    #[test]
    fn failures_count_like_successes() {
        let agg = MetricsAggregator::new();
        agg.record_request(Duration::from_millis(5), &RequestOutcome::from_status(200));
        agg.record_request(Duration::from_millis(5), &RequestOutcome::from_status(500));
        agg.record_request(
            Duration::from_millis(5),
            &RequestOutcome::from_failure(FailureKind::Timeout),
        );
        agg.record_request(
            Duration::from_millis(5),
            &RequestOutcome::from_failure(FailureKind::Other),
        );

        let summary = agg.summary();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.http_fail, 1);
        assert_eq!(summary.timeout_fail, 1);
        assert_eq!(summary.other_fail, 1);
        assert_eq!(summary.mean_millis, 5.0);
    }

    #[test]
    fn concurrent_records_lose_nothing() {
        let agg = MetricsAggregator::new();

        std::thread::scope(|scope| {
            for _ in 0..100 {
                scope.spawn(|| {
                    for _ in 0..100 {
                        agg.record_request(
                            Duration::from_millis(5),
                            &RequestOutcome::from_status(200),
                        );
                    }
                });
            }
        });

        let summary = agg.summary();
        assert_eq!(summary.count, 10_000);
        assert_eq!(summary.ok, 10_000);
        assert_eq!(summary.mean_millis, 5.0);
    }

    #[test]
    fn status_classification() {
        for (status, ok) in [
            (200, true),
            (204, true),
            (301, true),
            (399, true),
            (199, false),
            (400, false),
            (404, false),
            (500, false),
        ] {
            let outcome = RequestOutcome::from_status(status);
            assert_eq!(outcome.ok, ok, "status: {status}");
            assert_eq!(outcome.status, Some(status));
            if ok {
                assert_eq!(outcome.failure, None);
            } else {
                assert_eq!(outcome.failure, Some(FailureKind::HttpStatus));
            }
        }
    }
}
