use stampede_lib::engine::RequestEvent;

use super::{Counters, Reporter};

pub struct HumanReporter {
    interval: std::time::Duration,
    last_tick: std::time::Duration,
    interval_counts: Counters,
    total_counts: Counters,
}

impl HumanReporter {
    pub fn new(interval: std::time::Duration) -> Self {
        Self {
            interval,
            last_tick: std::time::Duration::ZERO,
            interval_counts: Counters::default(),
            total_counts: Counters::default(),
        }
    }
}

impl Reporter for HumanReporter {
    fn on_result(&mut self, _now: std::time::Duration, ev: &RequestEvent) {
        self.interval_counts.apply(ev);
        self.total_counts.apply(ev);
    }

    fn on_tick(&mut self, now: std::time::Duration) {
        if now.saturating_sub(self.last_tick) < self.interval {
            return;
        }
        self.last_tick = now;

        let interval_secs = self.interval.as_secs_f64();
        let rps = if interval_secs == 0. {
            0.
        } else {
            self.interval_counts.total as f64 / interval_secs
        };

        println!(
            "t={:.1}s rps={:.1} mean_ms={:.1} ok={} http_fail={} timeout_fail={} other_fail={} total_ok={} total_fail={}",
            now.as_secs_f64(),
            rps,
            self.interval_counts.mean_millis(),
            self.interval_counts.ok,
            self.interval_counts.http_fail,
            self.interval_counts.timeout_fail,
            self.interval_counts.other_fail,
            self.total_counts.ok,
            self.total_counts.fail(),
        );

        self.interval_counts = Counters::default();
    }

    fn finish(&mut self) {
        println!(
            "done ok={} http_fail={} timeout_fail={} other_fail={} total={} mean_ms={:.1}",
            self.total_counts.ok,
            self.total_counts.http_fail,
            self.total_counts.timeout_fail,
            self.total_counts.other_fail,
            self.total_counts.total,
            self.total_counts.mean_millis(),
        );
    }
}
