use std::time::Duration;

use clap::Args;
use tokio::{
    sync::mpsc::{self, UnboundedReceiver},
    time::Instant,
};
use tokio_graceful::ShutdownGuard;

use stampede_lib::{
    config::{LoadTestConfig, Scenario},
    engine::{LoadEngine, RequestEvent},
    error::BoxError,
};

use crate::config::parse_scenario;

pub mod reporter;

use self::reporter::*;

#[derive(Debug, Clone, Args)]
/// run a load test against a target
pub struct RunCommand {
    /// base url of the target under load, e.g. http://127.0.0.1:8080
    #[arg(value_name = "TARGET_URL", required = true)]
    target: String,

    /// number of concurrent simulated users
    #[arg(long, value_name = "N", default_value_t = 1)]
    users: usize,

    /// wall clock duration of the run
    #[arg(long, value_name = "DURATION", default_value = "10s", value_parser = humantime::parse_duration)]
    duration: Duration,

    /// cap on how long a single request may take
    #[arg(long, value_name = "DURATION", default_value = "30s", value_parser = humantime::parse_duration)]
    request_timeout: Duration,

    /// scenario to issue requests for, as PATH or PATH=WEIGHT;
    /// repeat for multiple scenarios, defaults to '/'
    #[arg(long = "path", value_name = "PATH[=WEIGHT]", value_parser = parse_scenario)]
    paths: Vec<Scenario>,

    /// report json lines instead of a human-friendly format
    #[arg(long, default_value_t = false)]
    json: bool,

    /// time between periodic progress reports
    #[arg(long, value_name = "DURATION", default_value = "1s", value_parser = humantime::parse_duration)]
    report_interval: Duration,
}

pub async fn exec(guard: ShutdownGuard, args: RunCommand) -> Result<(), BoxError> {
    let scenarios = if args.paths.is_empty() {
        vec![Scenario::new("/")]
    } else {
        args.paths.clone()
    };

    let config = LoadTestConfig {
        target_url: args.target.clone(),
        users: args.users,
        duration: args.duration,
        scenarios,
    };
    config.validate()?;

    tracing::info!(
        target = %config.target_url,
        users = config.users,
        duration_ms = config.duration.as_millis() as u64,
        scenarios = config.scenarios.len(),
        "load test config ready"
    );

    let reporter: Box<dyn Reporter> = if args.json {
        const EMIT_EVENTS: bool = true;
        Box::new(JsonlReporter::new(args.report_interval, EMIT_EVENTS))
    } else {
        Box::new(HumanReporter::new(args.report_interval))
    };

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let report_handle = guard.spawn_task(report_worker(reporter, events_rx));

    let engine = LoadEngine::new()
        .with_request_timeout(args.request_timeout)
        .with_events(events_tx);

    let result = engine
        .run_until(&config, guard.clone_weak().into_cancelled())
        .await;

    // The engine holds the last event sender; dropping it lets the
    // report worker drain to the end and print the closing report.
    drop(engine);
    if let Err(err) = report_handle.await {
        tracing::debug!("report worker join failed: {err}");
    }

    let summary = result?;
    tracing::info!(
        count = summary.count,
        mean_millis = summary.mean_millis,
        ok = summary.ok,
        http_fail = summary.http_fail,
        timeout_fail = summary.timeout_fail,
        other_fail = summary.other_fail,
        "load test summary"
    );

    Ok(())
}

/// Consume request events until all senders are gone, then print the
/// closing report. Draining to the very end keeps the final totals
/// complete even when the run is interrupted.
async fn report_worker(
    mut reporter: Box<dyn Reporter>,
    mut events_rx: UnboundedReceiver<RequestEvent>,
) {
    let start = Instant::now();

    while let Some(ev) = events_rx.recv().await {
        let now = start.elapsed();
        reporter.on_result(now, &ev);
        reporter.on_tick(now);
    }

    tracing::debug!("all event senders closed: finish report");
    reporter.finish();
}
