use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::Instant};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    client::{RequestClient, WebClient, WebClientConfig},
    config::LoadTestConfig,
    error::{ClientError, EngineError},
    metrics::{FailureKind, MetricsAggregator, RequestOutcome, RunSummary},
};

/// Per request notification, emitted when an event sink is configured.
#[derive(Debug, Clone)]
pub struct RequestEvent {
    /// Zero based id of the simulated user that issued the request.
    pub user: usize,
    /// Scenario path the request was issued for.
    pub path: Arc<str>,
    /// Wall clock time from issuing the request until its completion.
    pub latency: Duration,
    pub outcome: RequestOutcome,
}

/// One resolved request target.
#[derive(Debug, Clone)]
struct Target {
    path: Arc<str>,
    url: Arc<str>,
}

/// Restartable walk over the configured request targets.
///
/// Wraps around at the end of the list, so a worker keeps producing
/// requests for as long as the run lasts. Only built from a validated
/// config, so the target list is never empty.
#[derive(Debug, Clone)]
struct ScenarioCycle {
    targets: Arc<[Target]>,
    index: usize,
}

impl ScenarioCycle {
    fn new(config: &LoadTestConfig) -> Self {
        let targets = config
            .scenarios
            .iter()
            .map(|scenario| Target {
                path: scenario.path.as_str().into(),
                url: config.request_url(scenario).into(),
            })
            .collect();
        Self { targets, index: 0 }
    }

    fn next(&mut self) -> Target {
        let target = self.targets[self.index].clone();
        self.index = (self.index + 1) % self.targets.len();
        target
    }
}

/// Drives complete load test runs.
///
/// One engine can serve multiple runs; every run gets its own client,
/// worker set and metrics.
pub struct LoadEngine {
    client_config: WebClientConfig,
    events: Option<mpsc::UnboundedSender<RequestEvent>>,
}

impl Default for LoadEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadEngine {
    pub fn new() -> Self {
        Self {
            client_config: WebClientConfig::default(),
            events: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.client_config.request_timeout = timeout;
        self
    }

    /// Emit one [`RequestEvent`] per completed request to the given sink.
    ///
    /// The channel is unbounded so a slow consumer never stalls a worker;
    /// the only await point of a worker stays its in flight request.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<RequestEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Run a load test to completion and return its aggregate summary.
    ///
    /// Fails fast on an invalid config or when the HTTP client cannot be
    /// created. Once workers are started the run always ends in a
    /// summary, however badly the target behaves.
    pub async fn run(&self, config: &LoadTestConfig) -> Result<RunSummary, EngineError> {
        self.run_until(config, std::future::pending()).await
    }

    /// Like [`run`](Self::run), additionally stopping early once
    /// `interrupt` resolves. Requests already in flight still complete.
    pub async fn run_until(
        &self,
        config: &LoadTestConfig,
        interrupt: impl Future<Output = ()> + Send,
    ) -> Result<RunSummary, EngineError> {
        config.validate()?;
        let client = WebClient::try_new(self.client_config.clone())
            .map_err(|err| EngineError::Resource(err.into()))?;
        Ok(self.drive(config, client, interrupt).await)
    }

    /// Run against a caller supplied [`RequestClient`].
    ///
    /// Scheduling, cancellation and metrics behave exactly like
    /// [`run`](Self::run); only the transport differs.
    pub async fn run_with_client<C: RequestClient>(
        &self,
        config: &LoadTestConfig,
        client: C,
        interrupt: impl Future<Output = ()> + Send,
    ) -> Result<RunSummary, EngineError> {
        config.validate()?;
        Ok(self.drive(config, client, interrupt).await)
    }

    async fn drive<C: RequestClient>(
        &self,
        config: &LoadTestConfig,
        client: C,
        interrupt: impl Future<Output = ()> + Send,
    ) -> RunSummary {
        let metrics = Arc::new(MetricsAggregator::new());
        let cancel = CancellationToken::new();
        let workers = TaskTracker::new();
        let cycle = ScenarioCycle::new(config);

        tracing::debug!(
            users = config.users,
            scenarios = config.scenarios.len(),
            duration_ms = config.duration.as_millis() as u64,
            "start load test run"
        );

        for user in 0..config.users {
            workers.spawn(drive_user(
                user,
                client.clone(),
                cycle.clone(),
                cancel.clone(),
                metrics.clone(),
                self.events.clone(),
            ));
        }
        workers.close();

        tokio::select! {
            _ = tokio::time::sleep(config.duration) => {
                tracing::debug!("run duration elapsed: stop workers");
            }
            _ = interrupt => {
                tracing::debug!("interrupted: stop workers early");
            }
        }

        // One signal for all workers; requests in flight finish first.
        cancel.cancel();
        workers.wait().await;

        let summary = metrics.summary();
        tracing::debug!(
            count = summary.count,
            mean_millis = summary.mean_millis,
            ok = summary.ok,
            "load test run complete"
        );
        summary
    }
}

/// One simulated user: issue requests back to back until told to stop.
///
/// Cancellation is only observed between requests. A request already in
/// flight is never aborted and its sample is still recorded.
async fn drive_user<C: RequestClient>(
    user: usize,
    client: C,
    mut targets: ScenarioCycle,
    cancel: CancellationToken,
    metrics: Arc<MetricsAggregator>,
    events: Option<mpsc::UnboundedSender<RequestEvent>>,
) {
    while !cancel.is_cancelled() {
        let target = targets.next();

        let started = Instant::now();
        let result = client.get(&target.url).await;
        let latency = started.elapsed();

        let outcome = match result {
            Ok(status) => RequestOutcome::from_status(status.as_u16()),
            Err(ClientError::Timeout) => RequestOutcome::from_failure(FailureKind::Timeout),
            Err(ClientError::Transport(err)) => {
                tracing::debug!(user, "request transport failure: {err}");
                RequestOutcome::from_failure(FailureKind::Other)
            }
        };

        metrics.record_request(latency, &outcome);

        if let Some(events) = &events {
            let ev = RequestEvent {
                user,
                path: target.path.clone(),
                latency,
                outcome,
            };
            if events.send(ev).is_err() {
                tracing::debug!(user, "request event dropped: receiver is gone");
            }
        }
    }

    tracing::trace!(user, "user worker done");
}
