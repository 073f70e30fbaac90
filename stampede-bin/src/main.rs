use std::{path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use tokio_graceful::Shutdown;

use stampede_lib::{error::BoxError, utils};

pub mod cmd;
pub mod config;

#[cfg(target_family = "unix")]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static ALLOC: mimalloc::MiMalloc = mimalloc::MiMalloc;


/// CLI arguments for configuring stampede behavior.
#[derive(Debug, Clone, Parser)]
#[command(name = "stampede")]
#[command(bin_name = "stampede")]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    cmds: CliCommands,

    /// debug logging as default instead of Info; use RUST_LOG env for more options
    #[arg(long, short = 'v', default_value_t = false, global = true)]
    pub verbose: bool,

    /// enable pretty logging (format for humans)
    #[arg(long, default_value_t = false, global = true)]
    pub pretty: bool,

    /// write the tracing output to the provided (log) file instead of stderr
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "SECONDS", default_value_t = 0., global = true)]
    /// the graceful shutdown timeout (<= 0.0 = no timeout)
    pub graceful: f64,
}

#[derive(Debug, Clone, Subcommand)]
enum CliCommands {
    Run(self::cmd::run::RunCommand),
    Mock(self::cmd::mock::MockCommand),
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let args = Args::parse();

    utils::telemetry::init_tracing(utils::telemetry::TelemetryConfig {
        verbose: args.verbose,
        pretty: args.pretty,
        output: args.output.as_deref(),
    })?;

    if let Err(err) = run_with_args(base_shutdown_signal(), args).await {
        eprintln!("🚩 exit with error: {err}");
        std::process::exit(1);
    }

    Ok(())
}

/// run a stampede cmd with the given args
async fn run_with_args<F>(base_shutdown_signal: F, args: Args) -> Result<(), BoxError>
where
    F: Future<Output: Send + 'static> + Send + 'static,
{
    let graceful_timeout = (args.graceful > 0.).then(|| Duration::from_secs_f64(args.graceful));

    let (error_tx, error_rx) = tokio::sync::oneshot::channel::<BoxError>();
    let graceful = Shutdown::new(new_shutdown_signal(error_rx, base_shutdown_signal));

    let cmd_handle = graceful.spawn_task_fn(async move |guard| {
        let result = match args.cmds {
            CliCommands::Run(run_args) => self::cmd::run::exec(guard, run_args).await,
            CliCommands::Mock(mock_args) => self::cmd::mock::exec(guard, mock_args).await,
        };
        if let Err(err) = result {
            let _ = error_tx.send(format!("{err}").into());
            return Err(err);
        }
        Ok(())
    });

    let delay = match graceful_timeout {
        Some(duration) => graceful.shutdown_with_limit(duration).await?,
        None => graceful.shutdown().await,
    };

    tracing::debug!("gracefully shutdown with a delay of: {delay:?}");

    match cmd_handle.await {
        Ok(result) => result,
        Err(err) => Err(err.into()),
    }
}

fn new_shutdown_signal(
    error_rx: tokio::sync::oneshot::Receiver<BoxError>,
    base_shutdown_signal: impl Future<Output: Send + 'static> + Send + 'static,
) -> impl Future + Send + 'static {
    async move {
        tokio::select! {
            _ = base_shutdown_signal => {
                tracing::debug!("default signal triggered: init graceful shutdown");
            }
            result = error_rx => {
                match result {
                    Ok(err) => {
                        tracing::error!("fatal err received: {err}; abort");
                    },
                    Err(_) => {
                        tracing::debug!("command is finished without error, return control");
                    },
                }
            }
        }
    }
}

#[cfg(target_family = "unix")]
async fn base_shutdown_signal() {
    let mut sigterm =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                tracing::warn!("install SIGTERM handler failed: {err}; use ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(target_family = "unix"))]
async fn base_shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
