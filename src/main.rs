//! Stability demo CLI.
//!
//! Drives a simulated flaky upstream through one of the decorators and logs
//! what each call observed.
//!
//! ```text
//! stability --failure-rate 0.7 --calls 20 breaker
//! stability --config stability.toml retry
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use stability::config::{load_config, StabilityConfig};
use stability::observability::logging::init_logging;
use stability::{CallError, Circuit, Context};

#[derive(Parser)]
#[command(name = "stability")]
#[command(about = "Exercise resilience decorators against a simulated flaky upstream", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults are used when omitted).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Probability in [0, 1] that a simulated upstream call fails.
    #[arg(short, long, default_value_t = 0.5)]
    failure_rate: f64,

    /// Number of calls to issue.
    #[arg(short = 'n', long, default_value_t = 10)]
    calls: u32,

    /// Pause between calls in milliseconds.
    #[arg(short, long, default_value_t = 50)]
    interval_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Circuit breaker with exponential cool-down
    Breaker,
    /// Bounded retry with fixed delay
    Retry,
    /// Leading-edge debounce
    DebounceFirst,
    /// Trailing-edge debounce
    DebounceLast,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => StabilityConfig::default(),
    };
    init_logging(&config.observability.log_level);

    tracing::info!(
        failure_rate = cli.failure_rate,
        calls = cli.calls,
        interval_ms = cli.interval_ms,
        "stability demo starting"
    );

    let root = Context::background();
    let canceller = root.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, cancelling");
            canceller.cancel();
        }
    });

    let upstream = flaky_upstream(cli.failure_rate.clamp(0.0, 1.0));
    let circuit = match cli.command {
        Commands::Breaker => config.breaker.wrap(upstream),
        Commands::Retry => config.retry.wrap(upstream),
        Commands::DebounceFirst => config.debounce.wrap_first(upstream),
        Commands::DebounceLast => config.debounce.wrap_last(upstream),
    };

    let interval = Duration::from_millis(cli.interval_ms);
    for n in 1..=cli.calls {
        if root.is_done() {
            break;
        }
        report(n, circuit.call(root.clone()).await);

        tokio::select! {
            _ = root.done() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    if matches!(cli.command, Commands::DebounceLast) && !root.is_done() {
        // Let the watcher fire, then read what it stored.
        let settle = config.debounce.window() + config.debounce.poll_interval() * 2;
        tokio::time::sleep(settle).await;
        report(cli.calls + 1, circuit.call(root.clone()).await);
    }

    tracing::info!("Demo complete");
    Ok(())
}

fn flaky_upstream(failure_rate: f64) -> Circuit {
    let counter = Arc::new(AtomicU64::new(0));
    Circuit::from_fn(move |ctx: Context| {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::select! {
                reason = ctx.done() => return Err(reason),
                _ = tokio::time::sleep(Duration::from_millis(10)) => {}
            }
            if fastrand::f64() < failure_rate {
                tracing::debug!(upstream_call = n, "Simulated upstream failure");
                Err(CallError::upstream("simulated upstream failure"))
            } else {
                Ok(format!("response #{}", n))
            }
        }
    })
}

fn report(n: u32, result: Result<String, CallError>) {
    match result {
        Ok(body) => tracing::info!(call = n, body = %body, "Call succeeded"),
        Err(e) if e.is_circuit_open() => tracing::warn!(call = n, "Circuit open"),
        Err(e) if e.is_cancellation() => tracing::warn!(call = n, error = %e, "Call cancelled"),
        Err(e) => tracing::warn!(call = n, error = %e, "Call failed"),
    }
}
