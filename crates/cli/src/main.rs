mod cli;
mod config;
mod workload;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use jobrunner_engine::{ErrorPrinter, Job, Scheduler};

use crate::cli::CliArgs;
use crate::workload::{build_workers, SumConsumer};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    let mut config = config::load(&args.config)?;
    if let Some(strategy) = args.strategy {
        config.strategy = strategy;
    }
    if args.debug {
        config.debug = true;
    }

    let scheduler = Scheduler::from_config(&config);
    info!(
        strategy = scheduler.strategy_name(),
        debug = scheduler.debug(),
        workers = args.workers,
        "scheduler ready"
    );

    let sum = Arc::new(SumConsumer::default());
    let workers = build_workers(args.workers, args.max_sleep_ms, args.fail_every);
    let job = Job::with_consumers("demo", workers, Arc::clone(&sum), ErrorPrinter);

    scheduler
        .submit(Some(&job))
        .context("failed to submit demo job")?;
    job.wait().await;

    info!(total = sum.total(), received = sum.received(), "demo job finished");

    if args.metrics {
        let metrics = scheduler.metrics();
        println!(
            "{}",
            serde_json::to_string_pretty(&metrics).context("failed to serialize metrics")?
        );
    }

    Ok(())
}
