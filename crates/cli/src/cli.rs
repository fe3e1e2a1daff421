use clap::Parser;

use jobrunner_engine::StrategyKind;

/// Run a batch of sleeping workers through the job scheduler.
///
/// Each worker sleeps for a deterministic duration and returns its index;
/// the values are summed as they arrive.
#[derive(Parser, Debug)]
#[command(name = "jobrunner", version, about)]
pub struct CliArgs {
    /// Path to a scheduler TOML config file
    #[arg(long, env = "JOBRUNNER_CONFIG", default_value = "config/jobrunner.toml")]
    pub config: String,

    /// Number of workers in the job
    #[arg(long, default_value_t = 100)]
    pub workers: usize,

    /// Upper bound for a single worker's sleep, in milliseconds
    #[arg(long, default_value_t = 50)]
    pub max_sleep_ms: u64,

    /// Make every K-th worker fail (0 disables failures)
    #[arg(long, default_value_t = 0)]
    pub fail_every: usize,

    /// Scheduling strategy: sequential or priority (overrides config and env)
    #[arg(long)]
    pub strategy: Option<StrategyKind>,

    /// Log worker start/end at info level
    #[arg(long)]
    pub debug: bool,

    /// Print the scheduler metrics as JSON after the job finishes
    #[arg(long)]
    pub metrics: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::parse_from(["jobrunner", "--config", "missing.toml"]);
        assert_eq!(args.workers, 100);
        assert_eq!(args.fail_every, 0);
        assert!(args.strategy.is_none());
        assert!(!args.debug);
    }

    #[test]
    fn strategy_flag_parses() {
        let args = CliArgs::parse_from([
            "jobrunner",
            "--config",
            "missing.toml",
            "--strategy",
            "priority",
            "--workers",
            "8",
            "--fail-every",
            "3",
        ]);
        assert_eq!(args.strategy, Some(StrategyKind::Priority));
        assert_eq!(args.workers, 8);
        assert_eq!(args.fail_every, 3);
    }
}
