use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use hp_engine::{run_sweep, Pipeline, SleepWork};
use hp_optimizer::{extract_scores, ObjectiveDirection, SweepConfig, TARGET_METRIC};
use hp_types::{GreetingStyle, PipelineParams};
use tracing_subscriber::EnvFilter;

/// Toy batch pipeline whose final metrics serve as an optimization target
#[derive(Parser)]
#[command(name = "hello-pipeline")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pipeline once and print the final metrics
    Run(ParamArgs),
    /// Run a local parameter sweep and report the best trial
    Sweep {
        #[command(flatten)]
        params: ParamArgs,

        /// Number of trials to run.
        ///
        /// Grid search walks the grid with greeting_style varying fastest, then
        /// batch_size, repeat_count and delay. Fewer trials than grid points
        /// (270 with the default --grid-steps) leave the later delay and
        /// repeat_count values untried.
        #[arg(long, default_value_t = 20)]
        trials: usize,

        /// Search strategy: grid or random
        #[arg(long, default_value = "random")]
        strategy: String,

        /// Seed for random search
        #[arg(long)]
        seed: Option<u64>,

        /// Steps per float parameter for grid search
        #[arg(long, default_value_t = 3)]
        grid_steps: usize,

        /// Score key that ranks trials
        #[arg(long, default_value = TARGET_METRIC)]
        objective: String,

        /// maximize or minimize the objective
        #[arg(long, default_value = "maximize")]
        direction: ObjectiveDirection,
    },
    /// Print the scores an optimizer would read from a final_metrics.json
    Score {
        path: PathBuf,
    },
}

/// Parameter sources: an optional JSON file, overridden by flags or environment.
#[derive(Args)]
struct ParamArgs {
    /// JSON file with any of the run parameters
    #[arg(long)]
    params: Option<PathBuf>,

    /// uppercase, lowercase, titlecase; anything else leaves text unchanged
    #[arg(long, env = "HELLO_GREETING_STYLE")]
    greeting_style: Option<String>,

    #[arg(long, env = "HELLO_BATCH_SIZE")]
    batch_size: Option<usize>,

    #[arg(long, env = "HELLO_REPEAT_COUNT")]
    repeat_count: Option<usize>,

    /// Simulated work per item, in seconds
    #[arg(long, env = "HELLO_DELAY")]
    delay: Option<f64>,

    #[arg(long, env = "HELLO_OUTDIR")]
    outdir: Option<PathBuf>,
}

impl ParamArgs {
    fn resolve(&self) -> anyhow::Result<PipelineParams> {
        let mut params = match &self.params {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .with_context(|| format!("reading parameters from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("parsing parameters in {}", path.display()))?
            }
            None => PipelineParams::default(),
        };

        if let Some(style) = &self.greeting_style {
            params.greeting_style = GreetingStyle::parse(style);
        }
        if let Some(batch_size) = self.batch_size {
            params.batch_size = batch_size;
        }
        if let Some(repeat_count) = self.repeat_count {
            params.repeat_count = repeat_count;
        }
        if let Some(delay) = self.delay {
            params.delay = delay;
        }
        if let Some(outdir) = &self.outdir {
            params.outdir = outdir.clone();
        }
        Ok(params)
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Execute one subcommand and return the JSON it prints.
async fn execute(command: Commands) -> anyhow::Result<String> {
    let output = match command {
        Commands::Run(args) => {
            let params = args.resolve()?;
            let report = Pipeline::new(params).run().await?;
            serde_json::to_string_pretty(&report.final_metrics)?
        }
        Commands::Sweep {
            params,
            trials,
            strategy,
            seed,
            grid_steps,
            objective,
            direction,
        } => {
            let base = params.resolve()?;
            let config = SweepConfig::new("hello_optimization", &strategy)
                .with_max_trials(trials)
                .with_seed(seed)
                .with_grid_steps(grid_steps)
                .with_objective(&objective, direction);
            let status = run_sweep(config, &base, Arc::new(SleepWork)).await?;
            match &status.best_trial {
                Some(best) => serde_json::to_string_pretty(best)?,
                None => anyhow::bail!(
                    "sweep failed: {}",
                    status.error.as_deref().unwrap_or("no trial completed")
                ),
            }
        }
        Commands::Score { path } => {
            let scores = extract_scores(&path);
            serde_json::to_string_pretty(&scores)?
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = execute(cli.command).await?;
    println!("{output}");
    Ok(())
}
