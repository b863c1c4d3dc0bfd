mod common;
mod config;
mod errors;
mod estimator;
mod features;
mod service;
mod training;

use std::fs;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{ServiceConfig, TrainingConfig};
use service::{EstimationPool, EstimationService};
use training::TrainingPipeline;

#[derive(Parser)]
#[command(name = "house-price-estimator")]
#[command(about = "Train a house price model and serve estimates from it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit the forest on historical sales and write the model artifact
    Train {
        /// Dataset file or glob pattern (default: $DATASET_PATH or train.csv)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Artifact output path (default: $MODEL_PATH or model.json)
        #[arg(short, long)]
        model: Option<String>,

        /// Train on the schema columns the dataset has instead of requiring all of them
        #[arg(long)]
        allow_partial_schema: bool,

        #[arg(long)]
        trees: Option<usize>,

        #[arg(long)]
        max_depth: Option<u16>,

        #[arg(long)]
        min_samples_split: Option<usize>,

        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON instead of the summary table
        #[arg(long)]
        json: bool,
    },

    /// Estimate one request given as a JSON object
    Estimate {
        #[command(flatten)]
        startup: StartupArgs,

        /// Request body, e.g. '{"area": 2000, "overallQual": 7}'
        payload: String,
    },

    /// Estimate every line of a JSON Lines file ("-" reads stdin)
    Batch {
        #[command(flatten)]
        startup: StartupArgs,

        /// Worker threads (default: $ESTIMATOR_WORKERS or the number of CPUs)
        #[arg(short, long)]
        workers: Option<usize>,

        input: String,
    },

    /// Report whether a trained model is in use
    Health {
        #[command(flatten)]
        startup: StartupArgs,
    },
}

#[derive(Args)]
struct StartupArgs {
    /// Model artifact path (default: $MODEL_PATH or model.json)
    #[arg(short, long)]
    model: Option<String>,

    /// Dataset used when the artifact is missing (default: $DATASET_PATH or train.csv)
    #[arg(short, long)]
    dataset: Option<String>,

    /// Never train at startup, fall back to the heuristic instead
    #[arg(long)]
    no_auto_train: bool,
}

impl StartupArgs {
    fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::from_env();
        if let Some(model) = &self.model {
            config.training.model_path = model.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.training.dataset_path = dataset.clone();
        }
        if self.no_auto_train {
            config.auto_train = false;
        }
        config
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            dataset,
            model,
            allow_partial_schema,
            trees,
            max_depth,
            min_samples_split,
            seed,
            json,
        } => {
            let mut config = TrainingConfig::from_env();
            if let Some(dataset) = dataset {
                config.dataset_path = dataset;
            }
            if let Some(model) = model {
                config.model_path = model;
            }
            config.allow_partial_schema = allow_partial_schema;
            if let Some(n) = trees {
                config.forest.n_trees = n;
            }
            if let Some(depth) = max_depth {
                config.forest.max_depth = depth;
            }
            if let Some(min) = min_samples_split {
                config.forest.min_samples_split = min;
            }
            if let Some(seed) = seed {
                config.forest.seed = seed;
            }

            let report = TrainingPipeline::new(config)
                .run()
                .context("Training failed")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print_summary();
            }
        }
        Commands::Estimate { startup, payload } => {
            let service = service::initialize(&startup.service_config());
            let response = service.respond_text(&payload);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Batch {
            startup,
            workers,
            input,
        } => {
            let config = startup.service_config();
            let workers = workers.unwrap_or(config.workers);
            let bodies = read_lines(&input)?;

            let service: Arc<EstimationService> = Arc::new(service::initialize(&config));
            let pool = EstimationPool::new(service, workers);
            info!("Estimating {} request(s) with {} worker(s)", bodies.len(), pool.workers());
            let responses = pool.estimate_batch(bodies);

            let stdout = io::stdout();
            let mut out = stdout.lock();
            for response in &responses {
                writeln!(out, "{}", serde_json::to_string(response)?)?;
            }
            let failed = responses.iter().filter(|r| !r.is_success()).count();
            info!("Batch done: {} ok, {} failed", responses.len() - failed, failed);
        }
        Commands::Health { startup } => {
            let service = service::initialize(&startup.service_config());
            println!("{}", serde_json::to_string_pretty(&service.health())?);
        }
    }

    Ok(())
}

/// Non-blank lines of a JSON Lines input
fn read_lines(input: &str) -> Result<Vec<String>> {
    let lines = if input == "-" {
        io::stdin()
            .lock()
            .lines()
            .collect::<io::Result<Vec<_>>>()
            .context("Failed to read requests from stdin")?
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("Failed to read requests from {}", input))?
            .lines()
            .map(str::to_string)
            .collect()
    };
    Ok(lines.into_iter().filter(|l| !l.trim().is_empty()).collect())
}
