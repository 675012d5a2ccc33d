use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wikireel::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "wikireel",
    version,
    about = "Wikipedia article pipeline with embeddings and spoken audio summaries",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// TOML configuration file (environment variables still apply on top)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the crawl pipeline once
    Crawl {
        /// Print collected articles as JSON instead of storing them
        #[arg(long, default_value = "false")]
        dry_run: bool,

        /// Override the global article cap
        #[arg(short, long)]
        max_articles: Option<usize>,

        /// Fixed sampling seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the crawl pipeline on a fixed interval
    Schedule {
        /// Minutes between runs
        #[arg(short, long)]
        interval_minutes: Option<u64>,

        /// Wait one interval before the first run
        #[arg(long, default_value = "false")]
        no_initial_run: bool,
    },

    /// Start the summarization web service
    Serve {
        /// Bind address (e.g. 0.0.0.0:5000)
        #[arg(short, long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };

    let log_format = cli
        .log_format
        .clone()
        .unwrap_or_else(|| config.logging.format.clone());
    setup_tracing(&log_format, cli.verbose, &config.logging.level)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "wikireel starting");

    match cli.command {
        Commands::Crawl {
            dry_run,
            max_articles,
            seed,
        } => {
            if let Some(max_articles) = max_articles {
                config.crawl.max_articles = max_articles;
            }
            if seed.is_some() {
                config.crawl.seed = seed;
            }
            config.validate().context("Invalid configuration")?;

            tracing::info!(
                dry_run,
                max_articles = config.crawl.max_articles,
                seed = ?config.crawl.seed,
                "Starting crawl command"
            );
            commands::crawl(config, dry_run).await?;
        }

        Commands::Schedule {
            interval_minutes,
            no_initial_run,
        } => {
            if let Some(minutes) = interval_minutes {
                config.schedule.interval_minutes = minutes;
            }
            if no_initial_run {
                config.schedule.run_on_startup = false;
            }
            config.validate().context("Invalid configuration")?;

            tracing::info!(
                interval_minutes = config.schedule.interval_minutes,
                run_on_startup = config.schedule.run_on_startup,
                "Starting schedule command"
            );
            commands::schedule(config).await?;
        }

        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind_address = bind;
            }
            config.validate().context("Invalid configuration")?;

            tracing::info!(bind = %config.server.bind_address, "Starting serve command");
            commands::serve(config).await?;
        }
    }

    tracing::info!("wikireel completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, verbose: bool, level: &str) -> Result<()> {
    let env_filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => tracing_subscriber::EnvFilter::new("wikireel=debug,info"),
        Err(_) => tracing_subscriber::EnvFilter::try_new(format!("wikireel={level},warn"))
            .context("Invalid log level")?,
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
