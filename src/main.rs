use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use job_tracker::shutdown::install_shutdown_handler;
use job_tracker::{InMemoryJobRepository, ReqwestFetcher, Scheduler, ScraperConfig};

#[derive(Parser, Debug)]
#[command(name = "job-tracker")]
#[command(version)]
#[command(about = "Keeps tracked job applications in sync with their live postings")]
struct Args {
    #[command(flatten)]
    scraper: ScraperArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Re-scrape every tracked job on a fixed interval until interrupted (default)
    Run,

    /// Run a single scrape cycle and print its report as JSON
    ScrapeOnce,
}

#[derive(clap::Args, Debug)]
struct ScraperArgs {
    /// Tracking CSV to load jobs from and save them back to
    #[arg(long, env = "JOBS_FILE", default_value = "applications.csv", global = true)]
    jobs_file: PathBuf,

    /// Seconds between scrape cycles
    #[arg(long, env = "SCRAPE_INTERVAL_SECS", default_value_t = 30, global = true)]
    interval_secs: u64,

    /// Maximum number of postings fetched at once
    #[arg(long, env = "SCRAPE_MAX_CONCURRENT", default_value_t = 20, global = true)]
    max_concurrent: usize,

    /// Per-request timeout in seconds
    #[arg(long, env = "SCRAPE_TIMEOUT_SECS", default_value_t = 30, global = true)]
    timeout_secs: u64,
}

impl ScraperArgs {
    fn into_config(self) -> ScraperConfig {
        let mut config = ScraperConfig::default()
            .with_interval(Duration::from_secs(self.interval_secs))
            .with_max_concurrent_fetches(self.max_concurrent)
            .with_jobs_file(self.jobs_file);
        config.request_timeout = Duration::from_secs(self.timeout_secs);
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Values from .env only fill in variables the environment leaves unset.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let command = args.command.unwrap_or(Commands::Run);
    let config = args.scraper.into_config();
    config.validate().context("Invalid scraper configuration")?;

    let jobs_file = config
        .jobs_file
        .clone()
        .context("a jobs file is required")?;
    let repository = if jobs_file.exists() {
        InMemoryJobRepository::load_csv(&jobs_file)
            .with_context(|| format!("Failed to load {}", jobs_file.display()))?
    } else {
        tracing::warn!(path = %jobs_file.display(), "Jobs file not found, starting empty");
        InMemoryJobRepository::new()
    };
    let repository = Arc::new(repository);

    let fetcher = Arc::new(ReqwestFetcher::new(&config).context("Failed to build HTTP client")?);
    let scheduler = Scheduler::new(&config, repository.clone(), fetcher);
    let shutdown = install_shutdown_handler().context("Failed to install signal handlers")?;

    match command {
        Commands::Run => {
            scheduler.run(shutdown).await;
            tracing::info!("Waiting for in-flight scrape cycle to finish");
            scheduler.drain().await;
        }
        Commands::ScrapeOnce => {
            let report = scheduler.run_once(&shutdown).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    repository
        .save_csv(&jobs_file)
        .await
        .with_context(|| format!("Failed to save {}", jobs_file.display()))?;
    Ok(())
}
