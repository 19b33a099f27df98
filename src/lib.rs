//! Job application tracker with a background scraper that keeps each job's
//! description and status in sync with its live posting.

pub mod config;
pub mod cycle;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod job;
pub mod repository;
pub mod scheduler;
pub mod shutdown;
pub mod worker;

pub use config::ScraperConfig;
pub use cycle::{CycleCoordinator, CycleReport};
pub use error::{ConfigError, RepositoryError, ScrapeError};
pub use fetch::{FetchedPage, PageFetcher, ReqwestFetcher};
pub use job::{Job, JobStatus};
pub use repository::{InMemoryJobRepository, JobRepository};
pub use scheduler::Scheduler;
pub use worker::{FetchWorker, ScrapeOutcome};
