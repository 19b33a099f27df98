use thiserror::Error;
use uuid::Uuid;

/// Why a single job could not be refreshed in a cycle.
///
/// None of these are fatal: the job is logged and retried on the next tick.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected HTTP status {0}")]
    HttpStatus(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Persist error: {0}")]
    Persist(#[from] RepositoryError),

    #[error("Cancelled by shutdown")]
    Cancelled,
}

impl ScrapeError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Network(_) => "network",
            ScrapeError::HttpStatus(_) => "http_status",
            ScrapeError::Parse(_) => "parse",
            ScrapeError::Persist(_) => "persist",
            ScrapeError::Cancelled => "cancelled",
        }
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Network(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Job not found: {0}")]
    NotFound(Uuid),

    #[error("Job already exists: {0}")]
    AlreadyExists(Uuid),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<csv::Error> for RepositoryError {
    fn from(err: csv::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for RepositoryError {
    fn from(err: std::io::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

/// Settings the scraper refuses to start with.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Scrape interval must be greater than zero")]
    ZeroInterval,

    #[error("Request timeout must be greater than zero")]
    ZeroRequestTimeout,

    #[error("Max concurrent fetches must be between 1 and {max}, got {value}")]
    ConcurrencyOutOfRange { value: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
