use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::Semaphore;

use crate::error::ConfigError;

/// Default period between scrape cycles.
pub const DEFAULT_SCRAPE_INTERVAL: Duration = Duration::from_secs(30);

/// Default cap on in-flight page fetches across a cycle.
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 20;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Settings for the background scraper.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Time between ticks. A tick that lands while a cycle is running is dropped.
    pub interval: Duration,
    /// Admission gate capacity.
    pub max_concurrent_fetches: usize,
    /// Upper bound on a single GET, including reading the body.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Tracking CSV to seed the repository from and flush back to on shutdown.
    pub jobs_file: Option<PathBuf>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_SCRAPE_INTERVAL,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            jobs_file: None,
        }
    }
}

impl ScraperConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max;
        self
    }

    pub fn with_jobs_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.jobs_file = Some(path.into());
        self
    }

    /// Reject settings the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        // The admission gate is a semaphore, which cannot hold more permits.
        if !(1..=Semaphore::MAX_PERMITS).contains(&self.max_concurrent_fetches) {
            return Err(ConfigError::ConcurrencyOutOfRange {
                value: self.max_concurrent_fetches,
                max: Semaphore::MAX_PERMITS,
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroRequestTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScraperConfig::default();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.max_concurrent_fetches, 20);
        assert!(config.jobs_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ScraperConfig::default()
            .with_interval(Duration::from_secs(5))
            .with_max_concurrent_fetches(3)
            .with_jobs_file("applications.csv");
        assert_eq!(config.interval, Duration::from_secs(5));
        assert_eq!(config.max_concurrent_fetches, 3);
        assert_eq!(config.jobs_file, Some(PathBuf::from("applications.csv")));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert_eq!(
            ScraperConfig::default().with_interval(Duration::ZERO).validate(),
            Err(ConfigError::ZeroInterval)
        );
        assert!(matches!(
            ScraperConfig::default().with_max_concurrent_fetches(0).validate(),
            Err(ConfigError::ConcurrencyOutOfRange { value: 0, .. })
        ));

        let mut config = ScraperConfig::default();
        config.request_timeout = Duration::ZERO;
        assert_eq!(config.validate(), Err(ConfigError::ZeroRequestTimeout));
    }

    #[test]
    fn test_validate_rejects_capacity_beyond_semaphore_limit() {
        let config = ScraperConfig::default().with_max_concurrent_fetches(usize::MAX);
        assert_eq!(
            config.validate(),
            Err(ConfigError::ConcurrencyOutOfRange {
                value: usize::MAX,
                max: Semaphore::MAX_PERMITS,
            })
        );

        let at_limit = ScraperConfig::default().with_max_concurrent_fetches(Semaphore::MAX_PERMITS);
        assert!(at_limit.validate().is_ok());
    }
}
