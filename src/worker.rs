use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};
use crate::extract::{extract, parse_document};
use crate::fetch::PageFetcher;
use crate::job::Job;
use crate::repository::JobRepository;

/// What happened to a job that was processed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeOutcome {
    /// No source URL, nothing fetched.
    Skipped,
    /// Page fetched but nothing extracted; the record was not written.
    Unchanged,
    /// New description and/or status persisted.
    Updated,
}

/// Refreshes one job from its live posting.
#[derive(Clone)]
pub struct FetchWorker {
    repository: Arc<dyn JobRepository>,
    fetcher: Arc<dyn PageFetcher>,
}

impl FetchWorker {
    pub fn new(repository: Arc<dyn JobRepository>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            repository,
            fetcher,
        }
    }

    /// Fetch, extract and conditionally persist a single job.
    ///
    /// Makes exactly one GET attempt. A non-200 response is an error and never
    /// changes the job's status by itself.
    pub async fn process_job(&self, mut job: Job, cancel: &CancellationToken) -> Result<ScrapeOutcome> {
        if !job.has_source() {
            debug!(job_id = %job.id, "No source URL, skipping");
            return Ok(ScrapeOutcome::Skipped);
        }

        let page = self.fetcher.fetch(&job.url, cancel).await.map_err(|e| {
            if !matches!(e, ScrapeError::Cancelled) {
                warn!(job_id = %job.id, url = %job.url, error = %e, "Failed to fetch job posting");
            }
            e
        })?;

        if !page.is_ok() {
            warn!(job_id = %job.id, url = %job.url, status = page.status, "Non-OK HTTP status");
            return Err(ScrapeError::HttpStatus(page.status));
        }

        // The parsed document is not Send; keep it out of scope of the awaits below.
        let extracted = {
            let document = parse_document(&page.body).map_err(|e| {
                warn!(job_id = %job.id, url = %job.url, error = %e, "Failed to parse job posting");
                e
            })?;
            extract(&document)
        };

        if !job.apply_scrape(&extracted.description, &extracted.status) {
            debug!(job_id = %job.id, "Nothing extracted, leaving job untouched");
            return Ok(ScrapeOutcome::Unchanged);
        }

        self.repository.update_job(&job).await.map_err(|e| {
            warn!(job_id = %job.id, error = %e, "Failed to persist scraped job");
            ScrapeError::Persist(e)
        })?;

        info!(
            job_id = %job.id,
            status = %job.status,
            description_len = job.description.len(),
            "Job refreshed from posting"
        );
        Ok(ScrapeOutcome::Updated)
    }
}
