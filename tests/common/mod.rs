//! Shared fakes for scraper integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use job_tracker::error::{RepositoryError, ScrapeError};
use job_tracker::repository::RepositoryResult;
use job_tracker::{FetchedPage, InMemoryJobRepository, Job, JobRepository, JobStatus, PageFetcher};

pub const RICH_DESCRIPTION: &str =
    r#"<html><body><div class="description__text--rich">Senior Engineer role</div></body></html>"#;

pub fn job_with_url(url: &str) -> Job {
    Job::new("Acme", "Engineer", "original", 120_000, true, url)
}

pub fn ok_page(html: &str) -> FetchedPage {
    FetchedPage {
        status: 200,
        body: html.as_bytes().to_vec(),
    }
}

/// Serves canned pages and records how many fetches overlap.
///
/// Ignores cancellation once a fetch has started so tests can observe
/// in-flight work running to completion.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, FetchedPage>,
    fallback: Option<FetchedPage>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, page: FetchedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    /// Page returned for any URL without a specific entry.
    pub fn with_fallback(mut self, page: FetchedPage) -> Self {
        self.fallback = Some(page);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str, _cancel: &CancellationToken) -> Result<FetchedPage, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| ScrapeError::Network(format!("no route to {url}")))
    }
}

/// In-memory repository that counts writes and can be told to fail.
#[derive(Default)]
pub struct CountingRepository {
    inner: InMemoryJobRepository,
    updates: AtomicUsize,
    fail_updates: AtomicBool,
    fail_listing: AtomicBool,
    failing_listings: AtomicUsize,
    listings: AtomicUsize,
}

impl CountingRepository {
    pub fn with_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        Self {
            inner: InMemoryJobRepository::with_jobs(jobs),
            ..Default::default()
        }
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn fail_updates(&self) {
        self.fail_updates.store(true, Ordering::SeqCst);
    }

    pub fn fail_listing(&self) {
        self.fail_listing.store(true, Ordering::SeqCst);
    }

    /// Fail only the next `count` listings, then recover.
    pub fn fail_next_listings(&self, count: usize) {
        self.failing_listings.store(count, Ordering::SeqCst);
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRepository for CountingRepository {
    async fn create_job(&self, job: Job) -> RepositoryResult<()> {
        self.inner.create_job(job).await
    }

    async fn get_job_by_id(&self, id: Uuid) -> RepositoryResult<Job> {
        self.inner.get_job_by_id(id).await
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Job>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        let transient = self
            .failing_listings
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if transient || self.fail_listing.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("database unavailable".to_string()));
        }
        self.inner.get_all().await
    }

    async fn update_job(&self, job: &Job) -> RepositoryResult<()> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("write rejected".to_string()));
        }
        self.inner.update_job(job).await
    }

    async fn delete_job(&self, id: Uuid) -> RepositoryResult<()> {
        self.inner.delete_job(id).await
    }

    async fn get_jobs_by_status(&self, status: JobStatus) -> RepositoryResult<Vec<Job>> {
        self.inner.get_jobs_by_status(status).await
    }
}
