//! Job persistence.
//!
//! The scraping engine only needs [`JobRepository::get_all`] and
//! [`JobRepository::update_job`]; the rest of the trait is the CRUD surface
//! used by the rest of the application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::RepositoryError;
use crate::job::{Job, JobStatus};

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create_job(&self, job: Job) -> RepositoryResult<()>;

    async fn get_job_by_id(&self, id: Uuid) -> RepositoryResult<Job>;

    async fn get_all(&self) -> RepositoryResult<Vec<Job>>;

    /// Save the whole record. Bumps `updated_at`.
    async fn update_job(&self, job: &Job) -> RepositoryResult<()>;

    async fn delete_job(&self, id: Uuid) -> RepositoryResult<()>;

    async fn get_jobs_by_status(&self, status: JobStatus) -> RepositoryResult<Vec<Job>>;
}

/// One row of the tracking CSV.
#[derive(Debug, Serialize, Deserialize)]
struct JobRecord {
    #[serde(rename = "Id")]
    id: Uuid,
    #[serde(rename = "Company")]
    company: String,
    #[serde(rename = "Position")]
    position: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "Salary")]
    salary: i64,
    #[serde(rename = "Remote")]
    remote: bool,
    #[serde(rename = "Url")]
    url: String,
    #[serde(rename = "CreatedAt")]
    created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    updated_at: DateTime<Utc>,
}

impl From<JobRecord> for Job {
    fn from(record: JobRecord) -> Self {
        Job {
            id: record.id,
            company: record.company,
            position: record.position,
            description: record.description,
            status: JobStatus::from_label(&record.status),
            salary: record.salary,
            remote: record.remote,
            url: record.url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<&Job> for JobRecord {
    fn from(job: &Job) -> Self {
        JobRecord {
            id: job.id,
            company: job.company.clone(),
            position: job.position.clone(),
            description: job.description.clone(),
            status: job.status.to_string(),
            salary: job.salary,
            remote: job.remote,
            url: job.url.clone(),
            created_at: job.created_at,
            updated_at: job.updated_at,
        }
    }
}

/// Process-local repository, optionally seeded from and flushed to a CSV file.
#[derive(Debug, Default)]
pub struct InMemoryJobRepository {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_jobs(jobs: impl IntoIterator<Item = Job>) -> Self {
        Self {
            jobs: RwLock::new(jobs.into_iter().map(|job| (job.id, job)).collect()),
        }
    }

    /// Load every row of a tracking CSV. Statuses are mapped through
    /// [`JobStatus::from_label`].
    pub fn load_csv(path: &Path) -> RepositoryResult<Self> {
        let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut jobs = Vec::new();
        for result in rdr.deserialize() {
            let record: JobRecord = result?;
            jobs.push(Job::from(record));
        }
        tracing::info!(path = %path.display(), count = jobs.len(), "Loaded tracked jobs");
        Ok(Self::with_jobs(jobs))
    }

    /// Write all jobs to `path`, oldest first.
    pub async fn save_csv(&self, path: &Path) -> RepositoryResult<()> {
        let mut jobs = self.get_all().await?;
        jobs.sort_by_key(|job| job.created_at);

        let mut wtr = WriterBuilder::new().has_headers(true).from_path(path)?;
        for job in &jobs {
            wtr.serialize(JobRecord::from(job))?;
        }
        wtr.flush()?;
        tracing::info!(path = %path.display(), count = jobs.len(), "Saved tracked jobs");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create_job(&self, job: Job) -> RepositoryResult<()> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job.id) {
            return Err(RepositoryError::AlreadyExists(job.id));
        }
        jobs.insert(job.id, job);
        Ok(())
    }

    async fn get_job_by_id(&self, id: Uuid) -> RepositoryResult<Job> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn get_all(&self) -> RepositoryResult<Vec<Job>> {
        Ok(self.jobs.read().await.values().cloned().collect())
    }

    async fn update_job(&self, job: &Job) -> RepositoryResult<()> {
        let mut jobs = self.jobs.write().await;
        let stored = jobs
            .get_mut(&job.id)
            .ok_or(RepositoryError::NotFound(job.id))?;
        *stored = job.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_job(&self, id: Uuid) -> RepositoryResult<()> {
        self.jobs
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn get_jobs_by_status(&self, status: JobStatus) -> RepositoryResult<Vec<Job>> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|job| job.status == status)
            .cloned()
            .collect())
    }
}
