use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Application status of a tracked job.
///
/// `Pending` through `Offer` are set by the user; `Open`, `Closed` and
/// `Unknown` come out of scraping the live posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Unknown,
    Open,
    Closed,
    Pending,
    Applied,
    Interview,
    Rejected,
    Offer,
}

impl JobStatus {
    /// Maps a free-text label onto the vocabulary, ignoring case.
    /// Anything unrecognised becomes `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_uppercase().as_str() {
            "OPEN" => JobStatus::Open,
            "CLOSED" => JobStatus::Closed,
            "PENDING" => JobStatus::Pending,
            "APPLIED" => JobStatus::Applied,
            "INTERVIEW" => JobStatus::Interview,
            "REJECTED" => JobStatus::Rejected,
            "OFFER" => JobStatus::Offer,
            _ => JobStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Unknown => "UNKNOWN",
            JobStatus::Open => "OPEN",
            JobStatus::Closed => "CLOSED",
            JobStatus::Pending => "PENDING",
            JobStatus::Applied => "APPLIED",
            JobStatus::Interview => "INTERVIEW",
            JobStatus::Rejected => "REJECTED",
            JobStatus::Offer => "OFFER",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub company: String,
    pub position: String,
    pub description: String,
    pub status: JobStatus,
    pub salary: i64,
    pub remote: bool,
    /// Posting to re-scrape. Empty means the job is never fetched.
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(
        company: impl Into<String>,
        position: impl Into<String>,
        description: impl Into<String>,
        salary: i64,
        remote: bool,
        url: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company: company.into(),
            position: position.into(),
            description: description.into(),
            status: JobStatus::Pending,
            salary,
            remote,
            url: url.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the user-editable fields.
    pub fn update(
        &mut self,
        company: impl Into<String>,
        position: impl Into<String>,
        description: impl Into<String>,
        salary: i64,
        remote: bool,
        url: impl Into<String>,
    ) {
        self.updated_at = Utc::now();
        self.company = company.into();
        self.position = position.into();
        self.description = description.into();
        self.salary = salary;
        self.remote = remote;
        self.url = url.into();
    }

    /// Apply what a scrape extracted. Empty values leave the field alone.
    /// Returns `false` when nothing was applied.
    pub fn apply_scrape(&mut self, description: &str, status: &str) -> bool {
        if description.is_empty() && status.is_empty() {
            return false;
        }
        if !description.is_empty() {
            self.description = description.to_string();
        }
        if !status.is_empty() {
            self.status = JobStatus::from_label(status);
        }
        true
    }

    pub fn has_source(&self) -> bool {
        !self.url.trim().is_empty()
    }
}
