use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::{Result, ScrapeError};
use crate::job::Job;
use crate::worker::{FetchWorker, ScrapeOutcome};

/// Outcome counts for one scrape cycle.
///
/// `dispatched` is the size of the job snapshot; every dispatched job lands in
/// exactly one of the other buckets once the cycle returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub dispatched: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl CycleReport {
    fn record(&mut self, job_id: Uuid, result: Result<ScrapeOutcome>) {
        match result {
            Ok(ScrapeOutcome::Updated) => self.updated += 1,
            Ok(ScrapeOutcome::Unchanged) => self.unchanged += 1,
            Ok(ScrapeOutcome::Skipped) => self.skipped += 1,
            Err(ScrapeError::Cancelled) => {
                debug!(job_id = %job_id, "Job abandoned by shutdown");
                self.cancelled += 1;
            }
            Err(e) => {
                debug!(job_id = %job_id, kind = e.kind(), "Job failed this cycle");
                self.failed += 1;
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.updated + self.unchanged + self.skipped + self.failed + self.cancelled
    }
}

/// Fans a job snapshot out to fetch workers behind the admission gate.
#[derive(Clone)]
pub struct CycleCoordinator {
    worker: FetchWorker,
}

impl CycleCoordinator {
    pub fn new(worker: FetchWorker) -> Self {
        Self { worker }
    }

    /// Process every job in `jobs` and wait for all of them.
    ///
    /// Each job runs on its own task and waits for a gate permit before any
    /// network I/O; the permit is held until that job is finished. Individual
    /// failures are counted, never propagated. A job still waiting for a
    /// permit when `cancel` fires gives up without fetching.
    pub async fn run_cycle(
        &self,
        jobs: Vec<Job>,
        gate: &Arc<Semaphore>,
        cancel: &CancellationToken,
    ) -> CycleReport {
        let start = Instant::now();
        let mut report = CycleReport {
            dispatched: jobs.len(),
            ..Default::default()
        };
        info!(jobs = jobs.len(), "Scrape cycle started");

        let mut tasks = JoinSet::new();
        for job in jobs {
            let worker = self.worker.clone();
            let gate = Arc::clone(gate);
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let job_id = job.id;
                if !job.has_source() {
                    return (job_id, worker.process_job(job, &cancel).await);
                }

                let _permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return (job_id, Err(ScrapeError::Cancelled)),
                    permit = gate.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (job_id, Err(ScrapeError::Cancelled)),
                    },
                };

                (job_id, worker.process_job(job, &cancel).await)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((job_id, result)) => report.record(job_id, result),
                Err(e) => {
                    error!(error = %e, "Scrape task panicked");
                    report.failed += 1;
                }
            }
        }

        info!(
            dispatched = report.dispatched,
            updated = report.updated,
            unchanged = report.unchanged,
            skipped = report.skipped,
            failed = report.failed,
            cancelled = report.cancelled,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Scrape cycle finished"
        );
        report
    }
}
