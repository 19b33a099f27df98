//! Periodic driver for scrape cycles.
//!
//! The scheduler ticks on a fixed period and starts at most one cycle at a
//! time. A tick that arrives while the previous cycle still holds the cycle
//! lock is dropped, not queued. Cancellation stops further ticks; a cycle
//! already in progress keeps running and can be awaited with
//! [`Scheduler::drain`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, OwnedMutexGuard, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::ScraperConfig;
use crate::cycle::{CycleCoordinator, CycleReport};
use crate::error::RepositoryError;
use crate::fetch::PageFetcher;
use crate::repository::JobRepository;
use crate::worker::FetchWorker;

/// Everything a spawned cycle needs, detached from the scheduler's lifetime.
#[derive(Clone)]
struct CycleRunner {
    repository: Arc<dyn JobRepository>,
    coordinator: CycleCoordinator,
    gate: Arc<Semaphore>,
}

impl CycleRunner {
    async fn run(&self, cancel: &CancellationToken) -> Result<CycleReport, RepositoryError> {
        let jobs = self.repository.get_all().await?;
        Ok(self.coordinator.run_cycle(jobs, &self.gate, cancel).await)
    }
}

/// Holds the cycle lock for one cycle and publishes that a cycle is running.
struct CycleGuard {
    running: Arc<watch::Sender<bool>>,
    _lock: OwnedMutexGuard<()>,
}

impl CycleGuard {
    fn new(lock: OwnedMutexGuard<()>, running: &Arc<watch::Sender<bool>>) -> Self {
        running.send_replace(true);
        Self {
            running: Arc::clone(running),
            _lock: lock,
        }
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        // Runs before the lock field is released, so a cycle started right
        // after never has its `true` overwritten.
        self.running.send_replace(false);
    }
}

pub struct Scheduler {
    interval: Duration,
    runner: CycleRunner,
    cycle_lock: Arc<Mutex<()>>,
    running: Arc<watch::Sender<bool>>,
}

impl Scheduler {
    pub fn new(
        config: &ScraperConfig,
        repository: Arc<dyn JobRepository>,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Self {
        let worker = FetchWorker::new(Arc::clone(&repository), fetcher);
        Self {
            interval: config.interval,
            runner: CycleRunner {
                repository,
                coordinator: CycleCoordinator::new(worker),
                // Semaphore::new panics above MAX_PERMITS; validate() reports it properly.
                gate: Arc::new(Semaphore::new(
                    config.max_concurrent_fetches.clamp(1, Semaphore::MAX_PERMITS),
                )),
            },
            cycle_lock: Arc::new(Mutex::new(())),
            running: Arc::new(watch::channel(false).0),
        }
    }

    /// Tick until `cancel` fires. The first tick is one full period after start.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            interval_secs = self.interval.as_secs_f64(),
            max_concurrent_fetches = self.runner.gate.available_permits(),
            "Scraper started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Scraper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    // Detached: the cycle outlives this tick and releases the lock itself.
                    if self.try_start_cycle(&cancel).is_some() {
                        debug!("Scrape cycle dispatched");
                    }
                }
            }
        }
    }

    /// Start a cycle in the background if none is running.
    ///
    /// Returns `None` without waiting when the cycle lock is held. The lock is
    /// released when the spawned cycle finishes, whatever its outcome.
    pub fn try_start_cycle(&self, cancel: &CancellationToken) -> Option<JoinHandle<CycleReport>> {
        let guard = match Arc::clone(&self.cycle_lock).try_lock_owned() {
            Ok(lock) => CycleGuard::new(lock, &self.running),
            Err(_) => {
                info!("Previous scrape cycle still running, skipping tick");
                return None;
            }
        };

        let runner = self.runner.clone();
        let cancel = cancel.clone();
        Some(tokio::spawn(async move {
            let _guard = guard;
            match runner.run(&cancel).await {
                Ok(report) => report,
                Err(e) => {
                    error!(error = %e, "Failed to list jobs, ending cycle early");
                    CycleReport::default()
                }
            }
        }))
    }

    /// Run one cycle inline, waiting for any in-flight cycle first.
    pub async fn run_once(&self, cancel: &CancellationToken) -> Result<CycleReport, RepositoryError> {
        let lock = Arc::clone(&self.cycle_lock).lock_owned().await;
        let _guard = CycleGuard::new(lock, &self.running);
        self.runner.run(cancel).await.map_err(|e| {
            error!(error = %e, "Failed to list jobs");
            e
        })
    }

    /// Reads the published state only, so it never contends with a tick.
    pub fn is_cycle_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Wait until no cycle is in progress. Does not take the cycle lock, so a
    /// tick landing meanwhile is not skipped on its account.
    pub async fn drain(&self) {
        let mut running = self.running.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = running.wait_for(|running| !*running).await;
    }
}
