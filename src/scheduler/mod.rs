//! Periodic job scheduling
//!
//! Runs a [`ScheduledJob`] on a fixed interval until a shutdown future
//! resolves. Runs never overlap: a tick that fires while the previous run
//! is still going is skipped and logged. Missed ticks are not replayed.
//!
//! ```text
//! tick ──▶ try_lock ──┬── acquired ──▶ spawn run ──▶ release on completion
//!                     └── busy ──────▶ skip (skipped_overlap += 1)
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::ScheduleConfig;
use crate::error::Result;

/// A unit of work the scheduler can run repeatedly
#[async_trait]
pub trait ScheduledJob: Send + 'static {
    /// Name used in log fields
    fn name(&self) -> &str;

    /// Perform one run
    async fn run(&mut self) -> Result<()>;
}

/// Counters reported when the scheduler stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Runs started
    pub triggered: u64,

    /// Ticks skipped because a run was still in progress
    pub skipped_overlap: u64,

    /// Runs that returned an error
    pub failed: u64,
}

/// Fixed-interval scheduler
#[derive(Debug, Clone)]
pub struct Scheduler {
    interval: Duration,
    run_on_startup: bool,
}

impl Scheduler {
    /// Create a scheduler
    pub fn new(interval: Duration, run_on_startup: bool) -> Self {
        Self {
            interval,
            run_on_startup,
        }
    }

    /// Create from configuration
    pub fn from_config(config: &ScheduleConfig) -> Self {
        Self::new(config.interval(), config.run_on_startup)
    }

    /// Interval between runs
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `job` on every tick until `shutdown` resolves
    ///
    /// A run in progress at shutdown is awaited, not cancelled.
    pub async fn run_until<J, F>(&self, job: J, shutdown: F) -> SchedulerStats
    where
        J: ScheduledJob,
        F: Future<Output = ()>,
    {
        let job = Arc::new(Mutex::new(job));
        let failures = Arc::new(AtomicU64::new(0));
        let mut stats = SchedulerStats::default();
        let mut in_flight: Option<JoinHandle<()>> = None;

        let start = if self.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            interval_secs = self.interval.as_secs(),
            run_on_startup = self.run_on_startup,
            "Scheduler started"
        );

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, stopping scheduler");
                    break;
                }
                _ = ticker.tick() => {
                    let Ok(mut guard) = Arc::clone(&job).try_lock_owned() else {
                        stats.skipped_overlap += 1;
                        tracing::warn!("Previous run still in progress, skipping this tick");
                        continue;
                    };

                    stats.triggered += 1;
                    let run = stats.triggered;
                    let failures = Arc::clone(&failures);

                    in_flight = Some(tokio::spawn(async move {
                        let name = guard.name().to_string();
                        tracing::info!(job = %name, run, "Scheduled run started");

                        if let Err(e) = guard.run().await {
                            failures.fetch_add(1, Ordering::Relaxed);
                            tracing::error!(job = %name, run, error = %e, "Scheduled run failed");
                        }
                    }));
                }
            }
        }

        if let Some(handle) = in_flight {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Scheduled run panicked");
            }
        }

        stats.failed = failures.load(Ordering::Relaxed);

        tracing::info!(
            triggered = stats.triggered,
            skipped = stats.skipped_overlap,
            failed = stats.failed,
            "Scheduler stopped"
        );

        stats
    }
}
