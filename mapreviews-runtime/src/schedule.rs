use std::future::Future;
use std::time::Duration;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Repeats a job on a fixed interval until cancelled.
///
/// The first run starts immediately. A run that overlaps the next tick delays
/// that tick instead of queueing a burst of catch-up runs.
#[derive(Debug, Clone)]
pub struct Scheduler {
    name: &'static str,
    every: Duration,
}

impl Scheduler {
    pub fn new(name: &'static str, every: Duration) -> Self {
        Self { name, every }
    }

    /// Drive `job` until `cancel` fires and return how many runs completed.
    ///
    /// A failed run is logged and the schedule carries on. Cancellation also
    /// interrupts a run that is still in progress.
    ///
    /// ```
    /// use mapreviews_runtime::Scheduler;
    /// use std::time::Duration;
    /// use tokio_util::sync::CancellationToken;
    ///
    /// let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    /// let cancel = CancellationToken::new();
    /// let stop = cancel.clone();
    /// let completed = rt.block_on(Scheduler::new("doc", Duration::from_secs(3600)).run(
    ///     &cancel,
    ///     move || {
    ///         let stop = stop.clone();
    ///         async move {
    ///             stop.cancel();
    ///             Ok(())
    ///         }
    ///     },
    /// ));
    /// assert_eq!(completed, 1);
    /// ```
    pub async fn run<F, Fut>(&self, cancel: &CancellationToken, mut job: F) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let mut ticker = time::interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut completed = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            info!(target: "schedule", name = self.name, run = completed + 1, "scheduled run starting");
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    warn!(target: "schedule", name = self.name, "run interrupted by shutdown");
                    break;
                }
                outcome = job() => outcome,
            };

            completed += 1;
            match outcome {
                Ok(()) => info!(
                    target: "schedule",
                    name = self.name,
                    next_in_secs = self.every.as_secs(),
                    "scheduled run finished"
                ),
                Err(e) => error!(
                    target: "schedule",
                    name = self.name,
                    error = %e,
                    "scheduled run failed"
                ),
            }
        }

        info!(target: "schedule", name = self.name, completed, "scheduler stopped");
        completed
    }
}
