//! Process runtime for the harvester: one Tokio runtime, one shutdown token,
//! and the interval [`Scheduler`] that repeats harvest runs until that token
//! fires (Ctrl-C or an explicit cancel).
use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

mod schedule;

pub use schedule::Scheduler;

pub struct MapReviewsRuntime {
    runtime: Runtime,
    cancel: CancellationToken,
}

impl MapReviewsRuntime {
    /// Build a multi-threaded runtime. `worker_threads` defaults to Tokio's choice.
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);
        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }

        Ok(Self {
            runtime: builder.build()?,
            cancel: CancellationToken::new(),
        })
    }

    /// The token every run on this runtime stops on.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the shared token on the first Ctrl-C.
    pub fn cancel_on_ctrl_c(&self) {
        let cancel = self.cancel.clone();
        self.runtime.spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!(target: "runtime", "interrupt received, shutting down");
                    cancel.cancel();
                }
                Err(e) => warn!(target: "runtime", error = %e, "cannot listen for interrupts"),
            }
        });
    }

    /// Run a future to completion, ignoring cancellation.
    pub fn block_on<F: Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Run one job, abandoning it if the token fires first.
    ///
    /// ```
    /// use mapreviews_runtime::MapReviewsRuntime;
    ///
    /// let runtime = MapReviewsRuntime::build("single-run", Some(1)).unwrap();
    /// let harvested = runtime.block_until_cancelled(async { vec!["review"; 3].len() });
    /// assert_eq!(harvested, Some(3));
    ///
    /// runtime.cancellation().cancel();
    /// let abandoned = runtime.block_until_cancelled(std::future::pending::<()>());
    /// assert_eq!(abandoned, None);
    /// ```
    pub fn block_until_cancelled<F: Future>(&self, fut: F) -> Option<F::Output> {
        self.runtime.block_on(self.cancel.run_until_cancelled(fut))
    }

    /// Drive `job` on `scheduler` until the token fires; returns completed runs.
    ///
    /// ```
    /// use mapreviews_runtime::{MapReviewsRuntime, Scheduler};
    /// use std::time::Duration;
    ///
    /// let runtime = MapReviewsRuntime::build("scheduled-runs", Some(1)).unwrap();
    /// let stop = runtime.cancellation();
    /// let mut batches = Vec::new();
    ///
    /// let completed = runtime.run_scheduled(
    ///     &Scheduler::new("harvest", Duration::from_millis(5)),
    ///     || {
    ///         batches.push(format!("reviews_results_{}.json", batches.len()));
    ///         let last = batches.len() == 2;
    ///         let stop = stop.clone();
    ///         async move {
    ///             if last {
    ///                 stop.cancel();
    ///             }
    ///             Ok(())
    ///         }
    ///     },
    /// );
    ///
    /// assert_eq!(completed, 2);
    /// assert_eq!(batches.len(), 2);
    /// ```
    pub fn run_scheduled<F, Fut>(&self, scheduler: &Scheduler, job: F) -> usize
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        self.runtime.block_on(scheduler.run(&self.cancel, job))
    }

    /// Cancel outstanding work and give tasks `graceful` to wind down.
    pub fn shutdown(self, graceful: Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}
