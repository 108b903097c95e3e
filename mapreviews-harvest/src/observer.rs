//! Progress reporting for the harvest loop.
//!
//! The loop never logs directly; it hands each event to the observer it was
//! built with. [`TracingObserver`] is the production choice.
use tracing::{debug, error, info, warn};

/// Why a harvest stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The target number of reviews was collected.
    TargetReached,
    /// Too many consecutive scroll cycles brought nothing new.
    Exhausted,
    /// The review list never appeared.
    ContainerMissing,
    /// The review list disappeared or stopped responding mid-harvest.
    ContainerLost,
}

impl Termination {
    /// Target reached and exhaustion are ordinary ends; the others are failures.
    pub fn is_failure(self) -> bool {
        matches!(self, Self::ContainerMissing | Self::ContainerLost)
    }
}

#[derive(Debug)]
pub enum HarvestEvent<'a> {
    ContainerMissing {
        selector: &'a str,
        error: Option<&'a anyhow::Error>,
    },
    ContainerLost {
        error: Option<&'a anyhow::Error>,
    },
    ReviewAdded {
        index: usize,
        total: usize,
    },
    UnresolvedDate {
        index: usize,
        raw: Option<&'a str>,
    },
    NodeFailed {
        index: usize,
        error: &'a anyhow::Error,
    },
    Stalled {
        attempt: u32,
        max: u32,
    },
    Finished {
        collected: usize,
        cycles: u32,
        termination: Termination,
    },
}

pub trait HarvestObserver: Send + Sync {
    fn on_event(&self, event: &HarvestEvent<'_>);
}

/// Forwards harvest events to `tracing` under the `harvest` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HarvestObserver for TracingObserver {
    fn on_event(&self, event: &HarvestEvent<'_>) {
        match event {
            HarvestEvent::ContainerMissing { selector, error } => {
                error!(target: "harvest", %selector, error = ?error, "review container not found")
            }
            HarvestEvent::ContainerLost { error } => {
                error!(target: "harvest", error = ?error, "review container lost")
            }
            HarvestEvent::ReviewAdded { index, total } => {
                debug!(target: "harvest", index, total, "review added")
            }
            HarvestEvent::UnresolvedDate { index, raw } => {
                warn!(target: "harvest", index, raw = ?raw, "review skipped: date not recognised")
            }
            HarvestEvent::NodeFailed { index, error } => {
                warn!(target: "harvest", index, error = %error, "review skipped: extraction failed")
            }
            HarvestEvent::Stalled { attempt, max } => {
                info!(target: "harvest", attempt, max, "scroll brought no new reviews")
            }
            HarvestEvent::Finished {
                collected,
                cycles,
                termination,
            } => {
                info!(target: "harvest", collected, cycles, termination = ?termination, "harvest finished")
            }
        }
    }
}
