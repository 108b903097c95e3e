//! Review harvesting for map-service business listings.
//!
//! The crate turns an open listing page into a bounded, newest-first list of
//! reviews plus the business card figures, and runs that over a list of
//! businesses.
//!
//! - [`dates`]: relative and absolute date labels to timestamps
//! - [`extract`]: per-review field extraction
//! - [`harvest`]: the scroll/extract/stall loop
//! - [`finalize`]: ordering, capping, and stripping of internal fields
//! - [`card`]: business card metadata
//! - [`orchestrator`]: per-business navigation and the run itself
//! - [`output`]: JSON batch persistence
//!
//! Everything that touches the page goes through the traits in
//! `mapreviews_drivers`, so the loop can be driven by a scripted fake.
pub mod card;
pub mod dates;
pub mod diagnostics;
pub mod extract;
pub mod finalize;
pub mod harvest;
pub mod model;
pub mod observer;
pub mod orchestrator;
pub mod output;
pub mod selectors;

pub use harvest::{HarvestReport, HarvestSettings, Harvester};
pub use model::{BusinessResult, CardMetadata, HarvestedReview, Review};
pub use observer::{HarvestEvent, HarvestObserver, Termination, TracingObserver};
pub use orchestrator::{Orchestrator, RunSummary};
