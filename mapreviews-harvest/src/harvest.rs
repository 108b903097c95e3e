//! The scroll-driven review collection loop.
//!
//! Each cycle scrolls the review panel to its bottom, waits for lazily rendered
//! reviews, then extracts only the nodes past the last processed position. A
//! cycle that adds nothing counts as a stall; a productive cycle clears the
//! stall counter. The loop ends when the target is met or the stall budget runs
//! out, and reports which of the two (or a container failure) ended it.
use crate::dates::normalize;
use crate::diagnostics::Diagnostics;
use crate::extract::extract_review;
use crate::model::HarvestedReview;
use crate::observer::{HarvestEvent, HarvestObserver, Termination};
use crate::selectors::ReviewSelectors;
use chrono::{DateTime, Utc};
use mapreviews_config::HarvestConfig;
use mapreviews_drivers::{Page, PageElement};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestSettings {
    pub target_count: usize,
    pub max_stall_attempts: u32,
    pub scroll_settle: Duration,
    pub container_timeout: Duration,
}

impl Default for HarvestSettings {
    fn default() -> Self {
        Self::from(&HarvestConfig::default())
    }
}

impl From<&HarvestConfig> for HarvestSettings {
    fn from(cfg: &HarvestConfig) -> Self {
        Self {
            target_count: cfg.target_count,
            max_stall_attempts: cfg.max_stall_attempts,
            scroll_settle: cfg.scroll_settle(),
            container_timeout: cfg.container_timeout(),
        }
    }
}

/// Outcome of one harvest. `reviews` is in discovery order and may exceed the
/// target; [`crate::finalize::finalize`] orders and trims it.
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub reviews: Vec<HarvestedReview>,
    pub termination: Termination,
    /// Scroll cycles performed.
    pub cycles: u32,
}

pub struct Harvester {
    settings: HarvestSettings,
    selectors: ReviewSelectors,
    observer: Arc<dyn HarvestObserver>,
    diagnostics: Diagnostics,
}

impl Harvester {
    pub fn new(
        settings: HarvestSettings,
        selectors: ReviewSelectors,
        observer: Arc<dyn HarvestObserver>,
        diagnostics: Diagnostics,
    ) -> Self {
        Self {
            settings,
            selectors,
            observer,
            diagnostics,
        }
    }

    pub fn settings(&self) -> &HarvestSettings {
        &self.settings
    }

    pub(crate) fn set_observer(&mut self, observer: Arc<dyn HarvestObserver>) {
        self.observer = observer;
    }

    /// Collect reviews from the open listing, resolving dates against `now`.
    pub async fn harvest<P: Page>(&self, page: &P, now: DateTime<Utc>) -> HarvestReport {
        let container_selector = self.selectors.container;
        let container = match page
            .find(container_selector, self.settings.container_timeout)
            .await
        {
            Ok(Some(container)) => container,
            Ok(None) => return self.container_missing(page, None).await,
            Err(e) => return self.container_missing(page, Some(&e)).await,
        };

        let mut harvested: Vec<HarvestedReview> = Vec::new();
        let mut processed = 0usize;
        let mut stalls = 0u32;
        let mut cycles = 0u32;

        let termination = loop {
            if harvested.len() >= self.settings.target_count {
                break Termination::TargetReached;
            }
            if stalls >= self.settings.max_stall_attempts {
                break Termination::Exhausted;
            }
            cycles += 1;

            match page.scroll_to_bottom(container_selector).await {
                Ok(true) => {}
                Ok(false) => break self.container_lost(page, None).await,
                Err(e) => break self.container_lost(page, Some(&e)).await,
            }
            if !self.settings.scroll_settle.is_zero() {
                sleep(self.settings.scroll_settle).await;
            }

            let nodes = match container.find_all(self.selectors.node).await {
                Ok(nodes) => nodes,
                Err(e) => break self.container_lost(page, Some(&e)).await,
            };

            let before = harvested.len();
            let fresh = nodes.get(processed..).unwrap_or_default();
            for (offset, node) in fresh.iter().enumerate() {
                let index = processed + offset;
                if let Some(review) = self.harvest_node(node, index, now).await {
                    harvested.push(review);
                    self.observer.on_event(&HarvestEvent::ReviewAdded {
                        index,
                        total: harvested.len(),
                    });
                }
            }
            processed = processed.max(nodes.len());

            if harvested.len() > before {
                stalls = 0;
            } else {
                stalls += 1;
                self.observer.on_event(&HarvestEvent::Stalled {
                    attempt: stalls,
                    max: self.settings.max_stall_attempts,
                });
            }
        };

        self.observer.on_event(&HarvestEvent::Finished {
            collected: harvested.len(),
            cycles,
            termination,
        });
        HarvestReport {
            reviews: harvested,
            termination,
            cycles,
        }
    }

    async fn harvest_node<E: PageElement>(
        &self,
        node: &E,
        index: usize,
        now: DateTime<Utc>,
    ) -> Option<HarvestedReview> {
        let review = match extract_review(node, &self.selectors).await {
            Ok(review) => review,
            Err(error) => {
                self.observer
                    .on_event(&HarvestEvent::NodeFailed { index, error: &error });
                return None;
            }
        };
        let Some(resolved_at) = review.raw_date.as_deref().and_then(|raw| normalize(raw, now))
        else {
            self.observer.on_event(&HarvestEvent::UnresolvedDate {
                index,
                raw: review.raw_date.as_deref(),
            });
            return None;
        };
        Some(HarvestedReview {
            review,
            resolved_at,
        })
    }

    async fn container_missing<P: Page>(
        &self,
        page: &P,
        error: Option<&anyhow::Error>,
    ) -> HarvestReport {
        self.observer.on_event(&HarvestEvent::ContainerMissing {
            selector: self.selectors.container,
            error,
        });
        self.diagnostics.save_screenshot(page).await;
        self.diagnostics.dump_page(page).await;

        let termination = Termination::ContainerMissing;
        self.observer.on_event(&HarvestEvent::Finished {
            collected: 0,
            cycles: 0,
            termination,
        });
        HarvestReport {
            reviews: Vec::new(),
            termination,
            cycles: 0,
        }
    }

    async fn container_lost<P: Page>(&self, page: &P, error: Option<&anyhow::Error>) -> Termination {
        self.observer
            .on_event(&HarvestEvent::ContainerLost { error });
        self.diagnostics.save_screenshot(page).await;
        Termination::ContainerLost
    }
}
