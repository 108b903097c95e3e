//! One full run: every configured business, one page each, one output file.
//!
//! Businesses are handled strictly one after another. A failure is confined to
//! the business it happened in: the page HTML is dumped for diagnosis, the
//! business is left out of the batch, and the run moves on.
use crate::card::extract_card;
use crate::diagnostics::Diagnostics;
use crate::finalize::finalize;
use crate::harvest::{HarvestSettings, Harvester};
use crate::model::BusinessResult;
use crate::observer::{HarvestObserver, TracingObserver};
use crate::output::write_batch;
use crate::selectors::{CardSelectors, MAPS_HOME, ReviewSelectors, SEARCH_BOX};
use chrono::{Local, Utc};
use mapreviews_common::{MapReviewsError, Result};
use mapreviews_config::{BusinessSpec, MapReviewsConfig};
use mapreviews_drivers::browser::behavioral::BehavioralEngine;
use mapreviews_drivers::{Browser, Page, PageElement};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};

/// Timings and labels for getting from a business spec to its open review list.
#[derive(Debug, Clone)]
pub struct NavigationSettings {
    pub navigation_timeout: Duration,
    pub search_settle: Duration,
    pub warmup_min_ms: u64,
    pub warmup_max_ms: u64,
    pub reviews_control_label: String,
    pub control_timeout: Duration,
    pub open_reviews_settle: Duration,
}

impl From<&MapReviewsConfig> for NavigationSettings {
    fn from(cfg: &MapReviewsConfig) -> Self {
        Self {
            navigation_timeout: cfg.browser.navigation_timeout(),
            search_settle: cfg.browser.search_settle(),
            warmup_min_ms: cfg.browser.warmup_min_ms,
            warmup_max_ms: cfg.browser.warmup_max_ms,
            reviews_control_label: cfg.harvest.reviews_control_label.clone(),
            control_timeout: cfg.harvest.control_timeout(),
            open_reviews_settle: cfg.harvest.open_reviews_settle(),
        }
    }
}

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    /// Batch file, absent when no business produced a result.
    pub output: Option<PathBuf>,
}

pub struct Orchestrator<B: Browser> {
    browser: B,
    harvester: Harvester,
    navigation: NavigationSettings,
    card_selectors: CardSelectors,
    diagnostics: Diagnostics,
    output_dir: PathBuf,
    behavioral_engine: BehavioralEngine,
}

impl<B: Browser> Orchestrator<B> {
    pub fn new(browser: B, cfg: &MapReviewsConfig) -> Self {
        let diagnostics = Diagnostics::new(&cfg.output.diagnostics_dir);
        let harvester = Harvester::new(
            HarvestSettings::from(&cfg.harvest),
            ReviewSelectors::default(),
            Arc::new(TracingObserver),
            diagnostics.clone(),
        );
        Self {
            browser,
            harvester,
            navigation: NavigationSettings::from(cfg),
            card_selectors: CardSelectors::default(),
            diagnostics,
            output_dir: cfg.output.dir.clone(),
            behavioral_engine: BehavioralEngine::new(),
        }
    }

    /// Route harvest progress to `observer` instead of the tracing default.
    pub fn with_observer(mut self, observer: Arc<dyn HarvestObserver>) -> Self {
        self.harvester.set_observer(observer);
        self
    }

    /// Scrape every business in order and persist whatever succeeded.
    ///
    /// Only a failure to write the batch is returned as an error.
    pub async fn run(&self, businesses: &[BusinessSpec]) -> Result<RunSummary> {
        info!(target: "run", businesses = businesses.len(), "run started");
        let mut results = Vec::new();

        for spec in businesses {
            info!(target: "run", business = %spec.name, "processing business");
            match self.scrape_business(spec).await {
                Ok(result) => {
                    info!(
                        target: "run",
                        business = %spec.name,
                        reviews = result.reviews.len(),
                        "business processed"
                    );
                    results.push(result);
                }
                Err(e) => {
                    error!(target: "run", business = %spec.name, error = %e, "business skipped");
                }
            }
        }

        let output = write_batch(&self.output_dir, &results, Local::now()).await?;
        let summary = RunSummary {
            attempted: businesses.len(),
            succeeded: results.len(),
            output,
        };
        info!(
            target: "run",
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            "run finished"
        );
        Ok(summary)
    }

    /// Open a fresh page for `spec`, collect its card and reviews, and close the page.
    pub async fn scrape_business(&self, spec: &BusinessSpec) -> Result<BusinessResult> {
        let page = self.browser.open_page().await?;
        let outcome = self.scrape_on_page(&page, spec).await;

        if outcome.is_err() {
            self.diagnostics.dump_page(&page).await;
        }
        if let Err(e) = page.close().await {
            warn!(target: "run", business = %spec.name, error = %e, "page did not close cleanly");
        }
        outcome
    }

    async fn scrape_on_page(&self, page: &B::Page, spec: &BusinessSpec) -> Result<BusinessResult> {
        self.navigate(page, spec).await?;
        self.warm_up(page).await?;

        let card_data = extract_card(page, &self.card_selectors, self.navigation.control_timeout).await;
        self.open_reviews(page).await;

        let report = self.harvester.harvest(page, Utc::now()).await;
        let reviews = finalize(report.reviews, self.harvester.settings().target_count);
        if reviews.is_empty() {
            warn!(target: "run", business = %spec.name, "no reviews collected");
        }

        Ok(BusinessResult { card_data, reviews })
    }

    async fn navigate(&self, page: &B::Page, spec: &BusinessSpec) -> Result<()> {
        let wait = self.navigation.navigation_timeout;

        if let Some(url) = spec.url() {
            page.goto(url).await?;
            page.wait_for_load(wait).await?;
            return Ok(());
        }

        let query = spec.search_query().ok_or_else(|| {
            MapReviewsError::Config(format!(
                "business '{}' needs either a url or a name and address",
                spec.name
            ))
        })?;

        page.goto(MAPS_HOME).await?;
        page.wait_for_load(wait).await?;
        let search_box = page
            .find(SEARCH_BOX, wait)
            .await?
            .ok_or_else(|| MapReviewsError::Navigation("search box not found".into()))?;
        search_box.type_text(&query).await?;
        search_box.press_enter().await?;
        page.wait_for_load(wait).await?;
        if !self.navigation.search_settle.is_zero() {
            sleep(self.navigation.search_settle).await;
        }
        Ok(())
    }

    /// Scroll halfway down and back so the listing renders its lazy panels.
    async fn warm_up(&self, page: &B::Page) -> Result<()> {
        let (min, max) = (self.navigation.warmup_min_ms, self.navigation.warmup_max_ms);
        page.scroll_window(0.5).await?;
        self.behavioral_engine.random_delay(min, max).await;
        page.scroll_window(0.0).await?;
        self.behavioral_engine.random_delay(min, max).await;
        Ok(())
    }

    /// Click the reviews tab. Its absence is not fatal: the list may already be open.
    async fn open_reviews(&self, page: &B::Page) {
        let label = &self.navigation.reviews_control_label;
        let control = page
            .find_by_text("button", label, self.navigation.control_timeout)
            .await;

        match control {
            Ok(Some(button)) => match button.click().await {
                Ok(()) => {
                    info!(target: "run", %label, "reviews control clicked");
                    if !self.navigation.open_reviews_settle.is_zero() {
                        sleep(self.navigation.open_reviews_settle).await;
                    }
                }
                Err(e) => warn!(target: "run", %label, error = %e, "reviews control not clickable"),
            },
            Ok(None) => warn!(target: "run", %label, "reviews control not found"),
            Err(e) => warn!(target: "run", %label, error = %e, "reviews control lookup failed"),
        }
    }
}
