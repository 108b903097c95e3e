#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use mapreviews_common::observability::{LogConfig, LogFormat};
use mapreviews_drivers::{Browser, Page, PageElement};
use mapreviews_harvest::selectors::{CardSelectors, ReviewSelectors, SEARCH_BOX};
use mapreviews_harvest::{HarvestEvent, HarvestObserver, Termination};

static INIT_PATH: OnceLock<std::path::PathBuf> = OnceLock::new();

pub fn init_test_tracing() {
    let _ = INIT_PATH.get_or_init(|| {
        let config = LogConfig {
            app_name: "mapreviews-tests",
            log_dir: Some(std::env::temp_dir().join("mapreviews-tests")),
            emit_stderr: true,
            format: if std::env::var("MAPREVIEWS_LOG_FORMAT")
                .map(|raw| raw.trim().eq_ignore_ascii_case("json"))
                .unwrap_or(false)
            {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            default_filter: "debug".to_string(),
        };

        mapreviews_common::observability::init_logging(config).unwrap_or_default()
    });
}

// =========================
// Scripted review nodes
// =========================

/// One review as the fake DOM renders it: selector -> inner text.
#[derive(Debug, Clone, Default)]
pub struct ReviewNode {
    fields: HashMap<&'static str, String>,
    rating_label: Option<String>,
    broken: bool,
}

impl ReviewNode {
    /// A fully populated review with the given date label.
    pub fn dated(author: &str, date: &str) -> Self {
        let s = ReviewSelectors::default();
        Self::bare()
            .with(s.author, author)
            .with(s.date, date)
            .with(s.text, "Nice place")
            .rating("5 stars")
    }

    /// No sub-elements at all.
    pub fn bare() -> Self {
        Self::default()
    }

    /// Every lookup inside this node fails like a stale element would.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, selector: &'static str, text: &str) -> Self {
        self.fields.insert(selector, text.to_string());
        self
    }

    pub fn rating(mut self, label: &str) -> Self {
        self.rating_label = Some(label.to_string());
        self
    }
}

/// `count` resolvable reviews named `{prefix}{i}`, all "1 day ago".
pub fn batch(prefix: &str, count: usize) -> Vec<ReviewNode> {
    (0..count)
        .map(|i| ReviewNode::dated(&format!("{prefix}{i}"), "1 day ago"))
        .collect()
}

// =========================
// Fake page state
// =========================

#[derive(Debug, Default)]
pub struct PageState {
    /// Nodes that appear after each successive scroll.
    pub batches: Vec<Vec<ReviewNode>>,
    pub scrolls: usize,
    pub container_present: bool,
    /// Scroll succeeds this many times, then reports the container gone.
    pub container_vanishes_after: Option<usize>,
    pub card: HashMap<&'static str, String>,
    pub reviews_button: Option<String>,
    pub reviews_clicked: bool,
    pub search_box_present: bool,
    pub typed: Vec<String>,
    pub enter_pressed: bool,
    pub visited: Vec<String>,
    pub fail_goto: bool,
    pub window_scrolls: Vec<f64>,
    pub closed: bool,
}

impl PageState {
    pub fn listing(batches: Vec<Vec<ReviewNode>>) -> Self {
        Self {
            batches,
            container_present: true,
            search_box_present: true,
            reviews_button: Some("Reviews".into()),
            ..Self::default()
        }
    }

    pub fn with_card(mut self, name: &str, rating: &str, reviews: &str, summary: &str) -> Self {
        let s = CardSelectors::default();
        self.card.insert(s.name, name.into());
        self.card.insert(s.rating, rating.into());
        self.card.insert(s.reviews_count, reviews.into());
        self.card.insert(s.summary, summary.into());
        self
    }

    fn rendered(&self) -> Vec<ReviewNode> {
        self.batches
            .iter()
            .take(self.scrolls)
            .flatten()
            .cloned()
            .collect()
    }
}

pub type Shared = Arc<Mutex<PageState>>;

pub fn shared(state: PageState) -> Shared {
    Arc::new(Mutex::new(state))
}

#[derive(Clone)]
pub struct FakePage {
    pub state: Shared,
}

impl FakePage {
    pub fn new(state: PageState) -> Self {
        Self {
            state: shared(state),
        }
    }
}

#[derive(Clone)]
pub enum FakeElement {
    Container(Shared),
    Review(ReviewNode),
    Text {
        text: String,
        label: Option<String>,
    },
    Button(Shared),
    SearchBox(Shared),
}

#[async_trait]
impl Page for FakePage {
    type Element = FakeElement;

    async fn goto(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_goto {
            return Err(anyhow!("net::ERR_NAME_NOT_RESOLVED"));
        }
        state.visited.push(url.to_string());
        Ok(())
    }

    async fn wait_for_load(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    async fn find(&self, selector: &str, _timeout: Duration) -> Result<Option<FakeElement>> {
        let state = self.state.lock().unwrap();
        if selector == ReviewSelectors::default().container {
            return Ok(state
                .container_present
                .then(|| FakeElement::Container(self.state.clone())));
        }
        if selector == SEARCH_BOX {
            return Ok(state
                .search_box_present
                .then(|| FakeElement::SearchBox(self.state.clone())));
        }
        Ok(state.card.get(selector).map(|text| FakeElement::Text {
            text: text.clone(),
            label: None,
        }))
    }

    async fn find_by_text(
        &self,
        tag: &str,
        text: &str,
        _timeout: Duration,
    ) -> Result<Option<FakeElement>> {
        let state = self.state.lock().unwrap();
        let matches = tag == "button"
            && state
                .reviews_button
                .as_deref()
                .is_some_and(|label| label.contains(text));
        Ok(matches.then(|| FakeElement::Button(self.state.clone())))
    }

    async fn find_all(&self, _selector: &str) -> Result<Vec<FakeElement>> {
        Ok(Vec::new())
    }

    async fn scroll_to_bottom(&self, _selector: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if !state.container_present {
            return Ok(false);
        }
        if let Some(limit) = state.container_vanishes_after {
            if state.scrolls >= limit {
                return Ok(false);
            }
        }
        state.scrolls += 1;
        Ok(true)
    }

    async fn scroll_window(&self, fraction: f64) -> Result<()> {
        self.state.lock().unwrap().window_scrolls.push(fraction);
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        Ok("<html><body>fake listing</body></html>".into())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn close(self) -> Result<()> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

#[async_trait]
impl PageElement for FakeElement {
    async fn find(&self, selector: &str) -> Result<Option<Self>> {
        match self {
            FakeElement::Review(node) => {
                if node.broken {
                    return Err(anyhow!("stale element reference"));
                }
                if selector == ReviewSelectors::default().rating {
                    return Ok(node.rating_label.clone().map(|label| FakeElement::Text {
                        text: String::new(),
                        label: Some(label),
                    }));
                }
                Ok(node.fields.get(selector).map(|text| FakeElement::Text {
                    text: text.clone(),
                    label: None,
                }))
            }
            _ => Ok(None),
        }
    }

    async fn find_all(&self, _selector: &str) -> Result<Vec<Self>> {
        match self {
            FakeElement::Container(state) => Ok(state
                .lock()
                .unwrap()
                .rendered()
                .into_iter()
                .map(FakeElement::Review)
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    async fn inner_text(&self) -> Result<String> {
        match self {
            FakeElement::Text { text, .. } => Ok(text.clone()),
            _ => Ok(String::new()),
        }
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        match self {
            FakeElement::Text { label, .. } if name == "aria-label" => Ok(label.clone()),
            _ => Ok(None),
        }
    }

    async fn click(&self) -> Result<()> {
        if let FakeElement::Button(state) = self {
            state.lock().unwrap().reviews_clicked = true;
        }
        Ok(())
    }

    async fn type_text(&self, text: &str) -> Result<()> {
        if let FakeElement::SearchBox(state) = self {
            state.lock().unwrap().typed.push(text.to_string());
        }
        Ok(())
    }

    async fn press_enter(&self) -> Result<()> {
        if let FakeElement::SearchBox(state) = self {
            state.lock().unwrap().enter_pressed = true;
        }
        Ok(())
    }
}

/// Hands out pre-scripted pages in order, one per business.
#[derive(Default)]
pub struct FakeBrowser {
    pages: Mutex<VecDeque<Shared>>,
}

impl FakeBrowser {
    pub fn new(pages: Vec<Shared>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Page = FakePage;

    async fn open_page(&self) -> Result<FakePage> {
        let state = self
            .pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow!("browser session could not be created"))?;
        Ok(FakePage { state })
    }
}

// =========================
// Recording observer
// =========================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    ContainerMissing,
    ContainerLost,
    Added(usize),
    Unresolved(usize),
    NodeFailed(usize),
    Stalled(u32),
    Finished(Termination),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Recorded>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Recorded> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Recorded) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }
}

impl HarvestObserver for RecordingObserver {
    fn on_event(&self, event: &HarvestEvent<'_>) {
        let recorded = match event {
            HarvestEvent::ContainerMissing { .. } => Recorded::ContainerMissing,
            HarvestEvent::ContainerLost { .. } => Recorded::ContainerLost,
            HarvestEvent::ReviewAdded { index, .. } => Recorded::Added(*index),
            HarvestEvent::UnresolvedDate { index, .. } => Recorded::Unresolved(*index),
            HarvestEvent::NodeFailed { index, .. } => Recorded::NodeFailed(*index),
            HarvestEvent::Stalled { attempt, .. } => Recorded::Stalled(*attempt),
            HarvestEvent::Finished { termination, .. } => Recorded::Finished(*termination),
        };
        self.events.lock().unwrap().push(recorded);
    }
}
