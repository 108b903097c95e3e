use crate::browser::behavioral::BehavioralEngine;
use crate::traits::{Page, PageElement};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use fantoccini::{elements::Element, error::CmdError, Client, Locator};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

/// WebDriver "Enter" key code point.
const ENTER_KEY: &str = "\u{E007}";

const READY_STATE_POLL: Duration = Duration::from_millis(250);

const SCROLL_CONTAINER_SCRIPT: &str = r#"
    const el = document.querySelector(arguments[0]);
    if (!el) { return false; }
    el.scrollTop = el.scrollHeight;
    return true;
"#;

const SCROLL_WINDOW_SCRIPT: &str =
    "window.scrollTo(0, document.body.scrollHeight * arguments[0]); return true;";

/// Page wrapper over a single WebDriver session.
pub struct FantocciniPage {
    pub(crate) client: Client,
    pub(crate) behavioral_engine: BehavioralEngine,
}

impl FantocciniPage {
    /// Construct a page wrapper around an existing WebDriver client.
    pub fn new(client: Client, behavioral_engine: BehavioralEngine) -> Self {
        Self {
            client,
            behavioral_engine,
        }
    }

    fn wrap(&self, element: Element) -> FantocciniElement {
        FantocciniElement::new(element, &self.behavioral_engine)
    }

    async fn wait_for(
        &self,
        locator: Locator<'_>,
        wait: Duration,
    ) -> Result<Option<FantocciniElement>> {
        match self.client.wait().at_most(wait).for_element(locator).await {
            Ok(element) => Ok(Some(self.wrap(element))),
            Err(CmdError::WaitTimeout) => Ok(None),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Page for FantocciniPage {
    type Element = FantocciniElement;

    async fn goto(&self, url: &str) -> Result<()> {
        self.client.goto(url).await.map_err(anyhow::Error::from)
    }

    async fn wait_for_load(&self, wait: Duration) -> Result<()> {
        let started = Instant::now();
        let poll = async {
            loop {
                let state = self
                    .client
                    .execute("return document.readyState;", vec![])
                    .await?;
                if state.as_str() == Some("complete") {
                    return Ok::<(), CmdError>(());
                }
                sleep(READY_STATE_POLL).await;
            }
        };
        timeout(wait, poll)
            .await
            .map_err(|_| anyhow!("page did not finish loading within {wait:?}"))??;
        debug!(target: "browser.page", elapsed_ms = started.elapsed().as_millis() as u64, "page loaded");
        Ok(())
    }

    async fn find(&self, selector: &str, wait: Duration) -> Result<Option<FantocciniElement>> {
        self.wait_for(Locator::Css(selector), wait).await
    }

    async fn find_by_text(
        &self,
        tag: &str,
        text: &str,
        wait: Duration,
    ) -> Result<Option<FantocciniElement>> {
        let xpath = contains_text_xpath(tag, text);
        self.wait_for(Locator::XPath(&xpath), wait).await
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<FantocciniElement>> {
        let elements = self.client.find_all(Locator::Css(selector)).await?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }

    async fn scroll_to_bottom(&self, selector: &str) -> Result<bool> {
        let found = self
            .client
            .execute(SCROLL_CONTAINER_SCRIPT, vec![json!(selector)])
            .await?;
        Ok(matches!(found, Value::Bool(true)))
    }

    async fn scroll_window(&self, fraction: f64) -> Result<()> {
        self.client
            .execute(SCROLL_WINDOW_SCRIPT, vec![json!(fraction)])
            .await?;
        Ok(())
    }

    async fn content(&self) -> Result<String> {
        self.client.source().await.map_err(anyhow::Error::from)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.client.screenshot().await.map_err(anyhow::Error::from)
    }

    async fn close(self) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// XPath selecting the first `tag` whose normalized text contains `text`.
fn contains_text_xpath(tag: &str, text: &str) -> String {
    format!(
        "//{tag}[contains(normalize-space(.), {})]",
        xpath_literal(text)
    )
}

/// Quote `text` as an XPath string literal; XPath 1.0 has no escapes.
fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

// ============================
// FantocciniElement Definition
// ============================

#[derive(Clone)]
/// Wrapper for DOM elements that provides typed helpers consistent with [`FantocciniPage`].
pub struct FantocciniElement {
    pub element: Element,
    pub behavioral_engine: BehavioralEngine,
}

impl FantocciniElement {
    /// Construct an element wrapper.
    pub fn new(element: Element, behavioral: &BehavioralEngine) -> Self {
        Self {
            element,
            behavioral_engine: behavioral.clone(),
        }
    }

    fn wrap(&self, element: Element) -> Self {
        Self::new(element, &self.behavioral_engine)
    }
}

#[async_trait]
impl PageElement for FantocciniElement {
    async fn find(&self, selector: &str) -> Result<Option<Self>> {
        match self.element.find(Locator::Css(selector)).await {
            Ok(element) => Ok(Some(self.wrap(element))),
            Err(e) if e.is_no_such_element() => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>> {
        let elements = self.element.find_all(Locator::Css(selector)).await?;
        Ok(elements.into_iter().map(|e| self.wrap(e)).collect())
    }

    async fn inner_text(&self) -> Result<String> {
        self.element.text().await.map_err(anyhow::Error::from)
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.element.attr(name).await.map_err(anyhow::Error::from)
    }

    async fn click(&self) -> Result<()> {
        self.element.click().await.map_err(anyhow::Error::from)
    }

    /// Type into the element using human‑like timings.
    async fn type_text(&self, text: &str) -> Result<()> {
        self.behavioral_engine
            .type_text_human_like(&self.element, text)
            .await
    }

    async fn press_enter(&self) -> Result<()> {
        self.element
            .send_keys(ENTER_KEY)
            .await
            .map_err(anyhow::Error::from)
    }
}
