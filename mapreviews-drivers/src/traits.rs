//! Capabilities the harvester needs from a rendered page.
//!
//! Everything above the driver layer is written against these traits so the
//! harvest loop can be exercised against a scripted fake instead of a real
//! browser. Lookups that may legitimately find nothing return `Ok(None)`;
//! `Err` is reserved for driver failures (lost session, stale element).
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Opens one isolated page per business.
#[async_trait]
pub trait Browser: Send + Sync {
    type Page: Page;

    async fn open_page(&self) -> Result<Self::Page>;
}

#[async_trait]
pub trait Page: Send + Sync {
    type Element: PageElement;

    /// Navigate to `url`.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Wait until the document reports it has finished loading.
    async fn wait_for_load(&self, timeout: Duration) -> Result<()>;

    /// First element matching `selector`, waiting up to `timeout` for it to appear.
    async fn find(&self, selector: &str, timeout: Duration) -> Result<Option<Self::Element>>;

    /// First `tag` element whose text contains `text`, waiting up to `timeout`.
    async fn find_by_text(
        &self,
        tag: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<Option<Self::Element>>;

    /// Every element currently rendered that matches `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// Scroll the element matching `selector` to its bottom. `false` if it is gone.
    async fn scroll_to_bottom(&self, selector: &str) -> Result<bool>;

    /// Scroll the window to `fraction` of the document height (0.0 = top).
    async fn scroll_window(&self, fraction: f64) -> Result<()>;

    /// Full page HTML.
    async fn content(&self) -> Result<String>;

    /// PNG screenshot of the viewport.
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// End the page's session.
    async fn close(self) -> Result<()>
    where
        Self: Sized;
}

#[async_trait]
pub trait PageElement: Send + Sync + Sized {
    /// First descendant matching `selector`.
    async fn find(&self, selector: &str) -> Result<Option<Self>>;

    async fn find_all(&self, selector: &str) -> Result<Vec<Self>>;

    /// Visible text.
    async fn inner_text(&self) -> Result<String>;

    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    async fn click(&self) -> Result<()>;

    async fn type_text(&self, text: &str) -> Result<()>;

    async fn press_enter(&self) -> Result<()>;
}
