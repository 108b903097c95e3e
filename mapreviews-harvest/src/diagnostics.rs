//! Best-effort captures of a page that misbehaved.
//!
//! Nothing here returns an error: a failed capture is logged and the caller
//! carries on with whatever it was doing.
use chrono::Local;
use mapreviews_drivers::Page;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Diagnostics {
    dir: PathBuf,
}

impl Diagnostics {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Save the page HTML as `error_page_content_<timestamp>.html`.
    pub async fn dump_page<P: Page>(&self, page: &P) -> Option<PathBuf> {
        let html = match page.content().await {
            Ok(html) => html,
            Err(e) => {
                warn!(target: "diagnostics", error = %e, "could not read page content");
                return None;
            }
        };
        let name = format!("error_page_content_{}.html", stamp());
        self.write(&name, html.as_bytes()).await
    }

    /// Save a PNG screenshot as `error_screenshot_<timestamp>.png`.
    pub async fn save_screenshot<P: Page>(&self, page: &P) -> Option<PathBuf> {
        let png = match page.screenshot().await {
            Ok(png) => png,
            Err(e) => {
                warn!(target: "diagnostics", error = %e, "could not take screenshot");
                return None;
            }
        };
        let name = format!("error_screenshot_{}.png", stamp());
        self.write(&name, &png).await
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Option<PathBuf> {
        let path = self.dir.join(name);
        let written = async {
            tokio::fs::create_dir_all(&self.dir).await?;
            tokio::fs::write(&path, bytes).await
        };
        match written.await {
            Ok(()) => {
                info!(target: "diagnostics", path = %path.display(), "diagnostic capture saved");
                Some(path)
            }
            Err(e) => {
                warn!(target: "diagnostics", path = %path.display(), error = %e, "could not save diagnostic capture");
                None
            }
        }
    }
}

fn stamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}
