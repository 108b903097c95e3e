use crate::browser::{behavioral::BehavioralEngine, page::FantocciniPage};
use crate::traits::Browser;
use anyhow::{Context, Result};
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;
use webdriver::capabilities::Capabilities;

/// Launches WebDriver sessions against a running driver service
/// (chromedriver by default).
#[derive(Debug, Clone)]
pub struct FantocciniBrowser {
    webdriver_url: String,
    headless: bool,
    behavioral_engine: BehavioralEngine,
}

impl FantocciniBrowser {
    /// Describe a browser reachable at `webdriver_url`. No session is opened yet.
    pub fn new(webdriver_url: impl Into<String>, headless: bool) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            headless,
            behavioral_engine: BehavioralEngine::new(),
        }
    }

    /// Open and immediately close one session to prove the driver service is usable.
    pub async fn probe(&self) -> Result<()> {
        let client = self.connect().await?;
        client.close().await?;
        Ok(())
    }

    async fn connect(&self) -> Result<Client> {
        let mut caps = Capabilities::new();
        let mut chrome_opts = HashMap::new();
        chrome_opts.insert("args".to_string(), json!(chrome_arguments(self.headless)));
        caps.insert("goog:chromeOptions".to_string(), json!(chrome_opts));

        debug!(target: "browser.driver", url = %self.webdriver_url, headless = self.headless, "opening session");
        ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.webdriver_url)
            .await
            .with_context(|| format!("failed to open WebDriver session at {}", self.webdriver_url))
    }
}

#[async_trait]
impl Browser for FantocciniBrowser {
    type Page = FantocciniPage;

    async fn open_page(&self) -> Result<FantocciniPage> {
        let client = self.connect().await?;
        Ok(FantocciniPage::new(client, self.behavioral_engine.clone()))
    }
}

fn chrome_arguments(headless: bool) -> Vec<String> {
    let mut args = vec![
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
        "--window-size=1440,900".to_string(),
    ];
    if headless {
        args.push("--headless".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}
