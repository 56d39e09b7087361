use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use domain_triage_core::{FetchError, FetchedPage, PageFetcher};
use futures::StreamExt;
use tracing::warn;

/// Headless Chromium page fetcher.
///
/// A fresh browser is launched for every fetch so pages never share cookies or
/// storage. Redirects, including script-driven ones, are resolved by the browser.
#[derive(Debug, Clone)]
pub struct BrowserPageFetcher {
    user_agent: String,
    timeout: Duration,
}

impl BrowserPageFetcher {
    pub fn new(user_agent: impl Into<String>, timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout,
        }
    }

    async fn render(&self, browser: &Browser, url: &str) -> Result<FetchedPage, FetchError> {
        let page = browser
            .new_page(url)
            .await
            .map_err(|err| FetchError::Browser(err.to_string()))?;
        page.wait_for_navigation()
            .await
            .map_err(|err| FetchError::Browser(err.to_string()))?;

        let final_url = page
            .url()
            .await
            .map_err(|err| FetchError::Browser(err.to_string()))?
            .unwrap_or_else(|| url.to_string());
        let body = page
            .content()
            .await
            .map_err(|err| FetchError::Browser(err.to_string()))?;

        Ok(FetchedPage {
            final_url,
            body,
            status: 200,
        })
    }
}

#[async_trait]
impl PageFetcher for BrowserPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let config = BrowserConfig::builder()
            .request_timeout(self.timeout)
            .arg(format!("--user-agent={}", self.user_agent))
            .build()
            .map_err(FetchError::Browser)?;
        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| FetchError::Browser(err.to_string()))?;

        let driver = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = self.render(&browser, url).await;

        if let Err(err) = browser.close().await {
            warn!(stage = "fetch", error = %err, "failed to close headless browser");
        }
        let _ = browser.wait().await;
        driver.abort();

        result
    }
}
