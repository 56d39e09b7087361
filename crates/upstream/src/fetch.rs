use std::time::Duration;

use async_trait::async_trait;
use domain_triage_core::{FetchError, FetchedPage, PageFetcher, DEFAULT_UPSTREAM_TIMEOUT};
use reqwest::{header, redirect, Client, Response};
use tracing::debug;

use crate::{describe, UpstreamError};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Bytes of a landing page kept for classification; the rest is discarded unread.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const MAX_REDIRECT_HOPS: usize = 10;

/// Plain HTTP page fetcher that follows redirects and returns the response text.
#[derive(Clone)]
pub struct HttpPageFetcher {
    http: Client,
    timeout: Duration,
    max_body_bytes: usize,
}

impl HttpPageFetcher {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Builds a client with a browser user agent, bounded redirects and a request timeout.
    pub fn with_settings(user_agent: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(redirect::Policy::limited(MAX_REDIRECT_HOPS))
            .build()?;
        Ok(Self {
            timeout,
            ..Self::new(http)
        })
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    fn map_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(describe(&err))
        }
    }

    /// Reads the body chunk by chunk, stopping once `max_body_bytes` are held.
    async fn read_capped(&self, mut response: Response) -> Result<(String, bool), FetchError> {
        let mut bytes = Vec::new();
        let mut truncated = false;
        while let Some(chunk) = response.chunk().await.map_err(|err| self.map_error(err))? {
            let remaining = self.max_body_bytes - bytes.len();
            if chunk.len() > remaining {
                bytes.extend_from_slice(&chunk[..remaining]);
                truncated = true;
                break;
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok((String::from_utf8_lossy(&bytes).into_owned(), truncated))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|err| self.map_error(err))?;

        let final_url = response.url().to_string();
        let status = response.status().as_u16();
        if let Some(content_type) = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !is_textual(content_type) {
                return Err(FetchError::NonText(content_type.to_string()));
            }
        }

        let (body, truncated) = self.read_capped(response).await?;
        debug!(
            stage = "fetch",
            url,
            %final_url,
            status,
            bytes = body.len(),
            truncated,
            "page fetched"
        );
        Ok(FetchedPage {
            final_url,
            body,
            status,
        })
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.is_empty() || mime.starts_with("text/") || mime.contains("xml") || mime.contains("json")
}
