use std::time::Duration;

use async_trait::async_trait;
use domain_triage_core::{
    LookupError, NormalizedDomain, RegistrationLookup, DEFAULT_UPSTREAM_TIMEOUT,
};
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::{describe, UpstreamError};

/// RDAP lookup client returning the raw HTTP status of `GET {base}/domain/{name}`.
#[derive(Clone)]
pub struct RdapClient {
    http: Client,
    base_url: Url,
    timeout: Duration,
}

impl RdapClient {
    /// Creates a new client. The base URL is treated as a directory.
    pub fn new(base_url: Url, http: Client) -> Self {
        Self {
            http,
            base_url: ensure_trailing_slash(base_url),
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Builds a client whose requests are cut off after `timeout`.
    pub fn with_timeout(base_url: Url, timeout: Duration) -> Result<Self, UpstreamError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            timeout,
            ..Self::new(base_url, http)
        })
    }

    fn map_error(&self, err: reqwest::Error) -> LookupError {
        if err.is_timeout() {
            LookupError::Timeout(self.timeout)
        } else {
            LookupError::Transport(describe(&err))
        }
    }

    fn domain_url(&self, domain: &NormalizedDomain) -> Result<Url, UpstreamError> {
        Ok(self.base_url.join(&format!("domain/{domain}"))?)
    }
}

#[async_trait]
impl RegistrationLookup for RdapClient {
    async fn query(&self, domain: &NormalizedDomain) -> Result<u16, LookupError> {
        let url = self
            .domain_url(domain)
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT, "application/rdap+json")
            .send()
            .await
            .map_err(|err| self.map_error(err))?;

        let status = response.status().as_u16();
        debug!(stage = "rdap", %domain, status, "rdap lookup completed");
        Ok(status)
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
