use std::{fmt, sync::Arc};

use domain_triage_core::{ClassifierConfig, PageFetcher, Pipeline, StructureThresholds};
use domain_triage_upstream::{HttpPageFetcher, RdapClient, UpstreamError, DEFAULT_USER_AGENT};
use domain_triage_util::{AppConfig, FetcherKind, PolicyOverrides};
use tracing::info;
use url::Url;

#[derive(Debug)]
pub enum BootstrapError {
    RdapUrl(url::ParseError),
    Upstream(UpstreamError),
    BrowserUnavailable,
}

impl fmt::Display for BootstrapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RdapUrl(err) => write!(f, "invalid RDAP_BASE_URL value: {err}"),
            Self::Upstream(err) => write!(f, "failed to build upstream client: {err}"),
            Self::BrowserUnavailable => write!(
                f,
                "PAGE_FETCHER=browser requires building with the `browser` feature"
            ),
        }
    }
}

impl std::error::Error for BootstrapError {}

impl From<UpstreamError> for BootstrapError {
    fn from(value: UpstreamError) -> Self {
        Self::Upstream(value)
    }
}

/// Merges environment overrides into the built-in classifier policy.
pub fn classifier_config(overrides: &PolicyOverrides) -> ClassifierConfig {
    let mut config = ClassifierConfig::default();
    if let Some(tlds) = &overrides.unwanted_tlds {
        config = config.with_unwanted_tlds(tlds.iter().cloned());
    }
    if let Some(markers) = &overrides.for_sale_markers {
        config = config.with_for_sale_markers(markers);
    }
    if let Some(markers) = &overrides.active_site_markers {
        config = config.with_active_site_markers(markers);
    }
    if let Some(prefix) = &overrides.aggregator_redirect_prefix {
        config = config.with_aggregator_redirect_prefix(prefix.clone());
    }

    let defaults = config.structure;
    config.with_structure(StructureThresholds {
        anchor_links: overrides
            .anchor_link_threshold
            .unwrap_or(defaults.anchor_links),
        nav_landmarks: overrides
            .nav_landmark_threshold
            .unwrap_or(defaults.nav_landmarks),
    })
}

/// Builds the classification pipeline with the collaborators selected by `config`.
pub fn build_pipeline(config: &AppConfig) -> Result<Pipeline, BootstrapError> {
    let rdap_base = Url::parse(&config.rdap_base_url).map_err(BootstrapError::RdapUrl)?;
    let lookup = Arc::new(RdapClient::with_timeout(rdap_base, config.upstream_timeout)?);

    let fetcher = page_fetcher(config)?;
    info!(
        stage = "app",
        rdap = %config.rdap_base_url,
        fetcher = config.fetcher.as_str(),
        timeout_secs = config.upstream_timeout.as_secs(),
        "pipeline configured"
    );

    Ok(Pipeline::new(
        classifier_config(&config.policy),
        lookup,
        fetcher,
        config.upstream_timeout,
    ))
}

fn user_agent(config: &AppConfig) -> &str {
    config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
}

fn page_fetcher(config: &AppConfig) -> Result<Arc<dyn PageFetcher>, BootstrapError> {
    match config.fetcher {
        FetcherKind::Http => Ok(Arc::new(HttpPageFetcher::with_settings(
            user_agent(config),
            config.upstream_timeout,
        )?)),
        FetcherKind::Browser => browser_fetcher(config),
    }
}

#[cfg(feature = "browser")]
fn browser_fetcher(config: &AppConfig) -> Result<Arc<dyn PageFetcher>, BootstrapError> {
    Ok(Arc::new(domain_triage_upstream::BrowserPageFetcher::new(
        user_agent(config),
        config.upstream_timeout,
    )))
}

#[cfg(not(feature = "browser"))]
fn browser_fetcher(_config: &AppConfig) -> Result<Arc<dyn PageFetcher>, BootstrapError> {
    Err(BootstrapError::BrowserUnavailable)
}
