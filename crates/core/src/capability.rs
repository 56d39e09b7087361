use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{FetchedPage, NormalizedDomain};

/// Registration-data service keyed by domain name.
///
/// Implementations return the raw HTTP status of the lookup; mapping the
/// status to a [`crate::types::RegistrationState`] is the resolver's job.
#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn query(&self, domain: &NormalizedDomain) -> Result<u16, LookupError>;
}

/// Retrieves a page, following redirects to the final URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("lookup timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("{0}")]
    Transport(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("fetch timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("{0}")]
    Transport(String),
    #[error("non-text response ({0})")]
    NonText(String),
    #[error("browser error: {0}")]
    Browser(String),
}
