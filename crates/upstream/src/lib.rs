//! HTTP-backed implementations of the pipeline's collaborator traits.

#[cfg(feature = "browser")]
pub mod browser;
pub mod fetch;
pub mod rdap;

use std::error::Error as _;

use thiserror::Error;

#[cfg(feature = "browser")]
pub use browser::BrowserPageFetcher;
pub use fetch::{HttpPageFetcher, DEFAULT_MAX_BODY_BYTES, DEFAULT_USER_AGENT};
pub use rdap::RdapClient;

/// Errors raised while constructing upstream clients.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build http client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Flattens a reqwest error and its sources into one line.
pub(crate) fn describe(err: &reqwest::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
