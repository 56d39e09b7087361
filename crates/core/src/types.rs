use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::LookupError;

/// Host extracted from user input that passed syntactic validation.
///
/// The original casing of the input is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedDomain(String);

impl NormalizedDomain {
    pub(crate) fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why an input was refused before any network access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("no host found in input")]
    Empty,
    #[error("unwanted TLD suffix {0}")]
    UnwantedTld(String),
    #[error("host is an IPv4 literal")]
    IpLiteral,
    #[error("host does not match hostname grammar")]
    Malformed,
}

/// Outcome of the registration lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub state: RegistrationState,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationState {
    Available,
    Registered,
    Unknown(UnknownCause),
}

impl RegistrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Registered => "registered",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Underlying cause of an indeterminate registration state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnknownCause {
    UnexpectedStatus(u16),
    Lookup(LookupError),
}

/// Page retrieved by a [`crate::capability::PageFetcher`] after following redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub final_url: String,
    pub body: String,
    pub status: u16,
}

/// Terminal classification status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictStatus {
    Pass,
    Fail,
    #[serde(rename = "Manual Review")]
    ManualReview,
}

impl VerdictStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::ManualReview => "Manual Review",
        }
    }

    pub fn metric_label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::ManualReview => "manual_review",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final answer for a single classification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub url: String,
    pub status: VerdictStatus,
    pub reason: String,
}

impl Verdict {
    pub fn new(url: impl Into<String>, status: VerdictStatus, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status,
            reason: reason.into(),
        }
    }
}
