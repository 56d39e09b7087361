use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::capability::{LookupError, RegistrationLookup};
use crate::types::{NormalizedDomain, Registration, RegistrationState, UnknownCause};

/// Maps a single registration lookup onto [`RegistrationState`].
#[derive(Clone)]
pub struct RegistrationResolver {
    lookup: Arc<dyn RegistrationLookup>,
    timeout: Duration,
}

impl RegistrationResolver {
    pub fn new(lookup: Arc<dyn RegistrationLookup>, timeout: Duration) -> Self {
        Self { lookup, timeout }
    }

    /// Issues exactly one lookup bounded by the configured timeout. Never fails.
    pub async fn resolve(&self, domain: &NormalizedDomain) -> Registration {
        let outcome = match tokio::time::timeout(self.timeout, self.lookup.query(domain)).await {
            Ok(result) => result,
            Err(_) => Err(LookupError::Timeout(self.timeout)),
        };

        let registration = map_lookup(outcome);
        match &registration.state {
            RegistrationState::Unknown(_) => {
                warn!(stage = "rdap", %domain, reason = %registration.reason, "registration status unknown")
            }
            state => debug!(stage = "rdap", %domain, state = state.as_str(), "registration resolved"),
        }
        registration
    }
}

fn map_lookup(outcome: Result<u16, LookupError>) -> Registration {
    match outcome {
        Ok(404) => Registration {
            state: RegistrationState::Available,
            reason: "domain available for registration".to_string(),
        },
        Ok(200) => Registration {
            state: RegistrationState::Registered,
            reason: "domain already registered".to_string(),
        },
        Ok(status) => Registration {
            state: RegistrationState::Unknown(UnknownCause::UnexpectedStatus(status)),
            reason: format!("RDAP returned {status}"),
        },
        Err(err) => Registration {
            reason: format!("RDAP error: {err}"),
            state: RegistrationState::Unknown(UnknownCause::Lookup(err)),
        },
    }
}
