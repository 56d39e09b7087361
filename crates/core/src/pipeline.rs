use std::{sync::Arc, time::Duration};

use tracing::debug;

use crate::capability::{PageFetcher, RegistrationLookup};
use crate::classifier::ContentClassifier;
use crate::config::ClassifierConfig;
use crate::resolver::RegistrationResolver;
use crate::types::{RegistrationState, Verdict, VerdictStatus};
use crate::validator::Validator;

pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Validate, resolve registration, then classify content when registered.
///
/// Holds no per-request state; a single instance is shared across concurrent requests.
#[derive(Clone)]
pub struct Pipeline {
    validator: Validator,
    resolver: RegistrationResolver,
    classifier: ContentClassifier,
}

impl Pipeline {
    pub fn new(
        config: ClassifierConfig,
        lookup: Arc<dyn RegistrationLookup>,
        fetcher: Arc<dyn PageFetcher>,
        timeout: Duration,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            validator: Validator::new(config.unwanted_tlds.clone()),
            resolver: RegistrationResolver::new(lookup, timeout),
            classifier: ContentClassifier::new(config, fetcher, timeout),
        }
    }

    /// Produces a verdict for `raw`. Upstream failures become verdict reasons.
    ///
    /// Callers are expected to reject missing or blank input beforehand.
    pub async fn classify(&self, raw: &str) -> Verdict {
        let domain = match self.validator.validate(raw) {
            Ok(domain) => domain,
            Err(reason) => {
                debug!(stage = "validate", input = raw, %reason, "input rejected");
                return Verdict::new(
                    raw,
                    VerdictStatus::Fail,
                    format!("invalid or unwanted domain: {reason}"),
                );
            }
        };

        let registration = self.resolver.resolve(&domain).await;
        let verdict = match registration.state {
            RegistrationState::Available => {
                Verdict::new(domain.as_str(), VerdictStatus::Pass, registration.reason)
            }
            RegistrationState::Unknown(_) => Verdict::new(
                domain.as_str(),
                VerdictStatus::ManualReview,
                registration.reason,
            ),
            RegistrationState::Registered => {
                let (status, reason) = self.classifier.classify_content(&domain).await;
                Verdict::new(domain.into_string(), status, reason)
            }
        };

        debug!(
            stage = "classify",
            url = %verdict.url,
            status = verdict.status.as_str(),
            reason = %verdict.reason,
            "verdict issued"
        );
        verdict
    }
}
