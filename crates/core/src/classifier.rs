use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::capability::{FetchError, PageFetcher};
use crate::config::ClassifierConfig;
use crate::html::{self, StructureCounts};
use crate::types::{FetchedPage, NormalizedDomain, VerdictStatus};

/// Which rule of the cascade produced an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Unreachable,
    AggregatorRedirect,
    SaleLanguage,
    ActiveSite,
    Inconclusive,
}

impl Signal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::AggregatorRedirect => "aggregator_redirect",
            Self::SaleLanguage => "sale_language",
            Self::ActiveSite => "active_site",
            Self::Inconclusive => "inconclusive",
        }
    }
}

/// Result of running the content cascade against one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub status: VerdictStatus,
    pub signal: Signal,
    pub reason: String,
}

impl Assessment {
    fn new(status: VerdictStatus, signal: Signal, reason: String) -> Self {
        Self {
            status,
            signal,
            reason,
        }
    }
}

/// Fetches a registered domain's landing page and applies the heuristic cascade.
#[derive(Clone)]
pub struct ContentClassifier {
    config: Arc<ClassifierConfig>,
    fetcher: Arc<dyn PageFetcher>,
    timeout: Duration,
}

impl ContentClassifier {
    pub fn new(
        config: Arc<ClassifierConfig>,
        fetcher: Arc<dyn PageFetcher>,
        timeout: Duration,
    ) -> Self {
        Self {
            config,
            fetcher,
            timeout,
        }
    }

    pub async fn classify_content(&self, domain: &NormalizedDomain) -> (VerdictStatus, String) {
        let assessment = self.assess(domain).await;
        (assessment.status, assessment.reason)
    }

    /// Fetches `http://<domain>` once and evaluates the page.
    pub async fn assess(&self, domain: &NormalizedDomain) -> Assessment {
        let url = format!("http://{domain}");
        let fetched = match tokio::time::timeout(self.timeout, self.fetcher.fetch(&url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout(self.timeout)),
        };

        let assessment = match fetched {
            Ok(page) => self.evaluate(&page),
            Err(err) => {
                warn!(stage = "fetch", %domain, error = %err, "page fetch failed");
                Assessment::new(
                    VerdictStatus::Fail,
                    Signal::Unreachable,
                    format!("registered domain but page unreachable: {err}"),
                )
            }
        };

        debug!(
            stage = "classify",
            %domain,
            signal = assessment.signal.as_str(),
            status = assessment.status.as_str(),
            "content assessed"
        );
        assessment
    }

    /// Applies the short-circuiting cascade: aggregator redirect, sale language,
    /// active-site keywords or structure, then fallback.
    pub fn evaluate(&self, page: &FetchedPage) -> Assessment {
        if self.is_aggregator_redirect(&page.final_url) {
            return Assessment::new(
                VerdictStatus::Pass,
                Signal::AggregatorRedirect,
                format!("listed for sale via aggregator ({})", page.final_url),
            );
        }

        let body = page.body.to_lowercase();

        if let Some(marker) = first_marker(&body, self.config.for_sale_markers.iter()) {
            return Assessment::new(
                VerdictStatus::Pass,
                Signal::SaleLanguage,
                format!("domain sale language detected (\"{marker}\")"),
            );
        }

        let counts = html::analyze(&body);
        let keyword = first_marker(&body, self.config.active_site_markers.iter());
        if keyword.is_some() || self.is_structurally_active(counts) {
            let trigger = match keyword {
                Some(marker) => format!("keyword \"{marker}\""),
                None => "page structure".to_string(),
            };
            return Assessment::new(
                VerdictStatus::Fail,
                Signal::ActiveSite,
                format!(
                    "active website content detected ({trigger}; {} links, {} nav landmarks)",
                    counts.anchors, counts.nav_landmarks
                ),
            );
        }

        Assessment::new(
            VerdictStatus::ManualReview,
            Signal::Inconclusive,
            format!(
                "signals inconclusive, requires human review ({} links, {} nav landmarks)",
                counts.anchors, counts.nav_landmarks
            ),
        )
    }

    fn is_aggregator_redirect(&self, final_url: &str) -> bool {
        let prefix = self.config.aggregator_redirect_prefix.as_str();
        if prefix.is_empty() {
            return false;
        }
        final_url
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    }

    fn is_structurally_active(&self, counts: StructureCounts) -> bool {
        let thresholds = self.config.structure;
        counts.anchors > thresholds.anchor_links || counts.nav_landmarks > thresholds.nav_landmarks
    }
}

fn first_marker<'a>(body: &str, mut markers: impl Iterator<Item = &'a String>) -> Option<&'a str> {
    markers
        .find(|marker| body.contains(marker.as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StructureThresholds;
    use async_trait::async_trait;

    struct StaticFetcher(Result<FetchedPage, FetchError>);

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            self.0.clone()
        }
    }

    struct SlowFetcher;

    #[async_trait]
    impl PageFetcher for SlowFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(FetchError::Transport("never reached".into()))
        }
    }

    fn classifier_with(
        config: ClassifierConfig,
        fetcher: impl PageFetcher + 'static,
    ) -> ContentClassifier {
        ContentClassifier::new(Arc::new(config), Arc::new(fetcher), Duration::from_secs(10))
    }

    fn classifier() -> ContentClassifier {
        classifier_with(
            ClassifierConfig::default(),
            StaticFetcher(Err(FetchError::Transport("unused".into()))),
        )
    }

    fn page(final_url: &str, body: &str) -> FetchedPage {
        FetchedPage {
            final_url: final_url.to_string(),
            body: body.to_string(),
            status: 200,
        }
    }

    #[test]
    fn aggregator_redirect_wins_over_everything() {
        let assessment = classifier().evaluate(&page(
            "https://www.afternic.com/forsale/example.com?utm_source=tdfs",
            "<a>cart</a>",
        ));
        assert_eq!(assessment.status, VerdictStatus::Pass);
        assert_eq!(assessment.signal, Signal::AggregatorRedirect);
        assert!(assessment.reason.contains("aggregator"));
    }

    #[test]
    fn aggregator_prefix_match_ignores_case() {
        let assessment = classifier().evaluate(&page(
            "HTTPS://WWW.AFTERNIC.COM/forsale/example.com",
            "",
        ));
        assert_eq!(assessment.signal, Signal::AggregatorRedirect);
    }

    #[test]
    fn sale_language_beats_active_keywords() {
        let assessment = classifier().evaluate(&page(
            "http://example.com/",
            "<h1>This Domain Is For Sale</h1><p>Add to cart or checkout</p>",
        ));
        assert_eq!(assessment.status, VerdictStatus::Pass);
        assert_eq!(assessment.signal, Signal::SaleLanguage);
        assert!(assessment.reason.contains("this domain is for sale"));
    }

    #[test]
    fn active_keyword_fails_with_counts() {
        let assessment = classifier().evaluate(&page(
            "http://example.com/",
            "<a href='/checkout'>Checkout</a>",
        ));
        assert_eq!(assessment.status, VerdictStatus::Fail);
        assert_eq!(assessment.signal, Signal::ActiveSite);
        assert!(assessment.reason.contains("\"checkout\""));
        assert!(assessment.reason.contains("1 links, 0 nav landmarks"));
    }

    #[test]
    fn many_links_mark_site_active() {
        let body = "<a href='#'>x</a>".repeat(21);
        let assessment = classifier().evaluate(&page("http://example.com/", &body));
        assert_eq!(assessment.status, VerdictStatus::Fail);
        assert!(assessment.reason.contains("page structure"));
        assert!(assessment.reason.contains("21 links"));
    }

    #[test]
    fn link_threshold_is_strict() {
        let body = "<a href='#'>x</a>".repeat(20);
        let assessment = classifier().evaluate(&page("http://example.com/", &body));
        assert_eq!(assessment.status, VerdictStatus::ManualReview);
    }

    #[test]
    fn any_nav_landmark_marks_site_active() {
        let assessment = classifier().evaluate(&page("http://example.com/", "<nav></nav>"));
        assert_eq!(assessment.status, VerdictStatus::Fail);
        assert!(assessment.reason.contains("1 nav landmarks"));
    }

    #[test]
    fn thresholds_are_configurable() {
        let classifier = classifier_with(
            ClassifierConfig::default().with_structure(StructureThresholds {
                anchor_links: 100,
                nav_landmarks: 2,
            }),
            StaticFetcher(Err(FetchError::Transport("unused".into()))),
        );
        let body = format!("<nav></nav>{}", "<a>x</a>".repeat(50));
        let assessment = classifier.evaluate(&page("http://example.com/", &body));
        assert_eq!(assessment.status, VerdictStatus::ManualReview);
    }

    #[test]
    fn quiet_page_needs_review() {
        let assessment = classifier().evaluate(&page("http://example.com/", "<p>Hello</p>"));
        assert_eq!(assessment.status, VerdictStatus::ManualReview);
        assert_eq!(assessment.signal, Signal::Inconclusive);
        assert!(assessment.reason.contains("inconclusive"));
    }

    #[tokio::test]
    async fn fetch_error_fails_as_unreachable() {
        let classifier = classifier_with(
            ClassifierConfig::default(),
            StaticFetcher(Err(FetchError::Transport("connection refused".into()))),
        );
        let (status, reason) = classifier
            .classify_content(&NormalizedDomain::new("example.com"))
            .await;
        assert_eq!(status, VerdictStatus::Fail);
        assert_eq!(
            reason,
            "registered domain but page unreachable: connection refused"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetch_times_out_as_unreachable() {
        let classifier = classifier_with(ClassifierConfig::default(), SlowFetcher);
        let (status, reason) = classifier
            .classify_content(&NormalizedDomain::new("example.com"))
            .await;
        assert_eq!(status, VerdictStatus::Fail);
        assert!(reason.contains("unreachable"));
        assert!(reason.contains("timed out after 10s"));
    }
}
