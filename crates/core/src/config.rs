use std::collections::BTreeSet;

pub const DEFAULT_UNWANTED_TLDS: &[&str] = &[".cn", ".ru"];

pub const DEFAULT_FOR_SALE_MARKERS: &[&str] = &[
    "buy this domain",
    "domain for sale",
    "this domain is for sale",
    "acquire this domain",
    "make an offer",
    "bid now",
];

pub const DEFAULT_ACTIVE_SITE_MARKERS: &[&str] = &[
    "cart",
    "checkout",
    "shop now",
    "products",
    "services",
    "marketplace",
    "about us",
    "contact",
    "login",
    "sign in",
    "my account",
];

pub const DEFAULT_AGGREGATOR_REDIRECT_PREFIX: &str = "https://www.afternic.com/forsale/";

/// Policy lists and thresholds consumed by the validator and the content classifier.
///
/// Marker phrases are stored lowercased so they can be matched directly against a
/// lowercased page body. Unwanted TLD suffixes are kept verbatim because the
/// suffix check is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub unwanted_tlds: BTreeSet<String>,
    pub for_sale_markers: BTreeSet<String>,
    pub active_site_markers: BTreeSet<String>,
    pub aggregator_redirect_prefix: String,
    pub structure: StructureThresholds,
}

/// Counts above which a page is treated as an active site.
///
/// A page is active when its anchor count is strictly greater than
/// `anchor_links` or its navigation landmark count is strictly greater than
/// `nav_landmarks`. Both values are tunable heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureThresholds {
    pub anchor_links: usize,
    pub nav_landmarks: usize,
}

impl Default for StructureThresholds {
    fn default() -> Self {
        Self {
            anchor_links: 20,
            nav_landmarks: 0,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            unwanted_tlds: DEFAULT_UNWANTED_TLDS.iter().map(|s| s.to_string()).collect(),
            for_sale_markers: markers(DEFAULT_FOR_SALE_MARKERS.iter().copied()),
            active_site_markers: markers(DEFAULT_ACTIVE_SITE_MARKERS.iter().copied()),
            aggregator_redirect_prefix: DEFAULT_AGGREGATOR_REDIRECT_PREFIX.to_string(),
            structure: StructureThresholds::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn with_unwanted_tlds<I, S>(mut self, tlds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unwanted_tlds = tlds
            .into_iter()
            .map(Into::into)
            .filter(|tld| !tld.is_empty())
            .collect();
        self
    }

    pub fn with_for_sale_markers<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.for_sale_markers = markers(phrases);
        self
    }

    pub fn with_active_site_markers<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.active_site_markers = markers(phrases);
        self
    }

    pub fn with_aggregator_redirect_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.aggregator_redirect_prefix = prefix.into();
        self
    }

    pub fn with_structure(mut self, structure: StructureThresholds) -> Self {
        self.structure = structure;
        self
    }
}

fn markers<I, S>(phrases: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    phrases
        .into_iter()
        .map(|phrase| phrase.as_ref().trim().to_lowercase())
        .filter(|phrase| !phrase.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_known_lists() {
        let config = ClassifierConfig::default();
        assert!(config.unwanted_tlds.contains(".ru"));
        assert!(config.for_sale_markers.contains("make an offer"));
        assert!(config.active_site_markers.contains("checkout"));
        assert_eq!(config.structure.anchor_links, 20);
        assert_eq!(config.structure.nav_landmarks, 0);
    }

    #[test]
    fn marker_overrides_are_normalized() {
        let config = ClassifierConfig::default()
            .with_for_sale_markers(["  Premium Domain ", "", "BID NOW"])
            .with_unwanted_tlds([".xyz", ""]);

        let expected: BTreeSet<String> = ["bid now", "premium domain"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(config.for_sale_markers, expected);
        assert_eq!(config.unwanted_tlds.len(), 1);
        assert!(config.unwanted_tlds.contains(".xyz"));
    }
}
