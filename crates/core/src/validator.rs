use std::{collections::BTreeSet, sync::LazyLock};

use regex::Regex;

use crate::types::{NormalizedDomain, RejectReason};

const MAX_HOST_LEN: usize = 253;

static IPV4_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{1,3}(\.[0-9]{1,3}){3}$").expect("valid ipv4 pattern"));

static HOSTNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\.)+[A-Za-z]{2,63}$")
        .expect("valid hostname pattern")
});

/// Syntactic gate in front of the network stages.
#[derive(Debug, Clone)]
pub struct Validator {
    unwanted_tlds: BTreeSet<String>,
}

impl Validator {
    pub fn new(unwanted_tlds: BTreeSet<String>) -> Self {
        Self { unwanted_tlds }
    }

    /// Extracts the host from `raw` and checks it against the denylist and hostname grammar.
    pub fn validate(&self, raw: &str) -> Result<NormalizedDomain, RejectReason> {
        let host = extract_host(raw);
        if host.is_empty() {
            return Err(RejectReason::Empty);
        }

        if let Some(tld) = self.unwanted_tlds.iter().find(|tld| host.ends_with(tld.as_str())) {
            return Err(RejectReason::UnwantedTld(tld.clone()));
        }

        if IPV4_LITERAL.is_match(host) {
            return Err(RejectReason::IpLiteral);
        }

        if host.len() > MAX_HOST_LEN || !HOSTNAME.is_match(host) {
            return Err(RejectReason::Malformed);
        }

        Ok(NormalizedDomain::new(host))
    }
}

/// Returns the authority of `raw`, treating scheme-less input as `http://` input.
///
/// When the authority is empty (`http:///example.com`) the path is used instead.
fn extract_host(raw: &str) -> &str {
    let rest = strip_scheme(raw).unwrap_or(raw);

    let authority_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_end];
    if !authority.is_empty() {
        return authority;
    }

    let path = &rest[authority_end..];
    let path_end = path.find(['?', '#']).unwrap_or(path.len());
    &path[..path_end]
}

/// Strips a leading `scheme://`. A `://` that appears after a path, query or
/// fragment delimiter, or after characters a scheme cannot hold, is not a
/// scheme separator.
fn strip_scheme(raw: &str) -> Option<&str> {
    let (scheme, rest) = raw.split_once("://")?;
    let mut chars = scheme.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let scheme_chars =
        chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (starts_with_letter && scheme_chars).then_some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;

    fn validator() -> Validator {
        Validator::new(ClassifierConfig::default().unwanted_tlds)
    }

    #[test]
    fn accepts_plain_and_nested_domains() {
        let validator = validator();
        assert_eq!(
            validator.validate("example.com").expect("valid").as_str(),
            "example.com"
        );
        assert_eq!(
            validator
                .validate("sub.sub.example.co.uk")
                .expect("valid")
                .as_str(),
            "sub.sub.example.co.uk"
        );
    }

    #[test]
    fn strips_scheme_path_and_query() {
        let domain = validator()
            .validate("https://Shop.Example.com/path?q=1#top")
            .expect("valid");
        assert_eq!(domain.as_str(), "Shop.Example.com");
    }

    #[test]
    fn embedded_urls_in_query_do_not_replace_the_host() {
        let validator = validator();
        assert_eq!(
            validator
                .validate("foo.com?next=https://bar.com")
                .expect("valid")
                .as_str(),
            "foo.com"
        );
        assert_eq!(
            validator
                .validate("example.com/?u=http://other.org")
                .expect("valid")
                .as_str(),
            "example.com"
        );
        assert_eq!(
            validator
                .validate("https://shop.example.com/#ref=http://other.org")
                .expect("valid")
                .as_str(),
            "shop.example.com"
        );
    }

    #[test]
    fn embedded_urls_cannot_bypass_denylist() {
        let validator = validator();
        assert_eq!(
            validator.validate("example.ru?x=http://good.com"),
            Err(RejectReason::UnwantedTld(".ru".into()))
        );
        assert_eq!(
            validator.validate("mirror.example.cn/redirect?to=https://good.com"),
            Err(RejectReason::UnwantedTld(".cn".into()))
        );
    }

    #[test]
    fn scheme_must_be_well_formed() {
        assert_eq!(strip_scheme("HTTPS://example.com"), Some("example.com"));
        assert_eq!(strip_scheme("svn+ssh://example.com"), Some("example.com"));
        assert_eq!(strip_scheme("://example.com"), None);
        assert_eq!(strip_scheme("1http://example.com"), None);
        assert_eq!(strip_scheme("foo.com?next=https://bar.com"), None);
        assert_eq!(strip_scheme("example.com"), None);
    }

    #[test]
    fn rejects_free_text() {
        assert_eq!(
            validator().validate("not a domain"),
            Err(RejectReason::Malformed)
        );
    }

    #[test]
    fn rejects_denylisted_suffixes() {
        let validator = validator();
        assert_eq!(
            validator.validate("example.ru"),
            Err(RejectReason::UnwantedTld(".ru".into()))
        );
        assert_eq!(
            validator.validate("http://mirror.example.cn/index.html"),
            Err(RejectReason::UnwantedTld(".cn".into()))
        );
    }

    #[test]
    fn denylist_match_is_case_sensitive() {
        assert!(validator().validate("example.RU").is_ok());
    }

    #[test]
    fn rejects_dotted_quads_regardless_of_range() {
        let validator = validator();
        for input in ["192.168.1.1", "999.999.999.999", "http://10.0.0.1/admin"] {
            assert_eq!(validator.validate(input), Err(RejectReason::IpLiteral), "{input}");
        }
    }

    #[test]
    fn rejects_empty_host() {
        assert_eq!(validator().validate("http://"), Err(RejectReason::Empty));
    }

    #[test]
    fn falls_back_to_path_when_authority_is_empty() {
        // the path keeps its leading slash, so grammar still rejects it
        assert_eq!(
            validator().validate("http:///example.com"),
            Err(RejectReason::Malformed)
        );
    }

    #[test]
    fn rejects_bad_labels() {
        let validator = validator();
        for input in [
            "-example.com",
            "example-.com",
            "exa_mple.com",
            "example.c",
            "example.c0m",
            "localhost",
            "example.com:8080",
        ] {
            assert_eq!(validator.validate(input), Err(RejectReason::Malformed), "{input}");
        }
    }

    #[test]
    fn enforces_label_and_total_length() {
        let validator = validator();
        let label_63 = "a".repeat(63);
        assert!(validator.validate(&format!("{label_63}.com")).is_ok());
        let label_64 = "a".repeat(64);
        assert!(validator.validate(&format!("{label_64}.com")).is_err());

        let long = format!("{}.com", vec![label_63; 4].join("."));
        assert!(long.len() > MAX_HOST_LEN);
        assert_eq!(validator.validate(&long), Err(RejectReason::Malformed));
    }

    #[test]
    fn custom_denylist_replaces_defaults() {
        let validator = Validator::new(
            ClassifierConfig::default()
                .with_unwanted_tlds([".xyz"])
                .unwanted_tlds,
        );
        assert!(validator.validate("example.ru").is_ok());
        assert!(validator.validate("example.xyz").is_err());
    }
}
