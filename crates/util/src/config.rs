use std::{env, fmt, net::SocketAddr, num::ParseIntError, time::Duration};

use super::server_bind_address;

pub const DEFAULT_RDAP_BASE_URL: &str = "https://rdap.org/";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Application runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => Err(ConfigError::InvalidEnvironment(other.to_string())),
        }
    }

    /// Returns the canonical name used for logging/metrics labels.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

/// Which page fetcher backs the content classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherKind {
    Http,
    Browser,
}

impl FetcherKind {
    fn from_str(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "browser" | "headless" => Ok(Self::Browser),
            other => Err(ConfigError::InvalidFetcher(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Browser => "browser",
        }
    }
}

/// Optional replacements for the classifier's built-in lists and thresholds.
///
/// `None` keeps the built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyOverrides {
    pub unwanted_tlds: Option<Vec<String>>,
    pub for_sale_markers: Option<Vec<String>>,
    pub active_site_markers: Option<Vec<String>>,
    pub aggregator_redirect_prefix: Option<String>,
    pub anchor_link_threshold: Option<usize>,
    pub nav_landmark_threshold: Option<usize>,
}

impl PolicyOverrides {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            unwanted_tlds: list_var("UNWANTED_TLDS"),
            for_sale_markers: list_var("FOR_SALE_MARKERS"),
            active_site_markers: list_var("ACTIVE_SITE_MARKERS"),
            aggregator_redirect_prefix: non_empty_var("AGGREGATOR_REDIRECT_PREFIX"),
            anchor_link_threshold: number_var("ANCHOR_LINK_THRESHOLD")?,
            nav_landmark_threshold: number_var("NAV_LANDMARK_THRESHOLD")?,
        })
    }
}

/// Runtime configuration resolved from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub environment: Environment,
    pub rdap_base_url: String,
    pub upstream_timeout: Duration,
    pub fetcher: FetcherKind,
    pub user_agent: Option<String>,
    pub policy: PolicyOverrides,
}

impl AppConfig {
    /// Constructs the configuration by reading and validating environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_value = env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());
        let environment = Environment::from_str(&env_value)?;
        let bind_addr = server_bind_address().map_err(ConfigError::BindAddress)?;

        let rdap_base_url =
            non_empty_var("RDAP_BASE_URL").unwrap_or_else(|| DEFAULT_RDAP_BASE_URL.to_string());

        let timeout_secs =
            number_var::<u64>("UPSTREAM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let fetcher = match non_empty_var("PAGE_FETCHER") {
            Some(value) => FetcherKind::from_str(&value)?,
            None => FetcherKind::Http,
        };

        Ok(Self {
            bind_addr,
            environment,
            rdap_base_url,
            upstream_timeout: Duration::from_secs(timeout_secs),
            fetcher,
            user_agent: non_empty_var("FETCH_USER_AGENT"),
            policy: PolicyOverrides::from_env()?,
        })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn list_var(name: &str) -> Option<Vec<String>> {
    non_empty_var(name).map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn number_var<T>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr<Err = ParseIntError>,
{
    non_empty_var(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|source| ConfigError::InvalidNumber { name, value, source })
        })
        .transpose()
}

/// Errors that can occur during configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    InvalidEnvironment(String),
    BindAddress(std::net::AddrParseError),
    InvalidFetcher(String),
    InvalidNumber {
        name: &'static str,
        value: String,
        source: ParseIntError,
    },
    ZeroTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnvironment(value) => write!(
                f,
                "APP_ENV must be one of 'development', 'production', or 'test' (got {value})"
            ),
            Self::BindAddress(err) => write!(f, "invalid APP_BIND_ADDR value: {err}"),
            Self::InvalidFetcher(value) => write!(
                f,
                "PAGE_FETCHER must be one of 'http' or 'browser' (got {value})"
            ),
            Self::InvalidNumber {
                name,
                value,
                source,
            } => write!(f, "{name} must be a non-negative integer (got {value}): {source}"),
            Self::ZeroTimeout => write!(f, "UPSTREAM_TIMEOUT_SECS must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}
