//! API environment: the base URL endpoints are resolved against.

use url::Url;

/// Supplies the base URL for a family of endpoints.
///
/// The base URL is optional at construction so that an environment can be
/// assembled from configuration that may be missing. Resolving it with
/// [`Environment::base_url`] when absent is a configuration bug and panics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    base_url: Option<Url>,
}

impl Environment {
    pub fn new(base_url: Option<Url>) -> Self {
        Self { base_url }
    }

    pub fn from_url(base_url: Url) -> Self {
        Self {
            base_url: Some(base_url),
        }
    }

    /// Parse `base_url`. An unparsable string yields an environment without a
    /// base URL rather than an error, matching how a missing setting behaves.
    pub fn parse(base_url: &str) -> Self {
        Self {
            base_url: Url::parse(base_url).ok(),
        }
    }

    /// Read the base URL from the environment variable `var`.
    pub fn from_env(var: &str) -> Self {
        match std::env::var(var) {
            Ok(value) => Self::parse(&value),
            Err(_) => Self::default(),
        }
    }

    /// The configured base URL.
    ///
    /// # Panics
    /// Panics if no valid base URL was configured.
    pub fn base_url(&self) -> &Url {
        self.base_url
            .as_ref()
            .unwrap_or_else(|| panic!("missing or invalid base URL"))
    }

    pub fn try_base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }
}
