use std::time::Duration;

use http::header::{
    ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION, CONTENT_TYPE, HeaderName, USER_AGENT,
};
use http::{HeaderMap, HeaderValue};

use crate::PicaError;

mod profile;
pub use self::profile::Profile;

/// The client version, advertised in the default `User-Agent`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process-wide settings, built once at startup and handed to the [`ApiRunner`](crate::ApiRunner).
///
/// Use [`PicaConfig::builder`] to create instances.
#[derive(Debug, Clone)]
pub struct PicaConfig {
    base_url: String,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl PicaConfig {
    /// Starts a builder with the default headers.
    pub fn builder() -> PicaConfigBuilder {
        PicaConfigBuilder::default()
    }

    /// The base URL used when the scope has no `baseUrl` binding.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers added to every request that does not declare them.
    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// The per request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl Default for PicaConfig {
    fn default() -> Self {
        PicaConfigBuilder::default().build()
    }
}

/// Builder for [`PicaConfig`].
///
/// # Default Configuration
///
/// - **Base URL**: empty, the scope `baseUrl` binding is expected
/// - **Headers**: `Accept: */*`, `Accept-Language`, `Cache-Control: max-age=0`,
///   a pica `User-Agent`, `Connection: keep-alive` and `Content-Type: application/json`
/// - **Timeout**: none
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
///
/// use pica_core::PicaConfig;
///
/// # fn example() -> Result<(), pica_core::PicaError> {
/// let config = PicaConfig::builder()
///     .with_base_url("http://localhost:8080")
///     .with_header("Authorization", "Bearer token")?
///     .with_timeout(Duration::from_secs(10))
///     .build();
///
/// assert_eq!(config.base_url(), "http://localhost:8080");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PicaConfigBuilder {
    base_url: String,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl PicaConfigBuilder {
    /// Builds the configuration.
    pub fn build(self) -> PicaConfig {
        let Self {
            base_url,
            default_headers,
            timeout,
        } = self;

        PicaConfig {
            base_url,
            default_headers,
            timeout,
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets or replaces a default header.
    ///
    /// # Errors
    ///
    /// Fails when the name or the value is not a valid HTTP header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, PicaError> {
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = HeaderValue::from_str(value)?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Removes every default header.
    pub fn without_default_headers(mut self) -> Self {
        self.default_headers.clear();
        self
    }

    /// Sets the per request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for PicaConfigBuilder {
    fn default() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        default_headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
        default_headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        default_headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(user_agent) = HeaderValue::from_str(&format!(
            "Pica Api Test Client/{VERSION} https://github.com/jeremaihloo/pica"
        )) {
            default_headers.insert(USER_AGENT, user_agent);
        }

        Self {
            base_url: String::new(),
            default_headers,
            timeout: None,
        }
    }
}
