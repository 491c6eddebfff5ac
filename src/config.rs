//! Client configuration.
//!
//! Configuration is a plain value owned by the caller. Build one per environment and hand
//! it to [`IgbClient`](crate::client::IgbClient); nothing is kept in process-wide state.
//!
//! # Examples
//!
//! ```
//! use igb_client::config::IgbConfig;
//!
//! let toml = r#"
//!     api_key = "partner-api-key"
//!     environment_id = "acc"
//!     storage_key = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA="
//!     transport_key = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE="
//!
//!     [http]
//!     timeout_secs = 20
//! "#;
//!
//! let config = IgbConfig::from_toml(toml).unwrap();
//! assert_eq!(
//!     config.environment_url(),
//!     "https://api.ingoedebanen.nl/apipartner/hapi/v1/acc/"
//! );
//! assert_eq!(config.http.timeout_secs, 20);
//! ```

use std::{fmt, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::{
    crypto::Cipher,
    error::{IgbError, Result},
};

/// Production base URL of the partner API.
pub const DEFAULT_BASE_URL: &str = "https://api.ingoedebanen.nl/apipartner/hapi/v1/";

/// Header carrying the static api key.
pub const API_KEY_HEADER: &str = "X-IGB-Api-Key";

/// Root client configuration.
#[derive(Clone, Deserialize)]
pub struct IgbConfig {
    /// Partner api key, sent as [`API_KEY_HEADER`].
    pub api_key: String,

    /// Partner environment identifier, the last path segment of every endpoint.
    pub environment_id: String,

    /// Base URL of the partner API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Base64 AES key protecting credentials at rest.
    pub storage_key: String,

    /// Base64 AES key protecting credentials in flight to the partner.
    pub transport_key: String,

    /// HTTP session settings.
    #[serde(default)]
    pub http: HttpConfig,
}

impl fmt::Debug for IgbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgbConfig")
            .field("api_key", &"<redacted>")
            .field("environment_id", &self.environment_id)
            .field("base_url", &self.base_url)
            .field("storage_key", &"<redacted>")
            .field("transport_key", &"<redacted>")
            .field("http", &self.http)
            .finish()
    }
}

impl IgbConfig {
    /// Creates a configuration against the production base URL.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        environment_id: impl Into<String>,
        storage_key: impl Into<String>,
        transport_key: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            environment_id: environment_id.into(),
            base_url: default_base_url(),
            storage_key: storage_key.into(),
            transport_key: transport_key.into(),
            http: HttpConfig::default(),
        }
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Config`] if the TOML is malformed or [`validate`](Self::validate)
    /// fails.
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml).map_err(|e| IgbError::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the whole configuration.
    ///
    /// Checks that:
    /// - `base_url` is an HTTPS URL and not a loopback host
    /// - `environment_id` and `api_key` are usable (see [`validate_identity`](Self::validate_identity))
    /// - both keys are usable (see [`validate_keys`](Self::validate_keys))
    /// - HTTP settings are in range
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Config`] describing the first failed check.
    pub fn validate(&self) -> Result<()> {
        self.validate_base_url()?;
        self.validate_identity()?;
        self.validate_keys()?;
        self.http.validate()
    }

    /// Validates the api key and environment id.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Config`] if the api key is empty or the environment id is not a
    /// single non-empty path segment.
    pub fn validate_identity(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(IgbError::Config("api_key must not be empty".to_owned()));
        }
        if self.environment_id.is_empty()
            || self.environment_id.contains(['/', '?', '#'])
            || self.environment_id.contains("..")
        {
            return Err(IgbError::Config(format!(
                "environment_id must be a single path segment: {:?}",
                self.environment_id
            )));
        }
        Ok(())
    }

    /// Validates the storage and transport keys.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Config`] if either key is not a base64 AES key, or if the two
    /// keys are the same.
    pub fn validate_keys(&self) -> Result<()> {
        Cipher::new(&self.storage_key)
            .map_err(|e| IgbError::Config(format!("storage_key: {e}")))?;
        Cipher::new(&self.transport_key)
            .map_err(|e| IgbError::Config(format!("transport_key: {e}")))?;

        if self.storage_key.trim() == self.transport_key.trim() {
            return Err(IgbError::Config(
                "storage_key and transport_key must be different keys".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_base_url(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            IgbError::Config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        if url.scheme() != "https" {
            return Err(IgbError::Config(format!(
                "base_url must use HTTPS, got: {}",
                url.scheme()
            )));
        }

        if let Some(host) = url.host_str() {
            let host = host.to_lowercase();
            if host == "localhost" || host.starts_with("127.") || host == "[::1]" {
                return Err(IgbError::Config(format!(
                    "base_url must not be localhost or loopback: {host}"
                )));
            }
        }

        Ok(())
    }

    /// Root URL of the configured environment, always ending in `/`.
    #[must_use]
    pub fn environment_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        format!("{base}/{}/", self.environment_id)
    }
}

/// HTTP session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Number of GET responses kept in the response cache. Zero disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl HttpConfig {
    /// Validates timeouts are within bounds.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - `timeout_secs` is not within 1-300
    /// - `connect_timeout_secs` is not within 1-60
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 || self.timeout_secs > 300 {
            return Err(IgbError::Config("timeout_secs must be between 1 and 300".to_owned()));
        }
        if self.connect_timeout_secs == 0 || self.connect_timeout_secs > 60 {
            return Err(IgbError::Config(
                "connect_timeout_secs must be between 1 and 60".to_owned(),
            ));
        }
        Ok(())
    }

    /// Returns timeout as Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns connect timeout as Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_cache_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORAGE: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
    const TRANSPORT: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";

    fn config() -> IgbConfig {
        IgbConfig::new("api-key", "acc", STORAGE, TRANSPORT)
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let toml = format!(
            "api_key = \"k\"\nenvironment_id = \"prod\"\nstorage_key = \"{STORAGE}\"\ntransport_key = \"{TRANSPORT}\"\n"
        );
        let config = IgbConfig::from_toml(&toml).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.http.cache_capacity, 256);
    }

    #[test]
    fn test_toml_missing_key_rejected() {
        let err = IgbConfig::from_toml("api_key = \"k\"").unwrap_err();
        assert!(matches!(err, IgbError::Config(_)));
    }

    #[test]
    fn test_environment_url() {
        let mut config = config();
        assert_eq!(config.environment_url(), format!("{DEFAULT_BASE_URL}acc/"));

        config.base_url = "https://partner.example.com/api".to_owned();
        assert_eq!(config.environment_url(), "https://partner.example.com/api/acc/");
    }

    #[test]
    fn test_http_base_url_rejected() {
        let mut config = config();
        config.base_url = "http://partner.example.com/".to_owned();
        assert!(matches!(config.validate(), Err(IgbError::Config(_))));
    }

    #[test]
    fn test_loopback_base_url_rejected() {
        let mut config = config();
        config.base_url = "https://127.0.0.1/".to_owned();
        assert!(config.validate().is_err());
        config.base_url = "https://localhost/".to_owned();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_environment_id_must_be_segment() {
        for bad in ["", "a/b", "..", "x?y"] {
            let mut config = config();
            config.environment_id = bad.to_owned();
            assert!(config.validate_identity().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let mut config = config();
        config.api_key = "  ".to_owned();
        assert!(config.validate_identity().is_err());
    }

    #[test]
    fn test_keys_validated() {
        let mut config = config();
        config.storage_key = "short".to_owned();
        assert!(config.validate_keys().is_err());

        let mut config = self::config();
        config.transport_key = STORAGE.to_owned();
        assert!(config.validate_keys().is_err(), "identical keys must be rejected");
    }

    #[test]
    fn test_http_config_bounds() {
        let mut http = HttpConfig::default();
        assert!(http.validate().is_ok());
        http.timeout_secs = 0;
        assert!(http.validate().is_err());
        http.timeout_secs = 30;
        http.connect_timeout_secs = 61;
        assert!(http.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let debug = format!("{:?}", config());
        assert!(!debug.contains("api-key"));
        assert!(!debug.contains(STORAGE));
        assert!(!debug.contains(TRANSPORT));
        assert!(debug.contains("acc"));
    }
}
