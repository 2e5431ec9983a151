//! Client configuration
//!
//! Values are layered through the `config` crate: built-in defaults, an
//! optional `portfolio.{toml,yaml,json}` file (or the file named by
//! `PORTFOLIO_CONFIG`), then `PORTFOLIO_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// API base used by development builds
pub const DEV_API_URL: &str = "http://localhost:5000";

/// Path under the API base where uploaded images are served
pub const UPLOADS_PATH: &str = "/api/uploads";

const DEFAULT_CONFIG_FILE: &str = "portfolio";
const DEFAULT_TOKEN_PATH: &str = ".portfolio/token";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the backend REST API, without trailing slash
    pub api_url: String,
    /// Base URL images are served from, without trailing slash
    pub uploads_url: String,
    /// Where the session token is persisted
    pub token_path: PathBuf,
    /// Per-request timeout
    pub request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    api_url: Option<String>,
    uploads_url: Option<String>,
    token_path: PathBuf,
    request_timeout: u64,
}

impl ClientConfig {
    /// Load configuration from the default file location and the environment
    ///
    /// # Environment Variables
    /// - `PORTFOLIO_CONFIG`: configuration file to read (default: `portfolio`)
    /// - `PORTFOLIO_API_URL`: backend base URL (default: `http://localhost:5000`
    ///   in development builds, required with the `production` feature)
    /// - `PORTFOLIO_UPLOADS_URL`: image base URL (default: `{api_url}/api/uploads`)
    /// - `PORTFOLIO_TOKEN_PATH`: persisted token location (default: `.portfolio/token`)
    /// - `PORTFOLIO_REQUEST_TIMEOUT`: request timeout in seconds (default: 30)
    pub fn from_env() -> ConfigResult<Self> {
        let path = std::env::var("PORTFOLIO_CONFIG")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load(&path)
    }

    /// Load configuration from the given file (optional) and the environment
    pub fn load(path: &str) -> ConfigResult<Self> {
        let mut builder = Config::builder()
            .set_default("token_path", DEFAULT_TOKEN_PATH)?
            .set_default("request_timeout", DEFAULT_REQUEST_TIMEOUT_SECS)?;

        if !cfg!(feature = "production") {
            builder = builder.set_default("api_url", DEV_API_URL)?;
        }

        let raw: RawConfig = builder
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("PORTFOLIO").try_parsing(true))
            .build()?
            .try_deserialize()?;

        let config = Self::resolve(raw)?;
        debug!(api_url = %config.api_url, uploads_url = %config.uploads_url, "Loaded client configuration");
        Ok(config)
    }

    /// Build a configuration for the given API base with every other value defaulted
    pub fn with_api_url(api_url: &str) -> ConfigResult<Self> {
        Self::resolve(RawConfig {
            api_url: Some(api_url.to_string()),
            uploads_url: None,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            request_timeout: DEFAULT_REQUEST_TIMEOUT_SECS,
        })
    }

    fn resolve(raw: RawConfig) -> ConfigResult<Self> {
        let api_url = raw
            .api_url
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::Missing("api_url"))?;
        let api_url = normalize_base("api_url", &api_url)?;

        let uploads_url = match raw.uploads_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => normalize_base("uploads_url", &url)?,
            None => format!("{}{}", api_url, UPLOADS_PATH),
        };

        if raw.request_timeout == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout",
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            api_url,
            uploads_url,
            token_path: raw.token_path,
            request_timeout: Duration::from_secs(raw.request_timeout),
        })
    }

    /// Public URL of an uploaded image
    pub fn image_url(&self, filename: &str) -> String {
        format!("{}/{}", self.uploads_url, filename.trim_start_matches('/'))
    }
}

fn normalize_base(key: &'static str, value: &str) -> ConfigResult<String> {
    let trimmed = value.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "PORTFOLIO_API_URL",
            "PORTFOLIO_UPLOADS_URL",
            "PORTFOLIO_TOKEN_PATH",
            "PORTFOLIO_REQUEST_TIMEOUT",
        ] {
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    #[cfg(not(feature = "production"))]
    fn test_development_defaults() {
        clear_env();
        let config = ClientConfig::load("does-not-exist").expect("Failed to load config");
        assert_eq!(config.api_url, "http://localhost:5000");
        assert_eq!(config.uploads_url, "http://localhost:5000/api/uploads");
        assert_eq!(config.token_path, PathBuf::from(".portfolio/token"));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    #[serial]
    fn test_environment_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("PORTFOLIO_API_URL", "https://photos.example.org/");
            std::env::set_var("PORTFOLIO_REQUEST_TIMEOUT", "5");
        }

        let config = ClientConfig::load("does-not-exist").expect("Failed to load config");
        assert_eq!(config.api_url, "https://photos.example.org");
        assert_eq!(config.uploads_url, "https://photos.example.org/api/uploads");
        assert_eq!(config.request_timeout, Duration::from_secs(5));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_explicit_uploads_url() {
        clear_env();
        unsafe {
            std::env::set_var("PORTFOLIO_API_URL", "https://photos.example.org");
            std::env::set_var("PORTFOLIO_UPLOADS_URL", "https://cdn.example.org/images/");
        }

        let config = ClientConfig::load("does-not-exist").expect("Failed to load config");
        assert_eq!(config.uploads_url, "https://cdn.example.org/images");

        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_url_rejected() {
        clear_env();
        unsafe { std::env::set_var("PORTFOLIO_API_URL", "not a url") };

        let result = ClientConfig::load("does-not-exist");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "api_url", .. })
        ));

        clear_env();
    }

    #[test]
    fn test_image_url() {
        let config = ClientConfig::with_api_url("http://localhost:5000").unwrap();
        assert_eq!(
            config.image_url("sunset.jpg"),
            "http://localhost:5000/api/uploads/sunset.jpg"
        );
        assert_eq!(
            config.image_url("/sunset.jpg"),
            "http://localhost:5000/api/uploads/sunset.jpg"
        );
    }
}
