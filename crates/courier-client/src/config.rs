//! Client configuration
//!
//! Loaded from a TOML file or built in code via `ClientConfig::new`. The
//! backend base URL is the only required field; platform, refresh path, and
//! timeout have defaults matching the production deployment.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Configuration for an API client instance.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://api.courier.example`
    pub base_url: String,
    /// Originating platform sent in the refresh exchange body
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Path of the refresh exchange endpoint
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Per-request timeout in seconds (also bounds the refresh exchange)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_platform() -> String {
    "web".into()
}

fn default_refresh_path() -> String {
    "/api/v1/auth/refresh-token".into()
}

fn default_timeout() -> u64 {
    30
}

impl ClientConfig {
    /// Build a config with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            platform: default_platform(),
            refresh_path: default_refresh_path(),
            timeout_secs: default_timeout(),
        }
    }

    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
        let config: ClientConfig = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field constraints.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("timeout_secs must be greater than 0".into()));
        }
        if !self.refresh_path.starts_with('/') {
            return Err(Error::Config(format!(
                "refresh_path must start with '/', got: {}",
                self.refresh_path
            )));
        }
        Ok(())
    }

    /// Per-request timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_toml(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn new_applies_defaults() {
        let config = ClientConfig::new("https://api.courier.example");
        assert_eq!(config.platform, "web");
        assert_eq!(config.refresh_path, "/api/v1/auth/refresh-token");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn load_minimal_toml_applies_defaults() {
        let file = write_toml(r#"base_url = "https://api.courier.example""#);
        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "https://api.courier.example");
        assert_eq!(config.platform, "web");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn load_full_toml() {
        let file = write_toml(
            r#"
base_url = "https://staging.courier.example"
platform = "ios"
refresh_path = "/api/v2/auth/refresh"
timeout_secs = 10
"#,
        );
        let config = ClientConfig::load(file.path()).unwrap();
        assert_eq!(config.platform, "ios");
        assert_eq!(config.refresh_path, "/api/v2/auth/refresh");
        assert_eq!(config.timeout_secs, 10);
    }

    #[test]
    fn rejects_non_http_base_url() {
        let file = write_toml(r#"base_url = "ftp://api.courier.example""#);
        let err = ClientConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("base_url"), "got: {err}");
    }

    #[test]
    fn rejects_zero_timeout() {
        let file = write_toml(
            r#"
base_url = "https://api.courier.example"
timeout_secs = 0
"#,
        );
        let err = ClientConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"), "got: {err}");
    }

    #[test]
    fn rejects_relative_refresh_path() {
        let file = write_toml(
            r#"
base_url = "https://api.courier.example"
refresh_path = "auth/refresh"
"#,
        );
        let err = ClientConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("refresh_path"), "got: {err}");
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ClientConfig::load(Path::new("/nonexistent/courier.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got: {err:?}");
    }
}
