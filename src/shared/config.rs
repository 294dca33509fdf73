//! Application configuration. API endpoint, request timeout, offline mode.

use serde::Deserialize;

/// Portal API used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://securing.onrender.com";

/// Per-request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// API root. Read from CLAIMS_PORTAL_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Read from CLAIMS_PORTAL_REQUEST_TIMEOUT_SECS.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Serve every call from the in-memory demo portal. Read from CLAIMS_PORTAL_OFFLINE.
    #[serde(default)]
    pub offline: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        if let Ok(path) = std::env::var("CLAIMS_PORTAL_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c = c.add_source(config::Environment::with_prefix("CLAIMS_PORTAL").try_parsing(true));
        c.build()?.try_deserialize()
    }

    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Zero is treated as unset.
    pub fn request_timeout_secs_or_default(&self) -> u64 {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
    }

    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api_base_url_or_default(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.request_timeout_secs_or_default(), 30);
        assert!(!cfg.is_offline());
    }

    #[test]
    fn test_blank_values_fall_back() {
        let cfg = AppConfig {
            api_base_url: Some("  ".into()),
            request_timeout_secs: Some(0),
            offline: Some(true),
        };
        assert_eq!(cfg.api_base_url_or_default(), DEFAULT_API_BASE_URL);
        assert_eq!(cfg.request_timeout_secs_or_default(), 30);
        assert!(cfg.is_offline());
    }

    #[test]
    fn test_file_source_overrides_defaults() {
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "api_base_url = \"http://localhost:8080\"\nrequest_timeout_secs = 5\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.api_base_url_or_default(), "http://localhost:8080");
        assert_eq!(cfg.request_timeout_secs_or_default(), 5);
    }
}
