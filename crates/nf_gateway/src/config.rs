use std::fmt;
use std::path::PathBuf;

use nf_core::{Error, KeywordSet, Result};

pub const DEFAULT_UPSTREAM_URL: &str = "https://newsdata.io/api/1";
pub const DEFAULT_LANGUAGE: &str = "zh";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_PORT: u16 = 8002;

/// Gateway configuration.
///
/// Required:
/// - `NEWS_API_KEY`: credential for the news search API
///
/// Optional:
/// - `NEWS_API_URL`: base URL of the news search API
/// - `NEWS_LANGUAGE`: language filter sent upstream
/// - `NEWS_PAGE_SIZE`: results requested per query
/// - `PORT`: listening port
/// - `STATIC_DIR`: directory served for every path other than the API
/// - `NEWS_FALLBACK_KEYWORDS`: `a OR b` expression used when a request has no keywords
#[derive(Clone)]
pub struct GatewayConfig {
    pub api_key: String,
    pub upstream_url: String,
    pub language: String,
    pub page_size: u32,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub fallback: KeywordSet,
}

impl GatewayConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            port: DEFAULT_PORT,
            static_dir: None,
            fallback: KeywordSet::fallback(),
        }
    }

    /// Loads the configuration from the environment. A missing or blank
    /// `NEWS_API_KEY` is an error so the gateway refuses to start without it.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("NEWS_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("NEWS_API_KEY environment variable is required".to_string())
            })?;

        let mut config = Self::new(api_key);

        if let Ok(url) = std::env::var("NEWS_API_URL") {
            config.upstream_url = url;
        }
        if let Ok(language) = std::env::var("NEWS_LANGUAGE") {
            config.language = language;
        }
        if let Some(page_size) = std::env::var("NEWS_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            config.page_size = page_size;
        }
        if let Some(port) = std::env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok()) {
            config.port = port;
        }
        config.static_dir = std::env::var_os("STATIC_DIR").map(PathBuf::from);
        if let Some(fallback) = std::env::var("NEWS_FALLBACK_KEYWORDS")
            .ok()
            .map(|s| KeywordSet::parse(&s))
            .filter(|k| !k.is_empty())
        {
            config.fallback = fallback;
        }

        Ok(config.normalized())
    }

    /// Trims the trailing slash off the upstream URL.
    pub fn normalized(mut self) -> Self {
        self.upstream_url = self.upstream_url.trim_end_matches('/').to_string();
        self
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_key", &"<redacted>")
            .field("upstream_url", &self.upstream_url)
            .field("language", &self.language)
            .field("page_size", &self.page_size)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .field("fallback", &self.fallback.to_expression())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::new("key");
        assert_eq!(config.upstream_url, DEFAULT_UPSTREAM_URL);
        assert_eq!(config.language, "zh");
        assert_eq!(config.page_size, 10);
        assert_eq!(config.port, 8002);
        assert_eq!(config.fallback, KeywordSet::fallback());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = GatewayConfig::new("super-secret");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_normalized_trims_slash() {
        let mut config = GatewayConfig::new("key");
        config.upstream_url = "http://localhost:9000/api/1/".to_string();
        assert_eq!(config.normalized().upstream_url, "http://localhost:9000/api/1");
    }
}
