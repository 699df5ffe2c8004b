//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::Selectors;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site addresses
    #[serde(default)]
    pub source: SourceConfig,

    /// HTTP request profile
    #[serde(default)]
    pub transport: TransportConfig,

    /// Resource resolution behavior
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Text preprocessing settings
    #[serde(default)]
    pub cleaning: CleaningConfig,

    /// CSS selectors for every page shape
    #[serde(default)]
    pub selectors: Selectors,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.source.base_url()?;
        if self.transport.user_agent.trim().is_empty() {
            return Err(AppError::validation("transport.user_agent is empty"));
        }
        if self.transport.timeout_secs == 0 {
            return Err(AppError::validation("transport.timeout_secs must be > 0"));
        }
        if self.transport.max_body_bytes == 0 {
            return Err(AppError::validation("transport.max_body_bytes must be > 0"));
        }
        if self.resolver.max_depth == 0 {
            return Err(AppError::validation("resolver.max_depth must be > 0"));
        }
        if self.resolver.max_concurrent == 0 {
            return Err(AppError::validation("resolver.max_concurrent must be > 0"));
        }
        if self.resolver.stream_extensions.is_empty() {
            return Err(AppError::validation("resolver.stream_extensions is empty"));
        }
        if self.cleaning.update_marker.is_empty() {
            return Err(AppError::validation("cleaning.update_marker is empty"));
        }
        self.selectors.validate()
    }
}

/// Site addresses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Site root, also the base for relative hrefs
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Page carrying the weekly schedule
    #[serde(default = "defaults::schedule_path")]
    pub schedule_path: String,

    /// Filterable catalog listing
    #[serde(default = "defaults::list_path")]
    pub list_path: String,

    /// Keyword search results
    #[serde(default = "defaults::search_path")]
    pub search_path: String,
}

impl SourceConfig {
    /// Parsed site root.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Absolute URL of a path on the site.
    pub fn page_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url()?.join(path)?)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            schedule_path: defaults::schedule_path(),
            list_path: defaults::list_path(),
            search_path: defaults::search_path(),
        }
    }
}

/// HTTP request profile settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Browser identity sent with every request
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Host header, sent only to requests for this host
    #[serde(default = "defaults::host")]
    pub host: String,

    /// Declared content type
    #[serde(default = "defaults::content_type")]
    pub content_type: String,

    /// Referer sent to embed players
    #[serde(default = "defaults::referer")]
    pub referer: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Response bytes read before the rest of the body is discarded
    #[serde(default = "defaults::max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            host: defaults::host(),
            content_type: defaults::content_type(),
            referer: defaults::referer(),
            timeout_secs: defaults::timeout(),
            max_body_bytes: defaults::max_body_bytes(),
        }
    }
}

/// Resource resolution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum intermediate hops per resource
    #[serde(default = "defaults::max_depth")]
    pub max_depth: usize,

    /// Maximum resources resolved at once
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Path extensions of directly playable streams
    #[serde(default = "defaults::stream_extensions")]
    pub stream_extensions: Vec<String>,

    /// Content types of directly playable streams
    #[serde(default = "defaults::stream_content_types")]
    pub stream_content_types: Vec<String>,

    /// URL fragments identifying embed player pages
    #[serde(default = "defaults::embed_markers")]
    pub embed_markers: Vec<String>,

    /// Query keys whose value is the wrapped target URL
    #[serde(default = "defaults::wrapper_params")]
    pub wrapper_params: Vec<String>,
}

impl ResolverConfig {
    /// Whether a path ends with a stream extension.
    pub fn is_stream_path(&self, path: &str) -> bool {
        let path = path.to_ascii_lowercase();
        self.stream_extensions
            .iter()
            .any(|ext| path.ends_with(&format!(".{}", ext.to_ascii_lowercase())))
    }

    /// Whether a content type denotes a stream.
    pub fn is_stream_content_type(&self, content_type: &str) -> bool {
        let content_type = content_type.to_ascii_lowercase();
        self.stream_content_types
            .iter()
            .any(|ct| content_type.starts_with(&ct.to_ascii_lowercase()))
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: defaults::max_depth(),
            max_concurrent: defaults::max_concurrent(),
            stream_extensions: defaults::stream_extensions(),
            stream_content_types: defaults::stream_content_types(),
            embed_markers: defaults::embed_markers(),
            wrapper_params: defaults::wrapper_params(),
        }
    }
}

/// Text cleaning/preprocessing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// Substring flagging a schedule entry as currently updating
    #[serde(default = "defaults::update_marker")]
    pub update_marker: String,

    /// Field labels stripped from the front of extracted text
    #[serde(default = "defaults::label_prefixes")]
    pub label_prefixes: Vec<String>,
}

impl CleaningConfig {
    /// Collapse whitespace and strip a leading field label.
    pub fn clean_field(&self, text: &str) -> String {
        let text = Self::normalize_whitespace(text);
        let stripped = self
            .label_prefixes
            .iter()
            .find_map(|prefix| text.strip_prefix(prefix.as_str()))
            .unwrap_or(text.as_str());
        stripped.trim().to_string()
    }

    /// Split raw schedule status text into cleaned text and the updating flag.
    pub fn clean_status(&self, raw: &str) -> (String, bool) {
        let updating = raw.contains(&self.update_marker);
        let cleaned = raw.replace(&self.update_marker, "");
        (cleaned.trim().to_string(), updating)
    }

    fn normalize_whitespace(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            update_marker: defaults::update_marker(),
            label_prefixes: defaults::label_prefixes(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn base_url() -> String {
        "https://www.yhdmz.org".into()
    }
    pub fn schedule_path() -> String {
        "/".into()
    }
    pub fn list_path() -> String {
        "/list/".into()
    }
    pub fn search_path() -> String {
        "/s_all".into()
    }

    // Transport defaults
    pub fn user_agent() -> String {
        concat!(
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 ",
            "(KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36 Edg/114.0.1823.67"
        )
        .into()
    }
    pub fn host() -> String {
        "www.yhdmz.org".into()
    }
    pub fn content_type() -> String {
        "text/html; charset=utf-8".into()
    }
    pub fn referer() -> Option<String> {
        Some("https://www.yhdmz.org/".into())
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_body_bytes() -> usize {
        2 * 1024 * 1024
    }

    // Resolver defaults
    pub fn max_depth() -> usize {
        4
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn stream_extensions() -> Vec<String> {
        ["m3u8", "mp4", "flv", "webm", "mkv", "mov"]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn stream_content_types() -> Vec<String> {
        [
            "application/vnd.apple.mpegurl",
            "application/x-mpegurl",
            "audio/mpegurl",
            "video/",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn embed_markers() -> Vec<String> {
        ["/embed", "/player", "/jx/", "/share/", "player."]
            .into_iter()
            .map(String::from)
            .collect()
    }
    pub fn wrapper_params() -> Vec<String> {
        ["url", "vid", "v"].into_iter().map(String::from).collect()
    }

    // Cleaning defaults
    pub fn update_marker() -> String {
        "new".into()
    }
    pub fn label_prefixes() -> Vec<String> {
        ["类型：", "类型:", "地区：", "地区:", "上映：", "上映:", "标签：", "标签:"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    // Logging defaults
    pub fn log_level() -> String {
        "info".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.transport.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_depth() {
        let mut config = Config::default();
        config.resolver.max_depth = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_body_cap() {
        let mut config = Config::default();
        config.transport.max_body_bytes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.source.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.source.base_url, "https://www.yhdmz.org");
        assert_eq!(config.resolver.max_depth, 4);
    }

    #[test]
    fn partial_toml_overrides_one_field() {
        let config: Config = toml::from_str("[resolver]\nmax_depth = 2\n").unwrap();
        assert_eq!(config.resolver.max_depth, 2);
        assert_eq!(config.resolver.max_concurrent, 4);
    }

    #[test]
    fn clean_status_strips_marker() {
        let cleaning = CleaningConfig::default();
        assert_eq!(cleaning.clean_status(" 第12集new "), ("第12集".to_string(), true));
        assert_eq!(cleaning.clean_status("第3集"), ("第3集".to_string(), false));
    }

    #[test]
    fn clean_field_strips_label() {
        let cleaning = CleaningConfig::default();
        assert_eq!(cleaning.clean_field("类型： 搞笑  校园"), "搞笑 校园");
        assert_eq!(cleaning.clean_field("  plain\ntext "), "plain text");
    }

    #[test]
    fn stream_path_detection() {
        let resolver = ResolverConfig::default();
        assert!(resolver.is_stream_path("/video/index.M3U8"));
        assert!(!resolver.is_stream_path("/vp/123-1-0.html"));
        assert!(resolver.is_stream_content_type("application/vnd.apple.mpegurl"));
        assert!(!resolver.is_stream_content_type("text/html; charset=utf-8"));
    }
}
