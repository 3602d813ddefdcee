//! Application configuration loaded from environment variables.

use serde::Deserialize;
use url::Url;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Server Configuration ===
    /// HTTP listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret expected in the `serv` request header.
    pub serv: String,

    // === Document Store ===
    /// MongoDB connection URI.
    pub mongodb_url: String,

    // === Certificate Lookup API ===
    /// Base URL of the certificate lookup API.
    #[serde(default)]
    pub cert_api_base: Option<String>,

    /// Tab (sheet) identifier passed to the lookup API.
    #[serde(default)]
    pub cert_api_tab: Option<String>,

    /// Column searched for the certificate number.
    #[serde(default)]
    pub cert_api_search_key: Option<String>,

    /// Upstream HTTP timeout in milliseconds.
    #[serde(default = "default_http_timeout")]
    pub http_timeout_ms: u64,

    // === Frontend ===
    /// Frontend build output directory.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// SPA entry document, relative to `static_dir`.
    #[serde(default = "default_spa_index")]
    pub spa_index: String,

    // === Observability ===
    /// Start the Prometheus exporter.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_http_timeout() -> u64 {
    10_000
}

fn default_static_dir() -> String {
    "client/dist".to_string()
}

fn default_spa_index() -> String {
    "index.html".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Build a configuration with the two required values and defaults for the rest.
    pub fn new(serv: impl Into<String>, mongodb_url: impl Into<String>) -> Self {
        Self {
            port: default_port(),
            serv: serv.into(),
            mongodb_url: mongodb_url.into(),
            cert_api_base: None,
            cert_api_tab: None,
            cert_api_search_key: None,
            http_timeout_ms: default_http_timeout(),
            static_dir: default_static_dir(),
            spa_index: default_spa_index(),
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }

    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        if self.serv.is_empty() {
            return Err("SERV is required".to_string());
        }

        if self.mongodb_url.is_empty() {
            return Err("MONGODB_URL is required".to_string());
        }

        if !self.mongodb_url.starts_with("mongodb://")
            && !self.mongodb_url.starts_with("mongodb+srv://")
        {
            return Err("MONGODB_URL must start with mongodb:// or mongodb+srv://".to_string());
        }

        if let Some(base) = &self.cert_api_base {
            if Url::parse(base).is_err() {
                return Err(format!("CERT_API_BASE is not a valid URL: {}", base));
            }
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Whether all three certificate API settings are present.
    pub fn certificate_api_configured(&self) -> bool {
        self.cert_api_base.is_some()
            && self.cert_api_tab.is_some()
            && self.cert_api_search_key.is_some()
    }

    /// Path of the SPA entry document.
    pub fn spa_index_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.static_dir).join(&self.spa_index)
    }
}
