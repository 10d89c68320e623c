//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Result;

/// Filter used when verbose logging is requested.
pub const VERBOSE_LOG_FILTER: &str = "econ_data_api=debug,info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === FRED Credentials ===
    /// FRED API key, read from `API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Fallback FRED API key, read from `FRED_API_KEY`.
    #[serde(default)]
    pub fred_api_key: Option<String>,

    // === Upstream Providers ===
    /// FRED API base URL.
    #[serde(default = "default_fred_url")]
    pub fred_api_url: String,

    /// World Bank API base URL.
    #[serde(default = "default_worldbank_url")]
    pub worldbank_api_url: String,

    /// Outbound HTTP request timeout in milliseconds.
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,

    // === Local Data ===
    /// Directory holding the static delimited-text datasets.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    // === Server Configuration ===
    /// Address the HTTP server binds to.
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Tracing filter directives, read from `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging, read from `VERBOSE`.
    #[serde(default)]
    pub verbose: bool,

    // === Metrics ===
    /// Serve Prometheus metrics.
    #[serde(default)]
    pub metrics_enabled: bool,

    /// Prometheus exporter port.
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

fn default_fred_url() -> String {
    "https://api.stlouisfed.org/fred".to_string()
}

fn default_worldbank_url() -> String {
    "https://api.worldbank.org/v2".to_string()
}

fn default_http_timeout_ms() -> u64 {
    30_000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("csv_files")
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_port() -> u16 {
    9090
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Configuration with every default applied and the given FRED key.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            fred_api_key: None,
            fred_api_url: default_fred_url(),
            worldbank_api_url: default_worldbank_url(),
            http_timeout_ms: default_http_timeout_ms(),
            data_dir: default_data_dir(),
            host: default_host(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            metrics_enabled: false,
            metrics_port: default_metrics_port(),
        }
    }

    /// The FRED API key, preferring `API_KEY` over `FRED_API_KEY`.
    pub fn fred_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .or(self.fred_api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.fred_key().is_none() {
            return Err("API_KEY (or FRED_API_KEY) is required".to_string());
        }

        if let Err(e) = url::Url::parse(&self.fred_api_url) {
            return Err(format!("FRED_API_URL is not a valid URL: {}", e));
        }

        if let Err(e) = url::Url::parse(&self.worldbank_api_url) {
            return Err(format!("WORLDBANK_API_URL is not a valid URL: {}", e));
        }

        if self.http_timeout_ms == 0 {
            return Err("HTTP_TIMEOUT_MS must be greater than 0".to_string());
        }

        if self.metrics_enabled && self.metrics_port == self.port {
            return Err("METRICS_PORT must differ from PORT".to_string());
        }

        Ok(())
    }

    /// Tracing filter directives, with verbose mode taking precedence.
    pub fn log_filter(&self, verbose: bool) -> String {
        if verbose || self.verbose {
            VERBOSE_LOG_FILTER.to_string()
        } else {
            self.rust_log.clone()
        }
    }

    /// Socket address string the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
