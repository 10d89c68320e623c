//! Raw data sources.
//!
//! This module handles:
//! - FRED series observations
//! - World Bank indicator records
//! - Static delimited-text files on disk

pub mod files;
pub mod fred;
pub mod worldbank;

use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::error::SourceError;

pub use files::{DataFile, DataFiles, DelimitedText};
pub use fred::{FredClient, Observation, Series};
pub use worldbank::{IndicatorQuery, IndicatorRecord, WorldBankClient};

/// Every source a dataset can draw from.
#[derive(Debug, Clone)]
pub struct Sources {
    /// FRED client.
    pub fred: FredClient,
    /// World Bank client.
    pub worldbank: WorldBankClient,
    /// Local data files.
    pub files: DataFiles,
}

impl Sources {
    /// Build every source from config, sharing one HTTP connection pool.
    pub fn from_config(config: &Config) -> Result<Self, SourceError> {
        let http = http_client(config)?;
        let api_key = config.fred_key().unwrap_or_default();

        let sources = Self {
            fred: FredClient::new(http.clone(), &config.fred_api_url, api_key)?,
            worldbank: WorldBankClient::new(http, &config.worldbank_api_url)?,
            files: DataFiles::new(config.data_dir.clone()),
        };

        debug!(
            fred = %sources.fred.base_url(),
            worldbank = %sources.worldbank.base_url(),
            data_dir = %sources.files.dir().display(),
            "Sources configured"
        );

        Ok(sources)
    }
}

/// Build the shared outbound HTTP client.
pub fn http_client(config: &Config) -> Result<reqwest::Client, SourceError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.http_timeout_ms))
        .connect_timeout(Duration::from_secs(5))
        // Keep idle connections for reuse across requests
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(concat!("econ-data-api/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Append `path` to a base URL, keeping any path the base already has.
pub(crate) fn endpoint_url(base: &Url, path: &str) -> Result<Url, SourceError> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Ok(Url::parse(&joined)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_url_keeps_base_path() {
        let base = Url::parse("https://api.stlouisfed.org/fred").unwrap();
        let url = endpoint_url(&base, "series/observations").unwrap();
        assert_eq!(url.as_str(), "https://api.stlouisfed.org/fred/series/observations");

        let base = Url::parse("http://127.0.0.1:8000/v2/").unwrap();
        let url = endpoint_url(&base, "/country/US;GB").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/v2/country/US;GB");
    }

    #[test]
    fn sources_build_from_config() {
        let mut config = Config::with_api_key("key");
        config.data_dir = "fixtures".into();
        let sources = Sources::from_config(&config).unwrap();
        assert_eq!(sources.files.dir(), std::path::Path::new("fixtures"));
    }
}
