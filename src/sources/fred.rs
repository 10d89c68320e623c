//! FRED (Federal Reserve Economic Data) series client.

use serde::Deserialize;
use time::macros::format_description;
use time::Date;
use tracing::{debug, instrument};
use url::Url;

use super::endpoint_url;
use crate::error::SourceError;
use crate::metrics;

const PROVIDER: &str = "fred";

/// Value FRED uses for a missing observation.
const MISSING_VALUE: &str = ".";

/// One dated observation of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    /// Observation date.
    pub date: Date,
    /// Observed value, `None` when FRED reports it missing.
    pub value: Option<f64>,
}

/// A series with its observations in date order.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// FRED series code (e.g. "MSPUS").
    pub id: String,
    /// Observations, ascending by date.
    pub observations: Vec<Observation>,
}

/// `series/observations` response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ObservationsResponse {
    /// Raw observations.
    pub observations: Vec<RawObservation>,
}

/// Observation as FRED sends it: both fields are strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    /// Date as `YYYY-MM-DD`.
    pub date: String,
    /// Value, or "." when missing.
    pub value: String,
}

/// Error body FRED returns with a 4xx status.
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error_message: String,
}

/// FRED API client.
#[derive(Debug, Clone)]
pub struct FredClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL for the FRED API.
    base_url: Url,
    /// API key.
    api_key: String,
}

impl FredClient {
    /// Create a FRED client against `base_url`.
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Result<Self, SourceError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            api_key: api_key.to_string(),
        })
    }

    /// Base URL of the API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch every observation of a series.
    #[instrument(skip(self))]
    pub async fn get_series(&self, series_id: &str) -> Result<Series, SourceError> {
        let _timer = metrics::timer_upstream(PROVIDER);
        let url = endpoint_url(&self.base_url, "series/observations")?;

        let response = self
            .http
            .get(url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(err) => SourceError::Upstream {
                    provider: PROVIDER,
                    message: err.error_message,
                },
                Err(_) => SourceError::Status {
                    provider: PROVIDER,
                    status: status.as_u16(),
                },
            });
        }

        let body: ObservationsResponse =
            response.json().await.map_err(|e| SourceError::Malformed {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        let observations = parse_observations(body)?;
        debug!(count = observations.len(), "Retrieved series observations");

        Ok(Series {
            id: series_id.to_string(),
            observations,
        })
    }
}

/// Convert raw string observations into typed ones.
pub fn parse_observations(body: ObservationsResponse) -> Result<Vec<Observation>, SourceError> {
    let format = format_description!("[year]-[month]-[day]");

    body.observations
        .into_iter()
        .map(|raw| {
            let date = Date::parse(&raw.date, &format).map_err(|e| SourceError::Malformed {
                provider: PROVIDER,
                reason: format!("bad date {:?}: {}", raw.date, e),
            })?;

            let value = if raw.value.trim() == MISSING_VALUE {
                None
            } else {
                let v: f64 = raw.value.trim().parse().map_err(|_| SourceError::Malformed {
                    provider: PROVIDER,
                    reason: format!("bad value {:?} on {}", raw.value, raw.date),
                })?;
                Some(v)
            };

            Ok(Observation { date, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn response(json: &str) -> ObservationsResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_values_and_missing_marker() {
        let body = response(
            r#"{"realtime_start":"2024-01-01","count":2,"observations":[
                {"realtime_start":"2024-01-01","date":"1963-01-01","value":"17800"},
                {"realtime_start":"2024-01-01","date":"1963-04-01","value":"."}
            ]}"#,
        );

        let observations = parse_observations(body).unwrap();
        assert_eq!(
            observations,
            vec![
                Observation {
                    date: date!(1963 - 01 - 01),
                    value: Some(17800.0)
                },
                Observation {
                    date: date!(1963 - 04 - 01),
                    value: None
                },
            ]
        );
    }

    #[test]
    fn rejects_bad_date() {
        let body = response(r#"{"observations":[{"date":"1963-13-01","value":"1"}]}"#);
        assert!(matches!(
            parse_observations(body),
            Err(SourceError::Malformed { .. })
        ));
    }

    #[test]
    fn rejects_non_numeric_value() {
        let body = response(r#"{"observations":[{"date":"1963-01-01","value":"n/a"}]}"#);
        assert!(parse_observations(body).is_err());
    }

    #[test]
    fn client_creation_works() {
        let client = FredClient::new(
            reqwest::Client::new(),
            "https://api.stlouisfed.org/fred",
            "key",
        )
        .unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.stlouisfed.org/fred");
    }
}
