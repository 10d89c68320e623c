//! World Bank indicators API client.

use serde::Deserialize;
use serde_json::Value;
use time::Date;
use tracing::{debug, instrument};
use url::Url;

use super::endpoint_url;
use crate::error::SourceError;
use crate::metrics;

const PROVIDER: &str = "worldbank";

/// Records requested per page.
const PER_PAGE: u32 = 1000;

/// An indicator over a set of countries and a date range.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorQuery<'a> {
    /// Indicator code (e.g. "SL.IND.EMPL.ZS").
    pub indicator: &'a str,
    /// ISO2 country codes.
    pub countries: &'a [&'a str],
    /// First date of the range, inclusive.
    pub start: Date,
    /// Last date of the range, inclusive.
    pub end: Date,
}

impl IndicatorQuery<'_> {
    /// The `date` query parameter: a yearly range.
    pub fn date_param(&self) -> String {
        format!("{}:{}", self.start.year(), self.end.year())
    }

    /// Path below the API base.
    pub fn path(&self) -> String {
        format!(
            "country/{}/indicator/{}",
            self.countries.join(";"),
            self.indicator
        )
    }

    /// Whether a record's date falls inside the range.
    pub fn contains_date(&self, date: &str) -> bool {
        match date.get(..4).and_then(|year| year.parse::<i32>().ok()) {
            Some(year) => year >= self.start.year() && year <= self.end.year(),
            None => false,
        }
    }
}

/// One (country, date) value of an indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    /// ISO2 country code.
    pub country: String,
    /// Date as the API reports it (e.g. "2019").
    pub date: String,
    /// Value, `None` when the API has no data.
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRecord {
    country: RawRef,
    date: String,
    value: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRef {
    id: String,
}

/// A decoded response page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Current page number.
    pub page: u64,
    /// Total page count.
    pub pages: u64,
    /// Records on this page.
    pub records: Vec<IndicatorRecord>,
}

/// World Bank API client.
#[derive(Debug, Clone)]
pub struct WorldBankClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Base URL for the indicators API.
    base_url: Url,
}

impl WorldBankClient {
    /// Create a World Bank client against `base_url`.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, SourceError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
        })
    }

    /// Base URL of the API.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetch every record of an indicator query, following upstream pages.
    #[instrument(skip(self), fields(indicator = %query.indicator))]
    pub async fn get_indicator(
        &self,
        query: &IndicatorQuery<'_>,
    ) -> Result<Vec<IndicatorRecord>, SourceError> {
        let _timer = metrics::timer_upstream(PROVIDER);
        let url = endpoint_url(&self.base_url, &query.path())?;
        let date = query.date_param();
        let per_page = PER_PAGE.to_string();

        let mut records = Vec::new();
        let mut page_number: u64 = 1;

        loop {
            let page_param = page_number.to_string();
            let response = self
                .http
                .get(url.clone())
                .query(&[
                    ("format", "json"),
                    ("date", date.as_str()),
                    ("per_page", per_page.as_str()),
                    ("page", page_param.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(SourceError::Status {
                    provider: PROVIDER,
                    status: response.status().as_u16(),
                });
            }

            let body: Value = response.json().await.map_err(|e| SourceError::Malformed {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

            let page = parse_page(body)?;
            debug!(
                page = page.page,
                pages = page.pages,
                count = page.records.len(),
                "Retrieved indicator page"
            );

            records.extend(
                page.records
                    .into_iter()
                    .filter(|r| query.countries.contains(&r.country.as_str()))
                    .filter(|r| query.contains_date(&r.date)),
            );

            if page_number >= page.pages {
                break;
            }
            page_number += 1;
        }

        Ok(records)
    }
}

/// Decode one `[meta, records]` response page.
pub fn parse_page(body: Value) -> Result<Page, SourceError> {
    let malformed = |reason: &str| SourceError::Malformed {
        provider: PROVIDER,
        reason: reason.to_string(),
    };

    let parts = body.as_array().ok_or_else(|| malformed("expected a JSON array"))?;
    let meta = parts.first().ok_or_else(|| malformed("empty response"))?;

    if let Some(message) = meta.get("message") {
        return Err(SourceError::Upstream {
            provider: PROVIDER,
            message: upstream_message(message),
        });
    }

    let page = count_field(meta, "page").ok_or_else(|| malformed("missing page"))?;
    let pages = count_field(meta, "pages").ok_or_else(|| malformed("missing pages"))?;

    let records = match parts.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(data) => {
            let raw: Vec<RawRecord> = serde_json::from_value(data.clone())
                .map_err(|e| malformed(&format!("bad records: {}", e)))?;
            raw.into_iter()
                .map(|r| IndicatorRecord {
                    country: r.country.id,
                    date: r.date,
                    value: r.value,
                })
                .collect()
        }
    };

    Ok(Page {
        page,
        pages,
        records,
    })
}

/// Read a page counter that may be sent as a number or a string.
fn count_field(meta: &Value, key: &str) -> Option<u64> {
    match meta.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Flatten the API's `message` field into text.
fn upstream_message(message: &Value) -> String {
    match message {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.get("value")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}
