//! Employment in industry across a fixed set of countries.

use std::collections::{BTreeMap, HashSet};

use serde::ser::{Serialize, SerializeMap, Serializer};
use time::macros::date;
use time::Date;

use crate::error::DatasetError;
use crate::sources::{IndicatorQuery, IndicatorRecord, WorldBankClient};

/// Employment in industry (% of total employment), modeled ILO estimate.
pub const INDICATOR: &str = "SL.IND.EMPL.ZS";

/// Countries reported, as ISO2 codes. Output columns follow this order.
pub const COUNTRIES: [&str; 8] = ["US", "GB", "JP", "DE", "CN", "VN", "IT", "FR"];

/// First date of the reported range.
pub const START: Date = date!(1991 - 01 - 01);

/// Last date of the reported range.
pub const END: Date = date!(2021 - 01 - 01);

/// The indicator query this dataset is built from.
pub fn query() -> IndicatorQuery<'static> {
    IndicatorQuery {
        indicator: INDICATOR,
        countries: &COUNTRIES,
        start: START,
        end: END,
    }
}

/// One date with a value slot per country.
#[derive(Debug, Clone, PartialEq)]
pub struct EmploymentRow {
    /// Date as reported upstream (a year).
    pub date: String,
    /// Values in [`COUNTRIES`] order.
    pub values: [Option<f64>; COUNTRIES.len()],
}

impl Serialize for EmploymentRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COUNTRIES.len() + 1))?;
        map.serialize_entry("date", &self.date)?;
        for (country, value) in COUNTRIES.iter().zip(self.values.iter()) {
            map.serialize_entry(country, value)?;
        }
        map.end()
    }
}

/// Reshape long records into one row per date, ascending.
///
/// Records for countries outside [`COUNTRIES`] are ignored. A repeated
/// (country, date) pair is an error.
pub fn pivot(records: &[IndicatorRecord]) -> Result<Vec<EmploymentRow>, DatasetError> {
    let mut by_date: BTreeMap<&str, [Option<f64>; COUNTRIES.len()]> = BTreeMap::new();
    let mut seen = HashSet::new();

    for record in records {
        let Some(slot) = COUNTRIES.iter().position(|c| *c == record.country) else {
            continue;
        };

        if !seen.insert((record.date.as_str(), slot)) {
            return Err(DatasetError::Duplicate {
                key: format!("{}/{}", record.country, record.date),
            });
        }

        by_date.entry(record.date.as_str()).or_insert([None; COUNTRIES.len()])[slot] = record.value;
    }

    Ok(by_date
        .into_iter()
        .map(|(date, values)| EmploymentRow {
            date: date.to_string(),
            values,
        })
        .collect())
}

/// Fetch the indicator and pivot it.
pub async fn load(worldbank: &WorldBankClient) -> crate::Result<Vec<EmploymentRow>> {
    let records = worldbank.get_indicator(&query()).await?;
    Ok(pivot(&records)?)
}
