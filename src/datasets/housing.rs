//! US housing datasets built from FRED series.

use std::collections::HashMap;

use serde::Serialize;
use time::Date;

use crate::sources::{FredClient, Series};

/// A FRED series code and the title its values are published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesSpec {
    /// FRED series code.
    pub id: &'static str,
    /// Human-readable title, used as the JSON field name.
    pub title: &'static str,
}

/// Median sales price of houses sold (quarterly).
pub const MEDIAN_SALES_PRICE: SeriesSpec = SeriesSpec {
    id: "MSPUS",
    title: "Median Sales Price of Houses Sold for the United States",
};

/// Real median household income (annual).
pub const REAL_MEDIAN_HOUSEHOLD_INCOME: SeriesSpec = SeriesSpec {
    id: "MEHOINUSA672N",
    title: "Real Median Household Income in the United States",
};

/// Homeownership rate (quarterly).
pub const HOMEOWNERSHIP_RATE: SeriesSpec = SeriesSpec {
    id: "RHORUSQ156N",
    title: "Homeownership Rate in the United States",
};

/// House price and household income observed on the same date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingAffordabilityRow {
    /// Observation date as `YYYY-MM-DD`.
    pub index: String,
    /// Median sales price of houses sold.
    #[serde(rename = "Median Sales Price of Houses Sold for the United States")]
    pub median_sales_price: Option<f64>,
    /// Real median household income.
    #[serde(rename = "Real Median Household Income in the United States")]
    pub real_median_household_income: Option<f64>,
}

/// One homeownership rate observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HomeownershipRow {
    /// Observation date as `YYYY-MM-DD`.
    pub index: String,
    /// Homeownership rate in percent.
    #[serde(rename = "Homeownership Rate in the United States")]
    pub homeownership_rate: Option<f64>,
}

/// Inner-join house prices with household income on observation date.
///
/// Rows follow the order of `price`. A date missing from either series is dropped.
pub fn join_price_and_income(price: &Series, income: &Series) -> Vec<HousingAffordabilityRow> {
    let income_by_date: HashMap<Date, Option<f64>> = income
        .observations
        .iter()
        .map(|o| (o.date, o.value))
        .collect();

    price
        .observations
        .iter()
        .filter_map(|o| {
            income_by_date
                .get(&o.date)
                .map(|income| HousingAffordabilityRow {
                    index: o.date.to_string(),
                    median_sales_price: o.value,
                    real_median_household_income: *income,
                })
        })
        .collect()
}

/// One row per homeownership observation.
pub fn homeownership_rows(series: &Series) -> Vec<HomeownershipRow> {
    series
        .observations
        .iter()
        .map(|o| HomeownershipRow {
            index: o.date.to_string(),
            homeownership_rate: o.value,
        })
        .collect()
}

/// Fetch both series concurrently and join them.
pub async fn load_price_vs_income(
    fred: &FredClient,
) -> crate::Result<Vec<HousingAffordabilityRow>> {
    let (price, income) = tokio::try_join!(
        fred.get_series(MEDIAN_SALES_PRICE.id),
        fred.get_series(REAL_MEDIAN_HOUSEHOLD_INCOME.id),
    )?;
    Ok(join_price_and_income(&price, &income))
}

/// Fetch the homeownership rate series.
pub async fn load_homeownership(fred: &FredClient) -> crate::Result<Vec<HomeownershipRow>> {
    let series = fred.get_series(HOMEOWNERSHIP_RATE.id).await?;
    Ok(homeownership_rows(&series))
}
