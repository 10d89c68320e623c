//! HTTP API route definitions.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{
    class_identification, debt_balance, employment_industry, global_manufacturing_2019, health,
    homeownership_rate, income_inequality, index, median_price_vs_household_income, AppState,
};
use crate::datasets::Dataset;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        // Remote datasets
        .route(
            Dataset::MedianPriceVsHouseholdIncome.path(),
            get(median_price_vs_household_income),
        )
        .route(Dataset::HomeownershipRate.path(), get(homeownership_rate))
        .route(Dataset::EmploymentIndustry.path(), get(employment_industry))
        // File-backed datasets
        .route(Dataset::DebtBalance.path(), get(debt_balance))
        .route(Dataset::IncomeInequality.path(), get(income_inequality))
        .route(Dataset::ClassIdentification.path(), get(class_identification))
        .route(
            Dataset::GlobalManufacturing2019.path(),
            get(global_manufacturing_2019),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
