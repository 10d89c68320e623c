//! HTTP API handlers.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, response::Html, response::IntoResponse, Json};
use serde::Serialize;
use strum::IntoEnumIterator;
use tracing::debug;

use crate::datasets::{
    debt, employment, housing, survey, Dataset, DebtBalanceRow, EmploymentRow,
    HomeownershipRow, HousingAffordabilityRow, LabeledTable, NumericTable,
};
use crate::error::Result;
use crate::metrics;
use crate::sources::Sources;

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Data sources.
    pub sources: Arc<Sources>,
}

impl AppState {
    /// Create new app state.
    pub fn new(sources: Sources) -> Self {
        Self {
            sources: Arc::new(sources),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Index page listing every dataset endpoint.
pub async fn index() -> Html<String> {
    Html(render_index())
}

/// Render the index page HTML.
pub fn render_index() -> String {
    let items: String = Dataset::iter()
        .map(|d| format!("                <li><a href=\"{0}\">{0}</a></li>\n", d.path()))
        .collect();

    format!(
        "<!doctype html>\n\
         <html>\n\
         \x20   <head>\n\
         \x20       <title>Economic Data API | Endpoints</title>\n\
         \x20   </head>\n\
         \x20   <body>\n\
         \x20       <h1>Endpoints:</h1>\n\
         \x20       <ul>\n\
         {items}\
         \x20       </ul>\n\
         \x20   </body>\n\
         </html>\n"
    )
}

/// Run a dataset loader, recording request metrics around it.
async fn observe<T, F>(dataset: Dataset, load: F) -> Result<Json<T>>
where
    F: Future<Output = Result<T>>,
{
    let start = Instant::now();
    metrics::inc_dataset_requests(dataset.name());

    let result = load.await;
    metrics::record_dataset_latency(start, dataset.name());

    match result {
        Ok(value) => {
            debug!(
                dataset = dataset.name(),
                remote = dataset.is_remote(),
                "Dataset built"
            );
            Ok(Json(value))
        }
        Err(e) => {
            metrics::inc_dataset_failures(dataset.name());
            Err(e)
        }
    }
}

/// Median house price joined with household income.
pub async fn median_price_vs_household_income(
    State(state): State<AppState>,
) -> Result<Json<Vec<HousingAffordabilityRow>>> {
    observe(
        Dataset::MedianPriceVsHouseholdIncome,
        housing::load_price_vs_income(&state.sources.fred),
    )
    .await
}

/// US homeownership rate.
pub async fn homeownership_rate(
    State(state): State<AppState>,
) -> Result<Json<Vec<HomeownershipRow>>> {
    observe(
        Dataset::HomeownershipRate,
        housing::load_homeownership(&state.sources.fred),
    )
    .await
}

/// Employment in industry, one column per country.
pub async fn employment_industry(
    State(state): State<AppState>,
) -> Result<Json<Vec<EmploymentRow>>> {
    observe(
        Dataset::EmploymentIndustry,
        employment::load(&state.sources.worldbank),
    )
    .await
}

/// Household debt balance by quarter.
pub async fn debt_balance(State(state): State<AppState>) -> Result<Json<Vec<DebtBalanceRow>>> {
    observe(Dataset::DebtBalance, debt::load(&state.sources.files)).await
}

/// Income inequality table.
pub async fn income_inequality(State(state): State<AppState>) -> Result<Json<LabeledTable>> {
    observe(
        Dataset::IncomeInequality,
        survey::load_income_inequality(&state.sources.files),
    )
    .await
}

/// Gallup class self-identification table.
pub async fn class_identification(State(state): State<AppState>) -> Result<Json<LabeledTable>> {
    observe(
        Dataset::ClassIdentification,
        survey::load_class_identification(&state.sources.files),
    )
    .await
}

/// Manufacturing output by country, 2019.
pub async fn global_manufacturing_2019(
    State(state): State<AppState>,
) -> Result<Json<NumericTable>> {
    observe(
        Dataset::GlobalManufacturing2019,
        survey::load_global_manufacturing(&state.sources.files),
    )
    .await
}
