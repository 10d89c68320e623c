//! Integration tests for the economic data API.
//!
//! The router is driven in-process. FRED and the World Bank are replaced by a
//! local axum stub serving fixtures from `tests/fixtures/`, and the file-backed
//! datasets read `tests/fixtures/data/`.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{Path, Query};
use axum::http::{header, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use econ_data_api::api::{create_router, AppState};
use econ_data_api::config::Config;
use econ_data_api::datasets::Dataset;
use econ_data_api::sources::Sources;

const API_KEY: &str = "test-key";

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture_response(name: &str) -> Response {
    match std::fs::read_to_string(fixtures_dir().join(name)) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Stand-in for `series/observations`.
async fn fred_observations(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("api_key").map(String::as_str) != Some(API_KEY) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error_code": 400,
                "error_message": "Bad Request.  The value for variable api_key is not registered."
            })),
        )
            .into_response();
    }

    match params.get("series_id") {
        Some(id) => fixture_response(&format!("fred_{}.json", id)),
        None => StatusCode::BAD_REQUEST.into_response(),
    }
}

/// Stand-in for `country/{countries}/indicator/{indicator}`.
async fn worldbank_indicator(
    Path((countries, indicator)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let expected_countries = "US;GB;JP;DE;CN;VN;IT;FR";
    if countries != expected_countries
        || indicator != "SL.IND.EMPL.ZS"
        || params.get("date").map(String::as_str) != Some("1991:2021")
        || params.get("format").map(String::as_str) != Some("json")
    {
        return Json(json!([{"message": [{"id": "120", "key": "Invalid value", "value": "The provided parameter value is not valid"}]}]))
            .into_response();
    }

    let page = params.get("page").map(String::as_str).unwrap_or("1");
    fixture_response(&format!("worldbank_page{}.json", page))
}

/// Spawn the upstream stub and return its address.
async fn spawn_upstream() -> SocketAddr {
    let app = Router::new()
        .route("/fred/series/observations", get(fred_observations))
        .route(
            "/v2/country/:countries/indicator/:indicator",
            get(worldbank_indicator),
        );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn test_config() -> Config {
    let upstream = spawn_upstream().await;
    let mut config = Config::with_api_key(API_KEY);
    config.fred_api_url = format!("http://{}/fred", upstream);
    config.worldbank_api_url = format!("http://{}/v2", upstream);
    config.data_dir = fixtures_dir().join("data");
    config.http_timeout_ms = 5_000;
    config
}

async fn test_app() -> Router {
    let config = test_config().await;
    create_router(AppState::new(Sources::from_config(&config).unwrap()))
}

async fn get_raw(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get_raw(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn field_names(row: &Value) -> Vec<String> {
    let mut names: Vec<String> = row.as_object().unwrap().keys().cloned().collect();
    names.sort();
    names
}

#[tokio::test]
async fn price_and_income_are_joined_on_shared_dates() {
    let (status, body) = get_json(test_app().await, Dataset::MedianPriceVsHouseholdIncome.path()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"index": "2019-01-01",
             "Median Sales Price of Houses Sold for the United States": 313000.0,
             "Real Median Household Income in the United States": 78250.0},
            {"index": "2020-01-01",
             "Median Sales Price of Houses Sold for the United States": 329000.0,
             "Real Median Household Income in the United States": 76660.0},
            {"index": "2021-01-01",
             "Median Sales Price of Houses Sold for the United States": 369800.0,
             "Real Median Household Income in the United States": null}
        ])
    );
}

#[tokio::test]
async fn homeownership_has_one_row_per_observation() {
    let (status, body) = get_json(test_app().await, Dataset::HomeownershipRate.path()).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|r| r["index"].is_string()));
    assert_eq!(rows[0]["index"], "2022-01-01");
    assert_eq!(rows[0]["Homeownership Rate in the United States"], 65.4);
    assert_eq!(rows[4]["Homeownership Rate in the United States"], Value::Null);
}

#[tokio::test]
async fn employment_is_pivoted_across_pages() {
    let (status, body) = get_json(test_app().await, Dataset::EmploymentIndustry.path()).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    let dates: Vec<&str> = rows.iter().map(|r| r["date"].as_str().unwrap()).collect();
    // 1990 is outside the requested range and BR was not requested.
    assert_eq!(dates, vec!["1991", "2020", "2021"]);

    for row in rows {
        assert_eq!(
            field_names(row),
            vec!["CN", "DE", "FR", "GB", "IT", "JP", "US", "VN", "date"]
        );
    }

    assert!(rows.iter().all(|r| r.get("BR").is_none()));
    assert_eq!(rows[0]["VN"], 11.0);
    assert_eq!(rows[0]["US"], Value::Null);
    assert_eq!(rows[1]["US"], 19.7);
    assert_eq!(rows[1]["GB"], Value::Null);
    assert_eq!(rows[1]["FR"], 19.8);
    assert_eq!(rows[2]["GB"], 17.7);
    assert_eq!(rows[2]["VN"], 33.1);
}

#[tokio::test]
async fn debt_balance_rows_use_fixed_columns() {
    let (status, body) = get_json(test_app().await, Dataset::DebtBalance.path()).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[2],
        json!({"0": "23:Q2", "Mortgage": 12.01, "HE Revolving": 0.34, "Auto Loan": 1.58,
               "Credit Card": 0.99, "Student Loan": 1.57, "Other": 0.54, "Total": 17.06})
    );
}

#[tokio::test]
async fn income_inequality_strips_percent_signs() {
    let (status, body) = get_json(test_app().await, Dataset::IncomeInequality.path()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"Group": "Top 10%", "1980": 34.2, "2000": 43.9, "2020": 45.5},
            {"Group": "Bottom 50%", "1980": 19.9, "2000": 14.7, "2020": 12.5},
            {"Group": "Middle 40%", "1980": 45.9, "2000": null, "2020": 42.0}
        ])
    );
}

#[tokio::test]
async fn class_identification_coerces_invalid_cells_to_null() {
    let (status, body) = get_json(test_app().await, Dataset::ClassIdentification.path()).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["Year"], 2002);
    assert_eq!(rows[1]["Middle"], Value::Null);
    assert_eq!(rows[2]["Lower"], Value::Null);
    assert_eq!(rows[2]["Working"], 40.0);
}

#[tokio::test]
async fn global_manufacturing_coerces_every_column() {
    let (status, body) = get_json(test_app().await, Dataset::GlobalManufacturing2019.path()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body[0],
        json!({"Country": null, "Output (USD trillions)": 3.87, "Share of world (%)": 28.7})
    );
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn file_backed_datasets_are_byte_identical_across_calls() {
    let app = test_app().await;
    for dataset in [
        Dataset::DebtBalance,
        Dataset::IncomeInequality,
        Dataset::ClassIdentification,
        Dataset::GlobalManufacturing2019,
    ] {
        let (_, first) = get_raw(app.clone(), dataset.path()).await;
        let (_, second) = get_raw(app.clone(), dataset.path()).await;
        assert_eq!(first, second, "{} changed between calls", dataset);
    }
}

#[tokio::test]
async fn http_body_matches_cli_rendering() {
    let config = test_config().await;
    let sources = Sources::from_config(&config).unwrap();
    let app = create_router(AppState::new(sources.clone()));

    let (_, body) = get_raw(app, Dataset::DebtBalance.path()).await;
    let rendered = Dataset::DebtBalance.to_json(&sources).await.unwrap();
    assert_eq!(String::from_utf8(body).unwrap(), rendered);
}

#[tokio::test]
async fn rejected_api_key_returns_generic_500() {
    let mut config = test_config().await;
    config.api_key = Some("wrong-key".to_string());
    let app = create_router(AppState::new(Sources::from_config(&config).unwrap()));

    let (status, body) = get_json(app, Dataset::HomeownershipRate.path()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal server error"}));
}

#[tokio::test]
async fn unreachable_upstream_returns_500() {
    let mut config = test_config().await;
    config.worldbank_api_url = "http://127.0.0.1:9/v2".to_string();
    let app = create_router(AppState::new(Sources::from_config(&config).unwrap()));

    let (status, _) = get_raw(app, Dataset::EmploymentIndustry.path()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn malformed_percent_cell_returns_500() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("income_inequality.csv"),
        "Group,2019\nTop 1%,not a number\n",
    )
    .unwrap();

    let mut config = test_config().await;
    config.data_dir = dir.path().to_path_buf();
    let app = create_router(AppState::new(Sources::from_config(&config).unwrap()));

    let (status, body) = get_json(app, Dataset::IncomeInequality.path()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "internal server error"}));
}
