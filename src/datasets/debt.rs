//! Household debt balance by quarter.
//!
//! The source file is space-delimited with no header. The first field is the
//! quarter label, followed by one balance per debt category.

use serde::Serialize;

use super::parse::{coerce_numeric, Label};
use crate::error::DatasetError;
use crate::sources::{DataFile, DataFiles, DelimitedText};

/// Debt categories, in file order.
pub const COLUMNS: [&str; 7] = [
    "Mortgage",
    "HE Revolving",
    "Auto Loan",
    "Credit Card",
    "Student Loan",
    "Other",
    "Total",
];

/// Fields per record: the label plus one per category.
const FIELDS: usize = COLUMNS.len() + 1;

/// Balances for one quarter, in trillions of dollars.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtBalanceRow {
    /// Quarter label, as text.
    #[serde(rename = "0")]
    pub quarter: String,
    /// Mortgage balance.
    #[serde(rename = "Mortgage")]
    pub mortgage: Option<f64>,
    /// Home equity revolving balance.
    #[serde(rename = "HE Revolving")]
    pub he_revolving: Option<f64>,
    /// Auto loan balance.
    #[serde(rename = "Auto Loan")]
    pub auto_loan: Option<f64>,
    /// Credit card balance.
    #[serde(rename = "Credit Card")]
    pub credit_card: Option<f64>,
    /// Student loan balance.
    #[serde(rename = "Student Loan")]
    pub student_loan: Option<f64>,
    /// Other debt balance.
    #[serde(rename = "Other")]
    pub other: Option<f64>,
    /// Total balance.
    #[serde(rename = "Total")]
    pub total: Option<f64>,
}

/// Build one row per record. Short records are padded with missing values.
pub fn rows(text: &DelimitedText) -> Result<Vec<DebtBalanceRow>, DatasetError> {
    for (row, record) in text.records.iter().enumerate() {
        if record.len() > FIELDS {
            return Err(DatasetError::FieldCount {
                row,
                expected: FIELDS,
                found: record.len(),
            });
        }
    }

    let labels = Label::infer_column(
        text.records
            .iter()
            .map(|r| r.first().map(String::as_str).unwrap_or_default()),
    );

    Ok(text
        .records
        .iter()
        .zip(labels)
        .map(|(record, label)| {
            let value = |i: usize| record.get(i).and_then(|cell| coerce_numeric(cell));
            DebtBalanceRow {
                quarter: label.to_string(),
                mortgage: value(1),
                he_revolving: value(2),
                auto_loan: value(3),
                credit_card: value(4),
                student_loan: value(5),
                other: value(6),
                total: value(7),
            }
        })
        .collect())
}

/// Read the debt report and build its rows.
pub async fn load(files: &DataFiles) -> crate::Result<Vec<DebtBalanceRow>> {
    let text = files.load(DataFile::HouseholdDebt).await?;
    Ok(rows(&text)?)
}
