//! Tables whose columns come from the file header.
//!
//! Three datasets share this shape: income inequality, Gallup class
//! self-identification and 2019 manufacturing output. The first two carry a
//! row-label column; the last is purely numeric.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use super::parse::{coerce_numeric, normalize_headers, parse_percent, CellError, Label};
use crate::error::DatasetError;
use crate::sources::{DataFile, DataFiles, DelimitedText};

/// Name given to a label column whose header cell is empty.
const DEFAULT_LABEL_COLUMN: &str = "index";

/// One labeled record.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    /// Row label, typed for the whole column.
    pub label: Label,
    /// Values, one per value column.
    pub values: Vec<Option<f64>>,
}

/// A table with a row-label column followed by numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable {
    /// Name of the label column.
    pub label_column: String,
    /// Names of the value columns, in file order.
    pub columns: Vec<String>,
    /// Records, in file order.
    pub rows: Vec<LabeledRow>,
}

/// A table of numeric columns only.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    /// Column names, in file order.
    pub columns: Vec<String>,
    /// Records, in file order.
    pub rows: Vec<Vec<Option<f64>>>,
}

/// Split off the header and pad every record to the header width.
fn widen(text: &DelimitedText) -> Result<(&[String], Vec<Vec<&str>>), DatasetError> {
    let headers = text.headers.as_deref().ok_or(DatasetError::MissingHeader)?;
    let width = headers.len();

    text.records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            if record.len() > width {
                return Err(DatasetError::FieldCount {
                    row,
                    expected: width,
                    found: record.len(),
                });
            }
            let mut cells: Vec<&str> = record.iter().map(String::as_str).collect();
            cells.resize(width, "");
            Ok(cells)
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|records| (headers, records))
}

/// Build a labeled table, parsing value cells with `parse_cell`.
pub fn labeled_table<F>(
    text: &DelimitedText,
    parse_cell: F,
) -> Result<LabeledTable, DatasetError>
where
    F: Fn(&str) -> Result<Option<f64>, CellError>,
{
    let (headers, records) = widen(text)?;
    if headers.is_empty() {
        return Err(DatasetError::MissingHeader);
    }

    let label_column = match headers[0].as_str() {
        "" => DEFAULT_LABEL_COLUMN.to_string(),
        name => name.to_string(),
    };
    let columns: Vec<String> = normalize_headers(headers.iter().map(String::as_str))
        .into_iter()
        .skip(1)
        .collect();

    let labels = Label::infer_column(records.iter().map(|cells| cells[0]));

    let rows = records
        .iter()
        .zip(labels)
        .enumerate()
        .map(|(row, (cells, label))| -> Result<LabeledRow, DatasetError> {
            let values = cells[1..]
                .iter()
                .zip(&columns)
                .map(|(cell, column)| {
                    parse_cell(*cell).map_err(|e| DatasetError::InvalidCell {
                        column: column.clone(),
                        row,
                        value: e.value,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(LabeledRow { label, values })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LabeledTable {
        label_column,
        columns,
        rows,
    })
}

/// Build a table where every column is coerced to numbers.
pub fn numeric_table(text: &DelimitedText) -> Result<NumericTable, DatasetError> {
    let (headers, records) = widen(text)?;
    let columns = normalize_headers(headers.iter().map(String::as_str));

    let rows = records
        .iter()
        .map(|cells| cells.iter().map(|cell| coerce_numeric(cell)).collect())
        .collect();

    Ok(NumericTable { columns, rows })
}

/// Percent-formatted cells become floats; unparseable cells are an error.
pub fn income_inequality(text: &DelimitedText) -> Result<LabeledTable, DatasetError> {
    labeled_table(text, parse_percent)
}

/// Value cells are coerced to numbers; unparseable cells become null.
pub fn class_identification(text: &DelimitedText) -> Result<LabeledTable, DatasetError> {
    labeled_table(text, |cell| Ok(coerce_numeric(cell)))
}

/// Read and build the income inequality table.
pub async fn load_income_inequality(files: &DataFiles) -> crate::Result<LabeledTable> {
    let text = files.load(DataFile::IncomeInequality).await?;
    Ok(income_inequality(&text)?)
}

/// Read and build the class identification table.
pub async fn load_class_identification(files: &DataFiles) -> crate::Result<LabeledTable> {
    let text = files.load(DataFile::ClassIdentification).await?;
    Ok(class_identification(&text)?)
}

/// Read and build the 2019 manufacturing output table.
pub async fn load_global_manufacturing(files: &DataFiles) -> crate::Result<NumericTable> {
    let text = files.load(DataFile::GlobalManufacturing2019).await?;
    Ok(numeric_table(&text)?)
}

struct LabeledRecord<'a> {
    table: &'a LabeledTable,
    row: &'a LabeledRow,
}

impl Serialize for LabeledRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.table.columns.len() + 1))?;
        map.serialize_entry(&self.table.label_column, &self.row.label)?;
        for (column, value) in self.table.columns.iter().zip(&self.row.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl Serialize for LabeledTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&LabeledRecord { table: self, row })?;
        }
        seq.end()
    }
}

struct NumericRecord<'a> {
    columns: &'a [String],
    values: &'a [Option<f64>],
}

impl Serialize for NumericRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (column, value) in self.columns.iter().zip(self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

impl Serialize for NumericTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for values in &self.rows {
            seq.serialize_element(&NumericRecord {
                columns: &self.columns,
                values,
            })?;
        }
        seq.end()
    }
}
