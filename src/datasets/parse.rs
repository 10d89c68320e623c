//! Cell-level parsing shared by every dataset.
//!
//! Delimited files arrive as untyped text. These helpers turn cells into
//! numbers or an explicit missing marker, infer the type of a row-label
//! column, and give header cells stable, unique names.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Serialize, Serializer};

/// Cell texts that denote a missing value.
const NA_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "#N/A", "#NA",
    "<NA>", "1.#IND", "1.#QNAN", "-1.#IND", "-1.#QNAN", "#N/A N/A",
];

/// Whether the cell denotes a missing value.
pub fn is_na(cell: &str) -> bool {
    NA_TOKENS.contains(&cell.trim())
}

/// Parse a cell as a number, mapping anything unparseable to `None`.
pub fn coerce_numeric(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if is_na(cell) {
        return None;
    }
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Why a cell was rejected by a strict parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellError {
    /// The offending cell text.
    pub value: String,
}

/// Strip every `%` from the cell and parse the remainder as a number.
///
/// Missing cells are `Ok(None)`. Any other text that does not parse is an error.
pub fn parse_percent(cell: &str) -> Result<Option<f64>, CellError> {
    if is_na(cell) {
        return Ok(None);
    }
    let stripped = cell.replace('%', "");
    let stripped = stripped.trim();
    if is_na(stripped) {
        return Ok(None);
    }
    match stripped.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Ok(None),
        Err(_) => Err(CellError {
            value: cell.to_string(),
        }),
    }
}

/// A row label with the type inferred for its whole column.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    /// Every label in the column is an integer.
    Integer(i64),
    /// Every label in the column is a number.
    Float(f64),
    /// Text label, or missing.
    Text(Option<String>),
}

impl Label {
    /// Type a whole label column: integers, else numbers, else text.
    ///
    /// Numeric labels ignore surrounding whitespace; text labels keep it.
    pub fn infer_column<'a, I>(cells: I) -> Vec<Label>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let cells: Vec<&str> = cells.into_iter().collect();
        let present = || cells.iter().map(|c| c.trim()).filter(|c| !is_na(c));

        if present().all(|c| c.parse::<i64>().is_ok()) && !cells.iter().any(|c| is_na(c)) {
            return cells
                .iter()
                .filter_map(|c| c.trim().parse().ok())
                .map(Label::Integer)
                .collect();
        }

        if present().all(|c| c.parse::<f64>().is_ok()) && present().next().is_some() {
            return cells
                .iter()
                .map(|c| match coerce_numeric(c) {
                    Some(v) => Label::Float(v),
                    None => Label::Text(None),
                })
                .collect();
        }

        cells
            .iter()
            .map(|c| {
                if is_na(c) {
                    Label::Text(None)
                } else {
                    Label::Text(Some(c.to_string()))
                }
            })
            .collect()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Integer(v) => write!(f, "{}", v),
            Label::Float(v) if v.fract() == 0.0 => write!(f, "{:.1}", v),
            Label::Float(v) => write!(f, "{}", v),
            Label::Text(Some(s)) => f.write_str(s),
            Label::Text(None) => f.write_str("nan"),
        }
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Label::Integer(v) => serializer.serialize_i64(*v),
            Label::Float(v) => serializer.serialize_f64(*v),
            Label::Text(Some(s)) => serializer.serialize_str(s),
            Label::Text(None) => serializer.serialize_none(),
        }
    }
}

/// Give every header cell a unique, non-empty name.
///
/// An empty cell at position `i` becomes `Unnamed: i`. A repeated name gets a
/// `.1`, `.2`, ... suffix in order of appearance.
pub fn normalize_headers<'a, I>(cells: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut used: HashSet<String> = HashSet::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();

    for (i, cell) in cells.into_iter().enumerate() {
        let base = if cell.is_empty() {
            format!("Unnamed: {}", i)
        } else {
            cell.to_string()
        };

        let mut name = base.clone();
        if used.contains(&name) {
            let count = counts.entry(base.clone()).or_insert(0);
            loop {
                *count += 1;
                name = format!("{}.{}", base, count);
                if !used.contains(&name) {
                    break;
                }
            }
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn coerce_numeric_handles_numbers_and_garbage() {
        assert_eq!(coerce_numeric("12.5"), Some(12.5));
        assert_eq!(coerce_numeric(" 7 "), Some(7.0));
        assert_eq!(coerce_numeric("-3e2"), Some(-300.0));
        assert_eq!(coerce_numeric(""), None);
        assert_eq!(coerce_numeric("NA"), None);
        assert_eq!(coerce_numeric("1,234"), None);
        assert_eq!(coerce_numeric("Working class"), None);
        assert_eq!(coerce_numeric("inf"), None);
    }

    #[test]
    fn parse_percent_strips_sign() {
        assert_eq!(parse_percent("12.5%"), Ok(Some(12.5)));
        assert_eq!(parse_percent(" 40 % "), Ok(Some(40.0)));
        assert_eq!(parse_percent("3.2"), Ok(Some(3.2)));
    }

    #[test]
    fn parse_percent_treats_missing_as_none() {
        assert_eq!(parse_percent(""), Ok(None));
        assert_eq!(parse_percent("NaN"), Ok(None));
        assert_eq!(parse_percent("%"), Ok(None));
    }

    #[test]
    fn parse_percent_rejects_text() {
        assert_eq!(
            parse_percent("n.a.%"),
            Err(CellError {
                value: "n.a.%".to_string()
            })
        );
    }

    #[test]
    fn label_column_of_integers() {
        let labels = Label::infer_column(["1990", "2000", "2010"]);
        assert_eq!(
            labels,
            vec![Label::Integer(1990), Label::Integer(2000), Label::Integer(2010)]
        );
    }

    #[test]
    fn label_column_with_gap_becomes_float() {
        let labels = Label::infer_column(["1", "", "2.5"]);
        assert_eq!(
            labels,
            vec![Label::Float(1.0), Label::Text(None), Label::Float(2.5)]
        );
    }

    #[test]
    fn label_column_of_text() {
        let labels = Label::infer_column(["United States", "3", ""]);
        assert_eq!(
            labels,
            vec![
                Label::Text(Some("United States".to_string())),
                Label::Text(Some("3".to_string())),
                Label::Text(None),
            ]
        );
    }

    #[test]
    fn text_labels_keep_surrounding_whitespace() {
        let labels = Label::infer_column([" Bottom 50%", "Top 10% "]);
        assert_eq!(
            labels,
            vec![
                Label::Text(Some(" Bottom 50%".to_string())),
                Label::Text(Some("Top 10% ".to_string())),
            ]
        );
        assert_eq!(Label::infer_column([" 2002", "2012 "]), vec![
            Label::Integer(2002),
            Label::Integer(2012),
        ]);
    }

    #[test]
    fn label_display_matches_inferred_type() {
        assert_eq!(Label::Integer(3).to_string(), "3");
        assert_eq!(Label::Float(2003.0).to_string(), "2003.0");
        assert_eq!(Label::Float(2.5).to_string(), "2.5");
        assert_eq!(Label::Text(Some("03:Q1".to_string())).to_string(), "03:Q1");
    }

    #[test]
    fn headers_are_made_unique() {
        let names = normalize_headers(["Country", "", "Share", "Share", "Share"]);
        assert_eq!(
            names,
            vec!["Country", "Unnamed: 1", "Share", "Share.1", "Share.2"]
        );
    }

    #[test]
    fn headers_keep_surrounding_whitespace() {
        let names = normalize_headers(["Group", " Top 10%", "Top 10%"]);
        assert_eq!(names, vec!["Group", " Top 10%", "Top 10%"]);
    }
}
