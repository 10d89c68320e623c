//! Static delimited-text datasets stored on the local filesystem.

use std::path::{Path, PathBuf};

use strum::{Display, EnumIter};
use tracing::{debug, instrument};

use crate::error::SourceError;
use crate::metrics;

/// The static files the service knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum DataFile {
    /// New York Fed household debt and credit report, 2023Q2.
    #[strum(serialize = "HHD_C_Report_2023Q2.csv")]
    HouseholdDebt,
    /// Income share by percentile group.
    #[strum(serialize = "income_inequality.csv")]
    IncomeInequality,
    /// Gallup social class self-identification survey.
    #[strum(serialize = "socialclass_identification_gallup.csv")]
    ClassIdentification,
    /// Manufacturing output by country, 2019.
    #[strum(serialize = "global_manufacturing_output_2019.csv")]
    GlobalManufacturing2019,
}

impl DataFile {
    /// Field delimiter used by this file.
    pub fn delimiter(&self) -> u8 {
        match self {
            DataFile::HouseholdDebt => b' ',
            _ => b',',
        }
    }

    /// Whether the first record is a header row.
    pub fn has_header(&self) -> bool {
        !matches!(self, DataFile::HouseholdDebt)
    }
}

/// A parsed delimited file: optional header plus raw records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DelimitedText {
    /// Header cells, when the file has a header row.
    pub headers: Option<Vec<String>>,
    /// Data records, cells exactly as read.
    pub records: Vec<Vec<String>>,
}

impl DelimitedText {
    /// Parse delimited text from memory.
    pub fn parse(bytes: &[u8], delimiter: u8, has_header: bool) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(has_header)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(bytes);

        let headers = if has_header {
            Some(reader.headers()?.iter().map(str::to_string).collect())
        } else {
            None
        };

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, records })
    }
}

/// Locates and reads the static datasets under one directory.
#[derive(Debug, Clone)]
pub struct DataFiles {
    dir: PathBuf,
}

impl DataFiles {
    /// Create a reader rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a data file.
    pub fn path(&self, file: DataFile) -> PathBuf {
        self.dir.join(file.to_string())
    }

    /// Read and parse a data file in one shot.
    #[instrument(skip(self))]
    pub async fn load(&self, file: DataFile) -> Result<DelimitedText, SourceError> {
        let _timer = metrics::timer_upstream("file");
        let path = self.path(file);

        let bytes = tokio::fs::read(&path).await.map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let text = DelimitedText::parse(&bytes, file.delimiter(), file.has_header()).map_err(
            |source| SourceError::Csv {
                path: path.display().to_string(),
                source,
            },
        )?;

        debug!(records = text.records.len(), "Loaded data file");

        Ok(text)
    }
}
