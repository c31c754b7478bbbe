use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use thiserror::Error;

/// Errors raised while decoding a backend result payload
#[derive(Debug, Error)]
pub enum ResultError {
    #[error("Malformed CSV payload: {0}")]
    Csv(#[from] csv::Error),
    #[error("Result payload has no header row")]
    MissingHeader,
}

/// Tabular query result decoded from the backend's annotated CSV.
///
/// The backend speaks the InfluxDB CSV dialect with `group`, `datatype`,
/// and `default` annotation rows; those rows and the leading empty
/// column are stripped here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl QueryResult {
    /// Parses an annotated-CSV payload. An all-whitespace payload is a
    /// valid, empty result.
    pub fn parse_annotated_csv(payload: &str) -> Result<Self, ResultError> {
        if payload.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut reader = ReaderBuilder::new()
            .comment(Some(b'#'))
            .flexible(true)
            .from_reader(payload.as_bytes());

        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(ResultError::MissingHeader);
        }

        // Annotated rows carry a leading empty column.
        let skip = usize::from(headers.get(0) == Some(""));
        let columns: Vec<String> = headers.iter().skip(skip).map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.iter().all(str::is_empty) {
                continue; // table separator line
            }
            rows.push(record.iter().skip(skip).map(str::to_string).collect());
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of the named column in the given row.
    pub fn value_at(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// The `_time` column of the given row, parsed as RFC 3339.
    pub fn time_at(&self, row: usize) -> Option<DateTime<Utc>> {
        let raw = self.value_at(row, "_time")?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}
