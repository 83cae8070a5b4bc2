use thiserror::Error;

/// Ways an uploaded file can fail validation
///
/// All variants map to the single `input_format` error kind at the API
/// boundary; the messages are shown to the user as-is.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to parse CSV: {0}")]
    Parse(String),

    #[error("uploaded file is empty")]
    Empty,

    #[error("dataset must have at least {minimum} columns, found {found}")]
    TooFewColumns { minimum: usize, found: usize },

    #[error("no numeric columns found for analysis")]
    NoNumericColumns,

    #[error("too much missing data: {percentage:.1}% of cells are empty (limit {limit}%)")]
    TooSparse { percentage: f64, limit: f64 },
}

impl From<csv::Error> for DatasetError {
    fn from(error: csv::Error) -> Self {
        DatasetError::Parse(error.to_string())
    }
}
