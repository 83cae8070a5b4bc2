use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Inferred type of one dataset column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every non-empty cell parses as a number
    Numeric,
    /// Every non-empty cell parses as a date or RFC 3339 timestamp
    Datetime,
    /// Anything else
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => write!(f, "numeric"),
            ColumnKind::Datetime => write!(f, "datetime"),
            ColumnKind::Categorical => write!(f, "categorical"),
        }
    }
}

/// Parsed cell values of one column; `None` marks an empty cell
#[derive(Debug, Clone)]
pub enum ColumnData {
    Numeric(Vec<Option<f64>>),
    Datetime(Vec<Option<DateTime<Utc>>>),
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Datetime(_) => ColumnKind::Datetime,
            ColumnData::Categorical(_) => ColumnKind::Categorical,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Datetime(values) => values.len(),
            ColumnData::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of empty cells in this column
    pub fn missing(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::Datetime(values) => values.iter().filter(|v| v.is_none()).count(),
            ColumnData::Categorical(values) => values.iter().filter(|v| v.is_none()).count(),
        }
    }
}

/// Parse one cell as a number, accepting thousands separators
pub(crate) fn parse_numeric(cell: &str) -> Option<f64> {
    let cleaned = cell.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok().filter(|value: &f64| value.is_finite())
}

/// Parse one cell as a timestamp: RFC 3339 first, then `YYYY-MM-DD`
pub(crate) fn parse_datetime(cell: &str) -> Option<DateTime<Utc>> {
    let trimmed = cell.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
