use super::errors::DatasetError;
use super::value_objects::{parse_datetime, parse_numeric, ColumnData, ColumnKind};

/// Minimum number of columns an upload must have
pub const MIN_COLUMNS: usize = 2;

/// Uploads with more than this percentage of empty cells are rejected
pub const MAX_MISSING_PERCENTAGE: f64 = 80.0;

/// One typed column of the uploaded table
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ColumnKind {
        self.data.kind()
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn missing(&self) -> usize {
        self.data.missing()
    }

    /// Non-empty numeric values, in row order. Empty for non-numeric columns.
    pub fn numbers(&self) -> Vec<f64> {
        match &self.data {
            ColumnData::Numeric(values) => values.iter().flatten().copied().collect(),
            _ => Vec::new(),
        }
    }

    /// Non-empty text values, in row order. Empty for non-categorical columns.
    pub fn labels(&self) -> Vec<&str> {
        match &self.data {
            ColumnData::Categorical(values) => {
                values.iter().flatten().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Dataset aggregate root
///
/// Represents one uploaded CSV table, parsed and column-typed, for the
/// duration of a single request. Enforces all upload invariants.
///
/// # Invariants
/// - At least one data row and at least [`MIN_COLUMNS`] columns
/// - At least one numeric column
/// - At most [`MAX_MISSING_PERCENTAGE`] percent empty cells overall
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Parse an uploaded CSV blob into a typed dataset.
    ///
    /// The first record is treated as the header row. Column types are
    /// inferred from the cells: numeric if every non-empty cell parses as a
    /// number, datetime if every non-empty cell parses as a date, otherwise
    /// categorical.
    ///
    /// # Returns
    /// * `Ok(Dataset)` - Parsed table satisfying all invariants
    /// * `Err(DatasetError)` - Malformed CSV or a violated invariant
    pub fn from_csv(name: impl Into<String>, raw: &str) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(raw.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(DatasetError::from)?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows: Vec<Vec<String>> = Vec::new();
        for record in reader.records() {
            let record = record.map_err(DatasetError::from)?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        if headers.iter().all(|h| h.is_empty()) || rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        if headers.len() < MIN_COLUMNS {
            return Err(DatasetError::TooFewColumns {
                minimum: MIN_COLUMNS,
                found: headers.len(),
            });
        }

        let row_count = rows.len();
        let columns: Vec<Column> = headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let cells: Vec<&str> = rows
                    .iter()
                    .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
                    .collect();
                Column {
                    name: header.clone(),
                    data: infer_column(&cells),
                }
            })
            .collect();

        let dataset = Self {
            name: name.into(),
            columns,
            row_count,
        };

        if dataset.numeric_columns().next().is_none() {
            return Err(DatasetError::NoNumericColumns);
        }

        let missing_percentage = 100.0 * dataset.missing_cells() as f64
            / (dataset.row_count * dataset.column_count()) as f64;
        if missing_percentage > MAX_MISSING_PERCENTAGE {
            return Err(DatasetError::TooSparse {
                percentage: missing_percentage,
                limit: MAX_MISSING_PERCENTAGE,
            });
        }

        Ok(dataset)
    }

    // ===== Getters =====

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|column| column.kind() == ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|column| column.kind() == ColumnKind::Categorical)
    }

    pub fn datetime_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns
            .iter()
            .filter(|column| column.kind() == ColumnKind::Datetime)
    }

    /// Total number of empty cells across the table
    pub fn missing_cells(&self) -> usize {
        self.columns.iter().map(Column::missing).sum()
    }

    /// Percentage of cells holding a value
    pub fn completeness(&self) -> f64 {
        let total = self.row_count * self.column_count();
        if total == 0 {
            return 100.0;
        }
        100.0 * (total - self.missing_cells()) as f64 / total as f64
    }
}

/// Infer the type of one column from its raw cells
fn infer_column(cells: &[&str]) -> ColumnData {
    let non_empty: Vec<&str> = cells
        .iter()
        .map(|cell| cell.trim())
        .filter(|cell| !cell.is_empty())
        .collect();

    if !non_empty.is_empty() && non_empty.iter().all(|cell| parse_numeric(cell).is_some()) {
        return ColumnData::Numeric(
            cells
                .iter()
                .map(|cell| parse_numeric(cell))
                .collect(),
        );
    }

    if !non_empty.is_empty() && non_empty.iter().all(|cell| parse_datetime(cell).is_some()) {
        return ColumnData::Datetime(
            cells
                .iter()
                .map(|cell| parse_datetime(cell))
                .collect(),
        );
    }

    ColumnData::Categorical(
        cells
            .iter()
            .map(|cell| {
                let trimmed = cell.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect(),
    )
}
