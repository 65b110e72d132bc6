use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AppError, Result};

/// How a column's values are treated when charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Values are discrete labels.
    Categorical,
    /// Every value parses as a number and supports aggregation.
    Numeric,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Categorical => "categorical",
            ColumnKind::Numeric => "numeric",
        }
    }
}

/// A table loaded from one CSV file. Created once per upload and immutable
/// afterwards; every chart request re-reads selections against it.
#[derive(Debug, Clone)]
pub struct Table {
    pub headers: Vec<String>,
    pub kinds: Vec<ColumnKind>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV content into a typed table.
    ///
    /// The reader enforces rectangular rows; header names must be unique and
    /// at least one data row must be present.
    pub fn from_reader<R: Read>(input: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(input);

        let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

        let mut seen = HashSet::new();
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(AppError::FileLoad(format!(
                    "duplicate column name '{}'",
                    header
                )));
            }
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(String::from).collect());
        }

        if rows.is_empty() {
            return Err(AppError::FileLoad(
                "CSV must contain at least one data row".to_string(),
            ));
        }

        let kinds = (0..headers.len())
            .map(|index| classify_column(&rows, index))
            .collect();

        Ok(Self {
            headers,
            kinds,
            rows,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|err| AppError::FileLoad(format!("{}: {}", path.display(), err)))?;
        Self::from_reader(file)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn column_kind(&self, index: usize) -> ColumnKind {
        self.kinds[index]
    }

    /// Column names of one kind, in table order. These feed the axis pickers.
    pub fn columns_of_kind(&self, kind: ColumnKind) -> Vec<String> {
        self.headers
            .iter()
            .zip(self.kinds.iter())
            .filter(|(_, k)| **k == kind)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn categorical_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Categorical)
    }

    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns_of_kind(ColumnKind::Numeric)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First rows of the table, for the upload preview.
    pub fn preview(&self, limit: usize) -> &[Vec<String>] {
        &self.rows[..self.rows.len().min(limit)]
    }
}

/// A column is numeric only when every cell parses as a float. An empty cell
/// fails the parse, so columns with missing values stay categorical and are
/// never offered as a value axis.
fn classify_column(rows: &[Vec<String>], index: usize) -> ColumnKind {
    let all_numeric = rows
        .iter()
        .all(|row| row[index].trim().parse::<f64>().is_ok());
    if all_numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_columns() {
        let table = Table::from_reader("category,sales\nA,10\nB,20.5\nA,30\n".as_bytes()).unwrap();
        assert_eq!(table.categorical_columns(), vec!["category".to_string()]);
        assert_eq!(table.numeric_columns(), vec!["sales".to_string()]);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_missing_value_forces_categorical() {
        let table = Table::from_reader("a,b\n1,10\n,20\n".as_bytes()).unwrap();
        assert_eq!(table.column_kind(0), ColumnKind::Categorical);
        assert_eq!(table.column_kind(1), ColumnKind::Numeric);
    }

    #[test]
    fn test_duplicate_header_rejected() {
        let err = Table::from_reader("x,x\n1,2\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::FileLoad(_)));
        assert!(err.to_string().contains("duplicate column name 'x'"));
    }

    #[test]
    fn test_header_only_input_rejected() {
        let err = Table::from_reader("x,y\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::FileLoad(_)));
        assert!(err.to_string().contains("at least one data row"));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Table::from_reader("x,y\n1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, AppError::FileLoad(_)));
    }

    #[test]
    fn test_binary_input_rejected() {
        let bytes: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0xfe, 0x00];
        let err = Table::from_reader(bytes).unwrap_err();
        assert!(matches!(err, AppError::FileLoad(_)));
    }

    #[test]
    fn test_preview_is_capped() {
        let table = Table::from_reader("v\na\nb\nc\nd\n".as_bytes()).unwrap();
        assert_eq!(table.preview(2).len(), 2);
        assert_eq!(table.preview(10).len(), 4);
        assert_eq!(table.preview(2)[1], vec!["b".to_string()]);
    }
}
