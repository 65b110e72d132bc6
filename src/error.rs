use std::fmt;

/// Failures surfaced to the page. Everything outside the first two variants
/// is displayed as a generic error.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The uploaded content is not parseable as CSV, or the fallback
    /// sample file is absent.
    FileLoad(String),
    /// The category or value column is unset, or points at a column of the
    /// wrong kind.
    InvalidSelection(String),
    /// A requested column name does not exist in the table.
    UnknownColumn(String),
    /// A cell in the value column failed to parse as a number.
    NonNumericValue(String),
    /// The chart backend failed while drawing or encoding.
    Render(String),
}

impl AppError {
    /// Stable machine-readable tag, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::FileLoad(_) => "file_load",
            AppError::InvalidSelection(_) => "invalid_selection",
            AppError::UnknownColumn(_) => "unknown_column",
            AppError::NonNumericValue(_) => "non_numeric_value",
            AppError::Render(_) => "render",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::FileLoad(msg) => write!(f, "Failed to load file: {}", msg),
            AppError::InvalidSelection(msg) => write!(f, "Invalid selection: {}", msg),
            AppError::UnknownColumn(name) => write!(f, "Column '{}' not found", name),
            AppError::NonNumericValue(msg) => write!(f, "Non-numeric value: {}", msg),
            AppError::Render(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::FileLoad(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileLoad(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
