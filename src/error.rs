use chrono::NaiveDate;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parsing error: {0}")]
    DateParse(#[from] chrono::ParseError),

    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Required column '{column}' is missing from the dataset")]
    MissingColumn { column: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported dataset source: {0}")]
    UnsupportedSource(String),

    #[error("Unknown parameter: '{label}'")]
    UnknownParameter { label: String },

    #[error("Unknown station: '{name}'")]
    UnknownStation { name: String },

    #[error("Date range {start} to {end} is outside the dataset coverage {coverage}")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        coverage: String,
    },

    #[error("Parameter '{parameter}' does not support {operation}")]
    UnsupportedAggregation {
        parameter: String,
        operation: &'static str,
    },
}

impl DashboardError {
    /// Errors raised while building the Dataset; these abort startup.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            DashboardError::Io(_)
                | DashboardError::Csv(_)
                | DashboardError::DateParse(_)
                | DashboardError::Zip(_)
                | DashboardError::Parquet(_)
                | DashboardError::Arrow(_)
                | DashboardError::MissingColumn { .. }
                | DashboardError::InvalidFormat(_)
                | DashboardError::UnsupportedSource(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_classification() {
        let missing = DashboardError::MissingColumn {
            column: "wd".to_string(),
        };
        assert!(missing.is_load_error());
        assert_eq!(
            missing.to_string(),
            "Required column 'wd' is missing from the dataset"
        );

        let unknown = DashboardError::UnknownParameter {
            label: "Humidity".to_string(),
        };
        assert!(!unknown.is_load_error());
    }
}
