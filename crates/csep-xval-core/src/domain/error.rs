//! Error taxonomy for the cross-validation pipeline.
//!
//! Each component owns a narrow error enum; [`XvalError`] aggregates them so
//! the pipeline entry point can propagate any of them with `?`.

use std::path::PathBuf;

/// Errors produced while parsing the reference event catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog line {line_no}: expected 9 fields, found {found}: {line:?}")]
    TooFewFields {
        line_no: usize,
        found: usize,
        line: String,
    },

    #[error("catalog line {line_no}: unknown month abbreviation {month:?}: {line:?}")]
    UnknownMonth {
        line_no: usize,
        month: String,
        line: String,
    },

    #[error("catalog line {line_no}: invalid {field} value {value:?}: {line:?}")]
    InvalidNumber {
        line_no: usize,
        field: &'static str,
        value: String,
        line: String,
    },

    #[error("catalog line {line_no}: invalid origin time {timestamp:?}: {line:?}")]
    InvalidTimestamp {
        line_no: usize,
        timestamp: String,
        line: String,
    },
}

/// Errors produced while loading the reference quantile table.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("malformed reference table: {0}")]
    Csv(#[from] csv::Error),

    #[error("reference table has no header row")]
    EmptyHeader,

    #[error("reference table row {record}: expected {expected} values, found {found}")]
    RowWidth {
        record: usize,
        expected: usize,
        found: usize,
    },

    #[error("reference table row {record}: duplicate model {model:?}")]
    DuplicateModel { record: usize, model: String },
}

/// Errors produced while reshaping live results against the reference grid.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("duplicate live outcome for model {model:?}, test {test:?}")]
    DuplicateOutcome { model: String, test: String },

    #[error("no live result for model {model:?}, test {test:?}")]
    ReconciliationMissingKey { model: String, test: String },
}

/// Errors produced by the error-statistics stage.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("{side} quantile for model {model:?}, test {test:?} is not numeric: {value:?}")]
    NonNumericQuantile {
        model: String,
        test: String,
        /// `"reference"` or `"live"`.
        side: &'static str,
        value: String,
    },

    #[error("no comparable cells: every reference cell was unavailable")]
    NoComparableCells,

    #[error("cannot build confidence band: {0}")]
    InvalidBand(String),
}

/// Errors produced while building or drawing the comparison chart.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("chart layout has no models to draw")]
    EmptyLayout,

    #[error("chart drawing failed: {0}")]
    Draw(String),
}

/// Errors produced while loading the experiment configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level error for the cross-validation pipeline.
#[derive(Debug, thiserror::Error)]
pub enum XvalError {
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("reference table: {0}")]
    Reference(#[from] ReferenceError),

    #[error("reconciliation: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("statistics: {0}")]
    Stats(#[from] StatsError),

    #[error("render: {0}")]
    Render(#[from] RenderError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("live results: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("report artifact: {0:#}")]
    Artifact(anyhow::Error),

    #[error("io error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl XvalError {
    /// Wrap an I/O failure with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for cross-validation operations.
pub type Result<T> = std::result::Result<T, XvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_reports_line() {
        let err = CatalogError::UnknownMonth {
            line_no: 4,
            month: "Foo".to_string(),
            line: "7 12 Foo 2008 10:00 34.0 -118.0 4.1 8.0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 4"));
        assert!(msg.contains("Foo"));
        assert!(msg.contains("34.0 -118.0"));
    }

    #[test]
    fn test_missing_key_names_model_and_test() {
        let err: XvalError = ReconcileError::ReconciliationMissingKey {
            model: "B".to_string(),
            test: "s-test".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("reconciliation:"));
        assert!(msg.contains("\"B\""));
        assert!(msg.contains("s-test"));
    }

    #[test]
    fn test_io_error_carries_path() {
        let err = XvalError::io(
            "data/missing.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("data/missing.csv"));
    }
}
