//! Error taxonomy for log ingestion and configuration
//!
//! Everything here is detected before aggregation starts. The aggregation and
//! comparison stages are infallible for well-typed input.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading logs or configuration
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error(
        "{source_name}: missing required column(s) [{}]; expected [{}], found [{}]",
        missing.join(", "),
        expected.join(", "),
        found.join(", ")
    )]
    Schema {
        source_name: String,
        expected: Vec<String>,
        found: Vec<String>,
        missing: Vec<String>,
    },

    #[error(
        "{source_name}: line {line}, column '{column}': cannot parse {value:?} as {expected}"
    )]
    Parse {
        source_name: String,
        line: u64,
        column: String,
        value: String,
        expected: &'static str,
    },

    #[error("{source_name}: malformed delimited input: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },

    #[error("Failed to read {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_not_found_message() {
        let err = AnalysisError::FileNotFound {
            path: PathBuf::from("results_lb/missing.log"),
        };
        assert_eq!(err.to_string(), "File not found: results_lb/missing.log");
    }

    #[test]
    fn test_schema_message_lists_columns() {
        let err = AnalysisError::Schema {
            source_name: "health.log".to_string(),
            expected: vec!["timestamp_ms".to_string(), "status".to_string()],
            found: vec!["timestamp_ms".to_string()],
            missing: vec!["status".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("health.log"));
        assert!(msg.contains("missing required column(s) [status]"));
        assert!(msg.contains("found [timestamp_ms]"));
    }

    #[test]
    fn test_parse_message_identifies_cell() {
        let err = AnalysisError::Parse {
            source_name: "metrics.log".to_string(),
            line: 7,
            column: "response_time_ms".to_string(),
            value: "fast".to_string(),
            expected: "a floating-point number",
        };
        let msg = err.to_string();
        assert!(msg.contains("line 7"));
        assert!(msg.contains("response_time_ms"));
        assert!(msg.contains("\"fast\""));
    }
}
