//! Delimited-text ingestion for health-check and metrics logs
//!
//! Both logs are comma-separated with a header row. Columns are located by
//! name, so their order does not matter and extra columns are ignored.
//!
//! ```text
//! timestamp_ms,status,backend_id,port,rtt_ms        (health-check log)
//! timestamp_ms,response_time_ms,backend_selected    (metrics log)
//! ```

use crate::error::{AnalysisError, Result};
use crate::observation::{normalize_elapsed, GroupKey, Observation, ProbeStatus};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

/// Which log layout a file follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSchema {
    HealthCheck,
    Metrics,
}

impl LogSchema {
    pub fn required_columns(self) -> &'static [&'static str] {
        match self {
            LogSchema::HealthCheck => &["timestamp_ms", "status", "backend_id", "port", "rtt_ms"],
            LogSchema::Metrics => &["timestamp_ms", "response_time_ms", "backend_selected"],
        }
    }
}

/// Position of each required column in the header
#[derive(Debug)]
struct ColumnIndex {
    positions: Vec<usize>,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, schema: LogSchema, source_name: &str) -> Result<Self> {
        let found: Vec<String> = headers.iter().map(str::to_string).collect();
        let required = schema.required_columns();

        let mut positions = Vec::with_capacity(required.len());
        let mut missing = Vec::new();
        for column in required {
            match found.iter().position(|h| h == column) {
                Some(idx) => positions.push(idx),
                None => missing.push((*column).to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(AnalysisError::Schema {
                source_name: source_name.to_string(),
                expected: required.iter().map(|c| (*c).to_string()).collect(),
                found,
                missing,
            });
        }

        Ok(Self { positions })
    }
}

/// One data row with enough context to report a bad cell
struct Row<'a> {
    record: &'a StringRecord,
    columns: &'a ColumnIndex,
    schema: LogSchema,
    source_name: &'a str,
    line: u64,
}

impl Row<'_> {
    fn cell(&self, slot: usize) -> &str {
        self.record.get(self.columns.positions[slot]).unwrap_or("")
    }

    fn parse_error(&self, slot: usize, expected: &'static str) -> AnalysisError {
        AnalysisError::Parse {
            source_name: self.source_name.to_string(),
            line: self.line,
            column: self.schema.required_columns()[slot].to_string(),
            value: self.cell(slot).to_string(),
            expected,
        }
    }

    fn parse<T: FromStr>(&self, slot: usize, expected: &'static str) -> Result<T> {
        self.cell(slot)
            .parse::<T>()
            .map_err(|_| self.parse_error(slot, expected))
    }

    fn parse_latency(&self, slot: usize) -> Result<f64> {
        let value: f64 = self.parse(slot, "a floating-point number")?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(self.parse_error(slot, "a finite floating-point number"))
        }
    }

    fn group_key(&self, slot: usize) -> Result<GroupKey> {
        let raw = self.cell(slot);
        if raw.is_empty() {
            return Err(self.parse_error(slot, "a backend identifier"));
        }
        Ok(GroupKey::parse(raw))
    }

    fn to_observation(&self) -> Result<Observation> {
        match self.schema {
            LogSchema::HealthCheck => {
                let timestamp_ms = self.parse(0, "an integer")?;
                let status = ProbeStatus::parse(self.cell(1))
                    .ok_or_else(|| self.parse_error(1, "OK or FAIL"))?;
                let backend = self.group_key(2)?;
                let port = self.parse(3, "a port number")?;
                // rtt_ms is only meaningful for successful probes
                let rtt_ms = match status {
                    ProbeStatus::Success => Some(self.parse_latency(4)?),
                    ProbeStatus::Failure => None,
                };
                Ok(Observation::probe(timestamp_ms, backend, port, status, rtt_ms))
            }
            LogSchema::Metrics => {
                let timestamp_ms = self.parse(0, "an integer")?;
                let response_time_ms = self.parse_latency(1)?;
                let backend = self.group_key(2)?;
                Ok(Observation::request(timestamp_ms, backend, response_time_ms))
            }
        }
    }
}

/// Parse every row of `reader` according to `schema`
///
/// `source_name` only appears in error messages. Elapsed times are normalized
/// against the earliest timestamp before returning.
pub fn read_observations<R: Read>(
    reader: R,
    schema: LogSchema,
    source_name: &str,
) -> Result<Vec<Observation>> {
    let csv_error = |error: csv::Error| AnalysisError::Csv {
        source_name: source_name.to_string(),
        error,
    };

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers().map_err(csv_error)?.clone();
    let columns = ColumnIndex::resolve(&headers, schema, source_name)?;

    let mut observations = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record).map_err(csv_error)? {
        let line = record.position().map_or(0, |p| p.line());
        let row = Row {
            record: &record,
            columns: &columns,
            schema,
            source_name,
            line,
        };
        observations.push(row.to_observation()?);
    }

    normalize_elapsed(&mut observations);
    tracing::debug!(
        source = source_name,
        rows = observations.len(),
        ?schema,
        "parsed log"
    );
    Ok(observations)
}

/// Load a log file, failing with `FileNotFound` before any parsing
pub fn load_log(path: &Path, schema: LogSchema) -> Result<Vec<Observation>> {
    ensure_exists(path)?;
    let file = File::open(path).map_err(|error| AnalysisError::Io {
        path: path.to_path_buf(),
        error,
    })?;
    read_observations(file, schema, &path.display().to_string())
}

pub fn load_health_log(path: &Path) -> Result<Vec<Observation>> {
    load_log(path, LogSchema::HealthCheck)
}

pub fn load_metrics_log(path: &Path) -> Result<Vec<Observation>> {
    load_log(path, LogSchema::Metrics)
}

/// `FileNotFound` unless `path` points at an existing file
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(AnalysisError::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn health(input: &str) -> Result<Vec<Observation>> {
        read_observations(input.as_bytes(), LogSchema::HealthCheck, "health.log")
    }

    fn metrics(input: &str) -> Result<Vec<Observation>> {
        read_observations(input.as_bytes(), LogSchema::Metrics, "metrics.log")
    }

    #[test]
    fn test_health_rows() {
        let rows = health(
            "timestamp_ms,status,backend_id,port,rtt_ms\n\
             1000,OK,1,8081,10.5\n\
             1500,FAIL,2,8082,-1\n",
        )
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, Some(ProbeStatus::Success));
        assert_eq!(rows[0].latency_ms, Some(10.5));
        assert_eq!(rows[0].port, Some(8081));
        assert_eq!(rows[1].status, Some(ProbeStatus::Failure));
        assert_eq!(rows[1].latency_ms, None);
        assert_eq!(rows[1].elapsed_sec, 0.5);
    }

    #[test]
    fn test_failed_probe_rtt_not_parsed() {
        let rows = health(
            "timestamp_ms,status,backend_id,port,rtt_ms\n\
             1000,FAIL,1,8081,-\n\
             1001,FAIL,1,8081,\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.latency_ms.is_none()));
    }

    #[test]
    fn test_metrics_rows_any_column_order() {
        let rows = metrics(
            "backend_selected, response_time_ms, timestamp_ms, extra\n\
             2, 14.25, 3000, x\n\
             cache-a, 9.0, 2000, y\n",
        )
        .unwrap();

        assert_eq!(rows[0].group_key, GroupKey::Id(2));
        assert_eq!(rows[0].latency_ms, Some(14.25));
        assert_eq!(rows[0].elapsed_sec, 1.0);
        assert_eq!(rows[1].group_key, GroupKey::Name("cache-a".to_string()));
        assert_eq!(rows[1].status, None);
    }

    #[test]
    fn test_header_only_is_empty() {
        let rows = metrics("timestamp_ms,response_time_ms,backend_selected\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let err = health("timestamp_ms,status,backend_id,rtt_ms\n1,OK,1,2.0\n").unwrap_err();
        match err {
            AnalysisError::Schema { missing, found, .. } => {
                assert_eq!(missing, vec!["port".to_string()]);
                assert_eq!(found.len(), 4);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input_is_schema_error() {
        assert!(matches!(
            metrics(""),
            Err(AnalysisError::Schema { .. })
        ));
    }

    #[test]
    fn test_bad_latency_is_parse_error() {
        let err = metrics(
            "timestamp_ms,response_time_ms,backend_selected\n\
             1,2.0,1\n\
             2,slow,1\n",
        )
        .unwrap_err();
        match err {
            AnalysisError::Parse {
                line,
                column,
                value,
                ..
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "response_time_ms");
                assert_eq!(value, "slow");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_status_is_parse_error() {
        let err = health("timestamp_ms,status,backend_id,port,rtt_ms\n1,DEGRADED,1,80,1.0\n")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { ref column, .. } if column == "status"));
    }

    #[test]
    fn test_ok_probe_requires_rtt() {
        let err = health("timestamp_ms,status,backend_id,port,rtt_ms\n1,OK,1,80,\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { ref column, .. } if column == "rtt_ms"));
    }

    #[test]
    fn test_non_finite_latency_rejected() {
        let err = metrics("timestamp_ms,response_time_ms,backend_selected\n1,NaN,1\n").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_bad_timestamp_is_parse_error() {
        let err = metrics("timestamp_ms,response_time_ms,backend_selected\n1.5e3,2.0,1\n")
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { ref column, .. } if column == "timestamp_ms"));
    }

    #[test]
    fn test_extreme_timestamps_parse() {
        let rows = metrics(
            "timestamp_ms,response_time_ms,backend_selected\n\
             -9223372036854775808,1.0,1\n\
             9223372036854775807,2.0,1\n",
        )
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].elapsed_sec, 0.0);
        assert!(rows[1].elapsed_sec > 0.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_health_log(Path::new("/nonexistent/lbscope/health.log")).unwrap_err();
        assert!(matches!(err, AnalysisError::FileNotFound { .. }));
    }
}
