//! Typed observations from load-balancer test harness logs
//!
//! One `Observation` is one row of either a health-check log (periodic probe
//! against a backend) or a metrics log (one routed client request).

use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Identity of the backend an observation belongs to
///
/// Backend ids are usually integers, but the harness may also emit names.
/// Numeric keys order numerically and come before textual keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    Id(i64),
    Name(String),
}

impl GroupKey {
    /// Interpret a raw cell: integers become `Id`, anything else `Name`
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<i64>() {
            Ok(id) => GroupKey::Id(id),
            Err(_) => GroupKey::Name(trimmed.to_string()),
        }
    }

    /// Short axis label used by charts ("B1", "Bcache-a")
    pub fn short_label(&self) -> String {
        format!("B{}", self)
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Id(a), GroupKey::Id(b)) => a.cmp(b),
            (GroupKey::Id(_), GroupKey::Name(_)) => Ordering::Less,
            (GroupKey::Name(_), GroupKey::Id(_)) => Ordering::Greater,
            (GroupKey::Name(a), GroupKey::Name(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Id(id) => write!(f, "{}", id),
            GroupKey::Name(name) => f.write_str(name),
        }
    }
}

impl From<i64> for GroupKey {
    fn from(id: i64) -> Self {
        GroupKey::Id(id)
    }
}

impl From<&str> for GroupKey {
    fn from(raw: &str) -> Self {
        GroupKey::parse(raw)
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            GroupKey::Id(id) => serializer.serialize_i64(*id),
            GroupKey::Name(name) => serializer.serialize_str(name),
        }
    }
}

/// Outcome of a health probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Success,
    Failure,
}

impl ProbeStatus {
    /// Parse the log's `OK` / `FAIL` tokens (case-insensitive)
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.eq_ignore_ascii_case("OK") {
            Some(ProbeStatus::Success)
        } else if token.eq_ignore_ascii_case("FAIL") {
            Some(ProbeStatus::Failure)
        } else {
            None
        }
    }
}

/// A single probe or request record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub timestamp_ms: i64,
    /// Seconds since the earliest timestamp of the dataset this row came from
    pub elapsed_sec: f64,
    pub group_key: GroupKey,
    /// `None` for request metrics, which have no failure state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ProbeStatus>,
    /// Present only for completed, timed operations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Observation {
    /// Build a health-probe observation; failed probes carry no latency
    pub fn probe(
        timestamp_ms: i64,
        backend: impl Into<GroupKey>,
        port: u16,
        status: ProbeStatus,
        rtt_ms: Option<f64>,
    ) -> Self {
        let latency_ms = match status {
            ProbeStatus::Success => rtt_ms,
            ProbeStatus::Failure => None,
        };
        Self {
            timestamp_ms,
            elapsed_sec: 0.0,
            group_key: backend.into(),
            status: Some(status),
            latency_ms,
            port: Some(port),
        }
    }

    /// Build a request-metric observation
    pub fn request(timestamp_ms: i64, backend: impl Into<GroupKey>, response_time_ms: f64) -> Self {
        Self {
            timestamp_ms,
            elapsed_sec: 0.0,
            group_key: backend.into(),
            status: None,
            latency_ms: Some(response_time_ms),
            port: None,
        }
    }

    /// Requests (no status) always count as successes
    pub fn is_success(&self) -> bool {
        !matches!(self.status, Some(ProbeStatus::Failure))
    }
}

/// Fill `elapsed_sec` relative to the earliest timestamp in the slice
///
/// Rows are not assumed to be ordered by time.
pub fn normalize_elapsed(observations: &mut [Observation]) {
    let Some(origin) = observations.iter().map(|o| o.timestamp_ms).min() else {
        return;
    };
    for obs in observations.iter_mut() {
        // i128: the span between two i64 timestamps may exceed i64::MAX
        let span_ms = i128::from(obs.timestamp_ms) - i128::from(origin);
        obs.elapsed_sec = span_ms as f64 / 1000.0;
    }
}
