//! Grouping and aggregation of probe and request observations
//!
//! Observations are partitioned by backend key with a hash map of
//! accumulators, then reduced into one `AggregateStat` per backend plus
//! dataset-wide `GlobalStats`. Latency figures only ever use observations
//! that carry a latency (successful probes and all requests).

use crate::observation::{GroupKey, Observation};
use crate::percentile::SortedSamples;
use serde::Serialize;
use std::collections::HashMap;

/// Descriptive statistics over a set of latencies (milliseconds)
///
/// Every field is 0 when `count == 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencySummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample standard deviation (n - 1 divisor), 0 for fewer than two samples
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencySummary {
    pub fn from_latencies(latencies: &[f64]) -> Self {
        let samples = SortedSamples::new(latencies);
        if samples.is_empty() {
            return Self::default();
        }

        let count = samples.len();
        let mean = samples.as_slice().iter().sum::<f64>() / count as f64;
        let std_dev = if count > 1 {
            let squares: f64 = samples
                .as_slice()
                .iter()
                .map(|v| (v - mean).powi(2))
                .sum();
            (squares / (count - 1) as f64).sqrt()
        } else {
            0.0
        };

        Self {
            count,
            mean,
            median: samples.median().unwrap_or(0.0),
            std_dev,
            min: samples.min().unwrap_or(0.0),
            max: samples.max().unwrap_or(0.0),
            p95: samples.percentile(95.0).unwrap_or(0.0),
            p99: samples.percentile(99.0).unwrap_or(0.0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Statistics for one backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStat {
    pub group_key: GroupKey,
    /// First port seen for this backend (health logs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub total_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// Percentage in `[0, 100]`; 0 for an empty group
    pub success_rate: f64,
    pub latency: LatencySummary,
}

/// Dataset-wide statistics, computed over every observation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GlobalStats {
    pub total_count: usize,
    pub success_count: usize,
    pub failure_count: usize,
    pub success_rate: f64,
    /// Largest elapsed time in the dataset, seconds
    pub duration_sec: f64,
    pub latency: LatencySummary,
}

/// Share of the dataset routed to (or probed on) one backend
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupShare {
    pub group_key: GroupKey,
    pub count: usize,
    pub percentage: f64,
}

/// Result of aggregating one dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub global: GlobalStats,
    /// Sorted ascending by key
    pub groups: Vec<AggregateStat>,
}

impl Aggregation {
    pub fn group(&self, key: &GroupKey) -> Option<&AggregateStat> {
        self.groups
            .binary_search_by(|g| g.group_key.cmp(key))
            .ok()
            .map(|idx| &self.groups[idx])
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.groups.iter().map(|g| &g.group_key)
    }

    /// Count and percentage of all observations per backend
    pub fn distribution(&self) -> Vec<GroupShare> {
        let total = self.global.total_count;
        self.groups
            .iter()
            .map(|g| GroupShare {
                group_key: g.group_key.clone(),
                count: g.total_count,
                percentage: rate(g.total_count, total),
            })
            .collect()
    }
}

/// Per-backend running totals
#[derive(Debug, Clone, Default)]
struct GroupAccumulator {
    port: Option<u16>,
    total: usize,
    failures: usize,
    latencies: Vec<f64>,
}

impl GroupAccumulator {
    fn record(&mut self, obs: &Observation) {
        if self.port.is_none() {
            self.port = obs.port;
        }
        self.total += 1;
        if !obs.is_success() {
            self.failures += 1;
        }
        if let (true, Some(latency)) = (obs.is_success(), obs.latency_ms) {
            self.latencies.push(latency);
        }
    }

    fn finish(self, group_key: GroupKey) -> AggregateStat {
        let success_count = self.total - self.failures;
        AggregateStat {
            group_key,
            port: self.port,
            total_count: self.total,
            success_count,
            failure_count: self.failures,
            success_rate: rate(success_count, self.total),
            latency: LatencySummary::from_latencies(&self.latencies),
        }
    }
}

/// Tracks observations per backend until they are reduced into an `Aggregation`
#[derive(Debug, Default)]
pub struct StatsTracker {
    groups: HashMap<GroupKey, GroupAccumulator>,
    total: usize,
    failures: usize,
    latencies: Vec<f64>,
    duration_sec: f64,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one observation
    pub fn record(&mut self, obs: &Observation) {
        self.groups
            .entry(obs.group_key.clone())
            .or_default()
            .record(obs);

        self.total += 1;
        if !obs.is_success() {
            self.failures += 1;
        }
        if let (true, Some(latency)) = (obs.is_success(), obs.latency_ms) {
            self.latencies.push(latency);
        }
        self.duration_sec = self.duration_sec.max(obs.elapsed_sec);
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Reduce everything recorded so far
    pub fn finish(self) -> Aggregation {
        let success_count = self.total - self.failures;
        let global = GlobalStats {
            total_count: self.total,
            success_count,
            failure_count: self.failures,
            success_rate: rate(success_count, self.total),
            duration_sec: self.duration_sec,
            latency: LatencySummary::from_latencies(&self.latencies),
        };

        let mut groups: Vec<AggregateStat> = self
            .groups
            .into_iter()
            .map(|(key, acc)| acc.finish(key))
            .collect();
        groups.sort_by(|a, b| a.group_key.cmp(&b.group_key));

        tracing::debug!(
            observations = global.total_count,
            groups = groups.len(),
            "aggregated dataset"
        );

        Aggregation { global, groups }
    }
}

/// Aggregate a whole dataset
pub fn aggregate(observations: &[Observation]) -> Aggregation {
    let mut tracker = StatsTracker::new();
    for obs in observations {
        tracker.record(obs);
    }
    tracker.finish()
}

/// `part / total` as a percentage, 0 when `total` is 0
pub fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}
