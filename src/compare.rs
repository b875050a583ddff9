//! Side-by-side comparison of two independently collected runs
//!
//! Typical use: the same workload replayed against a round-robin balancer and
//! a least-response-time balancer. Each run is aggregated on its own; the
//! report pairs their global latency figures and lines up how requests were
//! spread across backends over the union of backends seen in either run.

use crate::observation::{GroupKey, Observation};
use crate::stats::{aggregate, rate, Aggregation, LatencySummary};
use serde::Serialize;
use std::collections::BTreeSet;

/// Default number of histogram bins for distribution-shape comparison
pub const DEFAULT_HISTOGRAM_BINS: usize = 30;

/// Global figures for one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub label: String,
    pub total_requests: usize,
    pub latency: LatencySummary,
}

/// `b - a` for each latency figure
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LatencyDelta {
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub p95: f64,
    pub p99: f64,
}

impl LatencyDelta {
    pub fn between(a: &LatencySummary, b: &LatencySummary) -> Self {
        Self {
            mean: b.mean - a.mean,
            median: b.median - a.median,
            std_dev: b.std_dev - a.std_dev,
            p95: b.p95 - a.p95,
            p99: b.p99 - a.p99,
        }
    }
}

/// How one backend was used by each run
///
/// A backend never selected by a run reports count 0 and percentage 0 for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupComparison {
    pub group_key: GroupKey,
    pub count_a: usize,
    pub percentage_a: f64,
    pub count_b: usize,
    pub percentage_b: f64,
}

/// Equal-width latency histogram shared by both runs
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SharedHistogram {
    /// `bins + 1` ascending bin edges; empty when neither run has latencies
    pub edges: Vec<f64>,
    pub counts_a: Vec<usize>,
    pub counts_b: Vec<usize>,
}

impl SharedHistogram {
    /// Bin both sets over their combined `[min, max]` range
    ///
    /// The last bin is closed on the right so the maximum is counted.
    pub fn build(a: &[f64], b: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = a
            .iter()
            .chain(b)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            return Self::default();
        }

        // Identical values: widen to a unit range centred on the value
        let (lo, hi) = if lo == hi { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let bin_of = |v: f64| (((v - lo) / width) as usize).min(bins - 1);
        let count = |values: &[f64]| {
            let mut counts = vec![0usize; bins];
            for &v in values {
                counts[bin_of(v)] += 1;
            }
            counts
        };

        Self {
            edges,
            counts_a: count(a),
            counts_b: count(b),
        }
    }

    pub fn bins(&self) -> usize {
        self.counts_a.len()
    }
}

/// Structured comparison of run A against run B
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub run_a: RunSummary,
    pub run_b: RunSummary,
    pub latency_delta: LatencyDelta,
    /// Union of backends from both runs, ascending
    pub groups: Vec<GroupComparison>,
    pub histogram: SharedHistogram,
}

impl ComparisonReport {
    pub fn group(&self, key: &GroupKey) -> Option<&GroupComparison> {
        self.groups.iter().find(|g| &g.group_key == key)
    }
}

/// Compare two runs with the default histogram resolution
pub fn compare(
    dataset_a: &[Observation],
    dataset_b: &[Observation],
    label_a: &str,
    label_b: &str,
) -> ComparisonReport {
    compare_with_bins(dataset_a, dataset_b, label_a, label_b, DEFAULT_HISTOGRAM_BINS)
}

pub fn compare_with_bins(
    dataset_a: &[Observation],
    dataset_b: &[Observation],
    label_a: &str,
    label_b: &str,
    bins: usize,
) -> ComparisonReport {
    let agg_a = aggregate(dataset_a);
    let agg_b = aggregate(dataset_b);

    let histogram = SharedHistogram::build(&latencies(dataset_a), &latencies(dataset_b), bins);
    let report = compare_aggregations(&agg_a, &agg_b, label_a, label_b, histogram);

    tracing::info!(
        label_a,
        label_b,
        backends = report.groups.len(),
        "compared runs"
    );
    report
}

/// Build the report from already aggregated runs
///
/// Global latency figures come straight from each run's dataset-wide
/// statistics, never from averaging per-backend means.
pub fn compare_aggregations(
    agg_a: &Aggregation,
    agg_b: &Aggregation,
    label_a: &str,
    label_b: &str,
    histogram: SharedHistogram,
) -> ComparisonReport {
    let run_a = run_summary(agg_a, label_a);
    let run_b = run_summary(agg_b, label_b);

    let keys: BTreeSet<&GroupKey> = agg_a.keys().chain(agg_b.keys()).collect();
    let groups = keys
        .into_iter()
        .map(|key| {
            let count_a = agg_a.group(key).map_or(0, |g| g.total_count);
            let count_b = agg_b.group(key).map_or(0, |g| g.total_count);
            GroupComparison {
                group_key: key.clone(),
                count_a,
                percentage_a: rate(count_a, run_a.total_requests),
                count_b,
                percentage_b: rate(count_b, run_b.total_requests),
            }
        })
        .collect();

    ComparisonReport {
        latency_delta: LatencyDelta::between(&run_a.latency, &run_b.latency),
        run_a,
        run_b,
        groups,
        histogram,
    }
}

fn run_summary(agg: &Aggregation, label: &str) -> RunSummary {
    RunSummary {
        label: label.to_string(),
        total_requests: agg.global.total_count,
        latency: agg.global.latency,
    }
}

fn latencies(observations: &[Observation]) -> Vec<f64> {
    observations
        .iter()
        .filter(|o| o.is_success())
        .filter_map(|o| o.latency_ms)
        .collect()
}
