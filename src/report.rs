//! Console tables and JSON documents for analysis results
//!
//! Rendering only: every number shown here was computed by `stats` or
//! `compare`.

use crate::compare::ComparisonReport;
use crate::stats::{Aggregation, LatencySummary};
use serde::Serialize;
use std::fmt::Write as _;

/// JSON document emitted by `health-analyze --format json`
#[derive(Debug, Serialize)]
pub struct HealthDocument<'a> {
    /// Format version identifier
    pub version: &'static str,
    pub format: &'static str,
    pub source: &'a str,
    #[serde(flatten)]
    pub aggregation: &'a Aggregation,
}

impl<'a> HealthDocument<'a> {
    pub fn new(source: &'a str, aggregation: &'a Aggregation) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            format: "lbscope-health-v1",
            source,
            aggregation,
        }
    }
}

/// JSON document emitted by `compare-algorithms --format json`
#[derive(Debug, Serialize)]
pub struct ComparisonDocument<'a> {
    pub version: &'static str,
    pub format: &'static str,
    pub source_a: &'a str,
    pub source_b: &'a str,
    #[serde(flatten)]
    pub report: &'a ComparisonReport,
}

impl<'a> ComparisonDocument<'a> {
    pub fn new(source_a: &'a str, source_b: &'a str, report: &'a ComparisonReport) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            format: "lbscope-comparison-v1",
            source_a,
            source_b,
            report,
        }
    }
}

pub fn to_json<T: Serialize>(document: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}

/// Overall, per-backend and RTT statistics of one health-check log
pub fn health_report(source: &str, agg: &Aggregation) -> String {
    let mut out = String::new();
    let rule = "=".repeat(60);
    let g = &agg.global;

    let _ = writeln!(out, "\n{rule}");
    let _ = writeln!(out, "Health Check Analysis: {source}");
    let _ = writeln!(out, "{rule}\n");

    let _ = writeln!(out, "Overall Statistics:");
    let _ = writeln!(out, "  Duration: {:.1} seconds", g.duration_sec);
    let _ = writeln!(out, "  Total checks: {}", g.total_count);
    let _ = writeln!(out, "  Successful checks: {}", g.success_count);
    let _ = writeln!(out, "  Failed checks: {}", g.failure_count);
    let _ = writeln!(out, "  Success rate: {:.1}%", g.success_rate);

    let _ = writeln!(out, "\nPer-Backend Statistics:");
    let _ = writeln!(
        out,
        "{:<10} {:<8} {:<10} {:<10} {:<10} {:<10} {:<15} {:<12} {:<12}",
        "Backend", "Port", "Checks", "Success", "Fail", "Rate (%)", "Avg RTT (ms)", "P95 (ms)", "P99 (ms)"
    );
    let _ = writeln!(out, "{}", "-".repeat(104));
    for stat in &agg.groups {
        let port = stat.port.map_or_else(|| "-".to_string(), |p| p.to_string());
        let _ = writeln!(
            out,
            "{:<10} {:<8} {:<10} {:<10} {:<10} {:<10.1} {:<15.2} {:<12.2} {:<12.2}",
            stat.group_key.to_string(),
            port,
            stat.total_count,
            stat.success_count,
            stat.failure_count,
            stat.success_rate,
            stat.latency.mean,
            stat.latency.p95,
            stat.latency.p99
        );
    }

    if g.latency.is_empty() {
        let _ = writeln!(out, "\nRTT Statistics: no successful checks");
    } else {
        let _ = writeln!(out, "\nRTT Statistics (successful checks only):");
        push_latency_lines(&mut out, &g.latency, "RTT");
    }

    out
}

fn push_latency_lines(out: &mut String, latency: &LatencySummary, name: &str) {
    let _ = writeln!(out, "  Mean {name}: {:.2} ms", latency.mean);
    let _ = writeln!(out, "  Median {name}: {:.2} ms", latency.median);
    let _ = writeln!(out, "  Min {name}: {:.2} ms", latency.min);
    let _ = writeln!(out, "  Max {name}: {:.2} ms", latency.max);
    let _ = writeln!(out, "  Std Dev: {:.2} ms", latency.std_dev);
    let _ = writeln!(out, "  P95 {name}: {:.2} ms", latency.p95);
    let _ = writeln!(out, "  P99 {name}: {:.2} ms", latency.p99);
}

/// Response-time and backend-distribution tables for two runs
pub fn comparison_report(report: &ComparisonReport) -> String {
    let mut out = String::new();
    let a = &report.run_a;
    let b = &report.run_b;
    let d = &report.latency_delta;

    let _ = writeln!(out, "\n{}", "=".repeat(70));
    let _ = writeln!(out, "LOAD BALANCING ALGORITHM COMPARISON");
    let _ = writeln!(out, "{}", "=".repeat(70));

    let _ = writeln!(out, "\nResponse Time Statistics:");
    let _ = writeln!(
        out,
        "{:<30} {:<20} {:<20} {:<12}",
        "Metric", a.label, b.label, "Delta"
    );
    let _ = writeln!(out, "{}", "-".repeat(84));
    let _ = writeln!(
        out,
        "{:<30} {:<20} {:<20} {:<+12}",
        "Total Requests",
        a.total_requests,
        b.total_requests,
        b.total_requests as i64 - a.total_requests as i64
    );
    let rows = [
        ("Mean Response Time (ms)", a.latency.mean, b.latency.mean, d.mean),
        ("Median Response Time (ms)", a.latency.median, b.latency.median, d.median),
        ("Std Dev (ms)", a.latency.std_dev, b.latency.std_dev, d.std_dev),
        ("P95 Response Time (ms)", a.latency.p95, b.latency.p95, d.p95),
        ("P99 Response Time (ms)", a.latency.p99, b.latency.p99, d.p99),
    ];
    for (metric, va, vb, delta) in rows {
        let _ = writeln!(out, "{metric:<30} {va:<20.2} {vb:<20.2} {delta:<+12.2}");
    }

    let _ = writeln!(out, "\nBackend Distribution:");
    let _ = writeln!(out, "{:<15} {:<20} {:<20}", "Backend", a.label, b.label);
    let _ = writeln!(out, "{}", "-".repeat(55));
    for group in &report.groups {
        let _ = writeln!(
            out,
            "{:<15} {:>5} ({:>5.1}%)     {:>5} ({:>5.1}%)",
            format!("Backend {}", group.group_key),
            group.count_a,
            group.percentage_a,
            group.count_b,
            group.percentage_b
        );
    }

    out
}
