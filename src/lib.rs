//! lbscope - health-check and request-metrics analysis for load-balancer test runs
//!
//! Reads CSV logs produced by a load-balancer test harness, aggregates them
//! per backend (counts, success rates, latency percentiles) and compares two
//! runs that used different balancing algorithms. Results are rendered as
//! console tables, JSON documents and SVG charts.

pub mod batch;
pub mod chart;
pub mod cli;
pub mod commands;
pub mod compare;
pub mod config;
pub mod error;
pub mod ingest;
pub mod observation;
pub mod percentile;
pub mod report;
pub mod stats;
