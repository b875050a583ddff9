//! CLI argument parsing for the `health-analyze` and `compare-algorithms` binaries

use clap::{Args, Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for analysis results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Text,
    /// JSON document for machine parsing
    Json,
}

/// Flags shared by both binaries
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with analysis settings (histogram bins, chart names, labels)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Skip writing the SVG chart
    #[arg(long = "no-chart")]
    pub no_chart: bool,

    /// Print debug tracing to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

#[derive(Parser, Debug)]
#[command(name = "health-analyze")]
#[command(version)]
#[command(
    about = "Per-backend statistics and charts for load-balancer health-check logs",
    long_about = None
)]
pub struct HealthAnalyzeCli {
    /// Health-check log(s): timestamp_ms,status,backend_id,port,rtt_ms
    #[arg(value_name = "LOG_FILE", required = true)]
    pub log_files: Vec<PathBuf>,

    /// Chart file suffix replacing each log's extension
    #[arg(long = "suffix", value_name = "SUFFIX")]
    pub suffix: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Parser, Debug)]
#[command(name = "compare-algorithms")]
#[command(version)]
#[command(
    about = "Compare request metrics of two load-balancing runs",
    long_about = None
)]
pub struct CompareCli {
    /// Metrics log of the first run: timestamp_ms,response_time_ms,backend_selected
    #[arg(value_name = "RUN_A_LOG")]
    pub run_a: PathBuf,

    /// Metrics log of the second run
    #[arg(value_name = "RUN_B_LOG")]
    pub run_b: PathBuf,

    /// Label for the first run [default: Round Robin]
    #[arg(long = "label-a", value_name = "LABEL")]
    pub label_a: Option<String>,

    /// Label for the second run [default: Least Response Time]
    #[arg(long = "label-b", value_name = "LABEL")]
    pub label_b: Option<String>,

    /// Number of histogram bins for the response-time distribution
    #[arg(long = "bins", value_name = "N")]
    pub bins: Option<usize>,

    #[command(flatten)]
    pub common: CommonArgs,
}
