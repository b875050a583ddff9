//! Analysis configuration
//!
//! Loaded from an optional TOML file; every field has a default so a partial
//! file (or none at all) is fine. Command-line flags override file values.
//!
//! ```toml
//! histogram_bins = 40
//! label_a = "RR"
//! label_b = "LRT"
//! ```

use crate::compare::DEFAULT_HISTOGRAM_BINS;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Upper bound for `histogram_bins`
pub const MAX_HISTOGRAM_BINS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Bins used for the shared response-time histogram
    pub histogram_bins: usize,

    /// Replaces the health log's extension when naming its chart
    /// (`exp1_health.log` -> `exp1_health_analysis.svg`)
    pub health_chart_suffix: String,

    /// File name of the comparison chart, written next to the first run's log
    pub comparison_chart_name: String,

    pub label_a: String,
    pub label_b: String,

    /// Chart canvas size in pixels
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            health_chart_suffix: "_analysis.svg".to_string(),
            comparison_chart_name: "algorithm_comparison.svg".to_string(),
            label_a: "Round Robin".to_string(),
            label_b: "Least Response Time".to_string(),
            chart_width: 1400,
            chart_height: 1000,
        }
    }
}

impl AnalysisConfig {
    /// Load and validate a TOML configuration file
    pub fn from_toml(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|error| AnalysisError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AnalysisError::Config(format!("failed to parse TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Default configuration, or the one at `path` when given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.histogram_bins == 0 {
            return Err(AnalysisError::Config(
                "histogram_bins must be at least 1".to_string(),
            ));
        }

        if self.histogram_bins > MAX_HISTOGRAM_BINS {
            return Err(AnalysisError::Config(format!(
                "histogram_bins must be at most {MAX_HISTOGRAM_BINS}, got {}",
                self.histogram_bins
            )));
        }

        if self.chart_width == 0 || self.chart_height == 0 {
            return Err(AnalysisError::Config(format!(
                "chart dimensions must be non-zero, got {}x{}",
                self.chart_width, self.chart_height
            )));
        }

        if self.health_chart_suffix.is_empty() || self.comparison_chart_name.is_empty() {
            return Err(AnalysisError::Config(
                "chart file names must not be empty".to_string(),
            ));
        }

        // Charts are written next to their logs, never elsewhere
        for (field, value) in [
            ("health_chart_suffix", &self.health_chart_suffix),
            ("comparison_chart_name", &self.comparison_chart_name),
        ] {
            if value.contains(['/', '\\']) || matches!(value.as_str(), "." | "..") {
                return Err(AnalysisError::Config(format!(
                    "{field} must be a bare file name, got {value:?}"
                )));
            }
        }

        if self.label_a.trim().is_empty() || self.label_b.trim().is_empty() {
            return Err(AnalysisError::Config(
                "run labels must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
