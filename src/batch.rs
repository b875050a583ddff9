//! Independent analyses of several log files, run in parallel
//!
//! Each file is loaded and aggregated on its own scoped thread. Nothing is
//! shared between units of work, so no locking is involved; results come
//! back in input order.

use crate::error::Result;
use crate::ingest::{load_health_log, load_metrics_log};
use crate::observation::Observation;
use crate::stats::{aggregate, Aggregation};
use std::panic;
use std::path::{Path, PathBuf};

/// Parsed rows and statistics of one health-check log
#[derive(Debug, Clone)]
pub struct HealthAnalysis {
    pub path: PathBuf,
    pub observations: Vec<Observation>,
    pub aggregation: Aggregation,
}

pub fn analyze_health_log(path: &Path) -> Result<HealthAnalysis> {
    let observations = load_health_log(path)?;
    if observations.is_empty() {
        tracing::warn!(path = %path.display(), "health log has no data rows");
    }
    let aggregation = aggregate(&observations);
    tracing::info!(
        path = %path.display(),
        checks = aggregation.global.total_count,
        backends = aggregation.groups.len(),
        "analyzed health log"
    );
    Ok(HealthAnalysis {
        path: path.to_path_buf(),
        observations,
        aggregation,
    })
}

/// Analyze every log concurrently; one result per input, in input order
pub fn analyze_health_logs(paths: &[PathBuf]) -> Vec<Result<HealthAnalysis>> {
    if paths.len() < 2 {
        return paths.iter().map(|p| analyze_health_log(p)).collect();
    }

    let outcome = crossbeam::scope(|scope| {
        let handles: Vec<_> = paths
            .iter()
            .map(|path| scope.spawn(move |_| analyze_health_log(path)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| panic::resume_unwind(e)))
            .collect()
    });
    outcome.unwrap_or_else(|e| panic::resume_unwind(e))
}

/// Load the metrics logs of two runs concurrently
pub fn load_metrics_pair(
    run_a: &Path,
    run_b: &Path,
) -> Result<(Vec<Observation>, Vec<Observation>)> {
    let outcome = crossbeam::scope(|scope| {
        let a = scope.spawn(move |_| load_metrics_log(run_a));
        let b = scope.spawn(move |_| load_metrics_log(run_b));
        let a = a.join().unwrap_or_else(|e| panic::resume_unwind(e));
        let b = b.join().unwrap_or_else(|e| panic::resume_unwind(e));
        (a, b)
    });
    let (a, b) = outcome.unwrap_or_else(|e| panic::resume_unwind(e));
    Ok((a?, b?))
}
