//! Entry points of the two binaries
//!
//! Input problems surface as `AnalysisError`s from the library; this layer
//! wraps them in `anyhow` and adds context for artifact writing. Returning
//! `Err` from `main` exits with status 1.

use crate::batch::{analyze_health_logs, load_metrics_pair, HealthAnalysis};
use crate::chart::{comparison_chart, comparison_chart_path, health_chart, health_chart_path};
use crate::cli::{CommonArgs, CompareCli, HealthAnalyzeCli, OutputFormat};
use crate::compare::compare_with_bins;
use crate::config::AnalysisConfig;
use crate::ingest::ensure_exists;
use crate::report::{comparison_report, health_report, to_json, ComparisonDocument, HealthDocument};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
pub fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(common: &CommonArgs) -> Result<AnalysisConfig> {
    let config = AnalysisConfig::load(common.config.as_deref())?;
    tracing::debug!(?config, "loaded analysis configuration");
    Ok(config)
}

fn write_chart(path: &Path, svg: &str) -> Result<()> {
    fs::write(path, svg).with_context(|| format!("Failed to write chart {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = svg.len(), "chart written");
    Ok(())
}

/// Tell the user where a chart went without corrupting JSON on stdout
fn announce_chart(path: &Path, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("\nPlot saved to: {}", path.display()),
        OutputFormat::Json => eprintln!("Plot saved to: {}", path.display()),
    }
}

pub fn run_health_analyze(args: &HealthAnalyzeCli) -> Result<()> {
    init_tracing(args.common.debug);

    let mut config = load_config(&args.common)?;
    if let Some(suffix) = &args.suffix {
        config.health_chart_suffix.clone_from(suffix);
        config.validate()?;
    }

    // Every input must exist before anything is printed
    for path in &args.log_files {
        ensure_exists(path)?;
    }

    let analyses = analyze_health_logs(&args.log_files)
        .into_iter()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    print_health(&analyses, args.common.format)?;

    if !args.common.no_chart {
        for analysis in &analyses {
            let path = health_chart_path(&analysis.path, &config.health_chart_suffix);
            let log_name = analysis
                .path
                .file_name()
                .map_or_else(
                    || analysis.path.display().to_string(),
                    |name| name.to_string_lossy().into_owned(),
                );
            let svg = health_chart(
                &log_name,
                &analysis.observations,
                &analysis.aggregation,
                config.chart_width,
                config.chart_height,
            );
            write_chart(&path, &svg)?;
            announce_chart(&path, args.common.format);
        }
    }

    Ok(())
}

fn print_health(analyses: &[HealthAnalysis], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for analysis in analyses {
                let source = analysis.path.display().to_string();
                print!("{}", health_report(&source, &analysis.aggregation));
            }
        }
        OutputFormat::Json => {
            let sources: Vec<String> = analyses
                .iter()
                .map(|a| a.path.display().to_string())
                .collect();
            let documents: Vec<HealthDocument<'_>> = analyses
                .iter()
                .zip(&sources)
                .map(|(a, source)| HealthDocument::new(source, &a.aggregation))
                .collect();
            // A single log keeps the plain object shape
            let json = match documents.as_slice() {
                [single] => to_json(single),
                many => to_json(&many),
            }
            .context("Failed to serialize health analysis")?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn run_compare(args: &CompareCli) -> Result<()> {
    init_tracing(args.common.debug);

    let mut config = load_config(&args.common)?;
    if let Some(label) = &args.label_a {
        config.label_a.clone_from(label);
    }
    if let Some(label) = &args.label_b {
        config.label_b.clone_from(label);
    }
    if let Some(bins) = args.bins {
        config.histogram_bins = bins;
    }
    config.validate()?;

    ensure_exists(&args.run_a)?;
    ensure_exists(&args.run_b)?;

    let (run_a, run_b) = load_metrics_pair(&args.run_a, &args.run_b)?;
    let report = compare_with_bins(
        &run_a,
        &run_b,
        &config.label_a,
        &config.label_b,
        config.histogram_bins,
    );

    match args.common.format {
        OutputFormat::Text => print!("{}", comparison_report(&report)),
        OutputFormat::Json => {
            let source_a = args.run_a.display().to_string();
            let source_b = args.run_b.display().to_string();
            let json = to_json(&ComparisonDocument::new(&source_a, &source_b, &report))
                .context("Failed to serialize comparison report")?;
            println!("{json}");
        }
    }

    if !args.common.no_chart {
        let path = comparison_chart_path(&args.run_a, &config.comparison_chart_name);
        let svg = comparison_chart(
            &report,
            &run_a,
            &run_b,
            config.chart_width,
            config.chart_height,
        );
        write_chart(&path, &svg)?;
        announce_chart(&path, args.common.format);
    }

    Ok(())
}
