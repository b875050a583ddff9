use anyhow::Result;
use clap::Parser;
use lbscope::cli::HealthAnalyzeCli;
use lbscope::commands::run_health_analyze;

fn main() -> Result<()> {
    let args = HealthAnalyzeCli::parse();
    run_health_analyze(&args)
}
