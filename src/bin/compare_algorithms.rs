use anyhow::Result;
use clap::Parser;
use lbscope::cli::CompareCli;
use lbscope::commands::run_compare;

fn main() -> Result<()> {
    let args = CompareCli::parse();
    run_compare(&args)
}
