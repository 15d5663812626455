// Entrypoint for the CLI application.
// - Keeps `main` small: parse arguments, set up logging, run the report.
// - Returns `anyhow::Result` so any failure prints its cause chain and exits 1.

use clap::Parser;
use mist_country_channels::cli::{init_logging, run, Args};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level());

    let path = run(&args)?;
    println!("Report written to {}", path.display());
    Ok(())
}
