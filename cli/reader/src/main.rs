//! bucketeer CLI
//!
//! Concurrent S3 listing and retrieval.

use bk_cli_common::{format_bytes, init_logging};
use clap::Parser;

mod args;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Initialize logging (to stderr, so stdout is clean for results)
    init_logging(args.log_level)?;

    let summary = run::execute(args).await?;

    // Report results to stderr
    eprintln!();
    eprintln!("Completed:");
    eprintln!("  Items:      {}", summary.items);
    if summary.bytes_fetched > 0 {
        eprintln!("  Fetched:    {}", format_bytes(summary.bytes_fetched));
    }
    eprintln!("  Errors:     {}", summary.failures.len());
    eprintln!("  Duration:   {:.2}s", summary.elapsed_secs);

    if summary.elapsed_secs > 0.0 && summary.items > 0 {
        eprintln!(
            "  Throughput: {:.1} items/sec",
            summary.items as f64 / summary.elapsed_secs
        );
    }

    if !summary.failures.is_empty() {
        for failure in &summary.failures {
            eprintln!("  Error: {}", failure);
        }
        std::process::exit(4); // Partial failure
    }

    Ok(())
}
