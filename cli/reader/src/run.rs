//! Main execution logic for the bucketeer CLI.

use std::time::Instant;

use anyhow::Result;
use bk_reader::{BucketReader, ReaderConfig, S3Config, S3Store};

use crate::args::{Cli, Command, ConnectionArgs, DownloadArgs, ListArgs};

/// Outcome of one CLI run, reported to stderr by `main`.
pub struct RunSummary {
    /// Keys listed or objects fetched.
    pub items: usize,
    /// Per-item failures, already rendered for display.
    pub failures: Vec<String>,
    /// Bytes fetched (zero for listings).
    pub bytes_fetched: u64,
    /// Wall-clock duration of the operation.
    pub elapsed_secs: f64,
}

/// Execute the selected subcommand.
pub async fn execute(args: Cli) -> Result<RunSummary> {
    match args.command {
        Command::List(list) => run_list(list).await,
        Command::Download(download) => run_download(download).await,
    }
}

/// Build the S3 configuration from connection arguments.
fn build_s3_config(conn: &ConnectionArgs) -> S3Config {
    let mut s3_config = S3Config::new(&conn.bucket).with_timeout(conn.timeout_secs);

    if let Some(region) = &conn.region {
        s3_config = s3_config.with_region(region);
    }

    if let Some(endpoint) = &conn.endpoint {
        s3_config = s3_config.with_endpoint(endpoint);
    }

    if let (Some(access_key), Some(secret_key)) = (&conn.access_key, &conn.secret_key) {
        s3_config =
            s3_config.with_credentials(access_key, secret_key, conn.session_token.clone());
    }

    if let Some(profile) = &conn.profile {
        s3_config = s3_config.with_profile(profile);
    }

    s3_config
}

/// Create the reader, building the shared S3 client once.
async fn connect(conn: &ConnectionArgs) -> Result<BucketReader<S3Store>> {
    let s3_config = build_s3_config(conn);
    let config = ReaderConfig::new().with_max_workers(conn.max_workers);

    let reader = BucketReader::connect(&s3_config, config).await?;
    Ok(reader)
}

async fn run_list(args: ListArgs) -> Result<RunSummary> {
    let start = Instant::now();
    let reader = connect(&args.connection).await?;

    let batch = if args.folders {
        reader.list_prefixes_by_prefixes(args.prefixes).await
    } else {
        reader.list_keys_by_prefixes(args.prefixes).await
    };

    for entry in &batch.entries {
        println!("{entry}");
    }

    Ok(RunSummary {
        items: batch.entries.len(),
        failures: batch
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.prefix, f.error))
            .collect(),
        bytes_fetched: 0,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

async fn run_download(args: DownloadArgs) -> Result<RunSummary> {
    let start = Instant::now();
    let reader = connect(&args.connection).await?;
    let format = args.format.into();
    let output_dir = args.output_dir.as_deref();

    let batch = if !args.keys.is_empty() {
        reader.download_by_keys(args.keys, format, output_dir).await
    } else {
        reader
            .download_by_prefixes(args.prefixes, format, output_dir)
            .await
    };

    // Structured payloads go to stdout as one JSON object per line;
    // byte payloads only land on disk (when -d is given).
    for (key, payload) in &batch.objects {
        if let Some(value) = payload.as_structured() {
            println!("{}", serde_json::json!({ "key": key, "data": value }));
        }
    }

    let mut failures: Vec<String> = batch
        .failed_prefixes
        .iter()
        .map(|f| format!("{}: {}", f.prefix, f.error))
        .collect();
    failures.extend(
        batch
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.key, f.error)),
    );

    Ok(RunSummary {
        items: batch.len(),
        failures,
        bytes_fetched: batch.bytes_fetched,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}
