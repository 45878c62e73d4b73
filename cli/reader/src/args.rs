//! CLI argument definitions for bucketeer.

use std::path::PathBuf;

use bk_cli_common::LogLevel;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Concurrent S3 listing and retrieval.
///
/// Enumerates object keys under prefixes and downloads object contents
/// through a bounded worker pool. Results go to stdout; logs and the
/// completion summary go to stderr.
///
/// ## Examples
///
/// List keys under two prefixes:
///   bucketeer list -b my-bucket -p logs/2024/ -p logs/2025/
///
/// List one level of sub-folders:
///   bucketeer list -b my-bucket -p logs/ --folders
///
/// Download everything under a prefix into a directory:
///   bucketeer download -b my-bucket -p logs/2024/ -d ./out
///
/// Download keys as parsed JSON lines:
///   bucketeer download -b my-bucket -k a.json -k b.json --format structured
#[derive(Parser, Debug)]
#[command(name = "bucketeer")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List object keys (or sub-folders) under one or more prefixes
    List(ListArgs),
    /// Download objects by key or by prefix
    Download(DownloadArgs),
}

/// S3 connection options shared by all subcommands.
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// S3 bucket name
    #[arg(short, long, env = "BK_S3_BUCKET")]
    pub bucket: String,

    /// Custom S3 endpoint URL (for LocalStack or MinIO)
    #[arg(long, env = "BK_S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS session token for temporary credentials
    #[arg(long, env = "AWS_SESSION_TOKEN")]
    pub session_token: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Maximum concurrent workers (must be >= 1)
    #[arg(long, default_value = "16", value_parser = parse_positive_usize)]
    pub max_workers: usize,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Prefix to list under (repeatable)
    #[arg(short, long = "prefix", required = true)]
    pub prefixes: Vec<String>,

    /// List one level of sub-folders instead of keys
    #[arg(long)]
    pub folders: bool,
}

#[derive(Args, Debug)]
pub struct DownloadArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Key to download (repeatable)
    #[arg(
        short,
        long = "key",
        conflicts_with = "prefixes",
        required_unless_present = "prefixes"
    )]
    pub keys: Vec<String>,

    /// Prefix to download everything under (repeatable)
    #[arg(short, long = "prefix")]
    pub prefixes: Vec<String>,

    /// Directory to persist objects under, mirroring key paths
    #[arg(short = 'd', long)]
    pub output_dir: Option<PathBuf>,

    /// Payload format
    #[arg(long, value_enum, default_value = "bytes")]
    pub format: FormatArg,
}

/// Payload format argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Raw object bytes
    Bytes,
    /// JSON parsed into a structured value
    Structured,
}

impl From<FormatArg> for bk_reader::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Bytes => bk_reader::OutputFormat::Bytes,
            FormatArg::Structured => bk_reader::OutputFormat::Structured,
        }
    }
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}
