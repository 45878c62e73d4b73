//! S3 client configuration and creation.

use std::time::Duration;

use aws_config::BehaviorVersion;
use aws_sdk_s3::Client;
use bk_error::Result;
use serde::{Deserialize, Serialize};

/// Configuration for S3 access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,

    /// AWS region
    pub region: Option<String>,

    /// Custom endpoint URL (for LocalStack or MinIO)
    pub endpoint: Option<String>,

    /// Explicit AWS access key (optional)
    pub access_key: Option<String>,

    /// Explicit AWS secret key (optional)
    pub secret_key: Option<String>,

    /// AWS session token for temporary credentials (optional)
    pub session_token: Option<String>,

    /// AWS profile name (optional)
    pub profile: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: None,
            endpoint: None,
            access_key: None,
            secret_key: None,
            session_token: None,
            profile: None,
            timeout_secs: 30,
        }
    }
}

impl S3Config {
    /// Create a new S3Config with the required bucket name.
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    /// Set the AWS region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set a custom endpoint (for LocalStack or MinIO).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set explicit credentials.
    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self.session_token = session_token;
        self
    }

    /// Set the AWS profile.
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Create an S3 client from configuration.
///
/// The client is cheaply cloneable and safe for concurrent use; one
/// instance is created per reader and shared by all of its workers.
pub async fn create_s3_client(config: &S3Config) -> Result<Client> {
    use aws_config::Region;
    use aws_config::timeout::TimeoutConfig;

    let mut aws_config_loader = aws_config::defaults(BehaviorVersion::latest());

    // Set region if provided
    if let Some(region) = &config.region {
        aws_config_loader = aws_config_loader.region(Region::new(region.clone()));
    }

    // Set custom endpoint if provided (for LocalStack)
    if let Some(endpoint) = &config.endpoint {
        aws_config_loader = aws_config_loader.endpoint_url(endpoint);
    }

    // Set explicit credentials if provided
    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        let credentials = aws_sdk_s3::config::Credentials::new(
            access_key,
            secret_key,
            config.session_token.clone(),
            None,
            "bucketeer",
        );
        aws_config_loader = aws_config_loader.credentials_provider(credentials);
    }

    // Set profile if provided
    if let Some(profile) = &config.profile {
        aws_config_loader = aws_config_loader.profile_name(profile);
    }

    // Bound every remote call; pagination and fan-out assume a listing
    // or fetch cannot hang forever.
    let timeouts = TimeoutConfig::builder()
        .operation_timeout(Duration::from_secs(config.timeout_secs))
        .build();
    aws_config_loader = aws_config_loader.timeout_config(timeouts);

    let aws_config = aws_config_loader.load().await;

    let s3_config_builder = aws_sdk_s3::config::Builder::from(&aws_config);

    // Enable path-style access if using a custom endpoint (LocalStack)
    let s3_config = if config.endpoint.is_some() {
        s3_config_builder.force_path_style(true).build()
    } else {
        s3_config_builder.build()
    };

    Ok(Client::from_conf(s3_config))
}
