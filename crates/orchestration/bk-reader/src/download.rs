//! Single-object retrieval: fetch, decode, optionally persist.

use std::path::{Component, Path, PathBuf};

use bk_error::{ParseError, PersistError, Result};
use bytes::Bytes;
use tokio::fs;
use tracing::debug;

use crate::store::ObjectStore;

/// How a fetched payload is delivered to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Parse the payload as JSON into a structured value.
    Structured,
    /// Return the raw bytes, persisting them under the output directory
    /// when one is configured.
    Bytes,
}

/// A retrieved object payload.
#[derive(Debug, Clone)]
pub enum Payload {
    /// JSON document parsed from the object bytes.
    Structured(serde_json::Value),
    /// Raw object bytes.
    Bytes(Bytes),
}

impl Payload {
    /// The parsed value, when the payload is structured.
    pub fn as_structured(&self) -> Option<&serde_json::Value> {
        match self {
            Payload::Structured(value) => Some(value),
            Payload::Bytes(_) => None,
        }
    }

    /// The raw bytes, when the payload is unparsed.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Payload::Structured(_) => None,
            Payload::Bytes(bytes) => Some(bytes),
        }
    }
}

/// One successfully retrieved object.
#[derive(Debug, Clone)]
pub struct DownloadedObject {
    /// The object key.
    pub key: String,
    /// The decoded payload.
    pub payload: Payload,
    /// Size of the fetched body in bytes.
    pub size: u64,
}

/// Download a single object.
///
/// Fetches the object, decodes it per `format`, and, for
/// [`OutputFormat::Bytes`] with an `output_dir`, writes the bytes to
/// `output_dir/<key>`, creating parent directories to mirror the key's
/// path structure. Fetch, parse, and persist failures all surface as
/// this key's error; batch callers record them without aborting
/// sibling keys.
pub async fn download_by_key<S>(
    store: &S,
    bucket: &str,
    key: &str,
    format: OutputFormat,
    output_dir: Option<&Path>,
) -> Result<DownloadedObject>
where
    S: ObjectStore + ?Sized,
{
    let bytes = store.fetch_object(bucket, key).await?;
    let size = bytes.len() as u64;

    let payload = match format {
        OutputFormat::Structured => {
            let value = serde_json::from_slice(&bytes).map_err(|e| ParseError::Json {
                key: key.to_string(),
                message: e.to_string(),
            })?;
            Payload::Structured(value)
        }
        OutputFormat::Bytes => {
            if let Some(dir) = output_dir {
                let path = persist_object(dir, key, &bytes).await?;
                debug!(key = key, path = %path.display(), size, "Persisted object");
            }
            Payload::Bytes(bytes)
        }
    };

    Ok(DownloadedObject {
        key: key.to_string(),
        payload,
        size,
    })
}

/// Resolve the local path an object persists to.
///
/// Every key component must be a normal path segment; keys that would
/// resolve outside `output_dir` are rejected.
fn object_path(output_dir: &Path, key: &str) -> Result<PathBuf> {
    let relative = Path::new(key);

    for component in relative.components() {
        match component {
            Component::Normal(_) => {}
            _ => return Err(PersistError::UnsafeKey(key.to_string()).into()),
        }
    }

    Ok(output_dir.join(relative))
}

async fn persist_object(output_dir: &Path, key: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = object_path(output_dir, key)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| PersistError::CreateDir {
                path: parent.display().to_string(),
                message: e.to_string(),
            })?;
    }

    fs::write(&path, bytes)
        .await
        .map_err(|e| PersistError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    Ok(path)
}
