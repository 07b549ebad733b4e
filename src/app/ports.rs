use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::time::Duration;

use crate::domain::CompanyRecord;
use crate::error::{EtlError, Result};
use crate::pipeline::schema::{TableReference, TableSchema};

static GS_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^gs://([a-z0-9][a-z0-9._-]{1,220}[a-z0-9])(?:/(.*))?$").unwrap());

/// A bucket plus an object name (or prefix) inside it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    pub bucket: String,
    pub name: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self { bucket: bucket.into(), name: name.into() }
    }

    /// Parse a `gs://bucket/name` URI. The name may be empty for a bare bucket.
    pub fn parse(uri: &str) -> Result<Self> {
        let caps = GS_URI
            .captures(uri.trim())
            .ok_or_else(|| EtlError::Config(format!("Invalid object location '{}'", uri)))?;
        let bucket = caps[1].to_string();
        let name = caps.get(2).map(|m| m.as_str().trim_matches('/')).unwrap_or("").to_string();
        Ok(Self { bucket, name })
    }

    /// A location nested under this one
    pub fn join(&self, child: &str) -> Self {
        let name = if self.name.is_empty() {
            child.trim_start_matches('/').to_string()
        } else {
            format!("{}/{}", self.name.trim_end_matches('/'), child.trim_start_matches('/'))
        };
        Self { bucket: self.bucket.clone(), name }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.name)
    }
}

/// Object storage reachable by the uploader and the pipeline
#[async_trait]
pub trait ObjectStorePort: Send + Sync {
    /// Fails with `EtlError::BucketNotFound` when the bucket does not exist
    async fn ensure_bucket(&self, bucket: &str) -> Result<()>;

    /// Transfer the content of an uploaded file; the caller enforces the
    /// overall timeout, `timeout` is passed on to the transport
    async fn upload(&self, dest: &ObjectLocation, bytes: Vec<u8>, timeout: Duration) -> Result<()>;

    async fn put(&self, dest: &ObjectLocation, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>>;
}

/// Outcome of one table write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub rows_written: usize,
    /// True when the table did not exist and was created by this write
    pub created: bool,
}

/// Structured sink for the merged company rows
#[async_trait]
pub trait WarehousePort: Send + Sync {
    /// Create the table with `schema` if needed, then replace its contents with `rows`.
    async fn write_truncate(
        &self,
        table: &TableReference,
        schema: &TableSchema,
        rows: &[CompanyRecord],
    ) -> Result<WriteOutcome>;
}
