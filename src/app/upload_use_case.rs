use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

use crate::app::ports::{ObjectLocation, ObjectStorePort};
use crate::config::UploadEntry;
use crate::error::{EtlError, Result};
use crate::metrics::UploadMetrics;

/// An object written by the uploader
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedObject {
    pub source: PathBuf,
    pub destination: String,
    pub bytes: u64,
    /// Hex SHA-256 of the uploaded content
    pub sha256: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub uploaded: Vec<UploadedObject>,
    pub skipped: Vec<PathBuf>,
}

/// Pushes local files into one bucket, one at a time.
///
/// Missing local files are skipped. The first transfer error stops the loop
/// and is returned; nothing is retried.
pub struct UploadUseCase {
    store: Arc<dyn ObjectStorePort>,
    bucket: String,
    timeout: Duration,
}

impl UploadUseCase {
    pub fn new(store: Arc<dyn ObjectStorePort>, bucket: impl Into<String>, timeout: Duration) -> Self {
        Self { store, bucket: bucket.into(), timeout }
    }

    #[instrument(skip(self, files), fields(bucket = %self.bucket, files = files.len()))]
    pub async fn upload_all(&self, files: &[UploadEntry]) -> Result<UploadReport> {
        self.store.ensure_bucket(&self.bucket).await?;

        let mut report = UploadReport::default();
        for entry in files {
            match tokio::fs::try_exists(&entry.source).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("The source file '{}' does not exist, skipping", entry.source.display());
                    UploadMetrics::record_skipped();
                    report.skipped.push(entry.source.clone());
                    continue;
                }
                Err(e) => {
                    error!("Cannot stat '{}': {}", entry.source.display(), e);
                    UploadMetrics::record_failed();
                    return Err(e.into());
                }
            }

            match self.upload_one(entry).await {
                Ok(uploaded) => {
                    info!(
                        "File {} uploaded to {}/{}",
                        entry.source.display(),
                        self.bucket,
                        entry.destination
                    );
                    report.uploaded.push(uploaded);
                }
                Err(e) => {
                    error!("Upload of '{}' failed: {}", entry.source.display(), e);
                    UploadMetrics::record_failed();
                    return Err(e);
                }
            }
        }
        Ok(report)
    }

    async fn upload_one(&self, entry: &UploadEntry) -> Result<UploadedObject> {
        let dest = ObjectLocation::new(self.bucket.clone(), entry.destination.clone());
        let started = Instant::now();

        // Read once: the digest and the transfer see the same bytes
        let content = tokio::fs::read(&entry.source).await?;
        let sha256 = hex::encode(Sha256::digest(&content));
        let bytes = content.len() as u64;

        tokio::time::timeout(self.timeout, self.store.upload(&dest, content, self.timeout))
            .await
            .map_err(|_| EtlError::Timeout {
                path: entry.source.display().to_string(),
                secs: self.timeout.as_secs(),
            })??;

        UploadMetrics::record_uploaded(bytes, started.elapsed().as_secs_f64());
        Ok(UploadedObject {
            source: entry.source.clone(),
            destination: entry.destination.clone(),
            bytes,
            sha256,
        })
    }
}
