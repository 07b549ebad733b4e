use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tracing::debug;

use crate::app::ports::{ObjectLocation, ObjectStorePort};
use crate::error::{EtlError, Result};

/// Object store backed by a local directory; each bucket is a subdirectory of `root`.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.root.join(bucket)
    }

    fn object_path(&self, location: &ObjectLocation) -> Result<PathBuf> {
        if location.name.is_empty() || location.name.split('/').any(|p| p == "..") {
            return Err(EtlError::Storage {
                message: format!("Invalid object name for {}", location),
            });
        }
        Ok(self.bucket_dir(&location.bucket).join(&location.name))
    }

    async fn prepare(&self, dest: &ObjectLocation) -> Result<PathBuf> {
        self.ensure_bucket(&dest.bucket).await?;
        let path = self.object_path(dest)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(path)
    }
}

#[async_trait]
impl ObjectStorePort for FsObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        match tokio::fs::metadata(self.bucket_dir(bucket)).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(EtlError::BucketNotFound(bucket.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(EtlError::BucketNotFound(bucket.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn upload(&self, dest: &ObjectLocation, bytes: Vec<u8>, _timeout: Duration) -> Result<()> {
        let path = self.prepare(dest).await?;
        let len = bytes.len();
        tokio::fs::write(&path, bytes).await?;
        debug!("Wrote {} bytes to {}", len, path.display());
        Ok(())
    }

    async fn put(&self, dest: &ObjectLocation, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        let path = self.prepare(dest).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        let path = self.object_path(location)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(EtlError::ObjectNotFound(location.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_bucket_is_reported() {
        let dir = tempdir().unwrap();
        let store = FsObjectStore::new(dir.path());
        let err = store.ensure_bucket("nope").await.unwrap_err();
        assert!(matches!(err, EtlError::BucketNotFound(b) if b == "nope"));
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bucket")).unwrap();
        let store = FsObjectStore::new(dir.path());
        let loc = ObjectLocation::new("bucket", "nested/obj.txt");

        store.put(&loc, b"hello".to_vec(), "text/plain").await.unwrap();
        assert_eq!(store.get(&loc).await.unwrap(), b"hello");

        let missing = ObjectLocation::new("bucket", "other.txt");
        assert!(matches!(store.get(&missing).await, Err(EtlError::ObjectNotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_parent_traversal() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bucket")).unwrap();
        let store = FsObjectStore::new(dir.path());
        let loc = ObjectLocation::new("bucket", "../escape.txt");
        assert!(store.put(&loc, Vec::new(), "text/plain").await.is_err());
    }
}
