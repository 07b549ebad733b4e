use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use std::time::Duration;
use tracing::debug;

use crate::app::ports::{ObjectLocation, ObjectStorePort};
use crate::error::{EtlError, Result};

/// Google Cloud Storage over the JSON API.
///
/// Token minting is left to the platform; the bearer token comes from the
/// credential file or `GCS_ACCESS_TOKEN` (see `config::Credentials`).
pub struct GcsObjectStore {
    client: Client,
    endpoint: Url,
    access_token: Option<String>,
}

impl GcsObjectStore {
    pub fn new(endpoint: &str, access_token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| EtlError::Config(format!("Invalid storage endpoint '{}': {}", endpoint, e)))?;
        Ok(Self { client: Client::new(), endpoint, access_token })
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| EtlError::Config(format!("Storage endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn upload_bytes(
        &self,
        dest: &ObjectLocation,
        bytes: Vec<u8>,
        content_type: &str,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let url = self.url(&["upload", "storage", "v1", "b", &dest.bucket, "o"])?;
        let mut request = self
            .authorized(self.client.post(url))
            .query(&[("uploadType", "media"), ("name", dest.name.as_str())])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let resp = request.send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(EtlError::BucketNotFound(dest.bucket.clone()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EtlError::Storage {
                message: format!("Upload to {} failed: {} - {}", dest, status, body),
            });
        }
        debug!("Uploaded object {}", dest);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorePort for GcsObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        let url = self.url(&["storage", "v1", "b", bucket])?;
        let resp = self.authorized(self.client.get(url)).send().await?;
        match resp.status() {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => Err(EtlError::BucketNotFound(bucket.to_string())),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(EtlError::Storage {
                    message: format!("Bucket lookup for '{}' failed: {} - {}", bucket, s, body),
                })
            }
        }
    }

    async fn upload(&self, dest: &ObjectLocation, bytes: Vec<u8>, timeout: Duration) -> Result<()> {
        self.upload_bytes(dest, bytes, "application/octet-stream", Some(timeout)).await
    }

    async fn put(&self, dest: &ObjectLocation, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.upload_bytes(dest, bytes, content_type, None).await
    }

    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        let url = self.url(&["storage", "v1", "b", &location.bucket, "o", &location.name])?;
        let resp = self
            .authorized(self.client.get(url))
            .query(&[("alt", "media")])
            .send()
            .await?;
        match resp.status() {
            s if s.is_success() => Ok(resp.bytes().await?.to_vec()),
            StatusCode::NOT_FOUND => Err(EtlError::ObjectNotFound(location.to_string())),
            s => {
                let body = resp.text().await.unwrap_or_default();
                Err(EtlError::Storage {
                    message: format!("Download of {} failed: {} - {}", location, s, body),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_names_are_escaped_as_one_segment() {
        let store = GcsObjectStore::new("https://storage.googleapis.com", None).unwrap();
        let url = store
            .url(&["storage", "v1", "b", "company_ceo", "o", "staging/job.json"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://storage.googleapis.com/storage/v1/b/company_ceo/o/staging%2Fjob.json"
        );
    }

    #[test]
    fn test_rejects_bad_endpoint() {
        assert!(GcsObjectStore::new("not a url", None).is_err());
    }
}
