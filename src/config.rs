use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::app::ports::ObjectLocation;
use crate::constants::*;
use crate::error::{EtlError, Result};
use crate::pipeline::schema::TableReference;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service credential file; `GOOGLE_APPLICATION_CREDENTIALS` takes precedence
    pub credentials_file: Option<PathBuf>,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub pipeline: PipelineConfig,
    pub warehouse: WarehouseConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Gcs,
    Fs,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory used by the `fs` backend
    pub root: PathBuf,
    /// Base URL used by the `gcs` backend
    pub endpoint: String,
    /// Upload destination bucket
    pub bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub timeout_secs: u64,
    pub files: Vec<UploadEntry>,
}

/// One local file and the object name it is uploaded as
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadEntry {
    pub source: PathBuf,
    pub destination: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub project: String,
    pub region: String,
    pub runner: String,
    pub staging_location: String,
    pub temp_location: String,
    /// NDJSON company records
    pub main_source: String,
    /// `company_name,ceo` lines
    pub ceo_source: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WarehouseConfig {
    /// `project.dataset.table`
    pub table: String,
    /// Directory used by the NDJSON warehouse
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Gcs,
            root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            endpoint: DEFAULT_GCS_ENDPOINT.to_string(),
            bucket: DEFAULT_BUCKET.to_string(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: UPLOAD_TIMEOUT_SECS,
            files: vec![
                UploadEntry {
                    source: PathBuf::from(CEO_DATA_FILE),
                    destination: CEO_DATA_FILE.to_string(),
                },
                UploadEntry {
                    source: PathBuf::from(MAIN_DATA_FILE),
                    destination: MAIN_DATA_FILE.to_string(),
                },
            ],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.to_string(),
            region: DEFAULT_REGION.to_string(),
            runner: DEFAULT_RUNNER.to_string(),
            staging_location: format!("gs://{}/staging", DEFAULT_BUCKET),
            temp_location: format!("gs://{}/temp", DEFAULT_BUCKET),
            main_source: format!("gs://{}/{}", DEFAULT_BUCKET, MAIN_DATA_FILE),
            ceo_source: format!("gs://{}/{}", DEFAULT_BUCKET, CEO_DATA_FILE),
        }
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            root: PathBuf::from(DEFAULT_WAREHOUSE_ROOT),
        }
    }
}

impl Config {
    /// Load `path` if it exists (built-in defaults otherwise), then apply
    /// environment overrides and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                EtlError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            toml::from_str(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_CREDENTIALS).filter(|v| !v.trim().is_empty()) {
            self.credentials_file = Some(PathBuf::from(path));
        }
        if let Some(bucket) = lookup(ENV_BUCKET) {
            self.storage.bucket = bucket;
        }
        match lookup(ENV_STORAGE_BACKEND).as_deref() {
            Some("fs") => self.storage.backend = StorageBackend::Fs,
            Some("gcs") => self.storage.backend = StorageBackend::Gcs,
            _ => {}
        }
        if let Some(root) = lookup(ENV_STORAGE_ROOT) {
            self.storage.root = PathBuf::from(root);
        }
        if let Some(root) = lookup(ENV_WAREHOUSE_ROOT) {
            self.warehouse.root = PathBuf::from(root);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.trim().is_empty() {
            return Err(EtlError::Config("storage.bucket must not be empty".to_string()));
        }
        if self.upload.timeout_secs == 0 {
            return Err(EtlError::Config("upload.timeout_secs must be positive".to_string()));
        }
        if self.pipeline.runner != DEFAULT_RUNNER {
            return Err(EtlError::Config(format!(
                "Unsupported runner '{}': only {} executes in-process",
                self.pipeline.runner, DEFAULT_RUNNER
            )));
        }
        self.pipeline.locations()?;
        TableReference::parse(&self.warehouse.table)?;
        Ok(())
    }
}

/// Parsed object locations the pipeline reads from and writes to
#[derive(Debug, Clone)]
pub struct PipelineLocations {
    pub main_source: ObjectLocation,
    pub ceo_source: ObjectLocation,
    pub staging: ObjectLocation,
    pub temp: ObjectLocation,
}

impl PipelineConfig {
    pub fn locations(&self) -> Result<PipelineLocations> {
        Ok(PipelineLocations {
            main_source: ObjectLocation::parse(&self.main_source)?,
            ceo_source: ObjectLocation::parse(&self.ceo_source)?,
            staging: ObjectLocation::parse(&self.staging_location)?,
            temp: ObjectLocation::parse(&self.temp_location)?,
        })
    }
}

/// Verified access to the credential file.
pub struct Credentials {
    pub path: PathBuf,
    /// Bearer token for the storage API, if one is available
    pub access_token: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("path", &self.path)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Check that the credential file exists and is readable.
    ///
    /// Runs before any network call; failure is fatal for both commands.
    pub fn load(config: &Config) -> Result<Self> {
        Self::load_with(config, |key| std::env::var(key).ok())
    }

    pub fn load_with(config: &Config, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let path = config.credentials_file.clone().ok_or_else(|| EtlError::Credentials {
            path: format!("<unset: set {} or credentials_file>", ENV_CREDENTIALS),
        })?;
        let content = fs::read_to_string(&path).map_err(|_| EtlError::Credentials {
            path: path.display().to_string(),
        })?;

        let file_token = serde_json::from_str::<serde_json::Value>(&content)
            .ok()
            .and_then(|v| v.get("access_token").and_then(|t| t.as_str()).map(str::to_string));
        let access_token = lookup(ENV_ACCESS_TOKEN)
            .filter(|t| !t.trim().is_empty())
            .or(file_token);

        debug!("Using credential file {}", path.display());
        Ok(Self { path, access_token })
    }
}
