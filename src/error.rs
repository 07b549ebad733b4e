use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credential file not found or unreadable: {path}")]
    Credentials { path: String },

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Transfer of '{path}' timed out after {secs}s")]
    Timeout { path: String, secs: u64 },

    #[error("Warehouse error: {message}")]
    Warehouse { message: String },
}

pub type Result<T> = std::result::Result<T, EtlError>;

/// Why a single main-source record could not be normalized.
///
/// These never abort a batch; the runner counts them and dead-letters the line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("line is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("line is not a JSON object")]
    NotAnObject,

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field '{0}' is not a string")]
    NotAString(&'static str),
}
