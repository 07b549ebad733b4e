/// Defaults for the deployment this tool was built around, and the literals the
/// transform relies on.

// Object storage
pub const DEFAULT_BUCKET: &str = "company_ceo";
pub const DEFAULT_GCS_ENDPOINT: &str = "https://storage.googleapis.com";
pub const DEFAULT_STORAGE_ROOT: &str = "data/object_store";

// Source objects (also the default upload set)
pub const CEO_DATA_FILE: &str = "company_ceo_data.csv";
pub const MAIN_DATA_FILE: &str = "sample_suppliers_data.json";

/// Per-file transfer timeout for the uploader
pub const UPLOAD_TIMEOUT_SECS: u64 = 600;

// Pipeline options
pub const DEFAULT_PROJECT: &str = "project1-439615";
pub const DEFAULT_REGION: &str = "us-east1";
pub const DEFAULT_RUNNER: &str = "DirectRunner";

// Warehouse
pub const DEFAULT_TABLE: &str = "project1-439615.ceo_dataset.company_list";
pub const DEFAULT_WAREHOUSE_ROOT: &str = "data/warehouse";

/// Sentinel for `latest_news` and `ceo` when no value is available
pub const NOT_AVAILABLE: &str = "Not available";

/// Raw fields dropped once city/state and the rest have been derived
pub const DEPRECATED_FIELDS: [&str; 3] = ["description", "locationUrl", "headquarters"];

// Environment overrides
pub const ENV_CREDENTIALS: &str = "GOOGLE_APPLICATION_CREDENTIALS";
pub const ENV_ACCESS_TOKEN: &str = "GCS_ACCESS_TOKEN";
pub const ENV_BUCKET: &str = "ETL_BUCKET";
pub const ENV_STORAGE_BACKEND: &str = "ETL_STORAGE_BACKEND";
pub const ENV_STORAGE_ROOT: &str = "ETL_STORAGE_ROOT";
pub const ENV_WAREHOUSE_ROOT: &str = "ETL_WAREHOUSE_ROOT";
pub const ENV_PUSHGATEWAY_URL: &str = "ETL_PUSHGATEWAY_URL";
