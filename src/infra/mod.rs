pub mod fs_object_store;
pub mod gcs_object_store;
pub mod in_memory;
pub mod ndjson_warehouse;

pub use fs_object_store::FsObjectStore;
pub use gcs_object_store::GcsObjectStore;
pub use in_memory::{InMemoryObjectStore, InMemoryWarehouse};
pub use ndjson_warehouse::NdjsonWarehouse;
