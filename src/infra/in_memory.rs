use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

use crate::app::ports::{ObjectLocation, ObjectStorePort, WarehousePort, WriteOutcome};
use crate::domain::CompanyRecord;
use crate::error::{EtlError, Result};
use crate::pipeline::schema::{TableReference, TableSchema};

/// In-memory object store for development/testing
#[derive(Default, Clone)]
pub struct InMemoryObjectStore {
    buckets: Arc<Mutex<HashSet<String>>>,
    objects: Arc<Mutex<HashMap<ObjectLocation, Vec<u8>>>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(bucket: &str) -> Self {
        let store = Self::new();
        store.create_bucket(bucket);
        store
    }

    pub fn create_bucket(&self, bucket: &str) {
        self.buckets.lock().unwrap().insert(bucket.to_string());
    }

    pub fn object(&self, location: &ObjectLocation) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(location).cloned()
    }

    pub fn object_names(&self, bucket: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|loc| loc.bucket == bucket)
            .map(|loc| loc.name.clone())
            .collect();
        names.sort();
        names
    }

    fn store(&self, dest: &ObjectLocation, bytes: Vec<u8>) -> Result<()> {
        if !self.buckets.lock().unwrap().contains(&dest.bucket) {
            return Err(EtlError::BucketNotFound(dest.bucket.clone()));
        }
        self.objects.lock().unwrap().insert(dest.clone(), bytes);
        debug!("Stored object {}", dest);
        Ok(())
    }
}

#[async_trait]
impl ObjectStorePort for InMemoryObjectStore {
    async fn ensure_bucket(&self, bucket: &str) -> Result<()> {
        if self.buckets.lock().unwrap().contains(bucket) {
            Ok(())
        } else {
            Err(EtlError::BucketNotFound(bucket.to_string()))
        }
    }

    async fn upload(&self, dest: &ObjectLocation, bytes: Vec<u8>, _timeout: Duration) -> Result<()> {
        self.store(dest, bytes)
    }

    async fn put(&self, dest: &ObjectLocation, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        self.store(dest, bytes)
    }

    async fn get(&self, location: &ObjectLocation) -> Result<Vec<u8>> {
        self.object(location)
            .ok_or_else(|| EtlError::ObjectNotFound(location.to_string()))
    }
}

#[derive(Debug, Clone)]
struct StoredTable {
    schema: TableSchema,
    rows: Vec<CompanyRecord>,
}

/// In-memory warehouse for development/testing
#[derive(Default, Clone)]
pub struct InMemoryWarehouse {
    tables: Arc<Mutex<HashMap<TableReference, StoredTable>>>,
}

impl InMemoryWarehouse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self, table: &TableReference) -> Option<Vec<CompanyRecord>> {
        self.tables.lock().unwrap().get(table).map(|t| t.rows.clone())
    }

    pub fn schema(&self, table: &TableReference) -> Option<TableSchema> {
        self.tables.lock().unwrap().get(table).map(|t| t.schema.clone())
    }
}

#[async_trait]
impl WarehousePort for InMemoryWarehouse {
    async fn write_truncate(
        &self,
        table: &TableReference,
        schema: &TableSchema,
        rows: &[CompanyRecord],
    ) -> Result<WriteOutcome> {
        let mut tables = self.tables.lock().unwrap();
        let created = match tables.get_mut(table) {
            Some(existing) => {
                if &existing.schema != schema {
                    return Err(EtlError::Warehouse {
                        message: format!("Schema of existing table {} does not match", table),
                    });
                }
                existing.rows = rows.to_vec();
                false
            }
            None => {
                tables.insert(
                    table.clone(),
                    StoredTable { schema: schema.clone(), rows: rows.to_vec() },
                );
                true
            }
        };
        Ok(WriteOutcome { rows_written: rows.len(), created })
    }
}
