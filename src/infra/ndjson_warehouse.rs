use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::app::ports::{WarehousePort, WriteOutcome};
use crate::domain::CompanyRecord;
use crate::error::{EtlError, Result};
use crate::pipeline::schema::{TableReference, TableSchema};

/// File-backed warehouse: one NDJSON file per table plus a schema sidecar.
///
/// Layout: `<root>/<project>/<dataset>/<table>.ndjson` and `<table>.schema.json`.
pub struct NdjsonWarehouse {
    root: PathBuf,
}

impl NdjsonWarehouse {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn table_path(&self, table: &TableReference) -> PathBuf {
        self.dataset_dir(table).join(format!("{}.ndjson", table.table))
    }

    pub fn schema_path(&self, table: &TableReference) -> PathBuf {
        self.dataset_dir(table).join(format!("{}.schema.json", table.table))
    }

    fn dataset_dir(&self, table: &TableReference) -> PathBuf {
        self.root.join(&table.project).join(&table.dataset)
    }

    /// Returns true when the table was created
    async fn create_if_needed(&self, table: &TableReference, schema: &TableSchema) -> Result<bool> {
        let schema_path = self.schema_path(table);
        if tokio::fs::try_exists(&schema_path).await? {
            let existing: TableSchema = serde_json::from_slice(&tokio::fs::read(&schema_path).await?)?;
            if &existing != schema {
                return Err(EtlError::Warehouse {
                    message: format!("Schema of existing table {} does not match", table),
                });
            }
            return Ok(false);
        }
        tokio::fs::create_dir_all(self.dataset_dir(table)).await?;
        tokio::fs::write(&schema_path, serde_json::to_vec_pretty(schema)?).await?;
        info!("Created table {}", table);
        Ok(true)
    }
}

fn rows_to_ndjson(rows: &[CompanyRecord]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for row in rows {
        serde_json::to_writer(&mut buf, row)?;
        buf.push(b'\n');
    }
    Ok(buf)
}

async fn replace_file(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("ndjson.tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(contents).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl WarehousePort for NdjsonWarehouse {
    async fn write_truncate(
        &self,
        table: &TableReference,
        schema: &TableSchema,
        rows: &[CompanyRecord],
    ) -> Result<WriteOutcome> {
        let created = self.create_if_needed(table, schema).await?;
        let path = self.table_path(table);
        replace_file(&path, &rows_to_ndjson(rows)?).await?;
        debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(WriteOutcome { rows_written: rows.len(), created })
    }
}
