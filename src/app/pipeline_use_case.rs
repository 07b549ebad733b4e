use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::app::ports::{ObjectLocation, ObjectStorePort, WarehousePort};
use crate::config::PipelineLocations;
use crate::error::{EtlError, Result};
use crate::metrics::PipelineMetrics;
use crate::pipeline::processing::JoinStats;
use crate::pipeline::schema::{TableReference, COMPANY_TABLE_SCHEMA};
use crate::pipeline::transform::{transform, RejectedLine, TransformCounts};

/// Job metadata recorded in the staging manifest
#[derive(Debug, Clone, Serialize)]
pub struct JobOptions {
    pub project: String,
    pub region: String,
    pub runner: String,
}

/// Result of a complete pipeline run; also written to staging as the job manifest
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub job_id: Uuid,
    pub options: JobOptions,
    pub table: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub counts: TransformCounts,
    pub join: JoinStats,
    pub rows_written: usize,
    pub table_created: bool,
    /// Where rejected main-source lines were written, if any
    pub rejected_location: Option<String>,
}

/// Direct runner for the transform-and-join pipeline.
///
/// Reads both sources from object storage, transforms them in-process and
/// replaces the warehouse table with the merged rows.
pub struct PipelineUseCase {
    store: Arc<dyn ObjectStorePort>,
    warehouse: Arc<dyn WarehousePort>,
    locations: PipelineLocations,
    table: TableReference,
    options: JobOptions,
}

impl PipelineUseCase {
    pub fn new(
        store: Arc<dyn ObjectStorePort>,
        warehouse: Arc<dyn WarehousePort>,
        locations: PipelineLocations,
        table: TableReference,
        options: JobOptions,
    ) -> Self {
        Self { store, warehouse, locations, table, options }
    }

    pub async fn run(&self) -> Result<PipelineResult> {
        self.run_at(Utc::now()).await
    }

    /// Run with an explicit processing time; `load_date` of every row derives from it.
    #[instrument(skip(self), fields(table = %self.table))]
    pub async fn run_at(&self, processed_at: DateTime<Utc>) -> Result<PipelineResult> {
        let job_id = Uuid::new_v4();
        let started = Instant::now();
        info!(%job_id, "Starting pipeline");

        let main_text = self.read_text(&self.locations.main_source).await?;
        let ceo_text = self.read_text(&self.locations.ceo_source).await?;

        let output = transform(&main_text, &ceo_text, processed_at);
        info!(
            "Normalized {} of {} main records, parsed {} CEO pairs, merged {} rows",
            output.counts.normalized,
            output.counts.main_lines,
            output.counts.ceo_pairs,
            output.join.merged
        );

        // Rejects land before the table is replaced so a failed dead-letter
        // write leaves the previous table intact.
        let rejected_location = if output.rejected.is_empty() {
            None
        } else {
            let location = self.write_rejected(job_id, &output.rejected).await?;
            warn!("{} records rejected, see {}", output.rejected.len(), location);
            Some(location.to_string())
        };

        let outcome = self
            .warehouse
            .write_truncate(&self.table, &COMPANY_TABLE_SCHEMA, &output.rows)
            .await?;
        PipelineMetrics::record_rows_written(outcome.rows_written, started.elapsed().as_secs_f64());
        info!("Wrote {} rows to {}", outcome.rows_written, self.table);

        let result = PipelineResult {
            job_id,
            options: self.options.clone(),
            table: self.table.to_string(),
            started_at: processed_at,
            finished_at: Utc::now(),
            counts: output.counts,
            join: output.join,
            rows_written: outcome.rows_written,
            table_created: outcome.created,
            rejected_location,
        };

        // The table is already replaced; a missing manifest does not fail the run.
        let manifest = self.locations.staging.join(&format!("{}.json", job_id));
        match self.write_manifest(&manifest, &result).await {
            Ok(()) => info!(%job_id, "Pipeline finished, manifest at {}", manifest),
            Err(e) => error!(%job_id, "Pipeline finished but manifest {} was not written: {}", manifest, e),
        }

        Ok(result)
    }

    async fn read_text(&self, location: &ObjectLocation) -> Result<String> {
        let bytes = self.store.get(location).await?;
        String::from_utf8(bytes).map_err(|e| EtlError::Storage {
            message: format!("{} is not valid UTF-8: {}", location, e),
        })
    }

    async fn write_manifest(&self, location: &ObjectLocation, result: &PipelineResult) -> Result<()> {
        let body = serde_json::to_vec_pretty(result)?;
        self.store.put(location, body, "application/json").await
    }

    async fn write_rejected(&self, job_id: Uuid, rejected: &[RejectedLine]) -> Result<ObjectLocation> {
        let location = self.locations.temp.join(&format!("{}/rejected.ndjson", job_id));
        let mut buf = Vec::new();
        for line in rejected {
            serde_json::to_writer(&mut buf, line)?;
            buf.push(b'\n');
        }
        self.store.put(&location, buf, "application/x-ndjson").await?;
        Ok(location)
    }
}
