use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use company_etl::app::pipeline_use_case::{JobOptions, PipelineUseCase};
use company_etl::app::ports::{ObjectStorePort, WarehousePort};
use company_etl::app::upload_use_case::UploadUseCase;
use company_etl::config::{Config, Credentials, StorageBackend};
use company_etl::infra::{FsObjectStore, GcsObjectStore, NdjsonWarehouse};
use company_etl::pipeline::schema::TableReference;
use company_etl::{logging, metrics};

#[derive(Parser)]
#[command(name = "company_etl")]
#[command(about = "Upload company source files and join them into a warehouse table")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file; built-in defaults apply when it does not exist
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload the configured local files to the bucket
    Upload,
    /// Run the transform-and-join pipeline into the warehouse table
    Pipeline,
}

fn build_store(config: &Config, credentials: &Credentials) -> anyhow::Result<Arc<dyn ObjectStorePort>> {
    let store: Arc<dyn ObjectStorePort> = match config.storage.backend {
        StorageBackend::Gcs => Arc::new(GcsObjectStore::new(
            &config.storage.endpoint,
            credentials.access_token.clone(),
        )?),
        StorageBackend::Fs => Arc::new(FsObjectStore::new(&config.storage.root)),
    };
    Ok(store)
}

async fn run_upload(config: &Config, store: Arc<dyn ObjectStorePort>) -> ExitCode {
    println!("⬆️  Uploading {} files to bucket {}...", config.upload.files.len(), config.storage.bucket);
    let use_case = UploadUseCase::new(
        store,
        config.storage.bucket.clone(),
        Duration::from_secs(config.upload.timeout_secs),
    );

    match use_case.upload_all(&config.upload.files).await {
        Ok(report) => {
            println!("\n📊 Upload Results:");
            println!("   Uploaded: {}", report.uploaded.len());
            for object in &report.uploaded {
                println!("   - {} -> {} ({} bytes)", object.source.display(), object.destination, object.bytes);
            }
            println!("   Skipped (missing): {}", report.skipped.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("An error occurred during upload: {}", e);
            println!("❌ Upload failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_pipeline(config: &Config, store: Arc<dyn ObjectStorePort>) -> anyhow::Result<ExitCode> {
    println!("🚀 Running company/CEO pipeline...");
    let table = TableReference::parse(&config.warehouse.table)?;
    let warehouse: Arc<dyn WarehousePort> = Arc::new(NdjsonWarehouse::new(&config.warehouse.root));
    let options = JobOptions {
        project: config.pipeline.project.clone(),
        region: config.pipeline.region.clone(),
        runner: config.pipeline.runner.clone(),
    };
    let use_case = PipelineUseCase::new(store, warehouse, config.pipeline.locations()?, table, options);

    match use_case.run().await {
        Ok(result) => {
            println!("\n📊 Pipeline Results ({}):", result.job_id);
            println!("   Main records: {}", result.counts.main_lines);
            println!("   Rejected: {}", result.counts.rejected);
            println!("   CEO pairs: {}", result.counts.ceo_pairs);
            println!("   Rows written: {} -> {}", result.rows_written, result.table);
            if let Some(location) = &result.rejected_location {
                println!("   Rejected records: {}", location);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            println!("❌ Pipeline failed: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();
    metrics::init_metrics();

    let config = Config::load(&cli.config).context("loading configuration")?;
    // Fatal before any network call
    let credentials = Credentials::load(&config)?;
    info!("Credentials found at {}", credentials.path.display());

    let store = build_store(&config, &credentials)?;

    let (job, code) = match cli.command {
        Commands::Upload => ("upload", run_upload(&config, store).await),
        Commands::Pipeline => ("pipeline", run_pipeline(&config, store).await?),
    };

    metrics::push::push_to_gateway("company_etl", job).await;
    Ok(code)
}
