use anyhow::Result;
use company_etl::app::ports::{ObjectLocation, ObjectStorePort};
use company_etl::app::upload_use_case::UploadUseCase;
use company_etl::config::UploadEntry;
use company_etl::infra::FsObjectStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test]
async fn test_missing_local_file_is_skipped_and_others_upload() -> Result<()> {
    let local = tempdir()?;
    let store_root = tempdir()?;
    std::fs::create_dir(store_root.path().join("company_ceo"))?;

    let ceo_path = local.path().join("company_ceo_data.csv");
    let main_path = local.path().join("sample_suppliers_data.json");
    std::fs::write(&ceo_path, "ACME,Jane Doe\n")?;
    std::fs::write(&main_path, "{\"company_name\": \"acme\"}\n")?;

    let files = vec![
        UploadEntry { source: local.path().join("does_not_exist.csv"), destination: "missing.csv".to_string() },
        UploadEntry { source: ceo_path.clone(), destination: "company_ceo_data.csv".to_string() },
        UploadEntry { source: main_path.clone(), destination: "sample_suppliers_data.json".to_string() },
    ];

    let store = Arc::new(FsObjectStore::new(store_root.path()));
    let use_case = UploadUseCase::new(store.clone(), "company_ceo", Duration::from_secs(600));
    let report = use_case.upload_all(&files).await?;

    assert_eq!(report.skipped, vec![local.path().join("does_not_exist.csv")]);
    assert_eq!(report.uploaded.len(), 2);
    assert_eq!(report.uploaded[0].destination, "company_ceo_data.csv");
    assert_eq!(report.uploaded[1].destination, "sample_suppliers_data.json");

    let uploaded = store.get(&ObjectLocation::new("company_ceo", "company_ceo_data.csv")).await?;
    assert_eq!(uploaded, b"ACME,Jane Doe\n");
    assert!(!store_root.path().join("company_ceo").join("missing.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_all_files_missing_is_not_an_error() -> Result<()> {
    let local = tempdir()?;
    let store_root = tempdir()?;
    std::fs::create_dir(store_root.path().join("bucket"))?;

    let files = vec![UploadEntry { source: local.path().join("nope"), destination: "nope".to_string() }];
    let use_case = UploadUseCase::new(
        Arc::new(FsObjectStore::new(store_root.path())),
        "bucket",
        Duration::from_secs(600),
    );

    let report = use_case.upload_all(&files).await?;
    assert!(report.uploaded.is_empty());
    assert_eq!(report.skipped.len(), 1);
    Ok(())
}
