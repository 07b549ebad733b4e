use tracing::{info, warn};

use crate::constants::ENV_PUSHGATEWAY_URL;

/// Push the current metrics snapshot to a Pushgateway.
///
/// Does nothing unless `ETL_PUSHGATEWAY_URL` is set and the recorder is installed.
/// Failures are logged and never fail the run.
pub async fn push_to_gateway(job: &str, instance: &str) {
    let base = match std::env::var(ENV_PUSHGATEWAY_URL) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return,
    };
    let Some(handle) = crate::metrics::get_handle() else {
        warn!("pushgateway: metrics recorder not installed, skipping push");
        return;
    };

    let body = handle.render();
    let push_url = format!(
        "{}/metrics/job/{}/instance/{}",
        base.trim_end_matches('/'),
        job,
        instance
    );

    let client = reqwest::Client::new();
    match client
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(body)
        .send()
        .await
    {
        Ok(r) if r.status().is_success() => {
            info!("Pushed metrics to Pushgateway for job={} instance={}", job, instance);
        }
        Ok(r) => {
            warn!("Pushgateway responded with status {} for job={}", r.status().as_u16(), job);
        }
        Err(e) => {
            warn!("Failed to push metrics to Pushgateway for job={}: {}", job, e);
        }
    }
}
