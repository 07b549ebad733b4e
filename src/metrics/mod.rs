//! Metrics for the uploader and the pipeline
//!
//! Each component defines its counters in a dedicated submodule. Counters are
//! no-ops until `init_metrics` installs the Prometheus recorder; short-lived
//! runs then push a rendered snapshot to a Pushgateway (see `push`).

pub mod pipeline;
pub mod push;
pub mod upload;

pub use pipeline::PipelineMetrics;
pub use upload::UploadMetrics;

use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder and register every counter. Idempotent.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already set");
            }
            register_all_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

pub fn get_handle() -> Option<&'static metrics_exporter_prometheus::PrometheusHandle> {
    HANDLE.get()
}

/// Implemented by each component's metrics collection
pub trait PhaseMetrics {
    /// Touch every metric so it shows up in a snapshot before first use
    fn register_metrics();

    fn phase_name() -> &'static str;
}

fn register_all_metrics() {
    register_phase::<UploadMetrics>();
    register_phase::<PipelineMetrics>();
}

fn register_phase<T: PhaseMetrics>() {
    T::register_metrics();
    tracing::debug!("Registered metrics for phase '{}'", T::phase_name());
}

/// Builds metric names as `etl_{phase}_{name}` (`_total` for counters)
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("etl_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("etl_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
