use crate::metrics::{phase_metric, PhaseMetrics};

pub struct UploadMetrics;

impl UploadMetrics {
    pub fn record_uploaded(bytes: u64, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "upload", "files_uploaded")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "upload", "bytes")).increment(bytes);
        ::metrics::histogram!(phase_metric!(histogram, "upload", "duration_seconds"))
            .record(duration_secs);
    }

    pub fn record_skipped() {
        ::metrics::counter!(phase_metric!(counter, "upload", "files_skipped")).increment(1);
    }

    pub fn record_failed() {
        ::metrics::counter!(phase_metric!(counter, "upload", "files_failed")).increment(1);
    }
}

impl PhaseMetrics for UploadMetrics {
    fn register_metrics() {
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "files_uploaded"));
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "bytes"));
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "files_skipped"));
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "files_failed"));
        let _ = ::metrics::histogram!(phase_metric!(histogram, "upload", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "upload"
    }
}
