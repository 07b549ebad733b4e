use crate::metrics::{phase_metric, PhaseMetrics};
use crate::pipeline::processing::JoinStats;

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_normalized() {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "records_normalized")).increment(1);
    }

    pub fn record_rejected() {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "records_rejected")).increment(1);
    }

    pub fn record_ceo_lines(parsed: usize, dropped: usize) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "ceo_lines_parsed"))
            .increment(parsed as u64);
        ::metrics::counter!(phase_metric!(counter, "pipeline", "ceo_lines_dropped"))
            .increment(dropped as u64);
    }

    pub fn record_join(stats: &JoinStats) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "join_matched"))
            .increment(stats.matched as u64);
        ::metrics::counter!(phase_metric!(counter, "pipeline", "join_unmatched"))
            .increment(stats.unmatched as u64);
        ::metrics::counter!(phase_metric!(counter, "pipeline", "join_duplicates"))
            .increment((stats.duplicate_companies + stats.duplicate_ceos) as u64);
    }

    pub fn record_rows_written(rows: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "pipeline", "rows_written")).increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "pipeline", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for PipelineMetrics {
    fn register_metrics() {
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "records_normalized"));
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "records_rejected"));
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "ceo_lines_parsed"));
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "ceo_lines_dropped"));
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "join_matched"));
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "join_unmatched"));
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "join_duplicates"));
        let _ = ::metrics::counter!(phase_metric!(counter, "pipeline", "rows_written"));
        let _ = ::metrics::histogram!(phase_metric!(histogram, "pipeline", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "pipeline"
    }
}
