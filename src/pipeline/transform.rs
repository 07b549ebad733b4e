use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{CeoPair, CompanyRecord};
use crate::metrics::PipelineMetrics;
use crate::pipeline::processing::{
    decode_raw_record, join_by_company, normalize_company, parse_ceo_line, JoinStats,
};

/// A main-source line that could not become a company row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    /// 1-based line number in the main source
    pub line_number: usize,
    pub reason: String,
    pub line: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransformCounts {
    pub main_lines: usize,
    pub normalized: usize,
    pub rejected: usize,
    pub ceo_lines: usize,
    pub ceo_pairs: usize,
    pub ceo_dropped: usize,
}

/// Output of the read-normalize-parse-join steps
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub rows: Vec<CompanyRecord>,
    pub rejected: Vec<RejectedLine>,
    pub counts: TransformCounts,
    pub join: JoinStats,
}

/// Normalize the main source, parse the CEO source and left-join them.
///
/// Blank lines are ignored on both sides. Bad main-source lines are collected
/// in `rejected` instead of failing the batch.
pub fn transform(main_source: &str, ceo_source: &str, processed_at: DateTime<Utc>) -> TransformOutput {
    let mut counts = TransformCounts::default();
    let mut rejected = Vec::new();
    let mut companies = Vec::new();

    for (idx, line) in main_source.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        counts.main_lines += 1;
        match decode_raw_record(line).and_then(|raw| normalize_company(&raw, processed_at)) {
            Ok(record) => {
                debug!(company = %record.company_name, "Main data record");
                PipelineMetrics::record_normalized();
                companies.push(record);
            }
            Err(e) => {
                warn!(line_number = idx + 1, "Rejected main data record: {}", e);
                PipelineMetrics::record_rejected();
                rejected.push(RejectedLine {
                    line_number: idx + 1,
                    reason: e.to_string(),
                    line: line.to_string(),
                });
            }
        }
    }
    counts.normalized = companies.len();
    counts.rejected = rejected.len();

    let mut pairs: Vec<CeoPair> = Vec::new();
    for line in ceo_source.lines() {
        if line.trim().is_empty() {
            continue;
        }
        counts.ceo_lines += 1;
        match parse_ceo_line(line) {
            Some(pair) => {
                debug!(company = %pair.company_name, ceo = %pair.ceo, "CEO data record");
                pairs.push(pair);
            }
            None => counts.ceo_dropped += 1,
        }
    }
    counts.ceo_pairs = pairs.len();
    if counts.ceo_dropped > 0 {
        debug!("Dropped {} malformed CEO lines", counts.ceo_dropped);
    }
    PipelineMetrics::record_ceo_lines(counts.ceo_pairs, counts.ceo_dropped);

    let (rows, join) = join_by_company(companies, pairs);
    PipelineMetrics::record_join(&join);
    for row in &rows {
        debug!(company = %row.company_name, ceo = ?row.ceo, "Merged record");
    }

    TransformOutput { rows, rejected, counts, join }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NOT_AVAILABLE;
    use chrono::TimeZone;

    const MAIN: &str = r#"{"company_name": "acme", "country": "usa", "industry": "software engineering", "size": "50-200", "headquarters": "Austin, TX"}

{"company_name": "Globex", "country": "us", "industry": "energy", "size": "abc", "latest_news": ""}
not json
{"company_name": "Nameless Inc"}
"#;

    const CEO: &str = "ACME,Jane Doe\nInitech,Bill Lumbergh\nbroken line\nA,B,C\n";

    #[test]
    fn test_transform_end_to_end() {
        let processed_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let out = transform(MAIN, CEO, processed_at);

        assert_eq!(out.rows.len(), 2);
        assert_eq!(out.rows[0].company_name, "ACME");
        assert_eq!(out.rows[0].ceo.as_deref(), Some("Jane Doe"));
        assert_eq!(out.rows[0].size, 200);
        assert_eq!(out.rows[1].company_name, "GLOBEX");
        assert_eq!(out.rows[1].ceo.as_deref(), Some(NOT_AVAILABLE));
        assert_eq!(out.rows[1].latest_news, NOT_AVAILABLE);
        assert_eq!(out.rows[1].size, 0);

        assert_eq!(out.counts.main_lines, 4);
        assert_eq!(out.counts.rejected, 2);
        assert_eq!(out.rejected[0].line_number, 4);
        assert_eq!(out.rejected[1].line_number, 5);
        assert!(out.rejected[1].reason.contains("country"));

        assert_eq!(out.counts.ceo_lines, 4);
        assert_eq!(out.counts.ceo_pairs, 2);
        assert_eq!(out.counts.ceo_dropped, 2);
        assert_eq!(out.join.orphan_ceos, 1);
    }
}
