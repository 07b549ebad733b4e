use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use crate::constants::NOT_AVAILABLE;
use crate::domain::{CeoPair, CompanyRecord};

/// Counts gathered while merging CEO names into company rows
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct JoinStats {
    /// Rows emitted (one per distinct company key)
    pub merged: usize,
    /// Rows that found a CEO
    pub matched: usize,
    /// Rows that fell back to the sentinel
    pub unmatched: usize,
    /// Company records dropped because their key was already seen
    pub duplicate_companies: usize,
    /// CEO pairs dropped because their key was already seen
    pub duplicate_ceos: usize,
    /// CEO keys with no company record
    pub orphan_ceos: usize,
}

/// Left join of company rows with CEO pairs on the normalized company name.
///
/// One row per distinct company key, in order of first appearance. When a key
/// repeats on either side, the first record by input order wins. CEO keys with
/// no company produce nothing.
pub fn join_by_company(
    companies: impl IntoIterator<Item = CompanyRecord>,
    ceos: impl IntoIterator<Item = CeoPair>,
) -> (Vec<CompanyRecord>, JoinStats) {
    let mut stats = JoinStats::default();

    let mut ceo_by_company: HashMap<String, String> = HashMap::new();
    for pair in ceos {
        if ceo_by_company.contains_key(&pair.company_name) {
            debug!(company = %pair.company_name, "Ignoring duplicate CEO entry");
            stats.duplicate_ceos += 1;
            continue;
        }
        ceo_by_company.insert(pair.company_name, pair.ceo);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();
    for mut company in companies {
        if !seen.insert(company.key().to_string()) {
            debug!(company = %company.key(), "Ignoring duplicate company record");
            stats.duplicate_companies += 1;
            continue;
        }
        match ceo_by_company.get(company.key()) {
            Some(ceo) => {
                company.ceo = Some(ceo.clone());
                stats.matched += 1;
            }
            None => {
                company.ceo = Some(NOT_AVAILABLE.to_string());
                stats.unmatched += 1;
            }
        }
        merged.push(company);
    }

    stats.orphan_ceos = ceo_by_company.keys().filter(|k| !seen.contains(*k)).count();
    stats.merged = merged.len();
    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn company(name: &str) -> CompanyRecord {
        CompanyRecord {
            company_name: name.to_string(),
            location: None,
            country: "USA".to_string(),
            industry: "Software".to_string(),
            website: None,
            size: 10,
            ceo: None,
            latest_news: NOT_AVAILABLE.to_string(),
            linkedin_url: None,
            point_of_contact: None,
            id: None,
            specialties: None,
            founded: None,
            load_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            state: None,
            city: None,
        }
    }

    fn ceo(name: &str, ceo: &str) -> CeoPair {
        CeoPair { company_name: name.to_string(), ceo: ceo.to_string() }
    }

    #[test]
    fn test_left_join_semantics() {
        let (rows, stats) = join_by_company(
            vec![company("ACME"), company("GLOBEX")],
            vec![ceo("ACME", "Jane Doe"), ceo("INITECH", "Bill Lumbergh")],
        );

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].company_name, "ACME");
        assert_eq!(rows[0].ceo.as_deref(), Some("Jane Doe"));
        assert_eq!(rows[1].company_name, "GLOBEX");
        assert_eq!(rows[1].ceo.as_deref(), Some(NOT_AVAILABLE));
        assert!(rows.iter().all(|r| r.company_name != "INITECH"));

        assert_eq!(stats.matched, 1);
        assert_eq!(stats.unmatched, 1);
        assert_eq!(stats.orphan_ceos, 1);
    }

    #[test]
    fn test_ceo_overwrites_existing_value() {
        let mut acme = company("ACME");
        acme.ceo = Some("Old Name".to_string());
        let (rows, _) = join_by_company(vec![acme], vec![ceo("ACME", "Jane Doe")]);
        assert_eq!(rows[0].ceo.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_duplicates_keep_first_by_input_order() {
        let mut first = company("ACME");
        first.size = 1;
        let mut second = company("ACME");
        second.size = 2;

        let (rows, stats) = join_by_company(
            vec![first, second],
            vec![ceo("ACME", "Jane Doe"), ceo("ACME", "John Roe")],
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].size, 1);
        assert_eq!(rows[0].ceo.as_deref(), Some("Jane Doe"));
        assert_eq!(stats.duplicate_companies, 1);
        assert_eq!(stats.duplicate_ceos, 1);
    }

    #[test]
    fn test_empty_company_side_yields_nothing() {
        let (rows, stats) = join_by_company(Vec::new(), vec![ceo("ACME", "Jane Doe")]);
        assert!(rows.is_empty());
        assert_eq!(stats.merged, 0);
        assert_eq!(stats.orphan_ceos, 1);
    }
}
