//! Warehouse table schema and table references

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EtlError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FieldType {
    String,
    Integer,
    Date,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// The fixed 16-column schema of the company table
pub static COMPANY_TABLE_SCHEMA: Lazy<TableSchema> = Lazy::new(|| {
    use FieldType::{Date, Integer, String as Text};
    let fields = [
        ("company_name", Text),
        ("location", Text),
        ("country", Text),
        ("industry", Text),
        ("website", Text),
        ("size", Integer),
        ("ceo", Text),
        ("latest_news", Text),
        ("linkedin_url", Text),
        ("point_of_contact", Text),
        ("id", Text),
        ("specialties", Text),
        ("founded", Text),
        ("load_date", Date),
        ("state", Text),
        ("city", Text),
    ];
    TableSchema {
        fields: fields
            .into_iter()
            .map(|(name, field_type)| FieldSchema { name: name.to_string(), field_type })
            .collect(),
    }
});

/// A `project.dataset.table` reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableReference {
    pub project: String,
    pub dataset: String,
    pub table: String,
}

impl TableReference {
    /// Accepts `project.dataset.table` and the legacy `project:dataset.table` form.
    pub fn parse(reference: &str) -> Result<Self> {
        let normalized = reference.trim().replacen(':', ".", 1);
        let parts: Vec<&str> = normalized.split('.').collect();
        match parts.as_slice() {
            [project, dataset, table]
                if !project.is_empty() && !dataset.is_empty() && !table.is_empty() =>
            {
                Ok(Self {
                    project: project.to_string(),
                    dataset: dataset.to_string(),
                    table: table.to_string(),
                })
            }
            _ => Err(EtlError::Config(format!(
                "Invalid table reference '{}': expected project.dataset.table",
                reference
            ))),
        }
    }
}

impl fmt::Display for TableReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.project, self.dataset, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CompanyRecord;
    use chrono::NaiveDate;

    #[test]
    fn test_schema_matches_record_serialization_order() {
        let record = CompanyRecord {
            company_name: "ACME".into(),
            location: None,
            country: "USA".into(),
            industry: "Software".into(),
            website: None,
            size: 1,
            ceo: None,
            latest_news: "Not available".into(),
            linkedin_url: None,
            point_of_contact: None,
            id: None,
            specialties: None,
            founded: None,
            load_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            state: None,
            city: None,
        };
        let line = serde_json::to_string(&record).unwrap();
        let mut last = 0;
        for name in COMPANY_TABLE_SCHEMA.field_names() {
            let pos = line.find(&format!("\"{}\":", name)).unwrap();
            assert!(pos >= last, "{} out of order", name);
            last = pos;
        }
        assert_eq!(COMPANY_TABLE_SCHEMA.fields.len(), 16);
    }

    #[test]
    fn test_schema_serializes_like_a_table_definition() {
        let json = serde_json::to_value(&*COMPANY_TABLE_SCHEMA).unwrap();
        assert_eq!(json["fields"][5]["name"], "size");
        assert_eq!(json["fields"][5]["type"], "INTEGER");
        assert_eq!(json["fields"][13]["type"], "DATE");
    }

    #[test]
    fn test_table_reference_parse() {
        let table = TableReference::parse("project1-439615.ceo_dataset.company_list").unwrap();
        assert_eq!(table.project, "project1-439615");
        assert_eq!(table.dataset, "ceo_dataset");
        assert_eq!(table.table, "company_list");

        let legacy = TableReference::parse("p:d.t").unwrap();
        assert_eq!(legacy.to_string(), "p.d.t");

        assert!(TableReference::parse("dataset.table").is_err());
        assert!(TableReference::parse("a..c").is_err());
    }
}
