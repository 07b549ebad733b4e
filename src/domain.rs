//! Record shapes shared by the transform, the runner and the warehouse adapters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One decoded line of the main (supplier) source
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// A company row in the shape of the warehouse table.
///
/// Field order matches the table schema so serialized rows line up with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_name: String,
    pub location: Option<String>,
    pub country: String,
    pub industry: String,
    pub website: Option<String>,
    pub size: i64,
    pub ceo: Option<String>,
    pub latest_news: String,
    pub linkedin_url: Option<String>,
    pub point_of_contact: Option<String>,
    pub id: Option<String>,
    pub specialties: Option<String>,
    pub founded: Option<String>,
    pub load_date: NaiveDate,
    pub state: Option<String>,
    pub city: Option<String>,
}

impl CompanyRecord {
    /// The join key; `company_name` is already trimmed and upper-cased.
    pub fn key(&self) -> &str {
        &self.company_name
    }
}

/// A company/CEO pair parsed from one line of the CEO source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeoPair {
    /// Trimmed, upper-cased company name
    pub company_name: String,
    pub ceo: String,
}
