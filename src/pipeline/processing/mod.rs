//! Per-record transforms and the company/CEO join

pub mod ceo;
pub mod join;
pub mod normalize;

pub use ceo::parse_ceo_line;
pub use join::{join_by_company, JoinStats};
pub use normalize::{decode_raw_record, normalize_company};
