//! Company ETL: upload source files to object storage and join them into a
//! warehouse table.

pub mod app;
pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod pipeline;

pub use error::{EtlError, Result};
