pub mod processing;
pub mod schema;
pub mod transform;
