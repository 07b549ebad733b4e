pub mod pipeline_use_case;
pub mod ports;
pub mod upload_use_case;
