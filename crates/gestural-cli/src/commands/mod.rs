//! CLI command implementations

pub mod curves;
pub mod edit;
pub mod info;
pub mod init;
pub mod json_output;
pub mod transform;
pub mod validate;
