//! CLI command implementations.

pub mod backup;
pub mod debug;
pub mod disable;
pub mod enable;
pub mod status;
