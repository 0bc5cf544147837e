//! CLI command implementations.

pub mod apply;
pub mod summary;
pub mod validate;
