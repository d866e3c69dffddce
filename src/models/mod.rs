//! Data structures shared between the core and the CLI.

pub mod config;
pub mod relation;
pub mod status;
