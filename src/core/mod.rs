//! Core reconciliation logic.

pub mod artifact;
pub mod credentials;
pub mod decode;
pub mod file_lock;
pub mod inputs;
pub mod merge;
pub mod operator;
pub mod paths;
pub mod relation_store;
pub mod service;
pub mod status;
pub mod workload;
