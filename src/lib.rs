//! Lifecycle manager for the conserver console server.
//!
//! Installs `conserver-server` and `ipmitool`, renders `conserver.cf` and
//! `conserver.passwd` from base64 config inputs and relation-issued
//! credentials, supervises the systemd unit and reports a unit status.
//!
//! ## Modules
//! - `cli` — Command-line event handlers
//! - `core` — Decoding, credential merge, artifacts, lifecycle, status
//! - `models` — Data structures
//! - `util` — System utilities (fs, systemd, apt, logging)

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod util;

#[cfg(test)]
pub(crate) mod testing;
