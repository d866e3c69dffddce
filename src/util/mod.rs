//! Host integration: apt, systemd, journald, privileges and logging.

pub mod apt;
pub mod journald;
pub mod logging;
pub mod privilege;
pub mod systemd;
