//! Package and service manager interfaces.
//!
//! Collaborator calls return plain `Result`s; each call site picks an
//! [`ErrorPolicy`] deciding whether a failure is propagated or only logged.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageState {
    Latest,
    Absent,
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageState::Latest => f.write_str("latest"),
            PackageState::Absent => f.write_str("absent"),
        }
    }
}

#[derive(Debug, Error)]
#[error("ensure {package} {state}: {reason}")]
pub struct PackageError {
    pub package: String,
    pub state: PackageState,
    pub reason: String,
}

pub trait PackageManager {
    fn ensure(&self, package: &str, state: PackageState) -> Result<(), PackageError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Enable,
    Disable,
    Reload,
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAction::Enable => f.write_str("start"),
            ServiceAction::Disable => f.write_str("stop"),
            ServiceAction::Reload => f.write_str("reload"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{action} {service}: {reason}")]
pub struct ServiceError {
    pub service: String,
    pub action: ServiceAction,
    pub reason: String,
}

pub trait ServiceManager {
    /// Enable the unit and start it now.
    fn enable(&self, service: &str) -> Result<(), ServiceError>;

    /// Disable the unit and stop it now.
    fn disable(&self, service: &str) -> Result<(), ServiceError>;

    /// Reload the unit, restarting it instead if the reload fails and
    /// `restart_on_failure` is set.
    fn reload(&self, service: &str, restart_on_failure: bool) -> Result<(), ServiceError>;

    fn is_running(&self, service: &str) -> bool;

    fn is_failed(&self, service: &str) -> bool;
}

/// What a call site does with a collaborator failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    Propagate,
    Ignore,
}

impl ErrorPolicy {
    /// Log a failure and either return it or swallow it.
    pub fn apply<E: std::error::Error>(self, result: Result<(), E>) -> Result<(), E> {
        match result {
            Ok(()) => Ok(()),
            Err(e) => match self {
                ErrorPolicy::Propagate => {
                    tracing::error!("{}", e);
                    Err(e)
                }
                ErrorPolicy::Ignore => {
                    tracing::warn!("ignoring failure: {}", e);
                    Ok(())
                }
            },
        }
    }
}
