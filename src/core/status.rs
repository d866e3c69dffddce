//! Unit status derived from configuration inputs and live service state.

use crate::core::decode::Decoded;
use crate::models::status::UnitStatus;

pub const MISSING_CONFIG: &str = "Missing config-file in config";
pub const INVALID_CONFIG: &str = "Invalid value for config-file";
pub const MISSING_PASSWD: &str = "Missing passwd-file in config";
pub const INVALID_PASSWD: &str = "Invalid value for passwd-file";
pub const SERVICE_FAILED: &str = "Conserver service has failed";

/// Daemon state as observed right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceState {
    pub running: bool,
    pub failed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct StatusInputs<'a> {
    pub main_config: &'a Decoded,
    pub passwords: &'a Decoded,
    /// Whether any active relation contributes a credential entry.
    pub relation_credentials: bool,
    pub service: ServiceState,
}

/// Compute the unit status. The first matching rule wins.
pub fn reconcile(inputs: StatusInputs<'_>) -> UnitStatus {
    match inputs.main_config {
        Decoded::Absent => return UnitStatus::blocked(MISSING_CONFIG),
        Decoded::Invalid => return UnitStatus::blocked(INVALID_CONFIG),
        Decoded::Present(_) => {}
    }

    if inputs.passwords.is_absent() && !inputs.relation_credentials {
        return UnitStatus::blocked(MISSING_PASSWD);
    }
    if inputs.passwords.is_invalid() {
        return UnitStatus::blocked(INVALID_PASSWD);
    }

    if inputs.service.running {
        UnitStatus::Active
    } else if inputs.service.failed {
        UnitStatus::blocked(SERVICE_FAILED)
    } else {
        UnitStatus::Maintenance(None)
    }
}
