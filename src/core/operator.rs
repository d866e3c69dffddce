//! Event handling for the conserver unit.
//!
//! One [`Operator`] is built per process with its collaborators injected;
//! each triggering event is a method call that runs to completion and ends
//! with a freshly computed [`UnitStatus`].

use crate::constants;
use crate::core::credentials::CredentialHasher;
use crate::core::decode::{self, Decoded};
use crate::core::merge;
use crate::core::relation_store::RelationStore;
use crate::core::service::ErrorPolicy;
use crate::core::status::{self, ServiceState, StatusInputs};
use crate::core::workload::Conserver;
use crate::models::config::ConfigInput;
use crate::models::relation::RelationId;
use crate::models::status::UnitStatus;
use anyhow::Result;

const CONFIG_FILE: &str = "config-file";
const PASSWD_FILE: &str = "passwd-file";

pub struct Operator {
    conserver: Conserver,
    relations: Box<dyn RelationStore>,
    hasher: Box<dyn CredentialHasher>,
    config: ConfigInput,
    status: UnitStatus,
    workload_version: Option<String>,
}

impl Operator {
    pub fn new(
        conserver: Conserver,
        relations: Box<dyn RelationStore>,
        hasher: Box<dyn CredentialHasher>,
        config: ConfigInput,
    ) -> Self {
        Self {
            conserver,
            relations,
            hasher,
            config,
            status: UnitStatus::Maintenance(None),
            workload_version: None,
        }
    }

    pub fn status(&self) -> &UnitStatus {
        &self.status
    }

    pub fn workload_version(&self) -> Option<&str> {
        self.workload_version.as_deref()
    }

    pub fn conserver(&self) -> &Conserver {
        &self.conserver
    }

    fn main_config(&self) -> Decoded {
        decode::decode(CONFIG_FILE, self.config.config_file.as_deref())
    }

    fn passwords(&self) -> Decoded {
        decode::decode(PASSWD_FILE, self.config.passwd_file.as_deref())
    }

    pub fn on_install(&mut self) -> Result<&UnitStatus> {
        self.status = UnitStatus::maintenance("Installing conserver-server");
        self.conserver.install()?;
        Ok(self.set_status())
    }

    pub fn on_config_changed(&mut self) -> &UnitStatus {
        self.status = UnitStatus::maintenance("Updating configuration");

        if let Decoded::Present(contents) = self.main_config() {
            if self.conserver.write_conserver_config(&contents).is_err() {
                self.status = UnitStatus::blocked(format!("Failed to write {}", constants::CONSERVER_CF));
                return &self.status;
            }
        }

        // An undecodable operator block must not be replaced by the relation
        // entries alone; the previous file stays until it is fixed.
        let passwords = self.passwords();
        if !passwords.is_invalid() {
            let merged = merge::merge_password_file(
                passwords.as_present(),
                self.relations.as_mut(),
                self.hasher.as_ref(),
            );
            if let Some(contents) = merged {
                if self.conserver.write_passwd_file(&contents).is_err() {
                    self.status =
                        UnitStatus::blocked(format!("Failed to write {}", constants::CONSERVER_PASSWD));
                    return &self.status;
                }
            }
        }

        // The previous configuration keeps serving if the reload fails.
        let _ = self.conserver.reload(true, ErrorPolicy::Ignore);
        self.set_status()
    }

    pub fn on_start(&mut self) -> &UnitStatus {
        let _ = self.conserver.start(ErrorPolicy::Ignore);
        let version = self.conserver.version();
        tracing::info!(version = %version, "workload version");
        self.workload_version = Some(version);
        self.set_status()
    }

    pub fn on_stop(&mut self) -> &UnitStatus {
        // Teardown is best-effort; failures are logged by the policy.
        let _ = self.conserver.stop(ErrorPolicy::Ignore);
        let _ = self.conserver.uninstall(ErrorPolicy::Ignore);
        self.set_status()
    }

    /// A relation joined or changed its data.
    pub fn on_relation_changed(&mut self, relation: &RelationId) -> &UnitStatus {
        tracing::info!(relation = %relation, "relation changed");
        self.on_config_changed()
    }

    /// A relation is gone: drop it and its data from the store, then
    /// re-render without its entry.
    pub fn on_relation_broken(&mut self, relation: &RelationId) -> &UnitStatus {
        tracing::info!(relation = %relation, "relation broken");
        match self.relations.remove(relation) {
            Ok(true) => {}
            Ok(false) => tracing::warn!(relation = %relation, "relation was not registered"),
            Err(e) => tracing::warn!(relation = %relation, error = %e, "cannot remove relation"),
        }
        self.on_config_changed()
    }

    /// Compute the status from current inputs and live service state,
    /// without side effects.
    pub fn compute_status(&self) -> UnitStatus {
        let main_config = self.main_config();
        let passwords = self.passwords();
        status::reconcile(StatusInputs {
            main_config: &main_config,
            passwords: &passwords,
            relation_credentials: merge::has_relation_credentials(self.relations.as_ref()),
            service: ServiceState {
                running: self.conserver.running(),
                failed: self.conserver.failed(),
            },
        })
    }

    fn set_status(&mut self) -> &UnitStatus {
        self.status = self.compute_status();
        tracing::info!(status = %self.status, "unit status");
        &self.status
    }
}
