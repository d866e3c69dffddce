//! `apt-get`-backed package manager.

use crate::core::service::{PackageError, PackageManager, PackageState};
use crate::util::systemd::run;
use anyhow::Context;
use std::process::Command;

#[derive(Debug, Default, Clone, Copy)]
pub struct Apt;

impl Apt {
    fn apt_get(args: &[&str], package: &str) -> anyhow::Result<()> {
        let mut cmd = Command::new("apt-get");
        cmd.env("DEBIAN_FRONTEND", "noninteractive")
            .arg("-y")
            .args(args)
            .arg(package);
        run(cmd).with_context(|| format!("apt-get {} {}", args.join(" "), package))
    }
}

impl PackageManager for Apt {
    fn ensure(&self, package: &str, state: PackageState) -> Result<(), PackageError> {
        let result = match state {
            PackageState::Latest => {
                let mut update = Command::new("apt-get");
                update.arg("update");
                // A stale index still lets the install proceed.
                if let Err(e) = run(update) {
                    tracing::warn!(error = %e, "apt-get update failed");
                }
                Self::apt_get(&["install"], package)
            }
            PackageState::Absent => Self::apt_get(&["remove"], package),
        };
        match result {
            Ok(()) => {
                tracing::info!(package, %state, "ensured package state");
                Ok(())
            }
            Err(e) => Err(PackageError {
                package: package.to_string(),
                state,
                reason: format!("{:#}", e),
            }),
        }
    }
}
