//! `systemctl`-backed service manager.

use crate::core::service::{ServiceAction, ServiceError, ServiceManager};
use anyhow::{bail, Context, Result};
use std::process::{Command, Stdio};

#[derive(Debug, Default, Clone, Copy)]
pub struct Systemctl;

impl Systemctl {
    fn action(&self, service: &str, action: ServiceAction, args: &[&str]) -> Result<(), ServiceError> {
        let mut cmd = Command::new("systemctl");
        cmd.args(args).arg(service);
        run(cmd)
            .with_context(|| format!("systemctl {}", args.join(" ")))
            .map_err(|e| ServiceError {
                service: service.to_string(),
                action,
                reason: format!("{:#}", e),
            })
    }

    fn query(&self, service: &str, verb: &str) -> bool {
        Command::new("systemctl")
            .arg(verb)
            .arg("--quiet")
            .arg(service)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl ServiceManager for Systemctl {
    fn enable(&self, service: &str) -> Result<(), ServiceError> {
        self.action(service, ServiceAction::Enable, &["enable", "--now"])
    }

    fn disable(&self, service: &str) -> Result<(), ServiceError> {
        self.action(service, ServiceAction::Disable, &["disable", "--now"])
    }

    fn reload(&self, service: &str, restart_on_failure: bool) -> Result<(), ServiceError> {
        match self.action(service, ServiceAction::Reload, &["reload"]) {
            Ok(()) => Ok(()),
            Err(e) if restart_on_failure => {
                tracing::warn!(service, error = %e, "reload failed, restarting");
                self.action(service, ServiceAction::Reload, &["restart"])
            }
            Err(e) => Err(e),
        }
    }

    fn is_running(&self, service: &str) -> bool {
        self.query(service, "is-active")
    }

    fn is_failed(&self, service: &str) -> bool {
        self.query(service, "is-failed")
    }
}

pub(crate) fn run(mut cmd: Command) -> Result<()> {
    let output = cmd.output().context("run command")?;
    if output.status.success() {
        return Ok(());
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    bail!("command failed: {}{}", stdout, stderr);
}
