//! The conserver workload: packages, service unit, artifacts and version.

use crate::constants;
use crate::core::artifact::{ArtifactError, ArtifactKind, ArtifactWriter};
use crate::core::service::{ErrorPolicy, PackageManager, PackageState, ServiceError, ServiceManager};
use anyhow::{Context, Result};
use regex::Regex;
use std::process::Command;
use std::sync::OnceLock;

pub struct Conserver {
    packages: Box<dyn PackageManager>,
    service: Box<dyn ServiceManager>,
    writer: ArtifactWriter,
    version_bin: String,
}

impl Conserver {
    pub fn new(
        packages: Box<dyn PackageManager>,
        service: Box<dyn ServiceManager>,
        writer: ArtifactWriter,
    ) -> Self {
        Self {
            packages,
            service,
            writer,
            version_bin: constants::CONSERVER_BIN.to_string(),
        }
    }

    /// Query a different binary for the version.
    pub fn with_version_bin(mut self, bin: impl Into<String>) -> Self {
        self.version_bin = bin.into();
        self
    }

    pub fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }

    /// Installed daemon version, or `"unknown"`.
    pub fn version(&self) -> String {
        match Command::new(&self.version_bin).arg("-V").output() {
            Ok(output) => {
                let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
                text.push_str(&String::from_utf8_lossy(&output.stderr));
                parse_version(&text)
            }
            Err(e) => {
                tracing::warn!(bin = %self.version_bin, error = %e, "cannot query conserver version");
                "unknown".to_string()
            }
        }
    }

    pub fn running(&self) -> bool {
        self.service.is_running(constants::CONSERVER_SERVICE)
    }

    pub fn failed(&self) -> bool {
        self.service.is_failed(constants::CONSERVER_SERVICE)
    }

    /// Install both packages at their latest version and write `server.conf`.
    pub fn install(&self) -> Result<()> {
        for package in constants::REQUIRED_PACKAGES {
            ErrorPolicy::Propagate
                .apply(self.packages.ensure(package, PackageState::Latest))
                .with_context(|| format!("install {}", package))?;
        }
        self.writer
            .write(ArtifactKind::ServerOptions, &constants::server_options())
            .context("write service options")?;
        Ok(())
    }

    pub fn uninstall(&self, policy: ErrorPolicy) -> Result<()> {
        for package in constants::REQUIRED_PACKAGES {
            policy
                .apply(self.packages.ensure(package, PackageState::Absent))
                .with_context(|| format!("remove {}", package))?;
        }
        Ok(())
    }

    pub fn start(&self, policy: ErrorPolicy) -> Result<(), ServiceError> {
        let result = self.service.enable(constants::CONSERVER_SERVICE);
        if result.is_ok() {
            tracing::info!("started {} service", constants::CONSERVER_SERVICE);
        }
        policy.apply(result)
    }

    pub fn reload(&self, restart_on_failure: bool, policy: ErrorPolicy) -> Result<(), ServiceError> {
        let result = self
            .service
            .reload(constants::CONSERVER_SERVICE, restart_on_failure);
        if result.is_ok() {
            tracing::info!("reloaded {} service", constants::CONSERVER_SERVICE);
        }
        policy.apply(result)
    }

    pub fn stop(&self, policy: ErrorPolicy) -> Result<(), ServiceError> {
        let result = self.service.disable(constants::CONSERVER_SERVICE);
        if result.is_ok() {
            tracing::info!("stopped {} service", constants::CONSERVER_SERVICE);
        }
        policy.apply(result)
    }

    pub fn write_conserver_config(&self, contents: &str) -> Result<(), ArtifactError> {
        self.writer.write(ArtifactKind::MainConfig, contents)
    }

    pub fn write_passwd_file(&self, contents: &str) -> Result<(), ArtifactError> {
        self.writer.write(ArtifactKind::Passwords, contents)
    }
}

/// Extract the version token from `conserver -V` output.
pub fn parse_version(output: &str) -> String {
    static VERSION: OnceLock<Regex> = OnceLock::new();
    let re = VERSION.get_or_init(|| {
        Regex::new(r"conserver\.com version (\S+)").expect("static version regex")
    });
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Accounts;
    use crate::core::paths::OperatorPaths;
    use crate::testing::{Call, FakePackages, FakeService};
    use std::fs;
    use tempfile::TempDir;

    fn conserver(packages: FakePackages, service: FakeService) -> (TempDir, Conserver) {
        let dir = TempDir::new().unwrap();
        let paths = OperatorPaths::sandboxed(dir.path().to_path_buf());
        let writer = ArtifactWriter::new(paths, Accounts::current());
        let conserver = Conserver::new(Box::new(packages), Box::new(service), writer);
        (dir, conserver)
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("conserver: conserver.com version 8.2.6\n"), "8.2.6");
        assert_eq!(parse_version("unexpected output"), "unknown");
        assert_eq!(parse_version(""), "unknown");
    }

    #[test]
    fn test_version_unknown_when_binary_missing() {
        let (_dir, conserver) = conserver(FakePackages::default(), FakeService::default());
        let conserver = conserver.with_version_bin("definitely-not-conserver-xyz");
        assert_eq!(conserver.version(), "unknown");
    }

    #[test]
    fn test_install_ensures_latest_and_writes_server_conf() {
        let packages = FakePackages::default();
        let (_dir, conserver) = conserver(packages.clone(), FakeService::default());
        conserver.install().unwrap();

        assert_eq!(
            packages.calls(),
            vec![
                ("conserver-server".to_string(), PackageState::Latest),
                ("ipmitool".to_string(), PackageState::Latest),
            ]
        );
        let written = fs::read_to_string(&conserver.writer().paths().server_conf).unwrap();
        assert_eq!(written, "OPTS='-p 3109 -b 33000  '\nASROOT=\n");
    }

    #[test]
    fn test_install_propagates_package_failure() {
        let packages = FakePackages::failing();
        let (_dir, conserver) = conserver(packages.clone(), FakeService::default());
        let err = conserver.install().unwrap_err();
        assert!(format!("{:#}", err).contains("install conserver-server"));
        assert!(!conserver.writer().paths().server_conf.exists());
        assert_eq!(packages.calls().len(), 1);
    }

    #[test]
    fn test_uninstall_ensures_absent() {
        let packages = FakePackages::default();
        let (_dir, conserver) = conserver(packages.clone(), FakeService::default());
        conserver.uninstall(ErrorPolicy::Propagate).unwrap();
        assert!(packages
            .calls()
            .iter()
            .all(|(_, state)| *state == PackageState::Absent));
        assert_eq!(packages.calls().len(), 2);
    }

    #[test]
    fn test_uninstall_ignored_failure_still_tries_both() {
        let packages = FakePackages::failing();
        let (_dir, conserver) = conserver(packages.clone(), FakeService::default());
        conserver.uninstall(ErrorPolicy::Ignore).unwrap();
        assert_eq!(packages.calls().len(), 2);
    }

    #[test]
    fn test_start_stop_reload_call_service() {
        let service = FakeService::default();
        let (_dir, conserver) = conserver(FakePackages::default(), service.clone());
        conserver.start(ErrorPolicy::Propagate).unwrap();
        conserver.reload(true, ErrorPolicy::Propagate).unwrap();
        conserver.stop(ErrorPolicy::Propagate).unwrap();
        assert_eq!(
            service.calls(),
            vec![Call::Enable, Call::Reload { restart_on_failure: true }, Call::Disable]
        );
    }

    #[test]
    fn test_service_errors_respect_policy() {
        let service = FakeService::failing();
        let (_dir, conserver) = conserver(FakePackages::default(), service);
        assert!(conserver.start(ErrorPolicy::Ignore).is_ok());
        assert!(conserver.start(ErrorPolicy::Propagate).is_err());
        assert!(conserver.reload(true, ErrorPolicy::Ignore).is_ok());
        assert!(conserver.reload(false, ErrorPolicy::Propagate).is_err());
        assert!(conserver.stop(ErrorPolicy::Ignore).is_ok());
        assert!(conserver.stop(ErrorPolicy::Propagate).is_err());
    }

    #[test]
    fn test_running_and_failed_are_read_live() {
        let service = FakeService::default();
        let (_dir, conserver) = conserver(FakePackages::default(), service.clone());
        assert!(!conserver.running());
        service.set_state(true, false);
        assert!(conserver.running());
        service.set_state(false, true);
        assert!(!conserver.running());
        assert!(conserver.failed());
    }
}
