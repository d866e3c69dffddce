//! Root enforcement for events that touch the real `/etc/conserver`.

use crate::constants;
use crate::core::paths::OperatorPaths;
use anyhow::{bail, Result};

/// Mutating `event` against the system root needs root, since artifacts are
/// chowned to root and `conservr`. Sandboxed roots only need write access.
pub fn check_event_privileges(event: &str, paths: &OperatorPaths) -> Result<()> {
    if paths.is_system_root() && !nix::unistd::geteuid().is_root() {
        bail!(
            "'{}' writes {} as root and {}; run it as root or pass --root",
            event,
            paths.conserver_dir.display(),
            constants::CONSERVER_USER
        );
    }
    Ok(())
}
