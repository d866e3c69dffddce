//! Forwarding unit status lines to journald via `systemd-cat`.
//!
//! Best-effort: hosts without `systemd-cat` simply get no journal entry.

use crate::models::status::UnitStatus;
use std::io::Write;
use std::process::{Command, Stdio};

pub const TAG: &str = "conserver-operator";

/// journald priority for a status: blocked units are warnings.
pub fn priority(status: &UnitStatus) -> &'static str {
    match status {
        UnitStatus::Blocked(_) => "warning",
        UnitStatus::Active | UnitStatus::Maintenance(_) => "info",
    }
}

/// One JSON line describing the status reached by `event`.
pub fn status_line(event: &str, status: &UnitStatus) -> String {
    serde_json::json!({
        "event": event,
        "status": status.name(),
        "message": status.message(),
    })
    .to_string()
}

pub fn forward_status(event: &str, status: &UnitStatus) {
    let mut child = match Command::new("systemd-cat")
        .args(["-t", TAG, "-p", priority(status)])
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(error = %e, "systemd-cat unavailable");
            return;
        }
    };

    if let Some(mut stdin) = child.stdin.take() {
        let _ = writeln!(stdin, "{}", status_line(event, status));
    }
    let _ = child.wait();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_is_warning() {
        assert_eq!(priority(&UnitStatus::blocked("Missing config-file in config")), "warning");
        assert_eq!(priority(&UnitStatus::Active), "info");
        assert_eq!(priority(&UnitStatus::Maintenance(None)), "info");
    }

    #[test]
    fn test_status_line_is_json() {
        let line = status_line("config-changed", &UnitStatus::blocked("Failed to write conserver.cf"));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "config-changed");
        assert_eq!(value["status"], "blocked");
        assert_eq!(value["message"], "Failed to write conserver.cf");
    }
}
