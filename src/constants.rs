//! Centralized constants for packages, paths, permissions, and ports.

/// Debian package providing the conserver daemon.
pub const CONSERVER_DEB: &str = "conserver-server";

/// Debian package providing ipmitool, used by console definitions.
pub const IPMITOOL_DEB: &str = "ipmitool";

/// Packages that must be present for the daemon to be useful.
pub const REQUIRED_PACKAGES: &[&str] = &[CONSERVER_DEB, IPMITOOL_DEB];

/// Systemd unit name of the daemon.
pub const CONSERVER_SERVICE: &str = "conserver-server";

/// Dedicated service account owning the password file.
pub const CONSERVER_USER: &str = "conservr";

/// Administrative account owning everything else.
pub const ADMIN_USER: &str = "root";

/// Binary queried for the workload version.
pub const CONSERVER_BIN: &str = "conserver";

/// Directory (relative to the filesystem root) holding the artifacts.
pub const CONSERVER_DIR: &str = "etc/conserver";

/// File name of the service options artifact.
pub const SERVER_CONF: &str = "server.conf";

/// File name of the main configuration artifact.
pub const CONSERVER_CF: &str = "conserver.cf";

/// File name of the password artifact.
pub const CONSERVER_PASSWD: &str = "conserver.passwd";

/// Listener port for incoming client connections.
pub const LISTEN_PORT: u16 = 3109;

/// Base port for established console connections.
pub const BASE_PORT: u16 = 33000;

/// Permission mode for world-readable artifacts.
pub const PUBLIC_FILE_MODE: u32 = 0o644;

/// Permission mode for the password artifact.
pub const SECRET_FILE_MODE: u32 = 0o600;

/// Permission mode for the state directory.
pub const STATE_DIR_MODE: u32 = 0o700;

/// Default state directory for inputs and relation data.
pub const DEFAULT_STATE_DIR: &str = "/var/lib/conserver-operator";

/// Relation name used by clients of the console server.
pub const RELATION_NAME: &str = "conserver";

/// Relation data key holding the generated username.
pub const RELATION_USERNAME_KEY: &str = "username";

/// Relation data key holding the generated plaintext password.
pub const RELATION_PASSWORD_KEY: &str = "password";

/// Length of generated relation passwords.
pub const DEFAULT_PASSWORD_LENGTH: usize = 32;

/// Render the fixed contents of `server.conf`.
pub fn server_options() -> String {
    format!("OPTS='-p {} -b {}  '\nASROOT=\n", LISTEN_PORT, BASE_PORT)
}
