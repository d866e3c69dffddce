//! Filesystem layout for artifacts and operator state.

use crate::constants;
use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Clone)]
pub struct OperatorPaths {
    pub root: PathBuf,
    pub conserver_dir: PathBuf,
    pub server_conf: PathBuf,
    pub conserver_cf: PathBuf,
    pub conserver_passwd: PathBuf,
    pub state_dir: PathBuf,
    pub config_toml: PathBuf,
    pub relations_toml: PathBuf,
    pub relations_lock: PathBuf,
}

impl OperatorPaths {
    /// Resolve paths from CLI args, env vars, or the defaults.
    pub fn resolve(root_arg: Option<PathBuf>, state_arg: Option<PathBuf>) -> Self {
        let root = root_arg
            .or_else(|| env::var("CONSERVER_OPERATOR_ROOT").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("/"));
        let state_dir = state_arg
            .or_else(|| env::var("CONSERVER_OPERATOR_STATE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_STATE_DIR));
        Self::new(root, state_dir)
    }

    pub fn new(root: PathBuf, state_dir: PathBuf) -> Self {
        let conserver_dir = root.join(constants::CONSERVER_DIR);
        let server_conf = conserver_dir.join(constants::SERVER_CONF);
        let conserver_cf = conserver_dir.join(constants::CONSERVER_CF);
        let conserver_passwd = conserver_dir.join(constants::CONSERVER_PASSWD);
        let config_toml = state_dir.join("config.toml");
        let relations_toml = state_dir.join("relations.toml");
        let relations_lock = state_dir.join("relations.lock");
        Self {
            root,
            conserver_dir,
            server_conf,
            conserver_cf,
            conserver_passwd,
            state_dir,
            config_toml,
            relations_toml,
            relations_lock,
        }
    }

    /// Both the root and the state directory live under `dir`.
    pub fn sandboxed(dir: PathBuf) -> Self {
        Self::new(dir.join("root"), dir.join("state"))
    }

    /// Create the state directory if needed and restrict it to the owner;
    /// it holds plaintext relation passwords.
    pub fn prepare_state_dir(&self) -> Result<()> {
        let dir = &self.state_dir;
        if dir.exists() && !dir.is_dir() {
            bail!("state path {} is not a directory", dir.display());
        }
        fs::create_dir_all(dir).with_context(|| format!("create state dir {}", dir.display()))?;
        #[cfg(unix)]
        {
            let perm = fs::Permissions::from_mode(constants::STATE_DIR_MODE);
            fs::set_permissions(dir, perm)
                .with_context(|| format!("restrict state dir {}", dir.display()))?;
        }
        Ok(())
    }

    /// Whether artifacts go to the real system locations.
    pub fn is_system_root(&self) -> bool {
        self.root == PathBuf::from("/")
    }
}

impl std::fmt::Display for OperatorPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conserver@{}", self.conserver_dir.display())
    }
}
