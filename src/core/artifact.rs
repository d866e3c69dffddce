//! Writing the conserver artifacts with fixed ownership and permissions.

use crate::constants;
use crate::core::paths::OperatorPaths;
use nix::unistd::{self, Gid, Uid, User};
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// The files this operator owns under `/etc/conserver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    ServerOptions,
    MainConfig,
    Passwords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Admin,
    Daemon,
}

/// Owner and mode an artifact must end up with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub owner: Owner,
    pub mode: u32,
}

impl ArtifactKind {
    pub fn profile(self) -> Profile {
        match self {
            ArtifactKind::ServerOptions | ArtifactKind::MainConfig => Profile {
                owner: Owner::Admin,
                mode: constants::PUBLIC_FILE_MODE,
            },
            ArtifactKind::Passwords => Profile {
                owner: Owner::Daemon,
                mode: constants::SECRET_FILE_MODE,
            },
        }
    }

    pub fn path(self, paths: &OperatorPaths) -> &Path {
        match self {
            ArtifactKind::ServerOptions => &paths.server_conf,
            ArtifactKind::MainConfig => &paths.conserver_cf,
            ArtifactKind::Passwords => &paths.conserver_passwd,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::ServerOptions => constants::SERVER_CONF,
            ArtifactKind::MainConfig => constants::CONSERVER_CF,
            ArtifactKind::Passwords => constants::CONSERVER_PASSWD,
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub uid: Uid,
    pub gid: Gid,
}

/// How owner accounts are turned into numeric ids.
#[derive(Debug, Clone)]
pub enum Accounts {
    /// `root` for the admin profile, `conservr`:root for the daemon profile.
    System,
    Fixed { admin: Ownership, daemon: Ownership },
}

impl Accounts {
    /// Every profile owned by the calling process. Used for sandboxed roots.
    pub fn current() -> Self {
        let me = Ownership {
            uid: unistd::getuid(),
            gid: unistd::getgid(),
        };
        Accounts::Fixed {
            admin: me,
            daemon: me,
        }
    }

    pub fn resolve(&self, owner: Owner) -> Result<Ownership, AccountError> {
        match self {
            Accounts::Fixed { admin, daemon } => Ok(match owner {
                Owner::Admin => *admin,
                Owner::Daemon => *daemon,
            }),
            Accounts::System => {
                let admin = lookup(constants::ADMIN_USER)?;
                match owner {
                    Owner::Admin => Ok(Ownership {
                        uid: admin.uid,
                        gid: admin.gid,
                    }),
                    Owner::Daemon => {
                        let daemon = lookup(constants::CONSERVER_USER)?;
                        Ok(Ownership {
                            uid: daemon.uid,
                            gid: admin.gid,
                        })
                    }
                }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("user {0} does not exist")]
    Missing(String),
    #[error("look up user {name}: {source}")]
    Lookup { name: String, source: nix::Error },
}

fn lookup(name: &str) -> Result<User, AccountError> {
    User::from_name(name)
        .map_err(|source| AccountError::Lookup {
            name: name.to_string(),
            source,
        })?
        .ok_or_else(|| AccountError::Missing(name.to_string()))
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("create directory {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("resolve owner of {path}: {source}")]
    Owner { path: PathBuf, source: AccountError },
    #[error("chown {path}: {source}")]
    Chown { path: PathBuf, source: nix::Error },
    #[error("chmod {mode:o} {path}: {source}")]
    Chmod {
        path: PathBuf,
        mode: u32,
        source: io::Error,
    },
    #[error("replace {path}: {source}")]
    Persist { path: PathBuf, source: io::Error },
}

/// Writes artifacts atomically: content goes to a temporary file beside
/// the target, which is chowned, chmodded and then renamed into place.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    paths: OperatorPaths,
    accounts: Accounts,
}

impl ArtifactWriter {
    pub fn new(paths: OperatorPaths, accounts: Accounts) -> Self {
        Self { paths, accounts }
    }

    pub fn paths(&self) -> &OperatorPaths {
        &self.paths
    }

    pub fn write(&self, kind: ArtifactKind, content: &str) -> Result<(), ArtifactError> {
        let path = kind.path(&self.paths);
        match self.write_file(path, kind.profile(), content) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "wrote {}", kind);
                Ok(())
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to write {}", kind);
                Err(e)
            }
        }
    }

    fn write_file(&self, path: &Path, profile: Profile, content: &str) -> Result<(), ArtifactError> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|source| ArtifactError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;

        // NamedTempFile starts out 0600, never looser than any profile.
        let write_err = |source| ArtifactError::Write {
            path: path.to_path_buf(),
            source,
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".artifact-")
            .tempfile_in(parent)
            .map_err(write_err)?;
        tmp.write_all(content.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        let ownership = self
            .accounts
            .resolve(profile.owner)
            .map_err(|source| ArtifactError::Owner {
                path: path.to_path_buf(),
                source,
            })?;
        unistd::chown(tmp.path(), Some(ownership.uid), Some(ownership.gid)).map_err(|source| {
            ArtifactError::Chown {
                path: path.to_path_buf(),
                source,
            }
        })?;

        #[cfg(unix)]
        {
            let perm = fs::Permissions::from_mode(profile.mode);
            tmp.as_file()
                .set_permissions(perm)
                .map_err(|source| ArtifactError::Chmod {
                    path: path.to_path_buf(),
                    mode: profile.mode,
                    source,
                })?;
        }

        tmp.persist(path).map_err(|e| ArtifactError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;
        Ok(())
    }
}
