//! Relation key-value stores.
//!
//! A [`RelationStore`] exposes the active `conserver` relations and one
//! small key-value store per relation. The file-backed implementation keeps
//! them in `relations.toml` under the state directory.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::models::relation::{RelationFile, RelationId, RelationRecord};
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Error)]
pub enum RelationError {
    #[error("relation {0} is not active")]
    NotFound(RelationId),
    #[error("relation store unavailable: {0}")]
    Unavailable(String),
}

impl From<anyhow::Error> for RelationError {
    fn from(err: anyhow::Error) -> Self {
        RelationError::Unavailable(format!("{:#}", err))
    }
}

pub trait RelationStore {
    /// Active relations, in store iteration order.
    fn relations(&self) -> Result<Vec<RelationId>, RelationError>;

    fn get(&self, relation: &RelationId, key: &str) -> Result<Option<String>, RelationError>;

    fn set(&mut self, relation: &RelationId, key: &str, value: &str) -> Result<(), RelationError>;

    /// Forget a broken relation and its data. Returns whether it was listed.
    fn remove(&mut self, relation: &RelationId) -> Result<bool, RelationError>;

    /// Store `value` under `key` unless a value is already present, and
    /// return whatever the store holds afterwards together with whether
    /// this call wrote it.
    fn set_if_absent(
        &mut self,
        relation: &RelationId,
        key: &str,
        value: &str,
    ) -> Result<(String, bool), RelationError> {
        if let Some(existing) = self.get(relation, key)? {
            return Ok((existing, false));
        }
        self.set(relation, key, value)?;
        Ok((value.to_string(), true))
    }
}

/// TOML-backed relation store guarded by an exclusive file lock.
#[derive(Debug, Clone)]
pub struct FileRelationStore {
    path: PathBuf,
    lock: PathBuf,
}

impl FileRelationStore {
    pub fn new(path: PathBuf, lock: PathBuf) -> Self {
        Self { path, lock }
    }

    /// Register a relation. Existing data for the same id is kept.
    pub fn join(&mut self, relation: &RelationId) -> Result<()> {
        let _lock = FileLock::exclusive(&self.lock)?;
        let mut file = load(&self.path)?;
        if let Some(existing) = file.relations.iter_mut().find(|r| r.id == relation.id) {
            existing.app = relation.app.clone();
        } else {
            file.relations.push(RelationRecord {
                id: relation.id,
                app: relation.app.clone(),
                data: Default::default(),
            });
        }
        save(&self.path, &file)
    }

    fn update<T>(
        &mut self,
        relation: &RelationId,
        f: impl FnOnce(&mut RelationRecord) -> T,
    ) -> Result<T, RelationError> {
        let _lock = FileLock::exclusive(&self.lock)?;
        let mut file = load(&self.path)?;
        let record = file
            .relations
            .iter_mut()
            .find(|r| r.id == relation.id)
            .ok_or_else(|| RelationError::NotFound(relation.clone()))?;
        let out = f(record);
        save(&self.path, &file)?;
        Ok(out)
    }
}

impl RelationStore for FileRelationStore {
    fn relations(&self) -> Result<Vec<RelationId>, RelationError> {
        let file = load(&self.path)?;
        Ok(file.relations.iter().map(RelationRecord::relation_id).collect())
    }

    fn get(&self, relation: &RelationId, key: &str) -> Result<Option<String>, RelationError> {
        let file = load(&self.path)?;
        let record = file
            .relations
            .iter()
            .find(|r| r.id == relation.id)
            .ok_or_else(|| RelationError::NotFound(relation.clone()))?;
        Ok(record.data.get(key).cloned())
    }

    fn set(&mut self, relation: &RelationId, key: &str, value: &str) -> Result<(), RelationError> {
        self.update(relation, |record| {
            record.data.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&mut self, relation: &RelationId) -> Result<bool, RelationError> {
        let _lock = FileLock::exclusive(&self.lock)?;
        let mut file = load(&self.path)?;
        let before = file.relations.len();
        file.relations.retain(|r| r.id != relation.id);
        if file.relations.len() == before {
            return Ok(false);
        }
        save(&self.path, &file)?;
        Ok(true)
    }

    fn set_if_absent(
        &mut self,
        relation: &RelationId,
        key: &str,
        value: &str,
    ) -> Result<(String, bool), RelationError> {
        // Checked and written under one lock so a concurrent event cannot
        // replace a password that was already handed out.
        self.update(relation, |record| match record.data.get(key) {
            Some(existing) => (existing.clone(), false),
            None => {
                record.data.insert(key.to_string(), value.to_string());
                (value.to_string(), true)
            }
        })
    }
}

fn load(path: &Path) -> Result<RelationFile> {
    if !path.exists() {
        return Ok(RelationFile::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read relation data {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse relation data {}", path.display()))
}

fn save(path: &Path, file: &RelationFile) -> Result<()> {
    let content = toml::to_string_pretty(file).context("serialize relation data")?;
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent).context("create temp relation data")?;
    tmp.write_all(content.as_bytes())
        .context("write relation data")?;
    tmp.flush().ok();

    // Holds plaintext relation passwords.
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(constants::SECRET_FILE_MODE);
        tmp.as_file()
            .set_permissions(perm)
            .context("set permissions on temp relation data")?;
    }

    tmp.persist(path)
        .map_err(|err| anyhow::anyhow!("persist relation data: {}", err))?;
    Ok(())
}
