//! Persisted configuration inputs (`config.toml` in the state directory).

use crate::constants;
use crate::models::config::ConfigInput;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub fn load(path: &Path) -> Result<ConfigInput> {
    if !path.exists() {
        return Ok(ConfigInput::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("read config inputs {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parse config inputs {}", path.display()))
}

pub fn save(path: &Path, input: &ConfigInput) -> Result<()> {
    let content = toml::to_string_pretty(input).context("serialize config inputs")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    let mut tmp = tempfile::NamedTempFile::new_in(
        path.parent().unwrap_or_else(|| Path::new(".")),
    )
    .context("create temp config inputs")?;
    tmp.write_all(content.as_bytes())
        .context("write config inputs")?;
    tmp.flush().ok();

    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(constants::SECRET_FILE_MODE);
        tmp.as_file()
            .set_permissions(perm)
            .context("set permissions on temp config inputs")?;
    }

    tmp.persist(path)
        .map_err(|err| anyhow::anyhow!("persist config inputs: {}", err))?;
    Ok(())
}
