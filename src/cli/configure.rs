//! Persist new config inputs, then run config-changed.

use crate::cli::{event, CliContext};
use crate::core::inputs;
use crate::models::config::ConfigInput;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// New base64 conserver.cf content
    #[arg(long, value_name = "BASE64")]
    pub set_config_file: Option<String>,

    /// New base64 conserver.passwd content
    #[arg(long, value_name = "BASE64")]
    pub set_passwd_file: Option<String>,

    /// Unset passwd-file
    #[arg(long, conflicts_with = "set_passwd_file")]
    pub clear_passwd_file: bool,
}

pub fn run(mut ctx: CliContext, args: ConfigureArgs) -> Result<()> {
    if args.set_config_file.is_none() && args.set_passwd_file.is_none() && !args.clear_passwd_file {
        bail!("nothing to configure (use --set-config-file, --set-passwd-file or --clear-passwd-file)");
    }

    let mut stored = inputs::load(&ctx.config_path)?.merged_with(ConfigInput {
        config_file: args.set_config_file,
        passwd_file: args.set_passwd_file,
    });
    if args.clear_passwd_file {
        stored.passwd_file = None;
    }
    inputs::save(&ctx.config_path, &stored)?;
    tracing::info!(path = %ctx.config_path.display(), "stored config inputs");

    ctx.inputs = stored;
    event::run_config_changed(&ctx)
}
