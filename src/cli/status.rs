//! Read-only `status` and `version` commands.

use crate::cli::CliContext;
use crate::core::relation_store::RelationStore;
use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format: text|json
    #[arg(long, default_value = "text")]
    pub format: String,
}

#[derive(Serialize)]
struct StatusReport<'a> {
    status: &'a str,
    message: &'a str,
    version: String,
    relations: usize,
}

pub fn run(ctx: &CliContext, args: StatusArgs) -> Result<()> {
    if args.format != "text" && args.format != "json" {
        bail!("invalid format: {} (use text|json)", args.format);
    }

    let operator = ctx.operator();
    let status = operator.compute_status();

    if args.format == "json" {
        let relations = ctx
            .relation_store()
            .relations()
            .map(|r| r.len())
            .unwrap_or(0);
        let report = StatusReport {
            status: status.name(),
            message: status.message(),
            version: operator.conserver().version(),
            relations,
        };
        let json = serde_json::to_string_pretty(&report).context("serialize status")?;
        println!("{}", json);
        return Ok(());
    }

    println!("{}", status);
    Ok(())
}

pub fn run_version(ctx: &CliContext) -> Result<()> {
    println!("{}", ctx.operator().conserver().version());
    Ok(())
}
