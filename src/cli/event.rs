//! Triggering events: install, config-changed, start, stop and relation
//! changes.

use crate::cli::CliContext;
use crate::core::operator::Operator;
use crate::core::relation_store::RelationStore;
use crate::models::relation::RelationId;
use crate::models::status::UnitStatus;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct RelationArgs {
    /// Relation id
    #[arg(long)]
    pub id: u32,

    /// Remote application name
    #[arg(long)]
    pub app: String,
}

#[derive(Args, Debug)]
pub struct BrokenArgs {
    /// Relation id
    #[arg(long)]
    pub id: u32,
}

pub fn run_install(ctx: &CliContext) -> Result<()> {
    let mut operator = ctx.operator();
    let status = operator.on_install()?.clone();
    ctx.report("install", &status);
    Ok(())
}

pub fn run_config_changed(ctx: &CliContext) -> Result<()> {
    let mut operator = ctx.operator();
    let status = operator.on_config_changed().clone();
    ctx.report("config-changed", &status);
    Ok(())
}

pub fn run_start(ctx: &CliContext) -> Result<()> {
    let mut operator = ctx.operator();
    let status = operator.on_start().clone();
    if let Some(version) = operator.workload_version() {
        println!("version: {}", version);
    }
    ctx.report("start", &status);
    Ok(())
}

pub fn run_stop(ctx: &CliContext) -> Result<()> {
    let mut operator = ctx.operator();
    let status = operator.on_stop().clone();
    ctx.report("stop", &status);
    Ok(())
}

pub fn run_relation_changed(ctx: &CliContext, args: RelationArgs) -> Result<()> {
    let status = relation_changed(ctx, ctx.operator(), args)?;
    ctx.report("relation-changed", &status);
    Ok(())
}

pub fn run_relation_broken(ctx: &CliContext, args: BrokenArgs) -> Result<()> {
    let status = relation_broken(ctx, ctx.operator(), args)?;
    ctx.report("relation-broken", &status);
    Ok(())
}

fn relation_changed(
    ctx: &CliContext,
    mut operator: Operator,
    args: RelationArgs,
) -> Result<UnitStatus> {
    let relation = RelationId::new(args.id, args.app);
    ctx.relation_store().join(&relation)?;
    Ok(operator.on_relation_changed(&relation).clone())
}

fn relation_broken(ctx: &CliContext, mut operator: Operator, args: BrokenArgs) -> Result<UnitStatus> {
    // The remote app name is only known from the join.
    let relation = ctx
        .relation_store()
        .relations()?
        .into_iter()
        .find(|r| r.id == args.id)
        .unwrap_or_else(|| RelationId::new(args.id, "unknown"));
    Ok(operator.on_relation_broken(&relation).clone())
}
