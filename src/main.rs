use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = conserver_operator::cli::Cli::parse();
    cli.run()
}
