//! CLI routing and event dispatch.

use crate::core::artifact::{Accounts, ArtifactWriter};
use crate::core::credentials::Sha512Crypt;
use crate::core::inputs;
use crate::core::operator::Operator;
use crate::core::paths::OperatorPaths;
use crate::core::relation_store::FileRelationStore;
use crate::core::service::{PackageManager, ServiceManager};
use crate::core::workload::Conserver;
use crate::models::config::ConfigInput;
use crate::models::status::UnitStatus;
use crate::util::{apt::Apt, journald, logging, privilege, systemd::Systemctl};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod configure;
pub mod event;
pub mod status;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: OperatorPaths,
    pub inputs: ConfigInput,
    pub config_path: PathBuf,
}

impl CliContext {
    pub fn relation_store(&self) -> FileRelationStore {
        FileRelationStore::new(
            self.paths.relations_toml.clone(),
            self.paths.relations_lock.clone(),
        )
    }

    /// Build the operator with production collaborators.
    pub fn operator(&self) -> Operator {
        self.operator_with(Box::new(Apt), Box::new(Systemctl))
    }

    pub fn operator_with(
        &self,
        packages: Box<dyn PackageManager>,
        service: Box<dyn ServiceManager>,
    ) -> Operator {
        let accounts = if self.paths.is_system_root() {
            Accounts::System
        } else {
            Accounts::current()
        };
        let writer = ArtifactWriter::new(self.paths.clone(), accounts);
        let conserver = Conserver::new(packages, service, writer);
        Operator::new(
            conserver,
            Box::new(self.relation_store()),
            Box::new(Sha512Crypt),
            self.inputs.clone(),
        )
    }

    /// Print the status and forward it to journald.
    pub fn report(&self, event: &str, status: &UnitStatus) {
        println!("{}", status);
        journald::forward_status(event, status);
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "conserver-operator",
    version,
    about = "Lifecycle manager for the conserver console server"
)]
pub struct Cli {
    /// Filesystem root the artifacts are written under
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Directory holding config inputs and relation data
    #[arg(long, global = true, value_name = "PATH")]
    pub state_dir: Option<PathBuf>,

    /// Config inputs file (default: <state-dir>/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base64 conserver.cf content, overriding the config file
    #[arg(long, global = true, env = "CONSERVER_CONFIG_FILE", hide_env_values = true)]
    pub config_file: Option<String>,

    /// Base64 conserver.passwd content, overriding the config file
    #[arg(long, global = true, env = "CONSERVER_PASSWD_FILE", hide_env_values = true)]
    pub passwd_file: Option<String>,

    /// Log filter when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        logging::init(&self.log_level);

        let paths = OperatorPaths::resolve(self.root, self.state_dir);
        let config_path = self.config.unwrap_or_else(|| paths.config_toml.clone());
        let overrides = ConfigInput {
            config_file: self.config_file,
            passwd_file: self.passwd_file,
        };
        let stored = inputs::load(&config_path)?;

        if self.command.requires_root() {
            privilege::check_event_privileges(self.command.name(), &paths)?;
            paths.prepare_state_dir()?;
        }

        let ctx = CliContext {
            paths,
            inputs: stored.merged_with(overrides),
            config_path,
        };

        match self.command {
            Commands::Install => event::run_install(&ctx),
            Commands::ConfigChanged => event::run_config_changed(&ctx),
            Commands::Start => event::run_start(&ctx),
            Commands::Stop => event::run_stop(&ctx),
            Commands::RelationChanged(args) => event::run_relation_changed(&ctx, args),
            Commands::RelationBroken(args) => event::run_relation_broken(&ctx, args),
            Commands::Configure(args) => configure::run(ctx, args),
            Commands::Status(args) => status::run(&ctx, args),
            Commands::Version => status::run_version(&ctx),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install packages and write server.conf
    Install,
    /// Render conserver.cf and conserver.passwd, then reload
    ConfigChanged,
    /// Enable and start the service
    Start,
    /// Stop the service and remove packages
    Stop,
    /// Register or refresh a conserver relation
    RelationChanged(event::RelationArgs),
    /// Forget a conserver relation
    RelationBroken(event::BrokenArgs),
    /// Store new config inputs and apply them
    Configure(configure::ConfigureArgs),
    /// Show the unit status (read-only)
    Status(status::StatusArgs),
    /// Show the installed conserver version
    Version,
}

impl Commands {
    /// Whether this command changes system or operator state.
    pub fn requires_root(&self) -> bool {
        !matches!(self, Commands::Status(_) | Commands::Version)
    }

    /// Command name for error messages.
    pub fn name(&self) -> &str {
        match self {
            Commands::Install => "install",
            Commands::ConfigChanged => "config-changed",
            Commands::Start => "start",
            Commands::Stop => "stop",
            Commands::RelationChanged(_) => "relation-changed",
            Commands::RelationBroken(_) => "relation-broken",
            Commands::Configure(_) => "configure",
            Commands::Status(_) => "status",
            Commands::Version => "version",
        }
    }
}
