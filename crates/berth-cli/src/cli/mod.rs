//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use berth_core::domain::{LOOPBACK, ServiceKind};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "berth",
    bin_name = "berth",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Backing services for PHP applications",
    long_about = "Berth provisions MySQL, MariaDB and Redis for a PHP application. \
                  It tries a container topology first and falls back to a local \
                  server when containers are unavailable.",
    after_help = "EXAMPLES:\n\
        \x20 berth provision mysql --dir ./shop\n\
        \x20 berth provision redis --dir ./shop --password sekret --no-admin-ui\n\
        \x20 berth provision mariadb --local --admin-user root --admin-password root\n\
        \x20 berth completions bash > /usr/share/bash-completion/completions/berth",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Provision a backing service (container first, local fallback).
    #[command(
        visible_alias = "p",
        about = "Provision a backing service",
        after_help = "EXAMPLES:\n\
            \x20 berth provision mysql   --dir ./shop --port 3307\n\
            \x20 berth provision redis   --dir ./shop --password sekret\n\
            \x20 berth provision mariadb --local --admin-user root --admin-password root"
    )]
    Provision(ProvisionArgs),

    /// Write the compose manifest without starting anything.
    #[command(
        about = "Generate a compose manifest",
        after_help = "EXAMPLES:\n\
            \x20 berth compose mysql --dir ./shop\n\
            \x20 berth compose redis --dir ./shop --no-admin-ui"
    )]
    Compose(ComposeArgs),

    /// Stop a topology started by `provision`.
    #[command(about = "Stop the service topology in a directory")]
    Down(DownArgs),

    /// Talk to a running MySQL/MariaDB server directly.
    #[command(
        about = "Direct database operations",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 berth db check  --user app --password secret\n\
            \x20 berth db create --admin-user root --admin-password root --db-name shop"
    )]
    Db(DbCommands),

    /// List supported service kinds.
    #[command(
        visible_alias = "ls",
        about = "List supported services",
        after_help = "EXAMPLES:\n\
            \x20 berth services\n\
            \x20 berth services --format json"
    )]
    Services(ServicesArgs),

    /// Initialise a Berth configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 berth init           # global config\n\
            \x20 berth init --local   # ./.berth.toml"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 berth completions bash > ~/.local/share/bash-completion/completions/berth\n\
            \x20 berth completions zsh  > ~/.zfunc/_berth\n\
            \x20 berth completions fish > ~/.config/fish/completions/berth.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Berth configuration.
    #[command(
        about = "Configuration inspection",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 berth config get health_check.max_attempts\n\
            \x20 berth config list\n\
            \x20 berth config path"
    )]
    Config(ConfigCommands),
}

// ── shared argument groups ────────────────────────────────────────────────────

/// Requested connection values shared by `provision` and `compose`.
#[derive(Debug, Clone, Default, Args)]
pub struct ConnectionArgs {
    /// Host of a pre-existing server (used by the local strategy).
    #[arg(long = "host", value_name = "HOST", default_value = LOOPBACK)]
    pub host: String,

    /// Port to publish / connect to (service default when omitted).
    #[arg(long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Cache password.
    #[arg(long = "password", value_name = "SECRET")]
    pub password: Option<String>,

    /// Application schema name.
    #[arg(long = "db-name", value_name = "NAME")]
    pub db_name: Option<String>,

    /// Application database user.
    #[arg(long = "db-user", value_name = "USER")]
    pub db_user: Option<String>,

    /// Application database user's password.
    #[arg(long = "db-password", value_name = "SECRET")]
    pub db_password: Option<String>,

    /// Server root password (container image and health probe).
    #[arg(long = "root-password", value_name = "SECRET")]
    pub root_password: Option<String>,
}

/// Target directory and naming shared by `provision` and `compose`.
#[derive(Debug, Clone, Args)]
pub struct TopologyArgs {
    /// Application directory that receives `docker-compose.yml`.
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Name used for container, volume and network prefixes.
    #[arg(long = "app-name", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Leave the admin-UI sidecar out of the manifest.
    #[arg(long = "no-admin-ui")]
    pub no_admin_ui: bool,
}

// ── provision ─────────────────────────────────────────────────────────────────

/// Arguments for `berth provision`.
#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Service to provision.
    #[arg(value_enum, value_name = "KIND")]
    pub kind: ServiceKindArg,

    #[command(flatten)]
    pub topology: TopologyArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Skip containers and use a server that is already running.
    #[arg(long = "local")]
    pub local: bool,

    /// Container runtime binary (overrides `container.runtime`).
    #[arg(long = "runtime", value_name = "BINARY")]
    pub runtime: Option<String>,

    /// Administrator user for direct provisioning on the local path.
    #[arg(long = "admin-user", value_name = "USER", requires = "admin_password")]
    pub admin_user: Option<String>,

    /// Administrator password for direct provisioning.
    #[arg(long = "admin-password", value_name = "SECRET", requires = "admin_user")]
    pub admin_password: Option<String>,
}

// ── compose ───────────────────────────────────────────────────────────────────

/// Arguments for `berth compose`.
#[derive(Debug, Args)]
pub struct ComposeArgs {
    /// Service whose manifest to generate.
    #[arg(value_enum, value_name = "KIND")]
    pub kind: ServiceKindArg,

    #[command(flatten)]
    pub topology: TopologyArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

// ── down ──────────────────────────────────────────────────────────────────────

/// Arguments for `berth down`.
#[derive(Debug, Args)]
pub struct DownArgs {
    /// Directory holding `docker-compose.yml`.
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Container runtime binary (overrides `container.runtime`).
    #[arg(long = "runtime", value_name = "BINARY")]
    pub runtime: Option<String>,
}

// ── db ────────────────────────────────────────────────────────────────────────

/// Subcommands for `berth db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check that a user can connect and run a query.
    Check(DbCheckArgs),
    /// Create a schema and a user limited to it.
    Create(DbCreateArgs),
}

/// Server address shared by the `db` subcommands.
#[derive(Debug, Clone, Args)]
pub struct ServerArgs {
    #[arg(long = "host", value_name = "HOST", default_value = LOOPBACK)]
    pub host: String,

    #[arg(long = "port", value_name = "PORT", default_value_t = 3306)]
    pub port: u16,
}

#[derive(Debug, Args)]
pub struct DbCheckArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    #[arg(long = "user", value_name = "USER")]
    pub user: String,

    #[arg(long = "password", value_name = "SECRET", default_value = "")]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct DbCreateArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    #[arg(long = "admin-user", value_name = "USER", default_value = "root")]
    pub admin_user: String,

    #[arg(long = "admin-password", value_name = "SECRET")]
    pub admin_password: String,

    #[arg(long = "db-name", value_name = "NAME")]
    pub db_name: String,

    #[arg(long = "db-user", value_name = "USER")]
    pub db_user: String,

    #[arg(long = "db-password", value_name = "SECRET")]
    pub db_password: String,
}

// ── services ──────────────────────────────────────────────────────────────────

/// Arguments for `berth services`.
#[derive(Debug, Args)]
pub struct ServicesArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `services` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `berth init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.berth.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `berth completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `berth config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `container.runtime`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the global configuration file.
    Path,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Service kinds accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum ServiceKindArg {
    Mysql,
    /// Also accepted as `maria`.
    #[value(alias = "maria")]
    Mariadb,
    /// Also accepted as `cache`.
    #[value(alias = "cache")]
    Redis,
}

impl From<ServiceKindArg> for ServiceKind {
    fn from(arg: ServiceKindArg) -> Self {
        match arg {
            ServiceKindArg::Mysql => ServiceKind::MySql,
            ServiceKindArg::Mariadb => ServiceKind::MariaDb,
            ServiceKindArg::Redis => ServiceKind::Redis,
        }
    }
}

impl std::fmt::Display for ServiceKindArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(ServiceKind::from(*self).as_str())
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
