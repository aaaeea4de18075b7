//! `berth db`: direct operations against a running MySQL/MariaDB server.

use serde_json::json;
use tracing::instrument;

use berth_adapters::MysqlConnector;
use berth_core::{application::DirectConnectionProvisioner, domain::AdminCredentials};

use crate::{
    cli::{DbCheckArgs, DbCommands, DbCreateArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(cmd: DbCommands, _config: AppConfig, output: OutputManager) -> CliResult<()> {
    let provisioner = DirectConnectionProvisioner::new(Box::new(MysqlConnector::default()));

    match cmd {
        DbCommands::Check(args) => check(&provisioner, args, &output),
        DbCommands::Create(args) => create(&provisioner, args, &output),
    }
}

#[instrument(skip_all, fields(host = %args.server.host, port = args.server.port))]
fn check(
    provisioner: &DirectConnectionProvisioner,
    args: DbCheckArgs,
    output: &OutputManager,
) -> CliResult<()> {
    let usable = provisioner.check_connection(
        &args.server.host,
        args.server.port,
        &args.user,
        &args.password,
    );

    if output.is_json() {
        output.json(&json!({ "usable": usable }))?;
    }

    if !usable {
        return Err(CliError::ConnectionCheckFailed {
            host: args.server.host,
            port: args.server.port,
            user: args.user,
        });
    }

    output.success(&format!(
        "Connected to {}:{} as '{}'",
        args.server.host, args.server.port, args.user
    ))?;
    Ok(())
}

#[instrument(skip_all, fields(host = %args.server.host, database = %args.db_name))]
fn create(
    provisioner: &DirectConnectionProvisioner,
    args: DbCreateArgs,
    output: &OutputManager,
) -> CliResult<()> {
    let admin = AdminCredentials::new(args.admin_user, args.admin_password);

    provisioner.create_database_and_user(
        &args.server.host,
        args.server.port,
        &admin,
        &args.db_name,
        &args.db_user,
        &args.db_password,
    )?;

    output.success(&format!(
        "Database '{}' ready; '{}'@localhost has privileges on it only",
        args.db_name, args.db_user
    ))?;
    Ok(())
}
