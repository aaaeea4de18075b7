//! Command handlers.
//!
//! Each handler translates parsed arguments into core calls and prints the
//! result. Adapter wiring shared between handlers lives here.

use std::path::Path;

use berth_adapters::{
    LocalFilesystem, SimpleRenderer, SystemProcessRunner, TemplateCatalog, ThreadSleeper,
};
use berth_core::{
    application::{ComposeTopologyGenerator, ContainerLifecycleController},
    domain::{Credentials, ServiceConnectionConfig, ServiceFamily, ServiceKind},
    error::BerthError,
};

use crate::{
    cli::ConnectionArgs,
    config::AppConfig,
    error::{CliError, CliResult},
};

pub mod completions;
pub mod compose;
pub mod config;
pub mod db;
pub mod down;
pub mod init;
pub mod provision;
pub mod services;

/// Template catalog: `templates.dir` from config, else `$BERTH_TEMPLATES_DIR`.
fn template_catalog(config: &AppConfig) -> TemplateCatalog {
    match &config.templates.dir {
        Some(dir) => TemplateCatalog::with_override_dir(dir),
        None => TemplateCatalog::from_env(),
    }
}

fn topology_generator(config: &AppConfig) -> ComposeTopologyGenerator {
    ComposeTopologyGenerator::new(
        Box::new(SimpleRenderer::with_catalog(template_catalog(config))),
        Box::new(LocalFilesystem::new()),
    )
}

fn lifecycle_controller(
    config: &AppConfig,
    runtime_override: Option<String>,
) -> ContainerLifecycleController {
    let mut runtime = config.runtime();
    if let Some(binary) = runtime_override {
        runtime.binary = binary;
    }

    ContainerLifecycleController::new(
        Box::new(SystemProcessRunner::new()),
        Box::new(ThreadSleeper),
        runtime,
    )
}

/// Final component of `dir` (made absolute first so `.` works), or `app`.
fn app_name(explicit: Option<&str>, dir: &Path) -> String {
    if let Some(name) = explicit {
        return name.to_string();
    }

    std::path::absolute(dir)
        .ok()
        .and_then(|path| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "app".into())
}

/// Build the connection request for `kind` from command-line values,
/// filling the gaps with the kind's defaults.
fn requested_config(kind: ServiceKind, args: &ConnectionArgs) -> CliResult<ServiceConnectionConfig> {
    let credentials = match kind.family() {
        ServiceFamily::RelationalDatabase => {
            if args.password.is_some() {
                return Err(CliError::InvalidInput {
                    message: format!("--password applies to redis; use --db-password for {kind}"),
                    source: None,
                });
            }

            let mut credentials = Credentials::database_defaults();
            if let Credentials::Database {
                database,
                username,
                password,
                root_password,
            } = &mut credentials
            {
                overwrite(database, &args.db_name);
                overwrite(username, &args.db_user);
                overwrite(password, &args.db_password);
                overwrite(root_password, &args.root_password);
            }
            credentials
        }
        ServiceFamily::Cache => {
            let database_flags = [
                &args.db_name,
                &args.db_user,
                &args.db_password,
                &args.root_password,
            ];
            if database_flags.iter().any(|flag| flag.is_some()) {
                return Err(CliError::InvalidInput {
                    message: format!("database flags do not apply to {kind}; use --password"),
                    source: None,
                });
            }

            match &args.password {
                Some(password) => Credentials::Password {
                    password: password.clone(),
                },
                None => Credentials::None,
            }
        }
    };

    ServiceConnectionConfig::new(kind, args.host.as_str(), args.port, credentials)
        .map_err(|e| CliError::Core(BerthError::from(e)))
}

fn overwrite(field: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        field.clone_from(value);
    }
}
