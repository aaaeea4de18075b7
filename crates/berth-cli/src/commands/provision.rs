//! Implementation of the `berth provision` command.
//!
//! Responsibility: translate CLI arguments into a connection request, run
//! the core orchestrator, and display the resulting connection values.

use tracing::{info, instrument};

use berth_adapters::MysqlConnector;
use berth_core::{
    application::{DirectConnectionProvisioner, ProvisionOptions, ProvisioningOrchestrator},
    domain::{
        AdminCredentials, Credentials, FailureStage, ProvisioningOutcome, ServiceConnectionConfig,
        ServiceFamily, ServiceKind,
    },
};

use crate::{
    cli::ProvisionArgs,
    commands::{app_name, lifecycle_controller, requested_config, topology_generator},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `berth provision` command.
///
/// A container failure is not an error here: the outcome falls back to the
/// local strategy and a note is printed. Only a failed direct provisioning
/// (`success: false`) exits non-zero.
#[instrument(skip_all, fields(kind = %args.kind))]
pub fn execute(args: ProvisionArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let kind = ServiceKind::from(args.kind);

    let mut requested = requested_config(kind, &args.connection)?;
    if args.local || !config.container.enabled {
        requested = requested.prefer_local();
    }

    let mut options = ProvisionOptions::default().with_app_name(app_name(
        args.topology.app_name.as_deref(),
        &args.topology.dir,
    ));
    if args.topology.no_admin_ui || !config.container.admin_ui {
        options = options.without_sidecars();
    }
    if let (Some(user), Some(password)) = (args.admin_user, args.admin_password) {
        options = options.with_admin(AdminCredentials::new(user, password));
    }

    let orchestrator = ProvisioningOrchestrator::new(
        topology_generator(&config),
        lifecycle_controller(&config, args.runtime),
    )
    .with_provisioner(DirectConnectionProvisioner::new(Box::new(
        MysqlConnector::default(),
    )))
    .with_budget(config.budget());

    let spinner = output.spinner(&format!("Provisioning {kind}"));
    let outcome = orchestrator.provision_with(kind, requested, &args.topology.dir, &options);
    spinner.finish();
    let outcome = outcome?;

    info!(
        attempt_id = %outcome.attempt_id(),
        success = outcome.is_success(),
        container = outcome.used_container(),
        "Provisioning finished"
    );

    if output.is_json() {
        output.json(&outcome)?;
    } else {
        report(&outcome, &output)?;
    }

    if outcome.is_success() {
        return Ok(());
    }

    Err(CliError::ProvisioningFailed {
        kind: kind.to_string(),
        stage: outcome
            .failure_stage()
            .unwrap_or(FailureStage::DirectConnection),
        reason: outcome.failure_reason().unwrap_or_default().to_string(),
    })
}

fn report(outcome: &ProvisioningOutcome, output: &OutputManager) -> CliResult<()> {
    if let Some(stage) = outcome.fallback_from() {
        output.info(&format!(
            "Containers unavailable ({stage}); using local configuration"
        ))?;
    }

    let Some(config) = outcome.config() else {
        return Ok(());
    };

    let strategy = if config.using_container() {
        "container"
    } else {
        "local server"
    };
    output.success(&format!("{} ready ({strategy})", outcome.kind()))?;

    for line in env_lines(outcome.kind(), config) {
        output.result(&line)?;
    }
    Ok(())
}

/// Connection values as `.env` lines a PHP framework reads directly.
fn env_lines(kind: ServiceKind, config: &ServiceConnectionConfig) -> Vec<String> {
    let prefix = match kind.family() {
        ServiceFamily::RelationalDatabase => "DB",
        ServiceFamily::Cache => "REDIS",
    };

    let mut lines = vec![
        format!("{prefix}_HOST={}", config.host()),
        format!("{prefix}_PORT={}", config.port()),
    ];

    match config.credentials() {
        Credentials::None => {}
        Credentials::Password { password } => lines.push(format!("{prefix}_PASSWORD={password}")),
        Credentials::Database {
            database,
            username,
            password,
            ..
        } => {
            lines.push(format!("{prefix}_DATABASE={database}"));
            lines.push(format!("{prefix}_USERNAME={username}"));
            lines.push(format!("{prefix}_PASSWORD={password}"));
        }
    }

    lines
}
