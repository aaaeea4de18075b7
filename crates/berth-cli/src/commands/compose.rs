//! `berth compose`: write the compose manifest without starting it.

use serde_json::json;
use tracing::instrument;

use berth_core::domain::{ServiceKind, TopologyVariables};

use crate::{
    cli::ComposeArgs,
    commands::{app_name, requested_config, topology_generator},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(kind = %args.kind))]
pub fn execute(args: ComposeArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let kind = ServiceKind::from(args.kind);
    let requested = requested_config(kind, &args.connection)?;

    let name = app_name(args.topology.app_name.as_deref(), &args.topology.dir);
    let variables = TopologyVariables::for_service(kind, &name, &requested);
    let include_sidecars = !args.topology.no_admin_ui && config.container.admin_ui;

    let spec = topology_generator(&config).generate_with(
        kind,
        &args.topology.dir,
        &variables,
        include_sidecars,
    )?;

    if output.is_json() {
        output.json(&json!({
            "kind": kind,
            "service": spec.service_name(),
            "path": spec.path,
            "sections": spec.included_sections,
        }))?;
        return Ok(());
    }

    output.success(&format!("Wrote {}", spec.path.display()))?;
    if !spec.included_sections.is_empty() {
        let sections: Vec<&str> = spec.included_sections.iter().map(String::as_str).collect();
        output.info(&format!("Optional sections: {}", sections.join(", ")))?;
    }
    Ok(())
}
