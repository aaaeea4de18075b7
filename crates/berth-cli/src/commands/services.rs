//! Implementation of the `berth services` command.

use serde::Serialize;

use berth_adapters::TemplateSource;
use berth_core::domain::ServiceKind;

use crate::{
    cli::{ListFormat, ServicesArgs},
    commands::template_catalog,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

/// One row of the service listing.
#[derive(Debug, Serialize)]
struct ServiceRow {
    name: &'static str,
    family: &'static str,
    port: u16,
    template: &'static str,
    sidecar: &'static str,
    sidecar_port: u16,
    #[serde(flatten)]
    source: TemplateSource,
}

pub fn execute(args: ServicesArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let rows = rows(&config);

    match args.format {
        ListFormat::Table => {
            output.header("Available Services:")?;
            for row in &rows {
                output.print(&format!(
                    "  {:<8} {:<20} port {:<5} {} ({}, ui on {})",
                    row.name,
                    row.family,
                    row.port,
                    row.template,
                    source_label(&row.source),
                    row.sidecar_port,
                ))?;
            }
        }

        ListFormat::Json => output.json(&rows)?,

        ListFormat::List => {
            for row in &rows {
                output.result(row.name)?;
            }
        }

        ListFormat::Csv => {
            output.result("name,family,port,template,sidecar,source")?;
            for row in &rows {
                output.result(&format!(
                    "{},{},{},{},{},{}",
                    row.name,
                    row.family,
                    row.port,
                    row.template,
                    row.sidecar,
                    source_label(&row.source)
                ))?;
            }
        }
    }

    Ok(())
}

fn rows(config: &AppConfig) -> Vec<ServiceRow> {
    let entries = template_catalog(config).entries();

    ServiceKind::ALL
        .iter()
        .map(|kind| {
            let source = entries
                .iter()
                .find(|entry| entry.id == kind.template_id())
                .map(|entry| entry.source.clone())
                .unwrap_or(TemplateSource::Builtin);

            ServiceRow {
                name: kind.as_str(),
                family: kind.family().as_str(),
                port: kind.default_port(),
                template: kind.template_id(),
                sidecar: kind.sidecar_section(),
                sidecar_port: kind.sidecar_port(),
                source,
            }
        })
        .collect()
}

fn source_label(source: &TemplateSource) -> String {
    match source {
        TemplateSource::Builtin => "builtin".into(),
        TemplateSource::Override(path) => path.display().to_string(),
    }
}
