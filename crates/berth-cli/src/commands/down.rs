//! `berth down`: stop the topology in a directory.

use tracing::instrument;

use berth_core::domain::MANIFEST_FILE;

use crate::{
    cli::DownArgs,
    commands::lifecycle_controller,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(dir = %args.dir.display()))]
pub fn execute(args: DownArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let manifest = args.dir.join(MANIFEST_FILE);
    if !manifest.is_file() {
        return Err(CliError::InvalidInput {
            message: format!("no {MANIFEST_FILE} in '{}'", args.dir.display()),
            source: None,
        });
    }

    let lifecycle = lifecycle_controller(&config, args.runtime);
    let spinner = output.spinner("Stopping containers");
    let stopped = lifecycle.stop(&args.dir);
    spinner.finish();
    stopped?;

    output.success(&format!("Stopped services in {}", args.dir.display()))?;
    Ok(())
}
