//! Diagnostics on stderr.
//!
//! `berth-core` and `berth-adapters` emit events; only [`init_logging`]
//! installs a subscriber. Stdout stays reserved for results, so the `.env`
//! lines from `provision` and every `--output-format json` document can be
//! piped while diagnostics are still visible.
//!
//! What each level shows:
//!
//! | Flag(s)   | Level | Shows                                                  |
//! |-----------|-------|--------------------------------------------------------|
//! | (none)    | WARN  | container fallback and its failure stage               |
//! | `-v`      | INFO  | provisioning stages, the compose commands being run    |
//! | `-vv`     | DEBUG | every health probe, template overrides, SQL sessions   |
//! | `-vvv`    | TRACE | everything                                             |
//! | `--quiet` | ERROR | nothing unless something breaks                        |
//!
//! `RUST_LOG` replaces the derived filter entirely. With `--output-format
//! json` the events are written as JSON lines so a wrapper can parse both
//! streams.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{GlobalArgs, OutputFormat};

/// Crates whose events are shown at the derived level.
const TARGETS: [&str; 3] = ["berth", "berth_core", "berth_adapters"];

/// Install the stderr subscriber. Call once, before the first command runs.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(derive_level(args))));

    let base = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // The attempt id lives on the provisioning span; JSON keeps it attached.
    let layer = if args.output_format == OutputFormat::Json {
        base.json().with_current_span(true).boxed()
    } else {
        let ansi = !args.no_color && std::io::stderr().is_terminal();
        base.with_ansi(ansi).without_time().boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

/// `-q` wins over any `-v` count.
fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
