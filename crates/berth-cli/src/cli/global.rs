//! Flags accepted by every `berth` subcommand.

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Show more diagnostics on stderr. Repeatable; see `logging`.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Show more diagnostics (-v, -vv, -vvv)",
        long_help = "Show more diagnostics on stderr:
    (none)  - Container fallback warnings
    -v      - Provisioning stages and compose commands
    -vv     - Every health probe, template overrides, SQL sessions
    -vvv    - Everything"
    )]
    pub verbose: u8,

    /// Only errors reach stderr. Results on stdout are still printed.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Only report errors"
    )]
    pub quiet: bool,

    /// Plain output even on a terminal. Set by `NO_COLOR` too.
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Disable colored output"
    )]
    pub no_color: bool,

    /// Extra configuration file, layered over the global and `./.berth.toml`
    /// files and under `BERTH_*` variables.
    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Extra configuration file"
    )]
    pub config: Option<PathBuf>,

    /// Overrides `output.format` from configuration unless left at `auto`.
    #[arg(
        long = "output-format",
        global = true,
        value_enum,
        default_value = "auto",
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,
}

/// Rendering for results on stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` otherwise.
    #[default]
    Auto,
    /// Colored, with a spinner while containers start.
    Human,
    /// No color, no spinner; `.env` lines are unchanged.
    Plain,
    /// One JSON document per command; logs become JSON lines.
    Json,
}
