use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use fault_core::{DetailLevel, Environment};

/// Top-level CLI parser for the `faultline` binary.
#[derive(Debug, Parser)]
#[command(
    name = "faultline",
    version,
    about = "Faultline - inspect and render structured service errors"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for JSON results: json (pretty) or raw (single line)
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Quiet mode (errors only in logs)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub const fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
        }
    }
}

/// Shared output mode across all commands.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Raw,
}

/// Global flags available before or after subcommands.
#[derive(Clone, Debug)]
pub struct GlobalFlags {
    pub format: OutputFormat,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render an error envelope the way an API would return it
    Render(RenderArgs),
    /// Print a human-readable summary of an error envelope
    Text(TextArgs),
    /// List the messages of the cause chain, outermost first
    Chain(InputArgs),
    /// Create a new error envelope stamped with the configured service
    Create(CreateArgs),
    /// Print the JSON Schema of the error envelope
    Schema,
}

/// Where to read an envelope from and how strictly to parse it.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// JSON file containing `{"error": {...}}`; omit or use `-` for stdin
    pub file: Option<PathBuf>,

    /// Treat malformed input as "no error" instead of reporting why
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Detail level 0-2 (defaults to render.detail_level from config)
    #[arg(short = 'l', long)]
    pub level: Option<DetailLevel>,

    /// Environment (defaults to service.environment from config)
    #[arg(short, long)]
    pub env: Option<Environment>,
}

#[derive(Debug, Args)]
pub struct TextArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Dump every field of every payload in the chain
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Error code, e.g. `access_denied` or `INVALID_ARGUMENT`
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// HTTP status (defaults to the code's own status, then the config default)
    #[arg(long)]
    pub status: Option<u16>,

    /// Service name (overrides service.name from config)
    #[arg(long)]
    pub service: Option<String>,

    /// Trace id (overrides service.trace_id from config)
    #[arg(long)]
    pub trace_id: Option<String>,
}
