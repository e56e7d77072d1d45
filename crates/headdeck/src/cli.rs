//! Clap derive structures for the `headdeck` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// headdeck -- admin front end and gateway for Headscale
#[derive(Debug, Parser)]
#[command(
    name = "headdeck",
    version,
    about = "Administer a Headscale server from the command line",
    long_about = "Runs a same-origin gateway in front of the Headscale API and\n\
        lists users, nodes, routes and API keys through it.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "HEADDECK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Gateway URL (overrides profile)
    #[arg(long = "gateway", short = 'g', env = "HEADDECK_GATEWAY_URL", global = true)]
    pub gateway_url: Option<String>,

    /// Headscale API key
    #[arg(long, env = "HEADDECK_API_KEY", global = true, hide_env = true)]
    pub api_key: Option<String>,

    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "HEADDECK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HEADDECK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "HEADDECK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "HEADDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the API gateway
    Serve(ServeArgs),

    /// Store (and verify) the Headscale API key
    Setup(SetupArgs),

    /// List users
    #[command(alias = "u")]
    Users,

    /// List nodes
    #[command(alias = "n")]
    Nodes,

    /// List routes
    #[command(alias = "r")]
    Routes,

    /// List API keys
    ApiKeys,

    /// Show all collections with counts
    Summary(SummaryArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Serve ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Socket address to bind (e.g. 127.0.0.1:3000)
    #[arg(long, short = 'l')]
    pub listen: Option<String>,

    /// Upstream base URL (e.g. http://localhost:8080/api)
    #[arg(long, short = 'u')]
    pub upstream: Option<String>,

    /// Inject the stored API key into requests that carry no Authorization
    #[arg(long)]
    pub inject_credential: bool,
}

// ── Setup ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SetupArgs {
    /// Save the key without checking it against the server
    #[arg(long)]
    pub no_verify: bool,

    /// Remove the stored key instead of setting one
    #[arg(long, conflicts_with = "no_verify")]
    pub clear: bool,
}

// ── Summary ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// View path whose entry is marked as selected (e.g. /nodes)
    #[arg(long, default_value = "/")]
    pub path: String,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file if none exists
    Init,

    /// Show the effective configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
