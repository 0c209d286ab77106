//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for settled answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Answer plus per-desk findings and the execution trace
    Full,
    /// Only the answer prose
    Answer,
    /// JSON output
    Json,
}

impl From<OutputFormat> for crossdesk_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => crossdesk_domain::OutputFormat::Full,
            OutputFormat::Answer => crossdesk_domain::OutputFormat::Answer,
            OutputFormat::Json => crossdesk_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for crossdesk
#[derive(Parser, Debug)]
#[command(name = "crossdesk")]
#[command(author, version, about = "One front desk for orders, shipping, payments and support")]
#[command(long_about = r#"
Crossdesk answers a customer question by routing it across four service
desks: orders, shipping, payments and support tickets.

Each run has three phases:
1. Routing: the question becomes a structured intent naming the desks
2. Lookups: the desks run in dependency order, concurrently where possible
3. Answer: the findings are phrased into one reply

A run that is missing a detail (an order number, a payment method ID)
suspends with a follow-up question and a session ID; answer it with
--resume, or use --chat to answer follow-ups inline.

Configuration files are loaded from (in priority order):
1. --config <path>     Explicit config file
2. ./crossdesk.toml    Project-level config (or ./.crossdesk.toml)
3. ~/.config/crossdesk/config.toml   Global config

Example:
  crossdesk "Where is order #1 and do I have any open tickets?"
  crossdesk --offline "Was I refunded for order 4?"
  crossdesk --resume 0198c2f4-5e21-4f7a-9b3d-8412a0c55e19 "PaymentMethodID=4"
  crossdesk --chat
"#)]
pub struct Cli {
    /// The question to ask, or the follow-up reply when --resume is given
    pub query: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Resume a suspended run with the positional argument as the reply
    #[arg(long, value_name = "SESSION_ID")]
    pub resume: Option<String>,

    /// Skip the model and use the built-in heuristic routing
    #[arg(long)]
    pub offline: bool,

    /// Output format (defaults to the configured format, then full)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}
