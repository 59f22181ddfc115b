use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ablyform")]
#[command(version)]
#[command(about = "Manage Ably rules, ingress rules and namespaces from declared JSON", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file (default: ~/.config/ablyform/config.toml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Control API account token
    #[arg(long, env = "ABLY_ACCOUNT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Control API base URL
    #[arg(long, env = "ABLY_URL", global = true)]
    pub url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the resource kinds this provider manages
    Resources,

    /// Print the attribute schema of a resource kind as JSON
    Schema {
        /// Resource kind, e.g. ably_rule_http
        kind: String,
    },

    /// Create the resource declared in a plan file
    Create(PlanArgs),

    /// Refresh a state file from the API
    Read(StateArgs),

    /// Update a resource in place from a plan file
    Update(PlanArgs),

    /// Delete a resource and its state file
    Delete(StateArgs),

    /// Adopt an existing resource into a state file
    Import {
        /// Resource kind
        kind: String,

        /// Import identifier, e.g. "app_id,id"
        id: String,

        /// State file to write
        #[arg(long)]
        state: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct PlanArgs {
    /// Resource kind
    pub kind: String,

    /// Plan file (declared values, JSON)
    #[arg(long)]
    pub plan: PathBuf,

    /// State file (JSON, created if missing)
    #[arg(long)]
    pub state: PathBuf,
}

#[derive(Args)]
pub struct StateArgs {
    /// Resource kind
    pub kind: String,

    /// State file (JSON)
    #[arg(long)]
    pub state: PathBuf,
}
