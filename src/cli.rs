use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jiraform")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative configuration for Jira", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection overrides; unset values fall back to the manifest, then to
/// `JIRA_URL`, `JIRA_USERNAME` and `JIRA_PASSWORD`
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Jira base URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Jira user name
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Jira password or API token
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<f64>,

    /// Skip TLS certificate validation
    #[arg(long, global = true)]
    pub insecure: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile Jira with the manifest
    Apply(ApplyArgs),

    /// Preview what apply would change
    Diff(DiffArgs),

    /// Reconcile a single resource given on the command line
    Ensure(EnsureArgs),

    /// Read remote state without changing it
    Fact(FactArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Manifest Commands
// ============================================================================

#[derive(Args)]
pub struct ApplyArgs {
    /// Manifest file (default: ./jiraform.toml, then ~/.config/jiraform/jiraform.toml)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Show what would change without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Only reconcile matching resources: kind or kind.name
    #[arg(short, long)]
    pub target: Option<String>,

    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Continue with the next resource after a failure
    #[arg(long)]
    pub keep_going: bool,

    /// Print outcomes as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct DiffArgs {
    /// Manifest file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Only check matching resources: kind or kind.name
    #[arg(short, long)]
    pub target: Option<String>,

    /// Print outcomes as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// Single-resource Commands
// ============================================================================

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

#[derive(Args)]
pub struct EnsureArgs {
    /// Resource kind, e.g. group, user, project
    pub kind: String,

    /// Parameter as name=value; values are parsed as JSON when possible
    #[arg(short, long = "set", value_name = "PARAM=VALUE")]
    pub params: Vec<String>,

    /// Whether the resource should exist
    #[arg(long, value_enum)]
    pub state: Option<StateArg>,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FactArgs {
    /// Fact name, e.g. get_project, list_users, jql
    pub fact: String,

    /// Parameter as name=value; values are parsed as JSON when possible
    #[arg(short, long = "set", value_name = "PARAM=VALUE")]
    pub params: Vec<String>,

    /// Print compact JSON
    #[arg(long)]
    pub json: bool,
}
