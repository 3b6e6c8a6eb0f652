//! Command-line interface definition using clap.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use relnotes_core::config::{
    CREDENTIALS_ENV, DEFAULT_CREDENTIALS_FILE, DEFAULT_SYSTEM_ROLE_FILE,
    DEFAULT_TASK_TEMPLATE_FILE,
};
use relnotes_core::DEFAULT_SUBJECT;
use std::path::PathBuf;

/// Build version string with git hash and build date.
fn version_string() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const BUILD_DATE: &str = env!("BUILD_DATE");

    // Format: "0.1.0 (abc1234, 2026-01-29)"
    static VERSION_STRING: std::sync::OnceLock<String> = std::sync::OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} ({}, {})", VERSION, GIT_HASH, BUILD_DATE))
}

/// relnotes - generate release notes from work items and email them
#[derive(Parser, Debug)]
#[command(name = "relnotes")]
#[command(author, version = version_string(), about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the credentials file
    #[arg(
        short,
        long,
        env = CREDENTIALS_ENV,
        default_value = DEFAULT_CREDENTIALS_FILE,
        global = true
    )]
    pub credentials: PathBuf,

    /// Options for the default `run` command; ignored when a subcommand is given
    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate release notes and email them (default)
    Run(RunArgs),

    /// Print the work item IDs returned by the saved query
    Ids,

    /// Send a one-word prompt to check the language model connection
    CheckModel,
}

/// Options for a release notes run.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// System-role prompt file
    #[arg(long, default_value = DEFAULT_SYSTEM_ROLE_FILE)]
    pub system_role: PathBuf,

    /// Task template file with {title} and {description} placeholders
    #[arg(long, default_value = DEFAULT_TASK_TEMPLATE_FILE)]
    pub task_template: PathBuf,

    /// Email subject line
    #[arg(long, default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// Also write the rendered HTML to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Build the document but do not send the email
    #[arg(long)]
    pub dry_run: bool,

    /// Escape HTML in titles and notes
    #[arg(long)]
    pub escape_html: bool,

    /// Release name shown in the heading
    #[arg(long)]
    pub release_name: Option<String>,

    /// Release date shown in the heading
    #[arg(long, value_name = "YYYY-MM-DD")]
    pub release_date: Option<NaiveDate>,
}

impl Cli {
    /// Options of the run to perform, if the command is a run.
    pub fn run_args(&self) -> Option<&RunArgs> {
        match &self.command {
            Some(Commands::Run(args)) => Some(args),
            Some(_) => None,
            None => Some(&self.run),
        }
    }

    /// Returns the log level based on verbosity.
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
