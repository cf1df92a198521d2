use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about = "Detect drift between two schema exports and render the DDL that reconciles them", long_about = None)]
pub struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare two exports and write the diff table
    Diff(DiffArgs),
    /// Compare two exports and write the DDL script
    Script(ScriptArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Source schema export (CSV)
    #[arg(short, long)]
    pub source: PathBuf,
    /// Target schema export (CSV)
    #[arg(short, long)]
    pub target: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, default_value = ",")]
    pub delimiter: String,
}

#[derive(Debug, Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Destination file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Output format for the diff table
    #[arg(long, value_enum, default_value_t = DiffFormat::Csv)]
    pub format: DiffFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DiffFormat {
    Csv,
    Json,
}

#[derive(Debug, Args)]
pub struct ScriptArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// source_to_target or target_to_source; defaults to the configured direction
    #[arg(short, long)]
    pub direction: Option<String>,
    /// Target dialect (mssql, postgres); defaults to the configured dialect
    #[arg(long)]
    pub dialect: Option<String>,
    /// Destination file for the script; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Also write the change descriptors as JSON to this file
    #[arg(long)]
    pub changes: Option<PathBuf>,
}
