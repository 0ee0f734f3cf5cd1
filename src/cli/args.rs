//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    activity::ActivityCommands, assoc::AssocCommands, cact::CactCommands,
    campaign::CampaignCommands, category::CategoryCommands, cfeat::CfeatCommands,
    completions::CompletionsArgs, component::ComponentCommands, contact::ContactCommands,
    feature::FeatureCommands, init::InitArgs, link::LinkCommands, report::ReportCommands,
    req::ReqCommands, software::SoftwareCommands, standard::StandardCommands,
    threat::ThreatCommands,
};

#[derive(Parser)]
#[command(name = "ctrack")]
#[command(author, version, about = "Compliance and program tracking")]
#[command(long_about = "Track software components, features, activity executions, standards and campaigns, and derive status buckets, compliance matrices and contact rollups.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .ctrack/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new tracker project
    Init(InitArgs),

    /// Software products
    #[command(subcommand)]
    Software(SoftwareCommands),

    /// Components of software products
    #[command(subcommand)]
    Component(ComponentCommands),

    /// Feature catalog
    #[command(subcommand)]
    Feature(FeatureCommands),

    /// Feature categories
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Threat catalog
    #[command(subcommand)]
    Threat(ThreatCommands),

    /// Component contacts
    #[command(subcommand)]
    Contact(ContactCommands),

    /// Standards
    #[command(subcommand)]
    Standard(StandardCommands),

    /// Requirements of standards
    #[command(subcommand)]
    Req(ReqCommands),

    /// Activity templates
    #[command(subcommand)]
    Activity(ActivityCommands),

    /// Feature implementation records per component
    #[command(subcommand)]
    Cfeat(CfeatCommands),

    /// Activity executions per component
    #[command(subcommand)]
    Cact(CactCommands),

    /// Campaigns grouping work across components
    #[command(subcommand)]
    Campaign(CampaignCommands),

    /// Jira tickets, results and documents
    #[command(subcommand)]
    Link(LinkCommands),

    /// Many-to-many associations
    #[command(subcommand)]
    Assoc(AssocCommands),

    /// Status, compliance and contact reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, YAML for single records
    #[default]
    Auto,
    /// Aligned text table
    Table,
    /// JSON format (for programming)
    Json,
    /// YAML format (full fidelity)
    Yaml,
    /// CSV format (for spreadsheets)
    Csv,
    /// Just IDs, one per line
    Id,
}
