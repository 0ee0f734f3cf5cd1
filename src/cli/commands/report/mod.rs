//! `ctrack report` command - Status, compliance and contact reports
//!
//! Reports render as markdown by default; `--format json` or `--format yaml`
//! emits the underlying aggregate instead.

mod compliance;
mod contacts;
mod status;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::{GlobalOpts, OutputFormat};

pub use compliance::{ComplianceArgs, SoaArgs};
pub use contacts::ContactsArgs;
pub use status::{BucketsArgs, DashboardArgs};

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// To Do / In Progress / Done counts for one campaign
    Buckets(BucketsArgs),

    /// Status counts for every campaign
    Dashboard(DashboardArgs),

    /// Requirements of a standard against a component's activity executions
    Compliance(ComplianceArgs),

    /// Statement of applicability: compliance for every standard of a component
    Soa(SoaArgs),

    /// Contacts of every component reached by a campaign
    Contacts(ContactsArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Buckets(args) => status::run_buckets(args, global),
        ReportCommands::Dashboard(args) => status::run_dashboard(args, global),
        ReportCommands::Compliance(args) => compliance::run_compliance(args, global),
        ReportCommands::Soa(args) => compliance::run_soa(args, global),
        ReportCommands::Contacts(args) => contacts::run(args, global),
    }
}

/// Print structured formats directly; returns false when the caller should render markdown
pub(crate) fn write_structured<T: Serialize>(value: &T, global: &GlobalOpts) -> Result<bool> {
    match global.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

pub(crate) fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
