use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use super::{write_output, write_structured};
use crate::cli::helpers::{open_store, or_dash, parse_id};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;

#[derive(clap::Args, Debug)]
pub struct BucketsArgs {
    /// Campaign ID
    pub campaign: String,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DashboardArgs {
    /// Hide campaigns that are done
    #[arg(long)]
    pub open: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run_buckets(args: BucketsArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let id = parse_id(&args.campaign, EntityPrefix::Camp)?;
    let campaign = store.get_campaign(&id)?;
    let buckets = store.campaign_status_buckets(&id)?;

    if write_structured(&buckets, global)? {
        return Ok(());
    }

    let mut output = String::new();
    output.push_str(&format!("# Campaign Status: {}\n\n", campaign.name));

    let mut summary = Builder::default();
    summary.push_record(["Status", "Count"]);
    summary.push_record(["To Do", &buckets.todo.to_string()]);
    summary.push_record(["In Progress", &buckets.in_progress.to_string()]);
    summary.push_record(["Done", &buckets.done.to_string()]);
    summary.push_record(["Pending", &buckets.pending.to_string()]);
    summary.push_record(["Total", &buckets.total().to_string()]);
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    write_output(&output, args.output)
}

pub fn run_dashboard(args: DashboardArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let mut summaries = store.campaign_dashboard()?;
    if args.open {
        summaries.retain(|s| s.campaign.is_selectable());
    }

    if write_structured(&summaries, global)? {
        return Ok(());
    }

    let mut output = String::new();
    output.push_str("# Campaign Dashboard\n\n");

    if summaries.is_empty() {
        output.push_str("No campaigns found.\n");
        return write_output(&output, args.output);
    }

    let mut table = Builder::default();
    table.push_record(["Campaign", "Status", "Due", "To Do", "In Progress", "Done", "Pending"]);
    for summary in &summaries {
        let b = &summary.buckets;
        table.push_record([
            summary.campaign.name.clone(),
            summary.campaign.status.to_string(),
            or_dash(summary.campaign.due_date),
            b.todo.to_string(),
            b.in_progress.to_string(),
            b.done.to_string(),
            b.pending.to_string(),
        ]);
    }
    output.push_str(&table.build().with(Style::markdown()).to_string());
    output.push('\n');

    write_output(&output, args.output)
}
