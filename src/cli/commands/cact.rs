//! `ctrack cact` command - Activity executions per component

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{edit_date, push_links, run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id, parse_opt_date, parse_opt_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::Status;
use crate::entities::{ComponentActivity, Relation};

#[derive(Subcommand, Debug)]
pub enum CactCommands {
    /// List activity executions
    List(ListArgs),

    /// Schedule an activity against a component
    New(NewArgs),

    /// Show an activity execution
    Show(ShowArgs),

    /// Update schedule, status, version or campaigns
    Edit(EditArgs),

    /// Delete an activity execution
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by component ID
    #[arg(long, short = 'c')]
    pub component: Option<String>,

    /// Filter by activity ID
    #[arg(long, short = 'a')]
    pub activity: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Component ID
    #[arg(long, short = 'c')]
    pub component: String,

    /// Activity ID
    #[arg(long, short = 'a')]
    pub activity: String,

    /// todo, in-progress or done
    #[arg(long, short = 's', default_value = "todo")]
    pub status: Status,

    /// Component version the activity runs against
    #[arg(long = "component-version", default_value = "")]
    pub component_version: String,

    /// Estimated completion date (YYYY-MM-DD)
    #[arg(long)]
    pub eta: Option<String>,

    /// Execution start date (YYYY-MM-DD)
    #[arg(long)]
    pub start: Option<String>,

    /// Execution end date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<String>,

    /// Campaigns to join (comma-separated CAMP IDs)
    #[arg(long, value_delimiter = ',')]
    pub campaigns: Vec<String>,
}

/// Unset flags keep the stored value; `none` clears a date
#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Activity execution ID
    pub id: String,

    #[arg(long, short = 's')]
    pub status: Option<Status>,

    #[arg(long = "component-version")]
    pub component_version: Option<String>,

    #[arg(long)]
    pub eta: Option<String>,

    #[arg(long)]
    pub start: Option<String>,

    #[arg(long)]
    pub end: Option<String>,

    /// Replace campaign membership (comma-separated CAMP IDs; empty clears)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub campaigns: Option<Vec<String>>,
}

pub fn run(cmd: CactCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CactCommands::List(args) => {
            let store = open_store(global)?;
            let component = parse_opt_id(args.component.as_deref(), EntityPrefix::Cmp)?;
            let activity = parse_opt_id(args.activity.as_deref(), EntityPrefix::Act)?;
            print_list(
                &store.list_component_activities(component.as_ref(), activity.as_ref())?,
                global,
            )
        }
        CactCommands::New(args) => run_new(args, global),
        CactCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Cact)?;
            print_record(&store.get_component_activity(&id)?, global)
        }
        CactCommands::Edit(args) => run_edit(args, global),
        CactCommands::Delete(args) => run_delete(&args, EntityPrefix::Cact, global, |store, id| {
            store.delete_component_activity(id)
        }),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;

    let mut record = ComponentActivity::new(
        parse_id(&args.component, EntityPrefix::Cmp)?,
        parse_id(&args.activity, EntityPrefix::Act)?,
    );
    record.status = args.status;
    record.component_version = args.component_version;
    record.schedule.estimated_completion = parse_opt_date(args.eta.as_deref())?;
    record.schedule.execution_start = parse_opt_date(args.start.as_deref())?;
    record.schedule.execution_end = parse_opt_date(args.end.as_deref())?;

    let record = store.create_component_activity(&record)?;
    let record = if args.campaigns.is_empty() {
        record
    } else {
        let mut links = Vec::new();
        push_links(&mut links, Relation::ComponentActivityCampaigns, Some(&args.campaigns))?;
        store.update_component_activity_with_links(&record, &links)?
    };
    print_saved("Created", &record, global);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let id = parse_id(&args.id, EntityPrefix::Cact)?;
    let mut record = store.get_component_activity(&id)?;

    if let Some(status) = args.status {
        record.status = status;
    }
    if let Some(version) = args.component_version {
        record.component_version = version;
    }
    let schedule = &mut record.schedule;
    schedule.estimated_completion = edit_date(args.eta.as_deref(), schedule.estimated_completion)?;
    schedule.execution_start = edit_date(args.start.as_deref(), schedule.execution_start)?;
    schedule.execution_end = edit_date(args.end.as_deref(), schedule.execution_end)?;

    let mut links = Vec::new();
    push_links(&mut links, Relation::ComponentActivityCampaigns, args.campaigns.as_ref())?;

    let record = store.update_component_activity_with_links(&record, &links)?;
    print_saved("Updated", &record, global);
    Ok(())
}
