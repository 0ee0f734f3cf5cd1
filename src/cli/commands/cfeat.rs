//! `ctrack cfeat` command - Feature implementation records per component

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{push_links, run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id, parse_opt_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::{Priority, Status};
use crate::entities::{ComponentFeature, Relation};

#[derive(Subcommand, Debug)]
pub enum CfeatCommands {
    /// List component features
    List(ListArgs),

    /// Record that a component implements a feature
    New(NewArgs),

    /// Show a component feature
    Show(ShowArgs),

    /// Update status, priority or campaigns
    Edit(EditArgs),

    /// Delete a component feature
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by component ID
    #[arg(long, short = 'c')]
    pub component: Option<String>,

    /// Filter by feature ID
    #[arg(long)]
    pub feature: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Component ID
    #[arg(long, short = 'c')]
    pub component: String,

    /// Feature ID
    #[arg(long)]
    pub feature: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// low, medium or high
    #[arg(long, short = 'p', default_value = "medium")]
    pub priority: Priority,

    /// todo, in-progress or done
    #[arg(long, short = 's', default_value = "todo")]
    pub status: Status,

    #[arg(long, default_value = "")]
    pub ticket_url: String,

    /// Campaigns to join (comma-separated CAMP IDs)
    #[arg(long, value_delimiter = ',')]
    pub campaigns: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Component feature ID
    pub id: String,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'p')]
    pub priority: Option<Priority>,

    #[arg(long, short = 's')]
    pub status: Option<Status>,

    #[arg(long)]
    pub ticket_url: Option<String>,

    /// Replace campaign membership (comma-separated CAMP IDs; empty clears)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub campaigns: Option<Vec<String>>,
}

pub fn run(cmd: CfeatCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CfeatCommands::List(args) => {
            let store = open_store(global)?;
            let component = parse_opt_id(args.component.as_deref(), EntityPrefix::Cmp)?;
            let feature = parse_opt_id(args.feature.as_deref(), EntityPrefix::Feat)?;
            print_list(
                &store.list_component_features(component.as_ref(), feature.as_ref())?,
                global,
            )
        }
        CfeatCommands::New(args) => run_new(args, global),
        CfeatCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Cfeat)?;
            print_record(&store.get_component_feature(&id)?, global)
        }
        CfeatCommands::Edit(args) => run_edit(args, global),
        CfeatCommands::Delete(args) => run_delete(&args, EntityPrefix::Cfeat, global, |store, id| {
            store.delete_component_feature(id)
        }),
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;

    let mut record = ComponentFeature::new(
        parse_id(&args.component, EntityPrefix::Cmp)?,
        parse_id(&args.feature, EntityPrefix::Feat)?,
    );
    record.description = args.description;
    record.priority = args.priority;
    record.status = args.status;
    record.ticket_url = args.ticket_url;

    let record = store.create_component_feature(&record)?;
    let record = if args.campaigns.is_empty() {
        record
    } else {
        let mut links = Vec::new();
        push_links(&mut links, Relation::ComponentFeatureCampaigns, Some(&args.campaigns))?;
        store.update_component_feature_with_links(&record, &links)?
    };
    print_saved("Created", &record, global);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let id = parse_id(&args.id, EntityPrefix::Cfeat)?;
    let mut record = store.get_component_feature(&id)?;

    if let Some(description) = args.description {
        record.description = description;
    }
    if let Some(priority) = args.priority {
        record.priority = priority;
    }
    if let Some(status) = args.status {
        record.status = status;
    }
    if let Some(url) = args.ticket_url {
        record.ticket_url = url;
    }

    let mut links = Vec::new();
    push_links(&mut links, Relation::ComponentFeatureCampaigns, args.campaigns.as_ref())?;

    let record = store.update_component_feature_with_links(&record, &links)?;
    print_saved("Updated", &record, global);
    Ok(())
}
