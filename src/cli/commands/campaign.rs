//! `ctrack campaign` command - Campaigns grouping work across components

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{edit_date, push_links, run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id, parse_opt_date};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::Status;
use crate::entities::{Campaign, Relation};

#[derive(Subcommand, Debug)]
pub enum CampaignCommands {
    /// List campaigns
    List(ListArgs),

    /// Start a campaign
    New(NewArgs),

    /// Show a campaign
    Show(ShowArgs),

    /// Update a campaign and optionally replace its members
    Edit(EditArgs),

    /// List the component features and activity executions in a campaign
    Members(ShowArgs),

    /// Delete a campaign; members are kept
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only campaigns that are not done
    #[arg(long)]
    pub open: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique campaign name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// todo, in-progress or done
    #[arg(long, short = 's', default_value = "todo")]
    pub status: Status,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: Option<String>,

    #[arg(long, default_value = "")]
    pub ticket_url: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Campaign ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 's')]
    pub status: Option<Status>,

    /// Due date, or `none` to clear
    #[arg(long)]
    pub due: Option<String>,

    #[arg(long)]
    pub ticket_url: Option<String>,

    /// Replace member component features (comma-separated CFEAT IDs; empty clears)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub features: Option<Vec<String>>,

    /// Replace member activity executions (comma-separated CACT IDs; empty clears)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub activities: Option<Vec<String>>,
}

pub fn run(cmd: CampaignCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CampaignCommands::List(args) => {
            let store = open_store(global)?;
            let mut campaigns = store.list_campaigns()?;
            if args.open {
                campaigns.retain(|c| c.is_selectable());
            }
            print_list(&campaigns, global)
        }
        CampaignCommands::New(args) => {
            let mut store = open_store(global)?;
            let mut campaign = Campaign::new(args.name);
            campaign.description = args.description;
            campaign.status = args.status;
            campaign.due_date = parse_opt_date(args.due.as_deref())?;
            campaign.ticket_url = args.ticket_url;
            let campaign = store.create_campaign(&campaign)?;
            print_saved("Created", &campaign, global);
            Ok(())
        }
        CampaignCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Camp)?;
            print_record(&store.get_campaign(&id)?, global)
        }
        CampaignCommands::Edit(args) => run_edit(args, global),
        CampaignCommands::Members(args) => run_members(args, global),
        CampaignCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Camp, global, |store, id| store.delete_campaign(id))
        }
    }
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let id = parse_id(&args.id, EntityPrefix::Camp)?;
    let mut campaign = store.get_campaign(&id)?;

    if let Some(name) = args.name {
        campaign.name = name;
    }
    if let Some(description) = args.description {
        campaign.description = description;
    }
    if let Some(status) = args.status {
        campaign.status = status;
    }
    campaign.due_date = edit_date(args.due.as_deref(), campaign.due_date)?;
    if let Some(url) = args.ticket_url {
        campaign.ticket_url = url;
    }

    let mut links = Vec::new();
    push_links(&mut links, Relation::CampaignComponentFeatures, args.features.as_ref())?;
    push_links(&mut links, Relation::CampaignActivities, args.activities.as_ref())?;

    let campaign = store.update_campaign_with_links(&campaign, &links)?;
    print_saved("Updated", &campaign, global);
    Ok(())
}

fn run_members(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let id = parse_id(&args.id, EntityPrefix::Camp)?;
    let campaign = store.get_campaign(&id)?;

    if !global.quiet {
        println!("{} {}", style(&campaign.name).bold(), style(&campaign.id).dim());
        println!();
        println!("{}", style("Component features").bold());
    }
    print_list(&store.campaign_component_features(&id)?, global)?;
    if !global.quiet {
        println!();
        println!("{}", style("Activity executions").bold());
    }
    print_list(&store.campaign_component_activities(&id)?, global)
}
