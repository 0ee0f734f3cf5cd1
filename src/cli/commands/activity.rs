//! `ctrack activity` command - Activity templates

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{push_links, run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::{Activity, Relation};

#[derive(Subcommand, Debug)]
pub enum ActivityCommands {
    /// List activity templates
    List,

    /// Create an activity template
    New(NewArgs),

    /// Show an activity template
    Show(ShowArgs),

    /// Update an activity and optionally replace the requirements it satisfies
    Edit(EditArgs),

    /// Delete an activity and its executions
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Requirements this activity satisfies (comma-separated REQ IDs)
    #[arg(long, value_delimiter = ',')]
    pub requirements: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Activity ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Replace satisfied requirements (comma-separated REQ IDs; empty clears)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub requirements: Option<Vec<String>>,
}

pub fn run(cmd: ActivityCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ActivityCommands::List => {
            let store = open_store(global)?;
            print_list(&store.list_activities()?, global)
        }
        ActivityCommands::New(args) => {
            let mut store = open_store(global)?;
            let activity = store.create_activity(&Activity::new(args.name, args.description))?;

            let activity = if args.requirements.is_empty() {
                activity
            } else {
                let mut links = Vec::new();
                push_links(&mut links, Relation::ActivityRequirements, Some(&args.requirements))?;
                store.update_activity_with_links(&activity, &links)?
            };
            print_saved("Created", &activity, global);
            Ok(())
        }
        ActivityCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Act)?;
            print_record(&store.get_activity(&id)?, global)
        }
        ActivityCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Act)?;
            let mut activity = store.get_activity(&id)?;
            if let Some(name) = args.name {
                activity.name = name;
            }
            if let Some(description) = args.description {
                activity.description = description;
            }

            let mut links = Vec::new();
            push_links(&mut links, Relation::ActivityRequirements, args.requirements.as_ref())?;

            let activity = store.update_activity_with_links(&activity, &links)?;
            print_saved("Updated", &activity, global);
            Ok(())
        }
        ActivityCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Act, global, |store, id| store.delete_activity(id))
        }
    }
}
