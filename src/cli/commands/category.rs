//! `ctrack category` command - Feature categories

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::FeatureCategory;

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List feature categories
    List,

    /// Create a feature category
    New(NewArgs),

    /// Show a feature category
    Show(ShowArgs),

    /// Update a feature category
    Edit(EditArgs),

    /// Delete a category and its features
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Category ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

pub fn run(cmd: CategoryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CategoryCommands::List => {
            let store = open_store(global)?;
            print_list(&store.list_categories()?, global)
        }
        CategoryCommands::New(args) => {
            let mut store = open_store(global)?;
            let category =
                store.create_category(&FeatureCategory::new(args.name, args.description))?;
            print_saved("Created", &category, global);
            Ok(())
        }
        CategoryCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Fcat)?;
            print_record(&store.get_category(&id)?, global)
        }
        CategoryCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Fcat)?;
            let mut category = store.get_category(&id)?;
            if let Some(name) = args.name {
                category.name = name;
            }
            if let Some(description) = args.description {
                category.description = description;
            }
            let category = store.update_category(&category)?;
            print_saved("Updated", &category, global);
            Ok(())
        }
        CategoryCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Fcat, global, |store, id| store.delete_category(id))
        }
    }
}
