//! `ctrack software` command - Software products

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::Software;

#[derive(Subcommand, Debug)]
pub enum SoftwareCommands {
    /// List software products
    List,

    /// Register a software product
    New(NewArgs),

    /// Show a software product
    Show(ShowArgs),

    /// Update a software product
    Edit(EditArgs),

    /// Delete a software product and everything it owns
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique product name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Software ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

pub fn run(cmd: SoftwareCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SoftwareCommands::List => {
            let store = open_store(global)?;
            print_list(&store.list_software()?, global)
        }
        SoftwareCommands::New(args) => {
            let mut store = open_store(global)?;
            let software = store.create_software(&Software::new(args.name, args.description))?;
            print_saved("Created", &software, global);
            Ok(())
        }
        SoftwareCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Sw)?;
            print_record(&store.get_software(&id)?, global)
        }
        SoftwareCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Sw)?;
            let mut software = store.get_software(&id)?;
            if let Some(name) = args.name {
                software.name = name;
            }
            if let Some(description) = args.description {
                software.description = description;
            }
            let software = store.update_software(&software)?;
            print_saved("Updated", &software, global);
            Ok(())
        }
        SoftwareCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Sw, global, |store, id| store.delete_software(id))
        }
    }
}
