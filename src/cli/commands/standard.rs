//! `ctrack standard` command - Standards

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::Standard;

#[derive(Subcommand, Debug)]
pub enum StandardCommands {
    /// List standards
    List,

    /// Register a standard
    New(NewArgs),

    /// Show a standard
    Show(ShowArgs),

    /// Update a standard
    Edit(EditArgs),

    /// Delete a standard and its requirements
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique standard name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Short code, e.g. ISO-27001
    #[arg(long, short = 'c', default_value = "")]
    pub code: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Standard ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub code: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

pub fn run(cmd: StandardCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        StandardCommands::List => {
            let store = open_store(global)?;
            print_list(&store.list_standards()?, global)
        }
        StandardCommands::New(args) => {
            let mut store = open_store(global)?;
            let mut standard = Standard::new(args.name, args.code);
            standard.description = args.description;
            let standard = store.create_standard(&standard)?;
            print_saved("Created", &standard, global);
            Ok(())
        }
        StandardCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Std)?;
            print_record(&store.get_standard(&id)?, global)
        }
        StandardCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Std)?;
            let mut standard = store.get_standard(&id)?;
            if let Some(name) = args.name {
                standard.name = name;
            }
            if let Some(code) = args.code {
                standard.code = code;
            }
            if let Some(description) = args.description {
                standard.description = description;
            }
            let standard = store.update_standard(&standard)?;
            print_saved("Updated", &standard, global);
            Ok(())
        }
        StandardCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Std, global, |store, id| store.delete_standard(id))
        }
    }
}
