//! `ctrack threat` command - Threat catalog

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::Threat;

#[derive(Subcommand, Debug)]
pub enum ThreatCommands {
    /// List threats
    List,

    /// Catalog a threat
    New(NewArgs),

    /// Show a threat
    Show(ShowArgs),

    /// Update a threat
    Edit(EditArgs),

    /// Delete a threat
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
    /// Threat ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

pub fn run(cmd: ThreatCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ThreatCommands::List => {
            let store = open_store(global)?;
            print_list(&store.list_threats()?, global)
        }
        ThreatCommands::New(args) => {
            let mut store = open_store(global)?;
            let threat = store.create_threat(&Threat::new(args.name, args.description))?;
            print_saved("Created", &threat, global);
            Ok(())
        }
        ThreatCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Thr)?;
            print_record(&store.get_threat(&id)?, global)
        }
        ThreatCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Thr)?;
            let mut threat = store.get_threat(&id)?;
            if let Some(name) = args.name {
                threat.name = name;
            }
            if let Some(description) = args.description {
                threat.description = description;
            }
            let threat = store.update_threat(&threat)?;
            print_saved("Updated", &threat, global);
            Ok(())
        }
        ThreatCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Thr, global, |store, id| store.delete_threat(id))
        }
    }
}
