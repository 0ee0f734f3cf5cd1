//! `ctrack contact` command - People referenced by components

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::{Contact, ContactKind};

#[derive(Subcommand, Debug)]
pub enum ContactCommands {
    /// List contacts
    List,

    /// Add a contact
    New(NewArgs),

    /// Show a contact
    Show(ShowArgs),

    /// Update a contact
    Edit(EditArgs),

    /// Delete a contact; components referencing it lose that contact
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'e')]
    pub email: String,

    /// engineering, business or psrd
    #[arg(long, short = 'k', default_value = "engineering")]
    pub kind: ContactKind,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Contact ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'e')]
    pub email: Option<String>,

    #[arg(long, short = 'k')]
    pub kind: Option<ContactKind>,
}

pub fn run(cmd: ContactCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ContactCommands::List => {
            let store = open_store(global)?;
            print_list(&store.list_contacts()?, global)
        }
        ContactCommands::New(args) => {
            let mut store = open_store(global)?;
            let contact = store.create_contact(&Contact::new(args.name, args.email, args.kind))?;
            print_saved("Created", &contact, global);
            Ok(())
        }
        ContactCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Con)?;
            print_record(&store.get_contact(&id)?, global)
        }
        ContactCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Con)?;
            let mut contact = store.get_contact(&id)?;
            if let Some(name) = args.name {
                contact.name = name;
            }
            if let Some(email) = args.email {
                contact.email = email;
            }
            if let Some(kind) = args.kind {
                contact.kind = kind;
            }
            let contact = store.update_contact(&contact)?;
            print_saved("Updated", &contact, global);
            Ok(())
        }
        ContactCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Con, global, |store, id| store.delete_contact(id))
        }
    }
}
