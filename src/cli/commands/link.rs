//! `ctrack link` command - Jira tickets, results and documents

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_any_id, parse_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::{Link, LinkKind};

#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// List links
    List(ListArgs),

    /// Add a link, optionally attached to an activity, execution or component feature
    New(NewArgs),

    /// Show a link
    Show(ShowArgs),

    /// Update a link
    Edit(EditArgs),

    /// Delete a link
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// jira-ticket, result or document
    #[arg(long, short = 'k')]
    pub kind: Option<LinkKind>,

    /// Only links attached to this ACT, CACT or CFEAT
    #[arg(long, short = 'o')]
    pub owner: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// jira-ticket, result or document
    #[arg(long, short = 'k')]
    pub kind: LinkKind,

    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'u')]
    pub url: String,

    /// Owning ACT, CACT or CFEAT ID
    #[arg(long, short = 'o')]
    pub owner: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Link ID
    pub id: String,

    #[arg(long, short = 'k')]
    pub kind: Option<LinkKind>,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'u')]
    pub url: Option<String>,

    /// New owner ID, or `none` to detach
    #[arg(long, short = 'o')]
    pub owner: Option<String>,
}

pub fn run(cmd: LinkCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        LinkCommands::List(args) => {
            let store = open_store(global)?;
            let mut links = match &args.owner {
                Some(owner) => store.links_of(&parse_any_id(owner)?)?,
                None => store.list_links(args.kind)?,
            };
            if let Some(kind) = args.kind {
                links.retain(|l| l.kind == kind);
            }
            print_list(&links, global)
        }
        LinkCommands::New(args) => {
            let mut store = open_store(global)?;
            let mut link = Link::new(args.kind, args.name, args.url);
            if let Some(owner) = &args.owner {
                link = link.owned_by(parse_any_id(owner)?);
            }
            let link = store.create_link(&link)?;
            print_saved("Created", &link, global);
            Ok(())
        }
        LinkCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Lnk)?;
            print_record(&store.get_link(&id)?, global)
        }
        LinkCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Lnk)?;
            let mut link = store.get_link(&id)?;
            if let Some(kind) = args.kind {
                link.kind = kind;
            }
            if let Some(name) = args.name {
                link.name = name;
            }
            if let Some(url) = args.url {
                link.url = url;
            }
            match args.owner.as_deref().map(str::trim) {
                None => {}
                Some("") | Some("none") => link.owner = None,
                Some(owner) => link.owner = Some(parse_any_id(owner)?),
            }
            let link = store.update_link(&link)?;
            print_saved("Updated", &link, global);
            Ok(())
        }
        LinkCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Lnk, global, |store, id| store.delete_link(id))
        }
    }
}
