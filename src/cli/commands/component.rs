//! `ctrack component` command - Components of software products

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{edit_date, edit_ref, run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id, parse_opt_date, parse_opt_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::Component;

#[derive(Subcommand, Debug)]
pub enum ComponentCommands {
    /// List components
    List(ListArgs),

    /// Create a component under a software product
    New(NewArgs),

    /// Show a component
    Show(ShowArgs),

    /// Update a component
    Edit(EditArgs),

    /// Delete a component and its tracking records
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only components of this software
    #[arg(long, short = 's')]
    pub software: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique component name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Owning software ID
    #[arg(long, short = 's')]
    pub software: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    #[arg(long, default_value = "")]
    pub repo_url: String,

    #[arg(long, default_value = "")]
    pub ticket_url: String,

    /// Engineering contact ID
    #[arg(long)]
    pub engineering: Option<String>,

    /// Business contact ID
    #[arg(long)]
    pub business: Option<String>,

    /// Product security contact ID
    #[arg(long)]
    pub psrd: Option<String>,

    /// Developer preview date (YYYY-MM-DD)
    #[arg(long)]
    pub dev_preview: Option<String>,

    /// Technology preview date (YYYY-MM-DD)
    #[arg(long)]
    pub tech_preview: Option<String>,

    /// General availability date (YYYY-MM-DD)
    #[arg(long)]
    pub ga: Option<String>,
}

/// Unset flags keep the stored value; `none` clears a contact or date
#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Component ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Move the component to another software product
    #[arg(long, short = 's')]
    pub software: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long)]
    pub repo_url: Option<String>,

    #[arg(long)]
    pub ticket_url: Option<String>,

    #[arg(long)]
    pub engineering: Option<String>,

    #[arg(long)]
    pub business: Option<String>,

    #[arg(long)]
    pub psrd: Option<String>,

    #[arg(long)]
    pub dev_preview: Option<String>,

    #[arg(long)]
    pub tech_preview: Option<String>,

    #[arg(long)]
    pub ga: Option<String>,
}

pub fn run(cmd: ComponentCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ComponentCommands::List(args) => run_list(args, global),
        ComponentCommands::New(args) => run_new(args, global),
        ComponentCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Cmp)?;
            print_record(&store.get_component(&id)?, global)
        }
        ComponentCommands::Edit(args) => run_edit(args, global),
        ComponentCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Cmp, global, |store, id| store.delete_component(id))
        }
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let software = parse_opt_id(args.software.as_deref(), EntityPrefix::Sw)?;
    print_list(&store.list_components(software.as_ref())?, global)
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;

    let mut component = Component::new(args.name, parse_id(&args.software, EntityPrefix::Sw)?);
    component.description = args.description;
    component.repo_url = args.repo_url;
    component.ticket_url = args.ticket_url;
    component.contacts.engineering = parse_opt_id(args.engineering.as_deref(), EntityPrefix::Con)?;
    component.contacts.business = parse_opt_id(args.business.as_deref(), EntityPrefix::Con)?;
    component.contacts.psrd = parse_opt_id(args.psrd.as_deref(), EntityPrefix::Con)?;
    component.milestones.dev_preview = parse_opt_date(args.dev_preview.as_deref())?;
    component.milestones.tech_preview = parse_opt_date(args.tech_preview.as_deref())?;
    component.milestones.general_availability = parse_opt_date(args.ga.as_deref())?;

    let component = store.create_component(&component)?;
    print_saved("Created", &component, global);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let id = parse_id(&args.id, EntityPrefix::Cmp)?;
    let mut component = store.get_component(&id)?;

    if let Some(name) = args.name {
        component.name = name;
    }
    if let Some(software) = args.software {
        component.software = parse_id(&software, EntityPrefix::Sw)?;
    }
    if let Some(description) = args.description {
        component.description = description;
    }
    if let Some(url) = args.repo_url {
        component.repo_url = url;
    }
    if let Some(url) = args.ticket_url {
        component.ticket_url = url;
    }

    let contacts = &mut component.contacts;
    contacts.engineering = edit_ref(
        args.engineering.as_deref(),
        contacts.engineering.take(),
        EntityPrefix::Con,
    )?;
    contacts.business = edit_ref(args.business.as_deref(), contacts.business.take(), EntityPrefix::Con)?;
    contacts.psrd = edit_ref(args.psrd.as_deref(), contacts.psrd.take(), EntityPrefix::Con)?;

    let milestones = &mut component.milestones;
    milestones.dev_preview = edit_date(args.dev_preview.as_deref(), milestones.dev_preview)?;
    milestones.tech_preview = edit_date(args.tech_preview.as_deref(), milestones.tech_preview)?;
    milestones.general_availability =
        edit_date(args.ga.as_deref(), milestones.general_availability)?;

    let component = store.update_component(&component)?;
    print_saved("Updated", &component, global);
    Ok(())
}
