//! `ctrack req` command - Requirements of standards

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{push_links, run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id, parse_opt_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::{Relation, Requirement};

#[derive(Subcommand, Debug)]
pub enum ReqCommands {
    /// List requirements
    List(ListArgs),

    /// Add a requirement to a standard
    New(NewArgs),

    /// Show a requirement
    Show(ShowArgs),

    /// Update a requirement and optionally replace its activities and features
    Edit(EditArgs),

    /// Delete a requirement
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only requirements of this standard
    #[arg(long, short = 's')]
    pub standard: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Owning standard ID
    #[arg(long, short = 's')]
    pub standard: String,

    /// Requirement text (unique within the standard)
    #[arg(long)]
    pub definition: String,

    #[arg(long, short = 'n', default_value = "")]
    pub name: String,

    /// Clause code, e.g. A.5.1
    #[arg(long, short = 'c', default_value = "")]
    pub code: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Requirement ID
    pub id: String,

    #[arg(long)]
    pub definition: Option<String>,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'c')]
    pub code: Option<String>,

    /// Replace satisfying activities (comma-separated ACT IDs; empty clears)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub activities: Option<Vec<String>>,

    /// Replace related features (comma-separated FEAT IDs; empty clears)
    #[arg(long, num_args = 0.., value_delimiter = ',')]
    pub features: Option<Vec<String>>,
}

pub fn run(cmd: ReqCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReqCommands::List(args) => {
            let store = open_store(global)?;
            let standard = parse_opt_id(args.standard.as_deref(), EntityPrefix::Std)?;
            print_list(&store.list_requirements(standard.as_ref())?, global)
        }
        ReqCommands::New(args) => {
            let mut store = open_store(global)?;
            let mut requirement =
                Requirement::new(parse_id(&args.standard, EntityPrefix::Std)?, args.definition);
            requirement.name = args.name;
            requirement.code = args.code;
            let requirement = store.create_requirement(&requirement)?;
            print_saved("Created", &requirement, global);
            Ok(())
        }
        ReqCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Req)?;
            print_record(&store.get_requirement(&id)?, global)
        }
        ReqCommands::Edit(args) => run_edit(args, global),
        ReqCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Req, global, |store, id| store.delete_requirement(id))
        }
    }
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let id = parse_id(&args.id, EntityPrefix::Req)?;
    let mut requirement = store.get_requirement(&id)?;

    if let Some(definition) = args.definition {
        requirement.definition = definition;
    }
    if let Some(name) = args.name {
        requirement.name = name;
    }
    if let Some(code) = args.code {
        requirement.code = code;
    }

    let mut links = Vec::new();
    push_links(&mut links, Relation::RequirementActivities, args.activities.as_ref())?;
    push_links(&mut links, Relation::RequirementFeatures, args.features.as_ref())?;

    let requirement = store.update_requirement_with_links(&requirement, &links)?;
    print_saved("Updated", &requirement, global);
    Ok(())
}
