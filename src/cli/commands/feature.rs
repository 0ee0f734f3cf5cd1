//! `ctrack feature` command - Feature catalog

use clap::Subcommand;
use miette::Result;

use crate::cli::commands::utils::{edit_ref, run_delete, DeleteArgs, ShowArgs};
use crate::cli::helpers::{open_store, parse_id, parse_opt_id};
use crate::cli::output::{print_list, print_record, print_saved};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::entities::Feature;

#[derive(Subcommand, Debug)]
pub enum FeatureCommands {
    /// List features
    List(ListArgs),

    /// Add a feature to the catalog
    New(NewArgs),

    /// Show a feature
    Show(ShowArgs),

    /// Update a feature
    Edit(EditArgs),

    /// Delete a feature
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Only features in this category
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Unique feature name
    #[arg(long, short = 'n')]
    pub name: String,

    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Feature category ID
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Feature ID
    pub id: String,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Category ID, or `none` to uncategorize
    #[arg(long, short = 'c')]
    pub category: Option<String>,
}

pub fn run(cmd: FeatureCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        FeatureCommands::List(args) => {
            let store = open_store(global)?;
            let category = parse_opt_id(args.category.as_deref(), EntityPrefix::Fcat)?;
            print_list(&store.list_features(category.as_ref())?, global)
        }
        FeatureCommands::New(args) => {
            let mut store = open_store(global)?;
            let mut feature = Feature::new(args.name);
            feature.description = args.description;
            feature.category = parse_opt_id(args.category.as_deref(), EntityPrefix::Fcat)?;
            let feature = store.create_feature(&feature)?;
            print_saved("Created", &feature, global);
            Ok(())
        }
        FeatureCommands::Show(args) => {
            let store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Feat)?;
            print_record(&store.get_feature(&id)?, global)
        }
        FeatureCommands::Edit(args) => {
            let mut store = open_store(global)?;
            let id = parse_id(&args.id, EntityPrefix::Feat)?;
            let mut feature = store.get_feature(&id)?;
            if let Some(name) = args.name {
                feature.name = name;
            }
            if let Some(description) = args.description {
                feature.description = description;
            }
            feature.category =
                edit_ref(args.category.as_deref(), feature.category.take(), EntityPrefix::Fcat)?;
            let feature = store.update_feature(&feature)?;
            print_saved("Updated", &feature, global);
            Ok(())
        }
        FeatureCommands::Delete(args) => {
            run_delete(&args, EntityPrefix::Feat, global, |store, id| store.delete_feature(id))
        }
    }
}
