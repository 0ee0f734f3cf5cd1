//! `ctrack assoc` command - Many-to-many associations
//!
//! Relations are named from the owner's side, e.g. `campaign-component-features`
//! links a campaign to component features. Run `ctrack assoc relations` for the full list.

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{open_store, parse_id, parse_ids};
use crate::cli::output::print_list;
use crate::cli::GlobalOpts;
use crate::entities::Relation;

#[derive(Subcommand, Debug)]
pub enum AssocCommands {
    /// Replace every target of an owner in one step
    Set(SetArgs),

    /// Link one target
    Add(PairArgs),

    /// Unlink one target
    Remove(PairArgs),

    /// Show the targets linked to an owner
    List(OwnerArgs),

    /// Show the targets that may be linked for a relation
    Candidates(RelationArgs),

    /// Show every relation with its owner and target types
    Relations,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Relation name, e.g. campaign-component-features
    pub relation: Relation,

    /// Owner ID
    pub owner: String,

    /// Target IDs; none clears the relation
    pub targets: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct PairArgs {
    pub relation: Relation,

    /// Owner ID
    pub owner: String,

    /// Target ID
    pub target: String,
}

#[derive(clap::Args, Debug)]
pub struct OwnerArgs {
    pub relation: Relation,

    /// Owner ID
    pub owner: String,
}

#[derive(clap::Args, Debug)]
pub struct RelationArgs {
    pub relation: Relation,
}

pub fn run(cmd: AssocCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        AssocCommands::Set(args) => {
            let mut store = open_store(global)?;
            let owner = parse_id(&args.owner, args.relation.owner())?;
            let targets = parse_ids(&args.targets, args.relation.target())?;
            let linked = store.replace_associations(&owner, args.relation, &targets)?;
            if !global.quiet {
                println!(
                    "{} {} now has {} {} link(s)",
                    style("✓").green(),
                    style(&owner).cyan(),
                    linked.len(),
                    args.relation
                );
            }
            Ok(())
        }
        AssocCommands::Add(args) => {
            let mut store = open_store(global)?;
            let owner = parse_id(&args.owner, args.relation.owner())?;
            let target = parse_id(&args.target, args.relation.target())?;
            store.link(args.relation, &owner, &target)?;
            if !global.quiet {
                println!(
                    "{} Linked {} -> {}",
                    style("✓").green(),
                    style(&owner).cyan(),
                    style(&target).cyan()
                );
            }
            Ok(())
        }
        AssocCommands::Remove(args) => {
            let mut store = open_store(global)?;
            let owner = parse_id(&args.owner, args.relation.owner())?;
            let target = parse_id(&args.target, args.relation.target())?;
            store.unlink(args.relation, &owner, &target)?;
            if !global.quiet {
                println!(
                    "{} Unlinked {} -> {}",
                    style("✓").green(),
                    style(&owner).cyan(),
                    style(&target).cyan()
                );
            }
            Ok(())
        }
        AssocCommands::List(args) => {
            let store = open_store(global)?;
            let owner = parse_id(&args.owner, args.relation.owner())?;
            print_list(&store.linked_targets(args.relation, &owner)?, global)
        }
        AssocCommands::Candidates(args) => {
            let store = open_store(global)?;
            print_list(&store.candidates(args.relation)?, global)
        }
        AssocCommands::Relations => {
            for relation in Relation::all() {
                println!(
                    "{:<30} {} -> {}",
                    relation.as_str(),
                    relation.owner(),
                    relation.target()
                );
            }
            Ok(())
        }
    }
}
