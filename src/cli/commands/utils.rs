//! Shared argument types and helpers for entity commands

use chrono::NaiveDate;
use console::style;
use miette::Result;

use crate::cli::helpers::{confirm, open_store, parse_date, parse_id, parse_ids};
use crate::cli::output::print_deleted;
use crate::cli::GlobalOpts;
use crate::core::error::StoreError;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::store::Store;
use crate::entities::Relation;

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Entity ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Entity ID
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Confirm, then delete one record through `delete`
pub fn run_delete<F>(
    args: &DeleteArgs,
    prefix: EntityPrefix,
    global: &GlobalOpts,
    delete: F,
) -> Result<()>
where
    F: FnOnce(&mut Store, &EntityId) -> std::result::Result<(), StoreError>,
{
    let id = parse_id(&args.id, prefix)?;
    let mut store = open_store(global)?;

    let prompt = format!("Delete {} {}?", prefix.entity_name(), id);
    if !confirm(&prompt, args.yes)? {
        println!("{} Cancelled", style("!").yellow());
        return Ok(());
    }

    delete(&mut store, &id)?;
    print_deleted(prefix.entity_name(), &id.to_string(), global);
    Ok(())
}

/// Apply a date flag on edit: absent keeps the current value, `none` or an empty value clears it
pub fn edit_date(value: Option<&str>, current: Option<NaiveDate>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None => Ok(current),
        Some("") | Some("none") => Ok(None),
        Some(s) => parse_date(s).map(Some),
    }
}

/// Apply an optional reference flag on edit, same rules as [`edit_date`]
pub fn edit_ref(
    value: Option<&str>,
    current: Option<EntityId>,
    prefix: EntityPrefix,
) -> Result<Option<EntityId>> {
    match value.map(str::trim) {
        None => Ok(current),
        Some("") | Some("none") => Ok(None),
        Some(s) => parse_id(s, prefix).map(Some),
    }
}

/// Collect a `--<relation> a,b,c` flag into a full-replace link set.
///
/// An omitted flag leaves the relation untouched; a flag with no values clears it.
pub fn push_links(
    links: &mut Vec<(Relation, Vec<EntityId>)>,
    relation: Relation,
    values: Option<&Vec<String>>,
) -> Result<()> {
    if let Some(values) = values {
        let values: Vec<String> = values
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        links.push((relation, parse_ids(&values, relation.target())?));
    }
    Ok(())
}
