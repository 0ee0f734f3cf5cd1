//! Output formatting for list, show and create commands
//!
//! Every entity that can be listed implements [`Tabular`], which gives the
//! table/CSV columns. JSON and YAML come straight from serde.

use std::io;

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{or_dash, resolve_format, truncate_str};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::Candidate;
use crate::core::Entity;
use crate::entities::{
    Activity, Association, Campaign, Component, ComponentActivity, ComponentFeature, Contact,
    Feature, FeatureCategory, Link, Requirement, Software, Standard, Threat,
};

/// Column layout for table and CSV output
pub trait Tabular: Serialize {
    /// Singular noun used in messages
    const NOUN: &'static str;

    fn headers() -> Vec<&'static str>;

    fn row(&self) -> Vec<String>;

    fn record_id(&self) -> String;
}

/// Print a collection in the requested format (tables by default)
pub fn print_list<T: Tabular>(items: &[T], global: &GlobalOpts) -> Result<()> {
    match resolve_format(global, OutputFormat::Table) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).into_diagnostic()?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(items).into_diagnostic()?);
        }
        OutputFormat::Csv => {
            write_csv(T::headers(), items.iter().map(|i| i.row()))?;
        }
        OutputFormat::Id => {
            for item in items {
                println!("{}", item.record_id());
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            if items.is_empty() {
                if !global.quiet {
                    println!("No {}s found.", T::NOUN);
                }
                return Ok(());
            }
            print_table(T::headers(), items.iter().map(|i| i.row()));
            if !global.quiet {
                println!();
                println!("{} {}(s) found.", style(items.len()).cyan(), T::NOUN);
            }
        }
    }
    Ok(())
}

/// Print a single record (YAML by default)
pub fn print_record<T: Tabular>(item: &T, global: &GlobalOpts) -> Result<()> {
    match resolve_format(global, OutputFormat::Yaml) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item).into_diagnostic()?);
        }
        OutputFormat::Yaml | OutputFormat::Auto => {
            print!("{}", serde_yml::to_string(item).into_diagnostic()?);
        }
        OutputFormat::Csv => write_csv(T::headers(), std::iter::once(item.row()))?,
        OutputFormat::Id => println!("{}", item.record_id()),
        OutputFormat::Table => {
            let mut builder = Builder::default();
            for (header, value) in T::headers().into_iter().zip(item.row()) {
                builder.push_record([header.to_string(), value]);
            }
            println!("{}", builder.build().with(Style::psql()));
        }
    }
    Ok(())
}

/// Report a created or updated record; `--format id` prints only the id
pub fn print_saved<T: Tabular + Entity>(verb: &str, item: &T, global: &GlobalOpts) {
    if global.format == OutputFormat::Id {
        println!("{}", item.record_id());
        return;
    }
    if global.quiet {
        return;
    }
    println!(
        "{} {} {} {} {}",
        style("✓").green(),
        verb,
        T::NOUN,
        style(item.record_id()).cyan(),
        style(item.label()).yellow()
    );
}

pub fn print_deleted(noun: &str, id: &str, global: &GlobalOpts) {
    if !global.quiet {
        println!("{} Deleted {} {}", style("✓").green(), noun, style(id).cyan());
    }
}

pub fn print_table<I>(headers: Vec<&'static str>, rows: I)
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(headers);
    for row in rows {
        builder.push_record(row);
    }
    println!("{}", builder.build().with(Style::psql()));
}

pub fn write_csv<I>(headers: Vec<&'static str>, rows: I) -> Result<()>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = csv::Writer::from_writer(io::stdout());
    writer.write_record(&headers).into_diagnostic()?;
    for row in rows {
        writer.write_record(&row).into_diagnostic()?;
    }
    writer.flush().into_diagnostic()
}

fn date_str(date: Option<chrono::NaiveDate>) -> String {
    or_dash(date.map(|d| d.format("%Y-%m-%d")))
}

impl Tabular for Software {
    const NOUN: &'static str = "software";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            truncate_str(&self.description, 40),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Component {
    const NOUN: &'static str = "component";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "SOFTWARE", "REPO", "GA"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.software.to_string(),
            truncate_str(&self.repo_url, 40),
            date_str(self.milestones.general_availability),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Contact {
    const NOUN: &'static str = "contact";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "EMAIL", "KIND"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.kind.to_string(),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Feature {
    const NOUN: &'static str = "feature";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "CATEGORY", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            or_dash(self.category.as_ref()),
            truncate_str(&self.description, 40),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for FeatureCategory {
    const NOUN: &'static str = "category";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            truncate_str(&self.description, 40),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Threat {
    const NOUN: &'static str = "threat";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            truncate_str(&self.description, 40),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Standard {
    const NOUN: &'static str = "standard";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "CODE", "NAME"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.code.clone(), self.name.clone()]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Requirement {
    const NOUN: &'static str = "requirement";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "CODE", "NAME", "DEFINITION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.code.clone(),
            self.name.clone(),
            truncate_str(&self.definition, 50),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Activity {
    const NOUN: &'static str = "activity";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "DESCRIPTION"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            truncate_str(&self.description, 40),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for ComponentFeature {
    const NOUN: &'static str = "component feature";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "COMPONENT", "FEATURE", "PRIORITY", "STATUS"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.component_name.clone(),
            self.feature_name.clone(),
            self.priority.to_string(),
            self.status.to_string(),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for ComponentActivity {
    const NOUN: &'static str = "component activity";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "COMPONENT", "ACTIVITY", "VERSION", "STATUS", "ETA"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.component_name.clone(),
            self.activity_name.clone(),
            or_dash(Some(&self.component_version).filter(|v| !v.is_empty())),
            self.status.to_string(),
            date_str(self.schedule.estimated_completion),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Campaign {
    const NOUN: &'static str = "campaign";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "NAME", "STATUS", "DUE"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.status.to_string(),
            date_str(self.due_date),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Link {
    const NOUN: &'static str = "link";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "KIND", "NAME", "URL", "OWNER"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.kind.to_string(),
            self.name.clone(),
            truncate_str(&self.url, 50),
            or_dash(self.owner.as_ref()),
        ]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}

impl Tabular for Association {
    const NOUN: &'static str = "association";

    fn headers() -> Vec<&'static str> {
        vec!["RELATION", "OWNER", "TARGET", "LINKED"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.relation.to_string(),
            self.owner.to_string(),
            self.target.to_string(),
            self.created.format("%Y-%m-%d").to_string(),
        ]
    }

    fn record_id(&self) -> String {
        self.target.to_string()
    }
}

impl Tabular for Candidate {
    const NOUN: &'static str = "target";

    fn headers() -> Vec<&'static str> {
        vec!["ID", "LABEL"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.to_string(), self.label.clone()]
    }

    fn record_id(&self) -> String {
        self.id.to_string()
    }
}
