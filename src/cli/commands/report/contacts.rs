use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use super::{write_output, write_structured};
use crate::cli::helpers::{open_store, parse_id};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;

#[derive(clap::Args, Debug)]
pub struct ContactsArgs {
    /// Campaign ID
    pub campaign: String,

    /// Print a single comma-separated address list
    #[arg(long)]
    pub emails: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ContactsArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let id = parse_id(&args.campaign, EntityPrefix::Camp)?;

    if args.emails {
        let emails = store.campaign_contact_emails(&id)?;
        if write_structured(&emails, global)? {
            return Ok(());
        }
        return write_output(&format!("{}\n", emails.join(", ")), args.output);
    }

    let campaign = store.get_campaign(&id)?;
    let rollup = store.campaign_contacts(&id)?;
    if write_structured(&rollup, global)? {
        return Ok(());
    }

    let mut output = format!("# Contacts: {}\n\n", campaign.name);
    if rollup.is_empty() {
        output.push_str("No contacts reached by this campaign.\n");
        return write_output(&output, args.output);
    }

    let mut table = Builder::default();
    table.push_record(["Role", "Email"]);
    for (role, emails) in [
        ("Engineering", &rollup.engineering),
        ("Business", &rollup.business),
        ("PSRD", &rollup.psrd),
    ] {
        for email in emails {
            table.push_record([role, email.as_str()]);
        }
    }
    output.push_str(&table.build().with(Style::markdown()).to_string());
    output.push('\n');

    write_output(&output, args.output)
}
