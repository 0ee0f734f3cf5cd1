use miette::Result;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use super::{write_output, write_structured};
use crate::cli::helpers::{open_store, parse_id, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::store::ComplianceMatrix;
use crate::core::Entity;

#[derive(clap::Args, Debug)]
pub struct ComplianceArgs {
    /// Component ID
    pub component: String,

    /// Standard ID
    pub standard: String,

    /// Only list requirements without any activity execution
    #[arg(long)]
    pub gaps_only: bool,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SoaArgs {
    /// Component ID
    pub component: String,

    /// Output to file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run_compliance(args: ComplianceArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let component = parse_id(&args.component, EntityPrefix::Cmp)?;
    let standard = parse_id(&args.standard, EntityPrefix::Std)?;
    let matrix = store.compliance_matrix(&component, &standard)?;

    if write_structured(&matrix, global)? {
        return Ok(());
    }

    let mut output = format!(
        "# Compliance: {} / {}\n\n",
        matrix.component.name, matrix.standard.name
    );
    render_matrix(&mut output, &matrix, args.gaps_only);
    write_output(&output, args.output)
}

pub fn run_soa(args: SoaArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let component = parse_id(&args.component, EntityPrefix::Cmp)?;
    let component_record = store.get_component(&component)?;
    let matrices = store.statement_of_applicability(&component)?;

    if write_structured(&matrices, global)? {
        return Ok(());
    }

    let mut output = format!("# Statement of Applicability: {}\n\n", component_record.name);
    if matrices.is_empty() {
        output.push_str("No standards apply to this component.\n");
        return write_output(&output, args.output);
    }

    let mut summary = Builder::default();
    summary.push_record(["Standard", "Requirements", "Covered", "Gaps"]);
    for matrix in &matrices {
        summary.push_record([
            matrix.standard.name.clone(),
            matrix.rows.len().to_string(),
            matrix.covered().to_string(),
            matrix.gaps().len().to_string(),
        ]);
    }
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    for matrix in &matrices {
        output.push_str(&format!("\n## {}\n\n", matrix.standard.name));
        render_matrix(&mut output, matrix, false);
    }
    write_output(&output, args.output)
}

fn render_matrix(output: &mut String, matrix: &ComplianceMatrix, gaps_only: bool) {
    let rows: Vec<_> = matrix
        .rows
        .iter()
        .filter(|row| !gaps_only || row.is_gap())
        .collect();

    if rows.is_empty() {
        output.push_str(if gaps_only {
            "No gaps.\n"
        } else {
            "This standard has no requirements.\n"
        });
        return;
    }

    let mut table = Builder::default();
    table.push_record(["Requirement", "Definition", "Activities"]);
    for row in rows {
        let activities = if row.is_gap() {
            "GAP".to_string()
        } else {
            row.activities
                .iter()
                .map(|a| format!("{} ({})", a.activity_name, a.status))
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.push_record([
            row.requirement.label(),
            truncate_str(&row.requirement.definition, 50),
            activities,
        ]);
    }
    output.push_str(&table.build().with(Style::markdown()).to_string());
    output.push('\n');
}
