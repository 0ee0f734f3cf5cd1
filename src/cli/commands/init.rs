//! `ctrack init` command - Initialize a new tracker project

use console::style;
use miette::{IntoDiagnostic, Result};
use tracing::debug;

use crate::core::project::{Project, ProjectError};
use crate::core::store::Store;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Rewrite the project skeleton even if .ctrack/ already exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            let db_path = project.database_path(None);
            let store = Store::open(&db_path)?;
            debug!(path = %db_path.display(), version = store.schema_version()?, "database ready");

            println!(
                "{} Initialized tracker project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!("  config:   {}", project.config_path().display());
            println!("  database: {}", db_path.display());
            println!();
            println!("Next steps:");
            println!(
                "  {} Register a software product",
                style("ctrack software new --name <NAME>").yellow()
            );
            println!(
                "  {} Add its components",
                style("ctrack component new --name <NAME> --software <SW-ID>").yellow()
            );
            println!(
                "  {} Start a campaign",
                style("ctrack campaign new --name <NAME>").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} Tracker project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("ctrack init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
