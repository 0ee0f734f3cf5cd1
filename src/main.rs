use clap::Parser;
use miette::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ctrack::cli::commands;
use ctrack::cli::{helpers, Cli, Commands, GlobalOpts};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` or `grep -q` ends quietly instead of panicking
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_logging(&global);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Software(cmd) => commands::software::run(cmd, &global),
        Commands::Component(cmd) => commands::component::run(cmd, &global),
        Commands::Feature(cmd) => commands::feature::run(cmd, &global),
        Commands::Category(cmd) => commands::category::run(cmd, &global),
        Commands::Threat(cmd) => commands::threat::run(cmd, &global),
        Commands::Contact(cmd) => commands::contact::run(cmd, &global),
        Commands::Standard(cmd) => commands::standard::run(cmd, &global),
        Commands::Req(cmd) => commands::req::run(cmd, &global),
        Commands::Activity(cmd) => commands::activity::run(cmd, &global),
        Commands::Cfeat(cmd) => commands::cfeat::run(cmd, &global),
        Commands::Cact(cmd) => commands::cact::run(cmd, &global),
        Commands::Campaign(cmd) => commands::campaign::run(cmd, &global),
        Commands::Link(cmd) => commands::link::run(cmd, &global),
        Commands::Assoc(cmd) => commands::assoc::run(cmd, &global),
        Commands::Report(cmd) => commands::report::run(cmd, &global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// RUST_LOG wins, then `--verbose`, then the configured level
fn init_logging(global: &GlobalOpts) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if global.verbose {
            "debug".to_string()
        } else {
            helpers::load_config(global).log_level().to_string()
        };
        EnvFilter::new(format!("ctrack={}", level))
    });

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
