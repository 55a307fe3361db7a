use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod plan_file;

#[derive(Parser)]
#[command(name = "brewguide-cli", version, about = "Brewguide CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect brew plan files
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Run a guided brew session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log to stderr so stdout stays machine-readable. Filter via BREWGUIDE_LOG.
fn init_logging() {
    let filter = EnvFilter::try_from_env("BREWGUIDE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Session { action } => commands::session::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
