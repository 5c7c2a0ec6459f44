//! FleetScope CLI
//!
//! Inspect resolved edge scopes of projects, applications, data streams and
//! data-driver bindings

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fleetscope_core::logging_facility;

mod commands;
mod config;

#[derive(Debug, Parser)]
#[command(name = "fleetscope")]
#[command(about = "FleetScope - Edge scope resolution", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./fleetscope.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tenant to act in
    #[arg(long, global = true, default_value = "default")]
    tenant: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending schema migrations
    Migrate,
    /// Project operations
    Project(commands::scope::ProjectArgs),
    /// Application operations
    App(commands::scope::EntityArgs),
    /// Data stream operations
    Stream(commands::scope::EntityArgs),
    /// Data-driver binding operations
    Binding(commands::binding::BindingArgs),
}

fn main() {
    let cli = Cli::parse();

    let result = run(cli);
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load(cli.config.as_deref())?;
    logging_facility::init(config.profile()?);

    let ctx = commands::Context::new(config, cli.tenant);
    match cli.command {
        Commands::Migrate => commands::migrate::execute(&ctx),
        Commands::Project(args) => commands::scope::execute_project(&ctx, args),
        Commands::App(args) => {
            commands::scope::execute_entity(&ctx, fleetscope_core::EntityKind::Application, args)
        }
        Commands::Stream(args) => {
            commands::scope::execute_entity(&ctx, fleetscope_core::EntityKind::DataStream, args)
        }
        Commands::Binding(args) => commands::binding::execute(&ctx, args),
    }
}
