//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// pom-view - Resolve a project descriptor with its ancestry and imports
#[derive(Parser, Debug)]
#[command(name = "pom-view")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the documents and BOM imports a view is built from
    Show(commands::show::ShowArgs),

    /// List dependencies with their resolved versions and scopes
    Deps(commands::deps::DepsArgs),

    /// List build plugins with their resolved group ids and versions
    Plugins(commands::plugins::PluginsArgs),

    /// Interpolate expressions against the view
    Eval(commands::eval::EvalArgs),
}

impl Cli {
    /// Initialise logging from `--log-level`; `RUST_LOG` takes precedence.
    pub fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        // A logger may already be installed when embedded in tests.
        let _ = env_logger::Builder::from_env(env).try_init();
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::Show(args) => commands::show::execute(args),
            Commands::Deps(args) => commands::deps::execute(args),
            Commands::Plugins(args) => commands::plugins::execute(args),
            Commands::Eval(args) => commands::eval::execute(args),
        }
    }
}
