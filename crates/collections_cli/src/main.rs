mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ecol")]
#[command(version, about = "Entity Collections Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a collection configuration and print the compiled plan summary
    Check {
        /// Path to the configuration file (YAML, TOML, or JSON)
        config: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Validate records from a JSON file against a collection configuration
    Validate {
        /// Path to the configuration file (YAML, TOML, or JSON)
        config: String,

        /// Path to a JSON file with one record or an array of records
        records: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Scaffold a starter collection configuration
    Init {
        /// Collection name
        name: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    // Execute command
    match cli.command {
        Commands::Check { config, format } => commands::check::execute(&config, &format),

        Commands::Validate {
            config,
            records,
            format,
        } => commands::validate::execute(&config, &records, &format),

        Commands::Init { name, output } => commands::init::execute(&name, output.as_deref()),
    }
}
