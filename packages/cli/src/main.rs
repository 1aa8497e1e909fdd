mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{expand, init, inspect, ExpandArgs, InitArgs, InspectArgs};

/// lsxgen - Variant expansion for LSX resource banks
#[derive(Parser, Debug)]
#[command(name = "lsxgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a default lsxgen.config.json
    Init(InitArgs),

    /// Expand every template node into one entry per variant
    Expand(ExpandArgs),

    /// List the template nodes a bank contains
    Inspect(InspectArgs),
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = std::env::current_dir()
        .map_err(anyhow::Error::from)
        .and_then(|cwd| {
            let cwd = cwd.display().to_string();
            match cli.command {
                Command::Init(args) => init(args, &cwd),
                Command::Expand(args) => expand(args, &cwd),
                Command::Inspect(args) => inspect(args, &cwd),
            }
        });

    if let Err(err) = result {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
