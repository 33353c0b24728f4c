pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "milesquote",
    about = "Milesquote operator CLI",
    long_about = "Price miles quotes, inspect effective configuration, and check lead delivery readiness.",
    after_help = "Examples:\n  milesquote quote --airline LATAM --points 100000\n  milesquote config\n  milesquote doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Estimate the value of a points balance using the configured rate table")]
    Quote {
        #[arg(long, help = "Airline identifier as listed in the rate table")]
        airline: String,
        #[arg(long, help = "Points balance; thousands separators are accepted")]
        points: String,
        #[arg(long, help = "Read rates from this JSON file instead of the configured source")]
        rates_file: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, rate table and lead delivery readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Quote { airline, points, rates_file } => {
            commands::quote::run(&airline, &points, rates_file)
        }
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
