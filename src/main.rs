mod cli;
mod config;
mod debris;
mod orbit;
mod predict;
mod web;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Commands;

#[derive(Parser)]
#[command(name = "debris-watch")]
#[command(about = "Orbit propagation, debris proximity screening and pass prediction")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli::execute(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
