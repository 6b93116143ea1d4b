//! Survey CLI
//!
//! Command-line interface for administering the survey server: questions,
//! distribution links, collected sessions and results.

mod commands;
mod config;
mod id_resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "survey")]
#[command(about = "Role-based survey administration CLI", long_about = None)]
struct Cli {
    /// Survey server URL
    #[arg(long, env = "SURVEY_SERVER_URL", default_value = "http://localhost:8080")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
    };

    handle_command(cli.command, &config).await
}
