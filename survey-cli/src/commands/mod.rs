//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod link;
mod question;
mod session;
mod stats;

pub use link::LinkCommands;
pub use question::QuestionCommands;
pub use session::SessionCommands;

use anyhow::Result;
use clap::Subcommand;
use survey_core::domain::role::Role;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Question management
    Question {
        #[command(subcommand)]
        command: QuestionCommands,
    },
    /// Distribution link management
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Collected sessions and responses
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Survey statistics
    Stats {
        /// Only count sessions (and questions) of this role
        #[arg(short, long)]
        role: Option<Role>,
    },
}

/// Route a command to its handler module
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Question { command } => question::handle_question_command(command, config).await,
        Commands::Link { command } => link::handle_link_command(command, config).await,
        Commands::Session { command } => session::handle_session_command(command, config).await,
        Commands::Stats { role } => stats::show_stats(config, role).await,
    }
}
