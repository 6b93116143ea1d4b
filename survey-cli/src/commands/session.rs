//! Session command handlers
//!
//! Browsing collected sessions, their answers and audio recordings.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use serde_json::Value;
use survey_client::SurveyClient;
use survey_core::domain::response::Response;
use survey_core::domain::session::{Session, SessionStatus};

use crate::config::Config;
use crate::id_resolver::{resolve_link_id, resolve_question_id, resolve_session_id};
use crate::types::IdOrPrefix;

/// Session subcommands
#[derive(Subcommand)]
pub enum SessionCommands {
    /// List sessions
    List {
        /// Only sessions started from this link (ID or prefix)
        #[arg(short, long)]
        link: Option<String>,
    },
    /// Show a session's answers
    Responses {
        /// Session ID or unambiguous prefix
        id: String,
    },
    /// Save the audio attached to an answer
    Audio {
        /// Session ID or unambiguous prefix
        session: String,

        /// Question ID or unambiguous prefix
        question: String,

        /// Output file (defaults to <session>-<question>.<ext>)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Handle session commands
pub async fn handle_session_command(command: SessionCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        SessionCommands::List { link } => list_sessions(&client, link).await,
        SessionCommands::Responses { id } => list_responses(&client, &id).await,
        SessionCommands::Audio {
            session,
            question,
            output,
        } => save_audio(&client, &session, &question, output).await,
    }
}

/// List sessions
async fn list_sessions(client: &SurveyClient, link: Option<String>) -> Result<()> {
    let link_id = match link {
        Some(link) => Some(resolve_link_id(client, &IdOrPrefix::parse(&link)).await?),
        None => None,
    };

    let sessions = client.list_sessions(link_id).await?;

    if sessions.is_empty() {
        println!("{}", "No sessions found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} session(s):", sessions.len()).bold());
    println!();
    for session in &sessions {
        print_session_summary(session);
    }

    Ok(())
}

/// Show the responses of a session
async fn list_responses(client: &SurveyClient, id: &str) -> Result<()> {
    let uuid = resolve_session_id(client, &IdOrPrefix::parse(id)).await?;
    let session = client.get_session(uuid).await?;
    let responses = client.list_responses(uuid).await?;
    let questions = client.list_questions(Some(session.role)).await?;

    print_session_summary(&session);

    if responses.is_empty() {
        println!("{}", "No answers recorded yet.".yellow());
        return Ok(());
    }

    for question in &questions {
        let Some(response) = responses.iter().find(|r| r.question_id == question.id) else {
            continue;
        };
        println!("  {} {}", "▸".cyan(), question.text.bold());
        println!("    {}", format_answer(response));
    }

    Ok(())
}

/// Write an answer's audio recording to a file
async fn save_audio(
    client: &SurveyClient,
    session: &str,
    question: &str,
    output: Option<String>,
) -> Result<()> {
    let session_id = resolve_session_id(client, &IdOrPrefix::parse(session)).await?;
    let question_id = resolve_question_id(client, &IdOrPrefix::parse(question)).await?;

    let (mime_type, data) = client.download_audio(session_id, question_id).await?;

    let path = output.unwrap_or_else(|| {
        format!(
            "{}-{}.{}",
            &session_id.to_string()[..8],
            &question_id.to_string()[..8],
            extension_for(mime_type.as_deref())
        )
    });
    std::fs::write(&path, &data).with_context(|| format!("Failed to write audio: {}", path))?;

    println!("{}", "✓ Audio saved!".green().bold());
    println!("  File: {}", path.cyan());
    println!(
        "  Size: {} bytes ({})",
        data.len(),
        mime_type.as_deref().unwrap_or("unknown type").dimmed()
    );

    Ok(())
}

fn extension_for(mime_type: Option<&str>) -> &'static str {
    let essence = mime_type
        .and_then(|m| m.split(';').next())
        .map(str::trim)
        .unwrap_or_default();

    match essence {
        "audio/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/mpeg" => "mp3",
        "audio/wav" | "audio/x-wav" => "wav",
        "audio/mp4" => "m4a",
        _ => "bin",
    }
}

fn format_answer(response: &Response) -> String {
    let value = match &response.value {
        Value::Null => "(skipped)".dimmed().to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|i| i.as_str().map(str::to_string).unwrap_or_else(|| i.to_string()))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };

    match &response.audio {
        Some(audio) => format!(
            "{} {}",
            value,
            format!("[audio {}, {} bytes]", audio.mime_type, audio.size_bytes).magenta()
        ),
        None => value,
    }
}

/// Print a session summary
fn print_session_summary(session: &Session) {
    let status = match session.status {
        SessionStatus::Completed => session.status.as_str().green(),
        SessionStatus::InProgress => session.status.as_str().yellow(),
    };

    println!(
        "  {} {} {} [{}]",
        "▸".cyan(),
        session.id.to_string().bold(),
        session.role,
        status
    );
    println!(
        "    Started:       {}",
        session.started_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "    Last activity: {}",
        session
            .last_activity_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(completed_at) = session.completed_at {
        println!(
            "    Completed:     {}",
            completed_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
}
