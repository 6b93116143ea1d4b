//! Link command handlers
//!
//! Distribution links: creation, status, deactivation and QR export.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use colored::*;
use survey_client::SurveyClient;
use survey_core::domain::link::LinkStatus;
use survey_core::domain::role::Role;
use survey_core::dto::link::{CreateLink, LinkSummary};

use crate::config::Config;
use crate::id_resolver::resolve_link_id;
use crate::types::IdOrPrefix;

/// Link subcommands
#[derive(Subcommand)]
pub enum LinkCommands {
    /// Create a link for one role
    Create {
        /// nurse or doctor
        #[arg(short, long)]
        role: Role,

        /// Free-form label (ward, campaign, ...)
        #[arg(short, long, default_value = "")]
        label: String,

        /// Expiry as an RFC 3339 timestamp
        #[arg(long, conflicts_with = "expires_in_days")]
        expires_at: Option<DateTime<Utc>>,

        /// Expiry relative to now
        #[arg(long)]
        expires_in_days: Option<i64>,

        /// Maximum number of sessions the link may start
        #[arg(short, long)]
        max_uses: Option<u32>,
    },
    /// List all links
    List,
    /// Show a link
    Get {
        /// Link ID or unambiguous prefix
        id: String,
    },
    /// Stop a link from starting new sessions
    Deactivate {
        /// Link ID or unambiguous prefix
        id: String,
    },
    /// Delete a link and everything collected through it
    Delete {
        /// Link ID or unambiguous prefix
        id: String,
    },
    /// Save the link's QR image as SVG
    Qr {
        /// Link ID or unambiguous prefix
        id: String,

        /// Output file (defaults to <code>.svg)
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// Handle link commands
pub async fn handle_link_command(command: LinkCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        LinkCommands::Create {
            role,
            label,
            expires_at,
            expires_in_days,
            max_uses,
        } => {
            let expires_at = expiry(expires_at, expires_in_days, Utc::now())?;
            create_link(
                &client,
                CreateLink {
                    role,
                    label,
                    expires_at,
                    max_uses,
                },
            )
            .await
        }
        LinkCommands::List => list_links(&client).await,
        LinkCommands::Get { id } => get_link(&client, &id).await,
        LinkCommands::Deactivate { id } => deactivate_link(&client, &id).await,
        LinkCommands::Delete { id } => delete_link(&client, &id).await,
        LinkCommands::Qr { id, output } => save_qr(&client, &id, output).await,
    }
}

fn expiry(
    expires_at: Option<DateTime<Utc>>,
    expires_in_days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>> {
    match expires_in_days {
        Some(days) if days <= 0 => bail!("--expires-in-days must be positive"),
        Some(days) => {
            let expires_at = Duration::try_days(days)
                .and_then(|delta| now.checked_add_signed(delta))
                .with_context(|| format!("--expires-in-days {} is too far in the future", days))?;
            Ok(Some(expires_at))
        }
        None => Ok(expires_at),
    }
}

/// Create a new link
async fn create_link(client: &SurveyClient, req: CreateLink) -> Result<()> {
    let summary = client.create_link(req).await?;

    println!("{}", "✓ Link created successfully!".green().bold());
    println!("  ID:   {}", summary.link.id.to_string().cyan());
    println!("  Code: {}", summary.link.code.bold());
    println!("  Role: {}", summary.link.role);
    println!("  URL:  {}", summary.url.underline());

    Ok(())
}

/// List all links
async fn list_links(client: &SurveyClient) -> Result<()> {
    let links = client.list_links().await?;

    if links.is_empty() {
        println!("{}", "No links found.".yellow());
        return Ok(());
    }

    println!("{}", format!("Found {} link(s):", links.len()).bold());
    println!();
    for summary in &links {
        print_link_summary(summary);
    }

    Ok(())
}

/// Get and display a single link
async fn get_link(client: &SurveyClient, id: &str) -> Result<()> {
    let uuid = resolve_link_id(client, &IdOrPrefix::parse(id)).await?;
    let summary = client.get_link(uuid).await?;

    print_link_details(&summary);

    Ok(())
}

/// Deactivate a link
async fn deactivate_link(client: &SurveyClient, id: &str) -> Result<()> {
    let uuid = resolve_link_id(client, &IdOrPrefix::parse(id)).await?;
    let summary = client.deactivate_link(uuid).await?;

    println!(
        "{}",
        format!("✓ Link {} deactivated", summary.link.code)
            .green()
            .bold()
    );

    Ok(())
}

/// Delete a link
async fn delete_link(client: &SurveyClient, id: &str) -> Result<()> {
    let uuid = resolve_link_id(client, &IdOrPrefix::parse(id)).await?;

    client.delete_link(uuid).await?;

    println!(
        "{}",
        format!("✓ Link {} deleted successfully!", uuid).green().bold()
    );

    Ok(())
}

/// Write the QR image to a file
async fn save_qr(client: &SurveyClient, id: &str, output: Option<String>) -> Result<()> {
    let uuid = resolve_link_id(client, &IdOrPrefix::parse(id)).await?;
    let summary = client.get_link(uuid).await?;
    let svg = client.link_qr_svg(uuid).await?;

    let path = output.unwrap_or_else(|| format!("{}.svg", summary.link.code));
    std::fs::write(&path, svg).with_context(|| format!("Failed to write QR image: {}", path))?;

    println!("{}", "✓ QR image saved!".green().bold());
    println!("  File: {}", path.cyan());
    println!("  URL:  {}", summary.url.dimmed());

    Ok(())
}

fn colored_status(status: LinkStatus) -> ColoredString {
    match status {
        LinkStatus::Active => status.as_str().green(),
        LinkStatus::Inactive => status.as_str().dimmed(),
        LinkStatus::Expired | LinkStatus::Exhausted => status.as_str().red(),
    }
}

fn usage(summary: &LinkSummary) -> String {
    match summary.link.max_uses {
        Some(max) => format!("{}/{}", summary.link.use_count, max),
        None => summary.link.use_count.to_string(),
    }
}

/// Print a link summary
fn print_link_summary(summary: &LinkSummary) {
    let link = &summary.link;
    println!(
        "  {} {} {} [{}]",
        "▸".cyan(),
        link.code.bold(),
        link.role.to_string().yellow(),
        colored_status(summary.status)
    );
    println!("    ID:    {}", link.id.to_string().dimmed());
    if !link.label.is_empty() {
        println!("    Label: {}", link.label);
    }
    println!("    Uses:  {}", usage(summary));
    println!();
}

/// Print detailed link information
fn print_link_details(summary: &LinkSummary) {
    let link = &summary.link;
    println!("{}", "Link Details:".bold());
    println!("  ID:      {}", link.id.to_string().cyan());
    println!("  Code:    {}", link.code.bold());
    println!("  Role:    {}", link.role);
    println!("  Status:  {}", colored_status(summary.status));
    println!("  URL:     {}", summary.url);
    if !link.label.is_empty() {
        println!("  Label:   {}", link.label);
    }
    println!("  Uses:    {}", usage(summary));
    if let Some(expires_at) = link.expires_at {
        println!("  Expires: {}", expires_at.format("%Y-%m-%d %H:%M:%S"));
    }
    println!("  Created: {}", link.created_at.format("%Y-%m-%d %H:%M:%S"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let now = Utc::now();

        assert_eq!(expiry(None, None, now).unwrap(), None);
        assert_eq!(
            expiry(None, Some(7), now).unwrap(),
            Some(now + Duration::days(7))
        );

        let fixed = now + Duration::hours(3);
        assert_eq!(expiry(Some(fixed), None, now).unwrap(), Some(fixed));

        assert!(expiry(None, Some(0), now).is_err());
        assert!(expiry(None, Some(100_000_000), now).is_err());
        assert!(expiry(None, Some(i64::MAX), now).is_err());
    }
}
