//! ID resolver module
//!
//! Resolves UUID prefixes to full UUIDs by listing the resource from the API,
//! so users can type short, unambiguous prefixes instead of full UUIDs.

use anyhow::{Context, Result, anyhow};
use survey_client::SurveyClient;
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Pick the single ID matching `id_or_prefix` out of `ids`
fn pick(
    kind: &str,
    id_or_prefix: &IdOrPrefix,
    ids: impl IntoIterator<Item = Uuid>,
) -> Result<Uuid> {
    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id_or_prefix.matches(*id))
        .collect();

    match matches.as_slice() {
        [] => Err(anyhow!(
            "No {} found with ID starting with '{}'",
            kind,
            id_or_prefix
        )),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple {}s: {}",
                id_or_prefix,
                kind,
                ids.join(", ")
            ))
        }
    }
}

/// Resolve a question ID or prefix to a full UUID
pub async fn resolve_question_id(client: &SurveyClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let questions = client
        .list_questions(None)
        .await
        .context("Failed to fetch questions for ID resolution")?;

    pick("question", id_or_prefix, questions.iter().map(|q| q.id))
}

/// Resolve a link ID or prefix to a full UUID
pub async fn resolve_link_id(client: &SurveyClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let links = client
        .list_links()
        .await
        .context("Failed to fetch links for ID resolution")?;

    pick("link", id_or_prefix, links.iter().map(|l| l.link.id))
}

/// Resolve a session ID or prefix to a full UUID
pub async fn resolve_session_id(client: &SurveyClient, id_or_prefix: &IdOrPrefix) -> Result<Uuid> {
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let sessions = client
        .list_sessions(None)
        .await
        .context("Failed to fetch sessions for ID resolution")?;

    pick("session", id_or_prefix, sessions.iter().map(|s| s.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Uuid {
        Uuid::parse_str(s).unwrap()
    }

    #[test]
    fn test_pick_unique_prefix() {
        let ids = [
            id("aa000000-0000-4000-8000-000000000001"),
            id("ab000000-0000-4000-8000-000000000002"),
        ];
        let found = pick("link", &IdOrPrefix::parse("ab"), ids).unwrap();
        assert_eq!(found, ids[1]);
    }

    #[test]
    fn test_pick_ambiguous_or_missing() {
        let ids = [
            id("aa000000-0000-4000-8000-000000000001"),
            id("aa100000-0000-4000-8000-000000000002"),
        ];
        let err = pick("question", &IdOrPrefix::parse("aa"), ids).unwrap_err();
        assert!(err.to_string().contains("Ambiguous prefix 'aa'"));

        let err = pick("question", &IdOrPrefix::parse("ff"), ids).unwrap_err();
        assert!(err.to_string().contains("No question found"));
    }
}
