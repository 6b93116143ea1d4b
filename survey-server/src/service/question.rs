//! Question Service
//!
//! Business logic for question management: definition checks, condition
//! authoring rules and display ordering.

use sqlx::SqlitePool;
use std::collections::HashSet;
use survey_core::conditions::validate_conditions;
use survey_core::domain::question::{Question, QuestionType, ScaleRange};
use survey_core::domain::role::Role;
use survey_core::dto::question::CreateQuestion;
use uuid::Uuid;

use crate::repository::{question_repository, response_repository};

/// Service error type
#[derive(Debug)]
pub enum QuestionError {
    NotFound(Uuid),
    ValidationError(String),
    InUse(String),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for QuestionError {
    fn from(err: sqlx::Error) -> Self {
        QuestionError::DatabaseError(err)
    }
}

pub type Result<T> = std::result::Result<T, QuestionError>;

/// Create a new question
pub async fn create_question(pool: &SqlitePool, req: CreateQuestion) -> Result<Question> {
    let req = normalize_question_request(req);
    validate_question_request(&req)?;

    let existing = question_repository::list_all(pool).await?;
    let display_order = req.display_order.unwrap_or_else(|| next_display_order(&existing));

    validate_conditions(None, display_order, &req.conditions, &existing)
        .map_err(|e| QuestionError::ValidationError(e.to_string()))?;

    let question = question_repository::create(pool, &req, display_order).await?;

    tracing::info!("Question created: {} ({})", question.id, question.question_type);

    Ok(question)
}

/// Get a question by ID
pub async fn get_question(pool: &SqlitePool, id: Uuid) -> Result<Question> {
    let question = question_repository::find_by_id(pool, id)
        .await?
        .ok_or(QuestionError::NotFound(id))?;

    Ok(question)
}

/// List questions in display order, optionally only those a role would see
pub async fn list_questions(pool: &SqlitePool, role: Option<Role>) -> Result<Vec<Question>> {
    let questions = question_repository::list_all(pool).await?;

    Ok(match role {
        Some(role) => questions
            .into_iter()
            .filter(|q| q.audience.includes(role))
            .collect(),
        None => questions,
    })
}

/// Replace a question's definition
pub async fn update_question(pool: &SqlitePool, id: Uuid, req: CreateQuestion) -> Result<Question> {
    let req = normalize_question_request(req);
    validate_question_request(&req)?;

    let all = question_repository::list_all(pool).await?;
    let current = all
        .iter()
        .find(|q| q.id == id)
        .ok_or(QuestionError::NotFound(id))?;
    let display_order = req.display_order.unwrap_or(current.display_order);

    let others: Vec<Question> = all.iter().filter(|q| q.id != id).cloned().collect();

    validate_conditions(Some(id), display_order, &req.conditions, &others)
        .map_err(|e| QuestionError::ValidationError(e.to_string()))?;

    // Questions depending on this one must stay after it.
    if let Some(dependent) = others
        .iter()
        .find(|q| depends_on(q, id) && q.display_order <= display_order)
    {
        return Err(QuestionError::ValidationError(format!(
            "Question {} depends on this question and would no longer come after it",
            dependent.id
        )));
    }

    let updated = question_repository::update(pool, id, &req, display_order).await?;

    if !updated {
        return Err(QuestionError::NotFound(id));
    }

    tracing::info!("Question updated: {}", id);

    get_question(pool, id).await
}

/// Delete a question unless another question's conditions reference it
pub async fn delete_question(pool: &SqlitePool, id: Uuid) -> Result<()> {
    let all = question_repository::list_all(pool).await?;

    let dependents: Vec<String> = all
        .iter()
        .filter(|q| q.id != id && depends_on(q, id))
        .map(|q| q.id.to_string())
        .collect();

    if !dependents.is_empty() {
        return Err(QuestionError::InUse(format!(
            "Question {} is referenced by the conditions of: {}",
            id,
            dependents.join(", ")
        )));
    }

    let answers = response_repository::count_for_question(pool, id).await?;
    let deleted = question_repository::delete(pool, id).await?;

    if !deleted {
        return Err(QuestionError::NotFound(id));
    }

    tracing::info!("Question deleted: {} ({} stored answers removed)", id, answers);

    Ok(())
}

/// Renumber questions: listed ids first in the given order, the rest after
/// them in their current order
pub async fn reorder_questions(
    pool: &SqlitePool,
    question_ids: Vec<Uuid>,
) -> Result<Vec<Question>> {
    let all = question_repository::list_all(pool).await?;
    let ordered = plan_reorder(&all, &question_ids)?;

    let mut tx = pool.begin().await?;
    for (index, id) in ordered.iter().enumerate() {
        question_repository::set_display_order(&mut tx, *id, index as i64 + 1).await?;
    }
    tx.commit().await?;

    tracing::info!("Reordered {} questions", ordered.len());

    Ok(question_repository::list_all(pool).await?)
}

// =============================================================================
// Helpers
// =============================================================================

fn depends_on(question: &Question, target: Uuid) -> bool {
    question.conditions.iter().any(|c| c.question_id == target)
}

fn next_display_order(existing: &[Question]) -> i64 {
    existing
        .iter()
        .map(|q| q.display_order)
        .max()
        .map_or(1, |max| max + 1)
}

/// Compute the new order and check it keeps every condition pointing backwards
fn plan_reorder(all: &[Question], question_ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let known: HashSet<Uuid> = all.iter().map(|q| q.id).collect();
    let mut seen = HashSet::new();

    for id in question_ids {
        if !known.contains(id) {
            return Err(QuestionError::NotFound(*id));
        }
        if !seen.insert(*id) {
            return Err(QuestionError::ValidationError(format!(
                "Question {} is listed more than once",
                id
            )));
        }
    }

    // `all` is already sorted by display order.
    let ordered: Vec<Uuid> = question_ids
        .iter()
        .copied()
        .chain(all.iter().map(|q| q.id).filter(|id| !seen.contains(id)))
        .collect();

    let position = |id: Uuid| ordered.iter().position(|o| *o == id);

    for question in all {
        for condition in &question.conditions {
            if position(condition.question_id) >= position(question.id) {
                return Err(QuestionError::ValidationError(format!(
                    "Question {} must stay after question {}, which its conditions reference",
                    question.id, condition.question_id
                )));
            }
        }
    }

    Ok(ordered)
}

// =============================================================================
// Validation
// =============================================================================

fn normalize_question_request(mut req: CreateQuestion) -> CreateQuestion {
    req.text = req.text.trim().to_string();
    req.options = req
        .options
        .into_iter()
        .map(|o| o.trim().to_string())
        .collect();
    req.description = req
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());

    if req.question_type == QuestionType::Scale && req.scale.is_none() {
        req.scale = Some(ScaleRange::default());
    }

    req
}

fn validate_question_request(req: &CreateQuestion) -> Result<()> {
    if req.text.is_empty() {
        return Err(QuestionError::ValidationError(
            "Question text cannot be empty".to_string(),
        ));
    }

    if req.text.len() > 1000 {
        return Err(QuestionError::ValidationError(
            "Question text is too long (max 1000 characters)".to_string(),
        ));
    }

    if req.question_type.has_options() {
        if req.options.len() < 2 {
            return Err(QuestionError::ValidationError(
                "Choice questions need at least two options".to_string(),
            ));
        }

        if req.options.iter().any(|o| o.is_empty()) {
            return Err(QuestionError::ValidationError(
                "Options cannot be empty".to_string(),
            ));
        }

        let distinct: HashSet<String> = req.options.iter().map(|o| o.to_lowercase()).collect();
        if distinct.len() != req.options.len() {
            return Err(QuestionError::ValidationError(
                "Options must be distinct".to_string(),
            ));
        }
    } else if !req.options.is_empty() {
        return Err(QuestionError::ValidationError(format!(
            "Questions of type {} do not take options",
            req.question_type
        )));
    }

    match (req.question_type, req.scale) {
        (QuestionType::Scale, Some(scale)) if scale.min >= scale.max => {
            Err(QuestionError::ValidationError(format!(
                "Scale minimum ({}) must be below its maximum ({})",
                scale.min, scale.max
            )))
        }
        (QuestionType::Scale, _) | (_, None) => Ok(()),
        (other, Some(_)) => Err(QuestionError::ValidationError(format!(
            "Questions of type {} do not take a scale",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use survey_core::domain::question::{ConditionOperator, QuestionCondition};
    use survey_core::domain::role::Audience;

    fn request(text: &str, question_type: QuestionType) -> CreateQuestion {
        CreateQuestion {
            text: text.to_string(),
            description: None,
            question_type,
            audience: Audience::All,
            options: vec![],
            scale: None,
            required: true,
            allow_audio: false,
            display_order: None,
            conditions: vec![],
            active: true,
        }
    }

    fn condition(question_id: Uuid) -> QuestionCondition {
        QuestionCondition {
            question_id,
            operator: ConditionOperator::Equals,
            value: "yes".to_string(),
        }
    }

    #[test]
    fn test_validate_empty_text() {
        let req = normalize_question_request(request("   ", QuestionType::Text));
        let result = validate_question_request(&req);
        assert!(matches!(result, Err(QuestionError::ValidationError(_))));
    }

    #[test]
    fn test_validate_choice_options() {
        let mut req = request("Which unit?", QuestionType::SingleChoice);
        req.options = vec!["ICU".to_string()];
        assert!(validate_question_request(&req).is_err());

        req.options = vec!["ICU".to_string(), "icu".to_string()];
        assert!(validate_question_request(&req).is_err());

        req.options = vec!["ICU".to_string(), "ER".to_string()];
        assert!(validate_question_request(&req).is_ok());

        let mut text = request("Comments", QuestionType::Text);
        text.options = vec!["a".to_string()];
        assert!(validate_question_request(&text).is_err());
    }

    #[test]
    fn test_validate_scale() {
        let req = normalize_question_request(request("Rate your workload", QuestionType::Scale));
        assert_eq!(req.scale, Some(ScaleRange { min: 1, max: 5 }));
        assert!(validate_question_request(&req).is_ok());

        let mut inverted = req.clone();
        inverted.scale = Some(ScaleRange { min: 5, max: 5 });
        assert!(validate_question_request(&inverted).is_err());

        let mut text = request("Comments", QuestionType::Text);
        text.scale = Some(ScaleRange::default());
        assert!(validate_question_request(&text).is_err());
    }

    #[tokio::test]
    async fn test_create_appends_and_validates_conditions() {
        let pool = test_pool().await;

        let first = create_question(&pool, request("Night shifts?", QuestionType::YesNo))
            .await
            .unwrap();
        assert_eq!(first.display_order, 1);

        let mut follow_up = request("How many per month?", QuestionType::Number);
        follow_up.conditions = vec![condition(first.id)];
        let second = create_question(&pool, follow_up).await.unwrap();
        assert_eq!(second.display_order, 2);
        assert_eq!(second.conditions.len(), 1);

        // Conditions may not point at questions ordered after the new one.
        let mut early = request("Placed first", QuestionType::Text);
        early.display_order = Some(0);
        early.conditions = vec![condition(second.id)];
        let result = create_question(&pool, early).await;
        assert!(matches!(result, Err(QuestionError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_delete_refuses_referenced_question() {
        let pool = test_pool().await;

        let first = create_question(&pool, request("Night shifts?", QuestionType::YesNo))
            .await
            .unwrap();
        let mut follow_up = request("How many?", QuestionType::Number);
        follow_up.conditions = vec![condition(first.id)];
        let second = create_question(&pool, follow_up).await.unwrap();

        let result = delete_question(&pool, first.id).await;
        assert!(matches!(result, Err(QuestionError::InUse(_))));

        delete_question(&pool, second.id).await.unwrap();
        delete_question(&pool, first.id).await.unwrap();

        let result = delete_question(&pool, first.id).await;
        assert!(matches!(result, Err(QuestionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_keeps_dependents_after() {
        let pool = test_pool().await;

        let first = create_question(&pool, request("Night shifts?", QuestionType::YesNo))
            .await
            .unwrap();
        let mut follow_up = request("How many?", QuestionType::Number);
        follow_up.conditions = vec![condition(first.id)];
        create_question(&pool, follow_up).await.unwrap();

        let mut moved = request("Night shifts?", QuestionType::YesNo);
        moved.display_order = Some(5);
        let result = update_question(&pool, first.id, moved).await;
        assert!(matches!(result, Err(QuestionError::ValidationError(_))));

        let mut reworded = request("Do you work night shifts?", QuestionType::YesNo);
        reworded.required = false;
        let updated = update_question(&pool, first.id, reworded).await.unwrap();
        assert_eq!(updated.text, "Do you work night shifts?");
        assert!(!updated.required);
        assert_eq!(updated.display_order, 1);
    }

    #[tokio::test]
    async fn test_reorder() {
        let pool = test_pool().await;

        let a = create_question(&pool, request("A", QuestionType::Text)).await.unwrap();
        let b = create_question(&pool, request("B", QuestionType::Text)).await.unwrap();
        let mut dependent = request("C", QuestionType::Text);
        dependent.conditions = vec![QuestionCondition {
            question_id: a.id,
            operator: ConditionOperator::IsAnswered,
            value: String::new(),
        }];
        let c = create_question(&pool, dependent).await.unwrap();

        let reordered = reorder_questions(&pool, vec![b.id]).await.unwrap();
        let ids: Vec<Uuid> = reordered.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![b.id, a.id, c.id]);

        let result = reorder_questions(&pool, vec![c.id, a.id]).await;
        assert!(matches!(result, Err(QuestionError::ValidationError(_))));

        let result = reorder_questions(&pool, vec![b.id, b.id]).await;
        assert!(matches!(result, Err(QuestionError::ValidationError(_))));

        let result = reorder_questions(&pool, vec![Uuid::new_v4()]).await;
        assert!(matches!(result, Err(QuestionError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_filters_by_role() {
        let pool = test_pool().await;

        let mut nurse = request("Nurse only", QuestionType::Text);
        nurse.audience = Audience::Nurse;
        create_question(&pool, nurse).await.unwrap();
        create_question(&pool, request("Everyone", QuestionType::Text))
            .await
            .unwrap();

        assert_eq!(list_questions(&pool, None).await.unwrap().len(), 2);
        assert_eq!(list_questions(&pool, Some(Role::Nurse)).await.unwrap().len(), 2);
        assert_eq!(list_questions(&pool, Some(Role::Doctor)).await.unwrap().len(), 1);
    }
}
