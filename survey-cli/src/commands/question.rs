//! Question command handlers
//!
//! Creating, editing, ordering and removing survey questions.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Subcommand};
use colored::*;
use survey_client::SurveyClient;
use survey_core::domain::question::{
    ConditionOperator, Question, QuestionCondition, QuestionType, ScaleRange,
};
use survey_core::domain::role::{Audience, Role};
use survey_core::dto::question::CreateQuestion;

use crate::config::Config;
use crate::id_resolver::resolve_question_id;
use crate::types::IdOrPrefix;

/// Question subcommands
#[derive(Subcommand)]
pub enum QuestionCommands {
    /// Create a question from flags or a JSON definition
    Create {
        #[command(flatten)]
        fields: QuestionFields,

        /// Read the whole definition from a JSON file instead
        #[arg(short, long, conflicts_with_all = ["text", "question_type"])]
        file: Option<String>,
    },
    /// List questions in display order
    List {
        /// Only questions shown to this role
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Show a question
    Get {
        /// Question ID or unambiguous prefix
        id: String,
    },
    /// Change a question; unspecified fields keep their current value
    Update {
        /// Question ID or unambiguous prefix
        id: String,

        #[command(flatten)]
        fields: QuestionFields,

        /// Remove all display conditions
        #[arg(long, conflicts_with = "when")]
        clear_conditions: bool,
    },
    /// Delete a question
    Delete {
        /// Question ID or unambiguous prefix
        id: String,
    },
    /// Move the given questions to the front, in this order
    Reorder {
        /// Question IDs or prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Fields shared by create and update
#[derive(Args, Default)]
pub struct QuestionFields {
    /// Question text
    #[arg(short, long)]
    text: Option<String>,

    /// Help text shown under the question
    #[arg(short, long)]
    description: Option<String>,

    /// text, single_choice, multiple_choice, yes_no, number or scale
    #[arg(long = "type")]
    question_type: Option<QuestionType>,

    /// all, nurse or doctor
    #[arg(short, long)]
    audience: Option<Audience>,

    /// Choice options (repeat or comma-separate)
    #[arg(short, long = "option", value_delimiter = ',')]
    options: Vec<String>,

    /// Lowest scale point
    #[arg(long)]
    scale_min: Option<i64>,

    /// Highest scale point
    #[arg(long)]
    scale_max: Option<i64>,

    /// Whether an answer is required
    #[arg(long)]
    required: Option<bool>,

    /// Whether an audio recording may be attached
    #[arg(long)]
    allow_audio: Option<bool>,

    /// Whether the question is part of the survey
    #[arg(long)]
    active: Option<bool>,

    /// Position in the survey
    #[arg(long)]
    order: Option<i64>,

    /// Display condition QUESTION:OPERATOR[:VALUE], e.g. 3f2a:equals:yes (repeatable)
    #[arg(short, long)]
    when: Vec<String>,
}

/// Handle question commands
pub async fn handle_question_command(command: QuestionCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        QuestionCommands::Create { fields, file } => create_question(&client, fields, file).await,
        QuestionCommands::List { role } => list_questions(&client, role).await,
        QuestionCommands::Get { id } => get_question(&client, &id).await,
        QuestionCommands::Update {
            id,
            fields,
            clear_conditions,
        } => update_question(&client, &id, fields, clear_conditions).await,
        QuestionCommands::Delete { id } => delete_question(&client, &id).await,
        QuestionCommands::Reorder { ids } => reorder_questions(&client, ids).await,
    }
}

/// Split a `QUESTION:OPERATOR[:VALUE]` condition argument
fn parse_condition(input: &str) -> Result<(IdOrPrefix, ConditionOperator, String)> {
    let mut parts = input.splitn(3, ':');

    let question = parts
        .next()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| anyhow!("condition '{}' is missing a question", input))?;
    let operator: ConditionOperator = parts
        .next()
        .ok_or_else(|| anyhow!("condition '{}' is missing an operator", input))?
        .parse()
        .map_err(|e: String| anyhow!(e))?;
    let value = parts.next().unwrap_or_default().to_string();

    if !operator.ignores_value() && value.is_empty() {
        bail!("condition '{}' needs a value for {}", input, operator.as_str());
    }

    Ok((IdOrPrefix::parse(question), operator, value))
}

async fn resolve_conditions(
    client: &SurveyClient,
    when: &[String],
) -> Result<Vec<QuestionCondition>> {
    let mut conditions = Vec::with_capacity(when.len());

    for input in when {
        let (question, operator, value) = parse_condition(input)?;
        conditions.push(QuestionCondition {
            question_id: resolve_question_id(client, &question).await?,
            operator,
            value,
        });
    }

    Ok(conditions)
}

/// Overlay the flags onto a base definition
fn apply_fields(mut req: CreateQuestion, fields: QuestionFields) -> CreateQuestion {
    if let Some(text) = fields.text {
        req.text = text;
    }
    if fields.description.is_some() {
        req.description = fields.description;
    }
    if let Some(question_type) = fields.question_type {
        req.question_type = question_type;
        if !question_type.has_options() {
            req.options.clear();
        }
        if question_type != QuestionType::Scale {
            req.scale = None;
        }
    }
    if let Some(audience) = fields.audience {
        req.audience = audience;
    }
    if !fields.options.is_empty() {
        req.options = fields.options;
    }
    if fields.scale_min.is_some() || fields.scale_max.is_some() {
        let current = req.scale.unwrap_or_default();
        req.scale = Some(ScaleRange {
            min: fields.scale_min.unwrap_or(current.min),
            max: fields.scale_max.unwrap_or(current.max),
        });
    }
    if let Some(required) = fields.required {
        req.required = required;
    }
    if let Some(allow_audio) = fields.allow_audio {
        req.allow_audio = allow_audio;
    }
    if let Some(active) = fields.active {
        req.active = active;
    }
    if fields.order.is_some() {
        req.display_order = fields.order;
    }
    req
}

fn definition_of(question: &Question) -> CreateQuestion {
    CreateQuestion {
        text: question.text.clone(),
        description: question.description.clone(),
        question_type: question.question_type,
        audience: question.audience,
        options: question.options.clone(),
        scale: question.scale,
        required: question.required,
        allow_audio: question.allow_audio,
        display_order: Some(question.display_order),
        conditions: question.conditions.clone(),
        active: question.active,
    }
}

/// Create a new question
async fn create_question(
    client: &SurveyClient,
    fields: QuestionFields,
    file: Option<String>,
) -> Result<()> {
    let req = match file {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read question file: {}", path))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid question definition in {}", path))?
        }
        None => {
            let text = fields
                .text
                .clone()
                .ok_or_else(|| anyhow!("--text is required (or use --file)"))?;
            let question_type = fields
                .question_type
                .ok_or_else(|| anyhow!("--type is required (or use --file)"))?;
            let conditions = resolve_conditions(client, &fields.when).await?;

            let base = CreateQuestion {
                text,
                description: None,
                question_type,
                audience: Audience::All,
                options: vec![],
                scale: None,
                required: false,
                allow_audio: false,
                display_order: None,
                conditions,
                active: true,
            };
            apply_fields(base, fields)
        }
    };

    let question = client.create_question(req).await?;

    println!("{}", "✓ Question created successfully!".green().bold());
    println!("  ID:    {}", question.id.to_string().cyan());
    println!("  Order: {}", question.display_order);
    println!("  Type:  {}", question.question_type.as_str().dimmed());

    Ok(())
}

/// List questions
async fn list_questions(client: &SurveyClient, role: Option<Role>) -> Result<()> {
    let questions = client.list_questions(role).await?;

    if questions.is_empty() {
        println!("{}", "No questions found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} question(s):", questions.len()).bold()
    );
    println!();
    for question in &questions {
        print_question_summary(question);
    }

    Ok(())
}

/// Get and display a single question
async fn get_question(client: &SurveyClient, id: &str) -> Result<()> {
    let uuid = resolve_question_id(client, &IdOrPrefix::parse(id)).await?;
    let question = client.get_question(uuid).await?;

    print_question_details(&question);

    Ok(())
}

/// Update a question from its current definition
async fn update_question(
    client: &SurveyClient,
    id: &str,
    fields: QuestionFields,
    clear_conditions: bool,
) -> Result<()> {
    let uuid = resolve_question_id(client, &IdOrPrefix::parse(id)).await?;
    let current = client.get_question(uuid).await?;

    let mut req = definition_of(&current);
    if clear_conditions {
        req.conditions.clear();
    } else if !fields.when.is_empty() {
        req.conditions = resolve_conditions(client, &fields.when).await?;
    }
    let req = apply_fields(req, fields);

    let question = client.update_question(uuid, req).await?;

    println!("{}", "✓ Question updated successfully!".green().bold());
    print_question_details(&question);

    Ok(())
}

/// Delete a question
async fn delete_question(client: &SurveyClient, id: &str) -> Result<()> {
    let uuid = resolve_question_id(client, &IdOrPrefix::parse(id)).await?;

    client.delete_question(uuid).await?;

    println!(
        "{}",
        format!("✓ Question {} deleted successfully!", uuid)
            .green()
            .bold()
    );

    Ok(())
}

/// Reorder questions
async fn reorder_questions(client: &SurveyClient, ids: Vec<String>) -> Result<()> {
    let mut resolved = Vec::with_capacity(ids.len());
    for id in &ids {
        resolved.push(resolve_question_id(client, &IdOrPrefix::parse(id)).await?);
    }

    let questions = client.reorder_questions(resolved).await?;

    println!("{}", "✓ Questions reordered!".green().bold());
    for question in &questions {
        println!(
            "  {:>3}. {} {}",
            question.display_order,
            question.text,
            short_id(question).dimmed()
        );
    }

    Ok(())
}

fn short_id(question: &Question) -> String {
    question.id.to_string()[..8].to_string()
}

/// Print a question summary
fn print_question_summary(question: &Question) {
    let flags = [
        (question.required, "required"),
        (question.allow_audio, "audio"),
        (!question.active, "inactive"),
        (!question.conditions.is_empty(), "conditional"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, name)| *name)
    .collect::<Vec<_>>()
    .join(", ");

    println!(
        "  {} {:>3}. {}",
        "▸".cyan(),
        question.display_order,
        question.text.bold()
    );
    println!(
        "       {}  {}  {}  {}",
        short_id(question).dimmed(),
        question.question_type.as_str(),
        question.audience.as_str().yellow(),
        flags.dimmed()
    );
}

/// Print detailed question information
fn print_question_details(question: &Question) {
    println!("{}", "Question Details:".bold());
    println!("  ID:          {}", question.id.to_string().cyan());
    println!("  Text:        {}", question.text.bold());
    if let Some(desc) = &question.description {
        println!("  Description: {}", desc);
    }
    println!("  Type:        {}", question.question_type.as_str());
    println!("  Audience:    {}", question.audience.as_str());
    println!("  Order:       {}", question.display_order);
    println!("  Required:    {}", question.required);
    println!("  Audio:       {}", question.allow_audio);
    println!("  Active:      {}", question.active);
    if !question.options.is_empty() {
        println!("  Options:     {}", question.options.join(", "));
    }
    if let Some(scale) = question.scale {
        println!("  Scale:       {}..{}", scale.min, scale.max);
    }
    if !question.conditions.is_empty() {
        println!("  Shown when:");
        for condition in &question.conditions {
            println!(
                "    - {} {} {}",
                condition.question_id.to_string().dimmed(),
                condition.operator.as_str().yellow(),
                condition.value
            );
        }
    }
    println!(
        "  Updated:     {}",
        question.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_parse_condition() {
        let (question, operator, value) = parse_condition("3f2a:equals:yes").unwrap();
        assert_eq!(question, IdOrPrefix::Prefix("3f2a".to_string()));
        assert_eq!(operator, ConditionOperator::Equals);
        assert_eq!(value, "yes");

        // Values may contain colons.
        let (_, _, value) = parse_condition("3f2a:equals:08:30").unwrap();
        assert_eq!(value, "08:30");

        let (_, operator, value) = parse_condition("3f2a:is_answered").unwrap();
        assert_eq!(operator, ConditionOperator::IsAnswered);
        assert!(value.is_empty());
    }

    #[test]
    fn test_parse_condition_errors() {
        assert!(parse_condition("3f2a").is_err());
        assert!(parse_condition("3f2a:equals").is_err());
        assert!(parse_condition("3f2a:between:1").is_err());
        assert!(parse_condition(":equals:yes").is_err());
    }

    #[test]
    fn test_apply_fields_keeps_unset_values() {
        let question = Question {
            id: Uuid::new_v4(),
            text: "Rate your workload".to_string(),
            description: None,
            question_type: QuestionType::Scale,
            audience: Audience::Nurse,
            options: vec![],
            scale: Some(ScaleRange { min: 1, max: 5 }),
            required: true,
            allow_audio: false,
            display_order: 4,
            conditions: vec![],
            active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };

        let fields = QuestionFields {
            scale_max: Some(10),
            allow_audio: Some(true),
            ..QuestionFields::default()
        };
        let req = apply_fields(definition_of(&question), fields);

        assert_eq!(req.text, "Rate your workload");
        assert_eq!(req.audience, Audience::Nurse);
        assert_eq!(req.scale, Some(ScaleRange { min: 1, max: 10 }));
        assert!(req.allow_audio);
        assert!(req.required);
        assert_eq!(req.display_order, Some(4));
    }
}
