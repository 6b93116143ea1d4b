//! Stats command handler

use anyhow::Result;
use colored::*;
use survey_core::domain::role::Role;
use survey_core::dto::stats::{QuestionStats, SurveyStats};

use crate::config::Config;

/// Print survey statistics
pub async fn show_stats(config: &Config, role: Option<Role>) -> Result<()> {
    let client = config.client();
    let stats = client.stats(role).await?;

    print_stats(&stats, role);

    Ok(())
}

fn print_stats(stats: &SurveyStats, role: Option<Role>) {
    let scope = role.map_or_else(|| "all roles".to_string(), |r| format!("{}s", r));
    println!("{}", format!("Survey statistics ({})", scope).bold());
    println!("  Sessions started:   {}", stats.sessions_started);
    println!(
        "  Completed:          {}",
        stats.sessions_completed.to_string().green()
    );
    println!(
        "  In progress:        {}",
        stats.sessions_in_progress.to_string().yellow()
    );
    println!("  Completion rate:    {:.1}%", stats.completion_rate);
    println!();

    for question in &stats.questions {
        print_question_stats(question);
    }
}

fn print_question_stats(question: &QuestionStats) {
    println!("  {} {}", "▸".cyan(), question.text.bold());
    println!(
        "    {} answered, {} skipped, {} with audio",
        question.answer_count, question.skip_count, question.audio_count
    );

    let total: u64 = question.distribution.values().sum();
    for (value, count) in &question.distribution {
        println!(
            "      {:<24} {:>5}  {}",
            value,
            count,
            bar(*count, total).cyan()
        );
    }
    println!();
}

/// Horizontal bar proportional to `count / total`
fn bar(count: u64, total: u64) -> String {
    const WIDTH: u64 = 30;
    if total == 0 {
        return String::new();
    }
    "█".repeat((count * WIDTH / total) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0, 0), "");
        assert_eq!(bar(0, 10), "");
        assert_eq!(bar(10, 10).chars().count(), 30);
        assert_eq!(bar(5, 10).chars().count(), 15);
    }
}
