//! Markdown rendering of a day's analysis.

use chrono::{DateTime, Datelike, Local, NaiveDate};

use crate::domain::analysis::AggregateAnalysis;
use crate::domain::commit::RepositoryCommitSet;

pub struct MarkdownReport<'a> {
    pub date: NaiveDate,
    pub backend_name: &'a str,
    pub generated_at: DateTime<Local>,
}

impl MarkdownReport<'_> {
    pub fn render(&self, sets: &[RepositoryCommitSet], analysis: &AggregateAnalysis) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("# Daily Work Report".to_string());
        lines.push(format!(
            "**{} ({})**\n",
            self.date.format("%B %-d, %Y"),
            weekday_name(self.date)
        ));

        lines.push("## Summary\n".to_string());
        if analysis.summary.trim().is_empty() {
            lines.push("No work recorded.".to_string());
        } else {
            lines.push(analysis.summary.clone());
        }
        lines.push(String::new());

        if !analysis.per_repository_achievements.is_empty() {
            for (repo, section) in &analysis.per_repository_achievements {
                lines.push(format!("## {repo}\n"));
                for achievement in &section.achievements {
                    lines.push(format!("- {achievement}"));
                }
                if !section.technologies.is_empty() {
                    lines.push(format!("\n*Stack: {}*", section.technologies.join(", ")));
                }
                lines.push(String::new());
            }
        } else if !analysis.key_achievements.is_empty() {
            lines.push("## Key achievements\n".to_string());
            for achievement in &analysis.key_achievements {
                lines.push(format!("- {achievement}"));
            }
            lines.push(String::new());
        }

        let commits: usize = sets.iter().map(|s| s.commits.len()).sum();
        let files: usize = sets.iter().map(RepositoryCommitSet::files_changed).sum();
        let (insertions, deletions) = sets
            .iter()
            .map(RepositoryCommitSet::total_stats)
            .fold((0, 0), |(ins, del), stats| {
                (ins + stats.insertions, del + stats.deletions)
            });

        lines.push("## Statistics\n".to_string());
        lines.push("| Metric | Value |".to_string());
        lines.push("|--------|-------|".to_string());
        lines.push(format!("| Repositories | {} |", sets.len()));
        lines.push(format!("| Commits | {commits} |"));
        lines.push(format!("| Files changed | {files} |"));
        lines.push(format!("| Lines added | +{insertions} |"));
        lines.push(format!("| Lines removed | -{deletions} |"));
        if analysis.impact_score > 0 {
            lines.push(format!("| Impact score | {}/10 |", analysis.impact_score));
        }
        lines.push(String::new());

        if !analysis.business_value.trim().is_empty() {
            lines.push("## Business impact\n".to_string());
            lines.push(analysis.business_value.clone());
            lines.push(String::new());
        }

        lines.push("---".to_string());
        let status = if analysis.is_generated() {
            String::new()
        } else {
            format!(
                " | AI analysis unavailable: {}",
                analysis.fallback_reason().unwrap_or("unknown error")
            )
        };
        lines.push(format!(
            "*Generated by Daily Git Report ({}) at {}{status}*",
            self.backend_name,
            self.generated_at.format("%Y-%m-%d %H:%M:%S")
        ));

        lines.join("\n")
    }
}

fn weekday_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        chrono::Weekday::Mon => "Monday",
        chrono::Weekday::Tue => "Tuesday",
        chrono::Weekday::Wed => "Wednesday",
        chrono::Weekday::Thu => "Thursday",
        chrono::Weekday::Fri => "Friday",
        chrono::Weekday::Sat => "Saturday",
        chrono::Weekday::Sun => "Sunday",
    }
}
