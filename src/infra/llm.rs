use std::collections::BTreeMap;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::analysis::{
    AggregateAnalysis, AnalysisOrigin, MAX_IMPACT_SCORE, RepositoryAchievements,
};
use crate::domain::commit::RepositoryCommitSet;
use crate::error::{AppError, AppResult};
use crate::services::LanguageModelService;

const GEMINI_MODEL: &str = "gemini-2.0-flash";
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const FILES_PER_COMMIT: usize = 5;
const MAX_TECHNOLOGIES: usize = 6;

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("valid json object regex"));

const PROMPT_TEMPLATE: &str = r#"Summarise a developer's work for one day, grouped by repository, for use in a résumé or portfolio.

Rules:
- Do not copy commit messages verbatim and drop prefixes such as "feat:" or "fix:".
- Ignore merge commits.
- Infer the domain or module from file paths and describe the business value.

Answer with JSON only, in this shape:
{
  "summary": "one-sentence overview",
  "by_repo": {
    "repository-name": {
      "achievements": ["achievement - detail"],
      "tech_stack": ["Kotlin", "Spring Boot"]
    }
  },
  "impact_score": 8,
  "business_value": "business impact"
}

Commits:
{commits}"#;

pub fn build_prompt(sets: &[RepositoryCommitSet]) -> String {
    PROMPT_TEMPLATE.replace("{commits}", &format_commit_digest(sets))
}

/// Compact per-repository listing: message, line counts and up to five files.
pub fn format_commit_digest(sets: &[RepositoryCommitSet]) -> String {
    let mut lines = Vec::new();
    for set in sets {
        lines.push(format!("[{}]", set.display_name));
        for commit in &set.commits {
            let mut files = commit
                .changed_files
                .iter()
                .take(FILES_PER_COMMIT)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if commit.changed_files.len() > FILES_PER_COMMIT {
                files.push_str(&format!(
                    " (+{} more)",
                    commit.changed_files.len() - FILES_PER_COMMIT
                ));
            }
            lines.push(format!(
                "- {} (+{}/-{})",
                commit.message, commit.insertions, commit.deletions
            ));
            lines.push(format!("  files: {files}"));
        }
    }
    lines.join("\n")
}

#[derive(Deserialize)]
struct GenerativeResponse {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    by_repo: BTreeMap<String, GenerativeRepoSection>,
    #[serde(default)]
    key_achievements: Vec<String>,
    #[serde(default)]
    impact_score: Option<f64>,
    #[serde(default)]
    business_value: String,
}

#[derive(Deserialize)]
struct GenerativeRepoSection {
    #[serde(default)]
    achievements: Vec<String>,
    #[serde(default)]
    tech_stack: Vec<String>,
}

/// Pulls the outermost JSON object out of a free-text answer.
pub fn parse_analysis(response_text: &str, backend: &str) -> AppResult<AggregateAnalysis> {
    let json = JSON_OBJECT
        .find(response_text)
        .ok_or_else(|| AppError::LanguageModel("response did not contain JSON".to_string()))?;
    let parsed: GenerativeResponse = serde_json::from_str(json.as_str())
        .map_err(|err| AppError::LanguageModel(format!("could not parse response JSON: {err}")))?;

    let mut technologies: Vec<String> = Vec::new();
    for section in parsed.by_repo.values() {
        for tag in &section.tech_stack {
            if !technologies.contains(tag) {
                technologies.push(tag.clone());
            }
        }
    }
    technologies.truncate(MAX_TECHNOLOGIES);

    let impact_score = parsed
        .impact_score
        .filter(|score| score.is_finite())
        .map(|score| score.round().clamp(0.0, f64::from(MAX_IMPACT_SCORE)) as u8)
        .unwrap_or(0);

    Ok(AggregateAnalysis {
        summary: parsed.summary,
        per_repository_achievements: parsed
            .by_repo
            .into_iter()
            .map(|(name, section)| {
                (
                    name,
                    RepositoryAchievements {
                        achievements: section.achievements,
                        technologies: section.tech_stack,
                    },
                )
            })
            .collect(),
        key_achievements: parsed.key_achievements,
        technologies,
        impact_score,
        business_value: parsed.business_value,
        origin: AnalysisOrigin::Generative {
            backend: backend.to_string(),
        },
    })
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: Client::new(),
            api_key,
            model: GEMINI_MODEL.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_ENDPOINT}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl LanguageModelService for GeminiClient {
    fn backend_name(&self) -> &str {
        "Google Gemini"
    }

    async fn analyze(&self, sets: &[RepositoryCommitSet]) -> AppResult<AggregateAnalysis> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: build_prompt(sets),
                }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|err| AppError::LanguageModel(format!("failed to call Gemini: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::LanguageModel(format!(
                "Gemini responded with {status}: {body}"
            )));
        }

        let payload: GeminiResponse = response.json().await.map_err(|err| {
            AppError::LanguageModel(format!("failed to parse Gemini response: {err}"))
        })?;

        let text = payload
            .candidates
            .into_iter()
            .flat_map(|candidate| candidate.content.parts)
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        parse_analysis(&text, self.backend_name())
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}
