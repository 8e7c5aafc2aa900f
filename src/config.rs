use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};
use crate::services::Identity;

const CONFIG_FILE_NAME: &str = "config.json";
const HOME_OVERRIDE_VAR: &str = "DAILY_GIT_REPORT_HOME";

/// Which backend summarises the commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    Gemini,
    Anthropic,
    ClaudeCli,
    Keywords,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Gemini => "gemini",
            Backend::Anthropic => "anthropic",
            Backend::ClaudeCli => "claude-cli",
            Backend::Keywords => "keywords",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Backend::Gemini => "Google Gemini",
            Backend::Anthropic => "Anthropic Claude API",
            Backend::ClaudeCli => "Claude CLI",
            Backend::Keywords => "keyword analysis",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub author: Option<String>,
    pub added_at: DateTime<Local>,
}

/// Settings and registered projects persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub default_backend: Backend,
    #[serde(default)]
    pub global_author: Option<String>,
    #[serde(default = "default_use_git_user")]
    pub use_git_user: bool,
    #[serde(skip)]
    file_path: PathBuf,
}

fn default_use_git_user() -> bool {
    true
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(config_file_path()?)
    }

    /// Reads the file at `path`; a missing or corrupt file yields defaults.
    pub fn load_from(path: PathBuf) -> AppResult<Self> {
        let mut config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<StoredConfig>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %path.display(), %err, "ignoring unreadable config file");
                    Self::empty()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Self::empty(),
            Err(err) => return Err(AppError::Io(err)),
        };
        config.file_path = path;
        Ok(config)
    }

    fn empty() -> Self {
        Self {
            projects: Vec::new(),
            default_backend: Backend::default(),
            global_author: None,
            use_git_user: true,
            file_path: PathBuf::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }

    /// Registers `path` and returns the name it was stored under. Taken
    /// names get a numeric suffix.
    pub fn add_project(
        &mut self,
        path: &Path,
        name: Option<&str>,
        author: Option<String>,
    ) -> AppResult<String> {
        let canonical = path.canonicalize().map_err(|err| {
            AppError::Registry(format!("path does not exist: {} ({err})", path.display()))
        })?;

        let base_name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => canonical
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string()),
        };

        let mut candidate = base_name.clone();
        let mut counter = 1;
        while self.project(&candidate).is_some() {
            candidate = format!("{base_name}_{counter}");
            counter += 1;
        }

        self.projects.push(ProjectEntry {
            name: candidate.clone(),
            path: canonical,
            author: author.filter(|a| !a.trim().is_empty()),
            added_at: Local::now(),
        });
        Ok(candidate)
    }

    pub fn project(&self, name: &str) -> Option<&ProjectEntry> {
        self.projects.iter().find(|p| p.name == name)
    }

    /// Accepts a project name or its 1-based position in `list` output.
    pub fn resolve_project(&self, name_or_index: &str) -> AppResult<&ProjectEntry> {
        if let Some(project) = self.project(name_or_index) {
            return Ok(project);
        }
        if let Ok(index) = name_or_index.parse::<usize>() {
            return index
                .checked_sub(1)
                .and_then(|i| self.projects.get(i))
                .ok_or_else(|| {
                    AppError::Registry(format!(
                        "invalid index {index} (expected 1-{})",
                        self.projects.len()
                    ))
                });
        }
        Err(AppError::Registry(format!(
            "project not found: {name_or_index}"
        )))
    }

    pub fn remove_project(&mut self, name_or_index: &str) -> AppResult<ProjectEntry> {
        let name = self.resolve_project(name_or_index)?.name.clone();
        let position = self
            .projects
            .iter()
            .position(|p| p.name == name)
            .ok_or_else(|| AppError::Registry(format!("project not found: {name}")))?;
        Ok(self.projects.remove(position))
    }

    pub fn update_project(
        &mut self,
        name: &str,
        path: Option<&Path>,
        author: Option<String>,
        new_name: Option<String>,
    ) -> AppResult<String> {
        if let Some(new_name) = new_name.as_deref() {
            if new_name != name && self.project(new_name).is_some() {
                return Err(AppError::Registry(format!(
                    "project name already taken: {new_name}"
                )));
            }
        }
        let canonical = match path {
            Some(path) => Some(path.canonicalize().map_err(|err| {
                AppError::Registry(format!("path does not exist: {} ({err})", path.display()))
            })?),
            None => None,
        };

        let project = self
            .projects
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| AppError::Registry(format!("project not found: {name}")))?;

        if let Some(canonical) = canonical {
            project.path = canonical;
        }
        if let Some(author) = author {
            project.author = Some(author).filter(|a| !a.trim().is_empty());
        }
        if let Some(new_name) = new_name.filter(|n| !n.trim().is_empty()) {
            project.name = new_name;
        }
        Ok(project.name.clone())
    }

    /// Project author, then global author, then the git identity when
    /// allowed.
    pub fn effective_author(
        &self,
        project_author: Option<&str>,
        identity: &Identity,
    ) -> Option<String> {
        if let Some(author) = project_author.filter(|a| !a.is_empty()) {
            return Some(author.to_string());
        }
        if let Some(author) = self.global_author.as_deref().filter(|a| !a.is_empty()) {
            return Some(author.to_string());
        }
        if self.use_git_user {
            return identity.preferred().map(str::to_string);
        }
        None
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Some(dir) = env::var_os(HOME_OVERRIDE_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join("daily-git-report"))
        .ok_or_else(|| {
            AppError::Configuration("could not determine a configuration directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// Settings for one report run, merged from flags, the stored config and
/// the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: Backend,
    pub api_key: Option<String>,
    /// Where generative analyses are cached; `None` disables caching.
    pub cache_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn resolve(
        backend: Option<Backend>,
        api_key: Option<String>,
        cache_file: Option<PathBuf>,
        stored: &StoredConfig,
    ) -> Self {
        let backend = backend.unwrap_or(stored.default_backend);
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| api_key_from_env(backend));
        Self {
            backend,
            api_key,
            cache_file,
        }
    }
}

fn api_key_from_env(backend: Backend) -> Option<String> {
    let vars: &[&str] = match backend {
        Backend::Gemini => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        Backend::Anthropic => &["ANTHROPIC_API_KEY"],
        Backend::ClaudeCli | Backend::Keywords => &[],
    };
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .find(|value| !value.trim().is_empty())
}
