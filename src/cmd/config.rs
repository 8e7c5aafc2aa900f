use clap::{ArgAction, Args};

use crate::config::{AppConfig, Backend, StoredConfig};
use crate::error::AppResult;
use crate::infra::git::GitCli;
use crate::services::{Identity, VersionControlService};

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Backend used when `--backend` is not given.
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,
    /// Author filter applied to projects without their own.
    #[arg(long, conflicts_with = "clear_author")]
    pub author: Option<String>,
    /// Remove the global author filter.
    #[arg(long)]
    pub clear_author: bool,
    /// Fall back to the git user when no author is configured.
    #[arg(long, action = ArgAction::Set, value_name = "true|false")]
    pub use_git_user: Option<bool>,
}

impl ConfigArgs {
    fn changes_anything(&self) -> bool {
        self.backend.is_some()
            || self.author.is_some()
            || self.clear_author
            || self.use_git_user.is_some()
    }
}

pub async fn run(args: ConfigArgs) -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    if args.changes_anything() {
        if let Some(backend) = args.backend {
            cfg.default_backend = backend;
        }
        if let Some(author) = args.author {
            cfg.global_author = Some(author).filter(|a| !a.trim().is_empty());
        }
        if args.clear_author {
            cfg.global_author = None;
        }
        if let Some(use_git_user) = args.use_git_user {
            cfg.use_git_user = use_git_user;
        }
        cfg.save()?;
        println!("Configuration saved to {}\n", cfg.path().display());
    }

    let identity = GitCli::new().identity().await;
    show(&cfg, &identity);
    Ok(())
}

fn show(cfg: &StoredConfig, identity: &Identity) {
    let key = AppConfig::resolve(None, None, None, cfg).api_key;

    println!("Configuration file: {}", cfg.path().display());
    println!(
        "Default backend: {} ({})",
        cfg.default_backend,
        cfg.default_backend.display_name()
    );
    println!("API key from environment: {}", mask_secret(&key));
    println!("Global author: {}", display_value(&cfg.global_author));
    println!("Use git user: {}", cfg.use_git_user);
    println!("Git user.name: {}", display_value(&identity.name));
    println!("Git user.email: {}", display_value(&identity.email));
    println!(
        "Effective author: {}",
        display_value(&cfg.effective_author(None, identity))
    );
    println!("Registered projects: {}", cfg.projects.len());
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

fn mask_secret(value: &Option<String>) -> String {
    match value {
        Some(token) if token.chars().count() > 6 => {
            let chars: Vec<char> = token.chars().collect();
            let prefix: String = chars[..3].iter().collect();
            let suffix: String = chars[chars.len() - 3..].iter().collect();
            format!("{prefix}***{suffix}")
        }
        Some(token) if !token.is_empty() => "***".to_string(),
        _ => "<not set>".to_string(),
    }
}
