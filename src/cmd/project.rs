use std::path::PathBuf;

use clap::Args;

use crate::config::StoredConfig;
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Directory to register.
    pub path: PathBuf,
    /// Name to register it under (defaults to the directory name).
    pub name: Option<String>,
    /// Default author filter for this project.
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct RemoveArgs {
    /// Project name or its index from `list`.
    pub name: String,
}

#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Project name.
    pub name: String,
    /// New directory.
    #[arg(long)]
    pub path: Option<PathBuf>,
    /// New author filter (empty string clears it).
    #[arg(long)]
    pub author: Option<String>,
    /// New project name.
    #[arg(long)]
    pub new_name: Option<String>,
}

pub fn add(args: AddArgs) -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;
    let name = cfg.add_project(&args.path, args.name.as_deref(), args.author)?;
    cfg.save()?;

    if let Some(project) = cfg.project(&name) {
        println!("Project added: {name}");
        println!("  path: {}", project.path.display());
    }
    Ok(())
}

pub fn list() -> AppResult<()> {
    let cfg = StoredConfig::load()?;

    if cfg.projects.is_empty() {
        println!("No projects registered. Add one with `daily-git-report add <path>`.");
        return Ok(());
    }

    println!("Registered projects:");
    for (index, project) in cfg.projects.iter().enumerate() {
        let marker = if project.path.exists() { "ok" } else { "missing" };
        let author = project
            .author
            .as_deref()
            .map(|author| format!(" (author: {author})"))
            .unwrap_or_default();
        println!("  [{}] {}{author}", index + 1, project.name);
        println!("      [{marker}] {}", project.path.display());
    }
    println!("Default backend: {}", cfg.default_backend);
    Ok(())
}

pub fn remove(args: RemoveArgs) -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;
    let removed = cfg.remove_project(&args.name)?;
    cfg.save()?;
    println!("Project removed: {}", removed.name);
    Ok(())
}

pub fn update(args: UpdateArgs) -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;
    let name = cfg.update_project(
        &args.name,
        args.path.as_deref(),
        args.author,
        args.new_name,
    )?;
    cfg.save()?;
    println!("Project updated: {name}");
    Ok(())
}
