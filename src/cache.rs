use std::fs;
use std::path::PathBuf;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::config::config_directory;
use crate::domain::analysis::AggregateAnalysis;
use crate::domain::commit::RepositoryCommitSet;
use crate::error::{AppError, AppResult};

const CACHE_FILE_NAME: &str = "analysis_cache.json";
const CACHE_LIMIT: usize = 32;

#[derive(Default, Serialize, Deserialize)]
struct CacheFile {
    entries: Vec<CacheEntry>,
}

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    key: String,
    analysis: AggregateAnalysis,
}

/// Generative analyses keyed by the commits they describe.
pub struct AnalysisCache {
    file_path: PathBuf,
    file: CacheFile,
}

impl AnalysisCache {
    pub fn default_path() -> AppResult<PathBuf> {
        Ok(config_directory()?.join(CACHE_FILE_NAME))
    }

    pub fn load_from(path: PathBuf) -> AppResult<Self> {
        let file = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str::<CacheFile>(&contents)
                .map_err(|err| AppError::Configuration(format!("invalid cache file: {err}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => CacheFile::default(),
            Err(err) => return Err(AppError::Io(err)),
        };

        Ok(Self {
            file_path: path,
            file,
        })
    }

    pub fn get(&self, key: &str) -> Option<AggregateAnalysis> {
        self.file
            .entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.analysis.clone())
    }

    pub fn insert(&mut self, key: String, analysis: &AggregateAnalysis) {
        self.file.entries.retain(|entry| entry.key != key);
        self.file.entries.push(CacheEntry {
            key,
            analysis: analysis.clone(),
        });

        if self.file.entries.len() > CACHE_LIMIT {
            let overflow = self.file.entries.len() - CACHE_LIMIT;
            self.file.entries.drain(0..overflow);
        }
    }

    pub fn save(&self) -> AppResult<()> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(&self.file)
            .map_err(|err| AppError::Configuration(format!("failed to write cache: {err}")))?;
        fs::write(&self.file_path, data)?;
        Ok(())
    }

    pub fn compute_key(backend: &str, sets: &[RepositoryCommitSet]) -> String {
        let mut hasher = Hasher::new();
        hasher.update(backend.as_bytes());
        for set in sets {
            hasher.update(b"\0repo\0");
            hasher.update(set.display_name.as_bytes());
            for commit in &set.commits {
                hasher.update(b"\0");
                hasher.update(commit.id.as_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}
