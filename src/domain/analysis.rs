use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const MAX_IMPACT_SCORE: u8 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryAchievements {
    pub achievements: Vec<String>,
    pub technologies: Vec<String>,
}

/// Where an analysis came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisOrigin {
    Generative { backend: String },
    Fallback { reason: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateAnalysis {
    pub summary: String,
    pub per_repository_achievements: BTreeMap<String, RepositoryAchievements>,
    pub key_achievements: Vec<String>,
    pub technologies: Vec<String>,
    pub impact_score: u8,
    pub business_value: String,
    pub origin: AnalysisOrigin,
}

impl AggregateAnalysis {
    pub fn is_generated(&self) -> bool {
        matches!(self.origin, AnalysisOrigin::Generative { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match &self.origin {
            AnalysisOrigin::Fallback { reason } => reason.as_deref(),
            AnalysisOrigin::Generative { .. } => None,
        }
    }

    pub fn with_fallback_reason(mut self, reason: impl Into<String>) -> Self {
        self.origin = AnalysisOrigin::Fallback {
            reason: Some(reason.into()),
        };
        self
    }
}
