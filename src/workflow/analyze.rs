use tracing::{debug, info, warn};

use crate::cache::AnalysisCache;
use crate::context::AppContext;
use crate::domain::analysis::AggregateAnalysis;
use crate::domain::commit::RepositoryCommitSet;

pub const KEYWORD_ONLY_REASON: &str = "keyword analysis selected";

/// Asks the generative backend first and falls back to keyword analysis on
/// any failure. Never fails itself.
pub async fn analyze_commits(ctx: &AppContext, sets: &[RepositoryCommitSet]) -> AggregateAnalysis {
    let Some(model) = ctx.language_model.as_deref() else {
        return ctx
            .classifier
            .classify(sets)
            .with_fallback_reason(KEYWORD_ONLY_REASON);
    };

    let key = AnalysisCache::compute_key(model.backend_name(), sets);
    let mut cache = ctx.config.cache_file.clone().and_then(|path| {
        AnalysisCache::load_from(path)
            .map_err(|err| warn!(%err, "analysis cache unavailable"))
            .ok()
    });

    if let Some(hit) = cache.as_ref().and_then(|cache| cache.get(&key)) {
        info!(backend = model.backend_name(), "reusing cached analysis");
        return hit;
    }

    match model.analyze(sets).await {
        Ok(analysis) => {
            if let Some(cache) = cache.as_mut() {
                cache.insert(key, &analysis);
                if let Err(err) = cache.save() {
                    warn!(%err, "could not write analysis cache");
                }
            }
            analysis
        }
        Err(err) => {
            warn!(
                backend = model.backend_name(),
                %err,
                "generative analysis failed, using keyword analysis"
            );
            debug!(repositories = sets.len(), "classifying with keyword tables");
            ctx.classifier.classify(sets).with_fallback_reason(err.to_string())
        }
    }
}
