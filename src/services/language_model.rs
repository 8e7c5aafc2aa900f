use async_trait::async_trait;

use crate::domain::analysis::AggregateAnalysis;
use crate::domain::commit::RepositoryCommitSet;
use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    fn backend_name(&self) -> &str;
    async fn analyze(&self, sets: &[RepositoryCommitSet]) -> AppResult<AggregateAnalysis>;
}
