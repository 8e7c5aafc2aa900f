use std::sync::Arc;

use crate::config::{AppConfig, Backend};
use crate::domain::classifier::{ClassifierTables, FallbackClassifier};
use crate::services::{LanguageModelService, VersionControlService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    /// `None` when only keyword analysis is available.
    pub language_model: Option<Arc<dyn LanguageModelService>>,
    pub classifier: FallbackClassifier,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        language_model: Option<Arc<dyn LanguageModelService>>,
    ) -> Self {
        Self {
            config,
            version_control,
            language_model,
            classifier: FallbackClassifier::new(ClassifierTables::default()),
        }
    }

    pub fn backend_name(&self) -> &str {
        self.language_model
            .as_deref()
            .map(|model| model.backend_name())
            .unwrap_or(Backend::Keywords.display_name())
    }
}
