use std::sync::Arc;

use crate::core::config::{AppPaths, Settings};
use crate::history::ConversationStore;
use crate::llm::provider::LlmProvider;
use crate::llm::{ChatService, OllamaProvider};

#[derive(Clone)]
pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub llm: Arc<dyn LlmProvider>,
    pub chat: ChatService,
    pub history: ConversationStore,
}

impl AppState {
    pub fn initialize() -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());
        let settings = Settings::load(&paths)?;

        let llm: Arc<dyn LlmProvider> = Arc::new(OllamaProvider::new(
            settings.ollama.resolved_base_url(),
            settings.ollama.timeout_secs,
        )?);

        let history = ConversationStore::new(paths.conversations_dir("advanced_rag"))?;
        let chat = ChatService::new(
            llm.clone(),
            history.clone(),
            settings.ollama.model.clone(),
            settings.ollama.temperature,
        );

        Ok(Arc::new(AppState {
            paths,
            settings,
            llm,
            chat,
            history,
        }))
    }
}
