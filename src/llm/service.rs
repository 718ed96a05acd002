use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use super::provider::LlmProvider;
use super::types::{ChatMessage, ChatRequest};
use crate::core::errors::ApiError;
use crate::history::{ConversationStore, StoredMessage};

/// Chat wrapper that persists conversational context to the transcript
/// store. Pipeline code composes a prompt (usually query plus retrieved
/// context) and lets this service handle history and bookkeeping.
#[derive(Clone)]
pub struct ChatService {
    provider: Arc<dyn LlmProvider>,
    store: ConversationStore,
    model: String,
    temperature: f64,
}

impl ChatService {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: ConversationStore,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            provider,
            store,
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Invoke the model for `chat_id`, persisting both the user turn and
    /// the assistant reply.
    ///
    /// The system prompt is prepended only when the transcript does not
    /// already carry a system message, so repeated calls keep a single
    /// system turn.
    pub async fn chat(
        &self,
        chat_id: &str,
        prompt: &str,
        system_prompt: Option<&str>,
        metadata: Value,
    ) -> Result<String, ApiError> {
        let mut messages = self.build_history(chat_id, system_prompt)?;
        messages.push(ChatMessage::new("user", prompt));

        let request = ChatRequest::new(messages).with_temperature(self.temperature);
        let reply = self.provider.chat(request, &self.model).await?;

        self.store.append(&StoredMessage {
            chat_id: chat_id.to_string(),
            role: "user".to_string(),
            content: prompt.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            metadata: metadata.clone(),
        })?;
        self.store.append(&StoredMessage {
            chat_id: chat_id.to_string(),
            role: "assistant".to_string(),
            content: reply.clone(),
            timestamp: Utc::now().to_rfc3339(),
            metadata: with_model(metadata, &self.model),
        })?;

        Ok(reply)
    }

    /// The persisted message history for the given chat.
    pub fn load_history(&self, chat_id: &str) -> Result<Vec<StoredMessage>, ApiError> {
        self.store.load(chat_id)
    }

    fn build_history(
        &self,
        chat_id: &str,
        system_prompt: Option<&str>,
    ) -> Result<Vec<ChatMessage>, ApiError> {
        let stored = self.store.load(chat_id)?;
        let mut messages = Vec::with_capacity(stored.len() + 2);

        if let Some(system_prompt) = system_prompt {
            let has_system = stored.iter().any(|message| message.role == "system");
            if !has_system {
                messages.push(ChatMessage::new("system", system_prompt));
            }
        }

        for message in stored {
            messages.push(ChatMessage::new(message.role, message.content));
        }

        Ok(messages)
    }
}

fn with_model(metadata: Value, model: &str) -> Value {
    let mut map = match metadata {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    map.insert("model".to_string(), Value::String(model.to_string()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use tempfile::tempdir;

    use crate::llm::types::ProviderModel;

    /// Provider that records the request it saw and answers with a canned
    /// reply.
    struct RecordingProvider {
        reply: String,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl RecordingProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn list_models(&self) -> Result<Vec<ProviderModel>, ApiError> {
            Ok(Vec::new())
        }

        async fn chat(&self, request: ChatRequest, _model_id: &str) -> Result<String, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(self.reply.clone())
        }

        async fn embed(
            &self,
            _inputs: &[String],
            _model_id: &str,
        ) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn service(provider: Arc<RecordingProvider>, dir: &std::path::Path) -> ChatService {
        let store = ConversationStore::new(dir).unwrap();
        ChatService::new(provider, store, "test-model", 0.1)
    }

    #[tokio::test]
    async fn chat_persists_both_turns() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(RecordingProvider::new("hello back"));
        let service = service(provider, dir.path());

        let reply = service
            .chat("chat-1", "hello", None, json!({}))
            .await
            .unwrap();
        assert_eq!(reply, "hello back");

        let transcript = service.load_history("chat-1").unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, "user");
        assert_eq!(transcript[0].content, "hello");
        assert_eq!(transcript[1].role, "assistant");
        assert_eq!(transcript[1].metadata["model"], "test-model");
    }

    #[tokio::test]
    async fn system_prompt_is_sent_once() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(RecordingProvider::new("ok"));
        let service = service(provider.clone(), dir.path());

        service
            .chat("chat-1", "first", Some("be helpful"), json!({}))
            .await
            .unwrap();
        service
            .chat("chat-1", "second", Some("be helpful"), json!({}))
            .await
            .unwrap();

        let seen = provider.seen.lock().unwrap();
        let first_roles: Vec<&str> = seen[0].messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(first_roles, vec!["system", "user"]);

        // Second call replays the persisted history; the system turn was
        // not persisted, so it is prepended again exactly once.
        let second_system_count = seen[1]
            .messages
            .iter()
            .filter(|m| m.role == "system")
            .count();
        assert_eq!(second_system_count, 1);

        let second_roles: Vec<&str> = seen[1].messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(second_roles, vec!["system", "user", "assistant", "user"]);
    }

    #[tokio::test]
    async fn temperature_reaches_the_provider() {
        let dir = tempdir().unwrap();
        let provider = Arc::new(RecordingProvider::new("ok"));
        let service = service(provider.clone(), dir.path());

        service.chat("chat-1", "hi", None, json!({})).await.unwrap();

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].temperature, Some(0.1));
    }
}
