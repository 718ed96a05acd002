pub mod ollama;
pub mod provider;
pub mod service;
pub mod types;

pub use ollama::OllamaProvider;
pub use provider::LlmProvider;
pub use service::ChatService;
pub use types::{ChatMessage, ChatRequest};
