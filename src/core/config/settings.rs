use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use super::paths::AppPaths;
use crate::core::errors::ApiError;

const DEFAULT_CHAT_MODEL: &str = "llama3.1:8b";
const DEFAULT_OLLAMA_HOST: &str = "ollama";
const DEFAULT_OLLAMA_PORT: &str = "11434";

/// Typed application settings, loaded from `config.yml` with environment
/// overrides applied on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub ollama: OllamaSettings,
    pub chunking: ChunkingSettings,
    pub retrieval: RetrievalSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub base_url: Option<String>,
    pub model: String,
    pub embedding_model: Option<String>,
    pub temperature: f64,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingSettings {
    pub chunk_size: usize,
    pub overlap: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub default_corpus: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            ollama: OllamaSettings::default(),
            chunking: ChunkingSettings::default(),
            retrieval: RetrievalSettings::default(),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { port: 8000 }
    }
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: None,
            temperature: 0.1,
            timeout_secs: 120,
        }
    }
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap: 50,
        }
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            top_k: 5,
            default_corpus: "emails.jsonl".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the config file (if present) and apply
    /// environment overrides. A missing file falls back to defaults.
    pub fn load(paths: &AppPaths) -> Result<Self, ApiError> {
        let path = config_path(paths);

        let mut settings = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(ApiError::internal)?;
            serde_yaml::from_str::<Settings>(&contents).map_err(|err| {
                ApiError::Internal(format!("invalid config {}: {}", path.display(), err))
            })?
        } else {
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(port) = env::var("PORT").ok().and_then(|v| v.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Ok(model) = env::var("OLLAMA_MODEL") {
            if !model.trim().is_empty() {
                self.ollama.model = model;
            }
        }
        if let Ok(model) = env::var("OLLAMA_EMBEDDING_MODEL") {
            if !model.trim().is_empty() {
                self.ollama.embedding_model = Some(model);
            }
        }
        if let Ok(url) = env::var("OLLAMA_BASE_URL") {
            if !url.trim().is_empty() {
                self.ollama.base_url = Some(url);
            }
        }
    }
}

impl OllamaSettings {
    /// Resolved Ollama endpoint. Explicit `base_url` wins, otherwise the
    /// URL is derived from `OLLAMA_HOST`/`OLLAMA_PORT`.
    pub fn resolved_base_url(&self) -> String {
        if let Some(url) = &self.base_url {
            return url.trim_end_matches('/').to_string();
        }

        let host = env::var("OLLAMA_HOST").unwrap_or_else(|_| DEFAULT_OLLAMA_HOST.to_string());
        let port = env::var("OLLAMA_PORT").unwrap_or_else(|_| DEFAULT_OLLAMA_PORT.to_string());
        derive_base_url(&host, &port)
    }

    /// Model used for embedding generation; defaults to the chat model.
    pub fn resolved_embedding_model(&self) -> &str {
        self.embedding_model.as_deref().unwrap_or(&self.model)
    }
}

/// Some setups specify host as host:port. Respect it if present.
fn derive_base_url(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("http://{}", host)
    } else {
        format!("http://{}:{}", host, port)
    }
}

fn config_path(paths: &AppPaths) -> PathBuf {
    if let Ok(path) = env::var("RAGLAB_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    let user_config = paths.data_dir.join("config.yml");
    if user_config.exists() {
        return user_config;
    }

    paths.project_root.join("config.yml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_derivation_appends_port() {
        assert_eq!(derive_base_url("ollama", "11434"), "http://ollama:11434");
    }

    #[test]
    fn base_url_derivation_respects_host_with_port() {
        assert_eq!(derive_base_url("localhost:9000", "11434"), "http://localhost:9000");
    }

    #[test]
    fn explicit_base_url_wins_and_is_normalized() {
        let settings = OllamaSettings {
            base_url: Some("http://localhost:11434/".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolved_base_url(), "http://localhost:11434");
    }

    #[test]
    fn embedding_model_falls_back_to_chat_model() {
        let settings = OllamaSettings::default();
        assert_eq!(settings.resolved_embedding_model(), DEFAULT_CHAT_MODEL);
    }

    #[test]
    fn yaml_settings_parse_with_partial_sections() {
        let yaml = "ollama:\n  model: mistral:7b\nchunking:\n  chunk_size: 256\n";
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.ollama.model, "mistral:7b");
        assert_eq!(settings.chunking.chunk_size, 256);
        assert_eq!(settings.chunking.overlap, 50);
        assert_eq!(settings.retrieval.top_k, 5);
    }
}
