//! Conversation transcript persistence.
//!
//! One JSON-Lines file per chat, so transcripts can be aggregated at the
//! end of a workshop run for quality and throughput analysis.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::errors::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    pub chat_id: String,
    pub role: String,
    pub content: String,
    pub timestamp: String,
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
}

fn empty_metadata() -> Value {
    Value::Object(serde_json::Map::new())
}

#[derive(Debug, Clone)]
pub struct ConversationStore {
    directory: PathBuf,
}

impl ConversationStore {
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).map_err(ApiError::internal)?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Persist a new message to the chat transcript.
    pub fn append(&self, message: &StoredMessage) -> Result<(), ApiError> {
        let path = self.chat_path(&message.chat_id)?;
        let line = serde_json::to_string(message).map_err(ApiError::internal)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(ApiError::internal)?;
        writeln!(file, "{}", line).map_err(ApiError::internal)?;

        Ok(())
    }

    /// Load the full conversation for a chat id, in append order. A chat
    /// that has never been recorded yields an empty transcript.
    pub fn load(&self, chat_id: &str) -> Result<Vec<StoredMessage>, ApiError> {
        let path = self.chat_path(chat_id)?;
        if !path.exists() {
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&path).map_err(ApiError::internal)?;
        let mut messages = Vec::new();

        for (number, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let message: StoredMessage = serde_json::from_str(line).map_err(|err| {
                ApiError::Internal(format!(
                    "corrupt transcript {} line {}: {}",
                    path.display(),
                    number + 1,
                    err
                ))
            })?;
            messages.push(message);
        }

        Ok(messages)
    }

    /// All chat identifiers that have been persisted, sorted.
    pub fn list_chats(&self) -> Result<Vec<String>, ApiError> {
        let mut chats = Vec::new();

        let entries = fs::read_dir(&self.directory).map_err(ApiError::internal)?;
        for entry in entries {
            let entry = entry.map_err(ApiError::internal)?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                chats.push(stem.to_string());
            }
        }

        chats.sort();
        Ok(chats)
    }

    /// Materialise all conversations into a single JSON-Lines file, one
    /// line per chat: `{"chat_id": ..., "messages": [...]}`. Returns the
    /// number of chats exported.
    pub fn export(&self, destination: &Path) -> Result<usize, ApiError> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(ApiError::internal)?;
        }

        let chats = self.list_chats()?;
        let mut out = fs::File::create(destination).map_err(ApiError::internal)?;

        for chat_id in &chats {
            let messages = self.load(chat_id)?;
            let record = serde_json::json!({
                "chat_id": chat_id,
                "messages": messages,
            });
            let line = serde_json::to_string(&record).map_err(ApiError::internal)?;
            writeln!(out, "{}", line).map_err(ApiError::internal)?;
        }

        Ok(chats.len())
    }

    fn chat_path(&self, chat_id: &str) -> Result<PathBuf, ApiError> {
        if chat_id.is_empty()
            || chat_id.contains('/')
            || chat_id.contains('\\')
            || chat_id.contains("..")
        {
            return Err(ApiError::BadRequest(format!(
                "invalid chat id: {}",
                chat_id
            )));
        }
        Ok(self.directory.join(format!("{}.jsonl", chat_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn message(chat_id: &str, role: &str, content: &str) -> StoredMessage {
        StoredMessage {
            chat_id: chat_id.to_string(),
            role: role.to_string(),
            content: content.to_string(),
            timestamp: "2025-01-01T00:00:00Z".to_string(),
            metadata: empty_metadata(),
        }
    }

    #[test]
    fn append_then_load_preserves_order() {
        let dir = tempdir().unwrap();
        let store = ConversationStore::new(dir.path()).unwrap();

        store.append(&message("chat-1", "user", "hello")).unwrap();
        store.append(&message("chat-1", "assistant", "hi")).unwrap();

        let transcript = store.load("chat-1").unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0].role, "user");
        assert_eq!(transcript[1].content, "hi");
    }

    #[test]
    fn unknown_chat_loads_empty() {
        let dir = tempdir().unwrap();
        let store = ConversationStore::new(dir.path()).unwrap();
        assert!(store.load("nope").unwrap().is_empty());
    }

    #[test]
    fn list_chats_is_sorted() {
        let dir = tempdir().unwrap();
        let store = ConversationStore::new(dir.path()).unwrap();

        store.append(&message("beta", "user", "b")).unwrap();
        store.append(&message("alpha", "user", "a")).unwrap();

        assert_eq!(store.list_chats().unwrap(), vec!["alpha", "beta"]);
    }

    #[test]
    fn export_writes_one_line_per_chat() {
        let dir = tempdir().unwrap();
        let store = ConversationStore::new(dir.path().join("chats")).unwrap();

        store.append(&message("a", "user", "one")).unwrap();
        store.append(&message("b", "user", "two")).unwrap();

        let destination = dir.path().join("out").join("all.jsonl");
        let exported = store.export(&destination).unwrap();
        assert_eq!(exported, 2);

        let contents = std::fs::read_to_string(&destination).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["chat_id"], "a");
        assert_eq!(first["messages"][0]["content"], "one");
    }

    #[test]
    fn path_escaping_chat_ids_are_rejected() {
        let dir = tempdir().unwrap();
        let store = ConversationStore::new(dir.path()).unwrap();
        let err = store.load("../../etc/passwd").unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
