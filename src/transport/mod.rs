use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

mod beeper;

pub use beeper::BeeperClient;

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConversation {
    #[serde(alias = "chatID", alias = "chat_id")]
    pub id: String,
    #[serde(default, alias = "name", deserialize_with = "null_as_empty")]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteMessage {
    #[serde(alias = "messageID", alias = "message_id")]
    pub id: String,
    /// Media-only messages arrive with a null body.
    #[serde(default, alias = "body", deserialize_with = "null_as_empty")]
    pub text: String,
    #[serde(
        default,
        alias = "senderName",
        alias = "sender",
        deserialize_with = "null_as_empty"
    )]
    pub sender_name: String,
    #[serde(default, alias = "isSender", alias = "is_sender", deserialize_with = "null_as_false")]
    pub is_own: bool,
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{tool} timed out")]
    Timeout { tool: &'static str },
    #[error("{tool} request failed: {source}")]
    Http {
        tool: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{tool} returned HTTP {status}")]
    Status {
        tool: &'static str,
        status: reqwest::StatusCode,
    },
    #[error("{tool} failed: {message}")]
    Remote { tool: &'static str, message: String },
    #[error("{tool} returned a malformed response: {detail}")]
    Malformed { tool: &'static str, detail: String },
}

/// The messaging service. Every call may fail; callers skip the affected unit.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn search_conversations(
        &self,
        query: &str,
        limit: usize,
        unread_only: bool,
    ) -> Result<Vec<RemoteConversation>, TransportError>;

    async fn list_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<RemoteMessage>, TransportError>;

    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), TransportError>;

    async fn archive_conversation(&self, conversation_id: &str) -> Result<(), TransportError>;
}

#[cfg(test)]
pub mod testing {
    use std::collections::{HashMap, HashSet};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;

    /// In-memory transport that records outgoing calls.
    #[derive(Default)]
    pub struct RecordingTransport {
        pub conversations: Vec<RemoteConversation>,
        pub messages: HashMap<String, Vec<RemoteMessage>>,
        pub failing_conversations: HashSet<String>,
        pub fail_search: bool,
        pub fail_send: bool,
        pub fail_archive: bool,
        pub sent: Mutex<Vec<(String, String)>>,
        pub archived: Mutex<Vec<String>>,
        pub listed: Mutex<Vec<String>>,
    }

    impl RecordingTransport {
        pub fn with_conversation(mut self, id: &str, title: &str, messages: Vec<RemoteMessage>) -> Self {
            self.conversations.push(RemoteConversation {
                id: id.to_string(),
                title: title.to_string(),
            });
            self.messages.insert(id.to_string(), messages);
            self
        }

        pub fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().clone()
        }

        pub fn archived(&self) -> Vec<String> {
            self.archived.lock().clone()
        }

        pub fn listed(&self) -> Vec<String> {
            self.listed.lock().clone()
        }
    }

    pub fn remote(id: &str, sender: &str, text: &str, is_own: bool) -> RemoteMessage {
        RemoteMessage {
            id: id.to_string(),
            text: text.to_string(),
            sender_name: sender.to_string(),
            is_own,
            timestamp: None,
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn search_conversations(
            &self,
            _query: &str,
            limit: usize,
            _unread_only: bool,
        ) -> Result<Vec<RemoteConversation>, TransportError> {
            if self.fail_search {
                return Err(TransportError::Timeout {
                    tool: "search_chats",
                });
            }
            Ok(self.conversations.iter().take(limit).cloned().collect())
        }

        async fn list_messages(
            &self,
            conversation_id: &str,
        ) -> Result<Vec<RemoteMessage>, TransportError> {
            self.listed.lock().push(conversation_id.to_string());
            if self.failing_conversations.contains(conversation_id) {
                return Err(TransportError::Timeout {
                    tool: "list_messages",
                });
            }
            Ok(self
                .messages
                .get(conversation_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), TransportError> {
            if self.fail_send {
                return Err(TransportError::Remote {
                    tool: "send_message",
                    message: "chat not found".to_string(),
                });
            }
            self.sent
                .lock()
                .push((conversation_id.to_string(), text.to_string()));
            Ok(())
        }

        async fn archive_conversation(&self, conversation_id: &str) -> Result<(), TransportError> {
            if self.fail_archive {
                return Err(TransportError::Timeout {
                    tool: "archive_chat",
                });
            }
            self.archived.lock().push(conversation_id.to_string());
            Ok(())
        }
    }
}
