use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::TransportConfig;

use super::{RemoteConversation, RemoteMessage, Transport, TransportError};

const SEARCH_CHATS: &str = "search_chats";
const LIST_MESSAGES: &str = "list_messages";
const SEND_MESSAGE: &str = "send_message";
const ARCHIVE_CHAT: &str = "archive_chat";

/// Beeper desktop MCP server spoken to over JSON-RPC `tools/call`.
pub struct BeeperClient {
    http: Client,
    config: TransportConfig,
    next_id: AtomicU64,
}

impl BeeperClient {
    pub fn new(http: Client, config: TransportConfig) -> Self {
        Self {
            http,
            config,
            next_id: AtomicU64::new(1),
        }
    }

    async fn call_tool(&self, tool: &'static str, arguments: Value) -> Result<Value, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = build_request(id, tool, arguments);
        tracing::debug!(target: "transport", tool, id, "calling tool");

        let mut builder = self
            .http
            .post(self.config.endpoint.clone())
            .timeout(self.config.timeout)
            .header(ACCEPT, "application/json, text/event-stream")
            .json(&request);
        if let Some(token) = &self.config.token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|err| http_error(tool, err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status { tool, status });
        }
        let body = response.text().await.map_err(|err| http_error(tool, err))?;
        parse_tool_result(tool, &body)
    }
}

#[async_trait]
impl Transport for BeeperClient {
    async fn search_conversations(
        &self,
        query: &str,
        limit: usize,
        unread_only: bool,
    ) -> Result<Vec<RemoteConversation>, TransportError> {
        let payload = self
            .call_tool(
                SEARCH_CHATS,
                json!({ "query": query, "limit": limit, "unreadOnly": unread_only }),
            )
            .await?;
        extract_list(SEARCH_CHATS, payload, &["items", "chats", "results"])
    }

    async fn list_messages(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<RemoteMessage>, TransportError> {
        let payload = self
            .call_tool(
                LIST_MESSAGES,
                json!({ "chatID": conversation_id, "limit": self.config.messages_per_chat }),
            )
            .await?;
        extract_list(LIST_MESSAGES, payload, &["items", "messages", "results"])
    }

    async fn send_message(&self, conversation_id: &str, text: &str) -> Result<(), TransportError> {
        self.call_tool(SEND_MESSAGE, json!({ "chatID": conversation_id, "text": text }))
            .await?;
        Ok(())
    }

    async fn archive_conversation(&self, conversation_id: &str) -> Result<(), TransportError> {
        self.call_tool(ARCHIVE_CHAT, json!({ "chatID": conversation_id }))
            .await?;
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: ToolCall,
}

#[derive(Debug, Serialize)]
struct ToolCall {
    name: &'static str,
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<ToolResult>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolResult {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    is_error: bool,
    structured_content: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

fn build_request(id: u64, tool: &'static str, arguments: Value) -> RpcRequest {
    RpcRequest {
        jsonrpc: "2.0",
        id,
        method: "tools/call",
        params: ToolCall {
            name: tool,
            arguments,
        },
    }
}

fn http_error(tool: &'static str, source: reqwest::Error) -> TransportError {
    if source.is_timeout() {
        TransportError::Timeout { tool }
    } else {
        TransportError::Http { tool, source }
    }
}

/// Accepts both plain JSON and a server-sent-events body (last `data:` line wins).
fn parse_tool_result(tool: &'static str, body: &str) -> Result<Value, TransportError> {
    let json_text = body
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .last()
        .map(str::trim)
        .unwrap_or(body);

    let response: RpcResponse =
        serde_json::from_str(json_text).map_err(|err| TransportError::Malformed {
            tool,
            detail: err.to_string(),
        })?;

    if let Some(error) = response.error {
        return Err(TransportError::Remote {
            tool,
            message: error.message,
        });
    }
    let result = response.result.ok_or_else(|| TransportError::Malformed {
        tool,
        detail: "missing result".to_string(),
    })?;

    let text = result
        .content
        .iter()
        .filter_map(|block| block.text.as_deref())
        .collect::<Vec<_>>()
        .join("\n");
    if result.is_error {
        return Err(TransportError::Remote { tool, message: text });
    }
    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

fn extract_list<T: DeserializeOwned>(
    tool: &'static str,
    payload: Value,
    keys: &[&str],
) -> Result<Vec<T>, TransportError> {
    let list = match payload {
        Value::Null => return Ok(Vec::new()),
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| map.remove(*key))
            .ok_or_else(|| TransportError::Malformed {
                tool,
                detail: format!("expected one of {keys:?}"),
            })?,
        other => other,
    };
    let items = match list {
        Value::Array(items) => items,
        other => {
            return Err(TransportError::Malformed {
                tool,
                detail: format!("expected a list, got {other}"),
            })
        }
    };

    // One bad entry must not cost the rest of the batch.
    let mut parsed = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(value) => parsed.push(value),
            Err(err) => {
                tracing::warn!(target: "transport", tool, index, error = %err, "dropping malformed entry");
            }
        }
    }
    Ok(parsed)
}
