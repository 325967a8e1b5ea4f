use std::{fmt, str::FromStr, sync::Arc};

use serde::Serialize;
use thiserror::Error;

use crate::{
    domain::{Category, Locale, PendingItem, PendingStatus},
    store::{StateFile, StoreError},
    transport::{Transport, TransportError},
};

/// A human decision about one pending message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Ignore,
    Send,
    Modify,
    SendCustom(String),
}

/// Action names as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Ignore,
    Send,
    Modify,
    SendCustom,
}

impl ActionKind {
    pub fn with_message(self, message: Option<String>) -> Result<Action, ActionError> {
        Ok(match self {
            ActionKind::Ignore => Action::Ignore,
            ActionKind::Send => Action::Send,
            ActionKind::Modify => Action::Modify,
            ActionKind::SendCustom => {
                let text = message.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(ActionError::EmptyCustomMessage);
                }
                Action::SendCustom(text)
            }
        })
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ignore" => Ok(ActionKind::Ignore),
            "send" => Ok(ActionKind::Send),
            "modify" => Ok(ActionKind::Modify),
            "send-custom" => Ok(ActionKind::SendCustom),
            other => Err(format!(
                "unknown action {other:?} (expected ignore, send, modify or send-custom)"
            )),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ActionKind::Ignore => "ignore",
            ActionKind::Send => "send",
            ActionKind::Modify => "modify",
            ActionKind::SendCustom => "send-custom",
        })
    }
}

/// Payload handed back by `modify` so a reply can be written out-of-band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModifyPrompt {
    pub message_id: String,
    pub chat_id: String,
    pub sender: String,
    pub category: Category,
    pub current_response: String,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ActionOutcome {
    Ignored {
        message_id: String,
        chat_id: String,
    },
    Sent {
        message_id: String,
        chat_id: String,
        text: String,
        archived: bool,
    },
    Modify(ModifyPrompt),
    /// Dry run of `send`/`send-custom`: nothing was delivered, archived or saved.
    WouldSend {
        message_id: String,
        chat_id: String,
        text: String,
    },
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("message {0} is not pending")]
    NotFound(String),
    #[error("no suggested response stored for message {0}")]
    EmptyResponse(String),
    #[error("send-custom requires a non-empty message")]
    EmptyCustomMessage,
    #[error("failed to deliver reply for message {message_id}: {source}")]
    Delivery {
        message_id: String,
        #[source]
        source: TransportError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Applies human decisions to the pending store, persisting after each mutation.
pub struct ActionHandler {
    transport: Arc<dyn Transport>,
    state: StateFile,
    dry_run: bool,
}

impl ActionHandler {
    pub fn new(transport: Arc<dyn Transport>, state: StateFile) -> Self {
        Self {
            transport,
            state,
            dry_run: false,
        }
    }

    /// In dry-run mode the reply is resolved and validated but never sent,
    /// and the state file is left untouched.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn resolve(&self, message_id: &str, action: Action) -> Result<ActionOutcome, ActionError> {
        let mut store = self.state.load()?;
        let item = store
            .get(message_id)
            .cloned()
            .ok_or_else(|| ActionError::NotFound(message_id.to_string()))?;

        let text = match action {
            Action::Modify => return Ok(ActionOutcome::Modify(modify_prompt(&item))),
            Action::Ignore => {
                store.remove(message_id);
                if !self.dry_run {
                    self.state.save(&store)?;
                }
                tracing::info!(target: "actions", message_id, chat_id = %item.chat_id, "pending message ignored");
                return Ok(ActionOutcome::Ignored {
                    message_id: item.message_id,
                    chat_id: item.chat_id,
                });
            }
            Action::Send => {
                if item.suggested_response.trim().is_empty() {
                    return Err(ActionError::EmptyResponse(message_id.to_string()));
                }
                item.suggested_response.clone()
            }
            Action::SendCustom(text) => {
                if text.trim().is_empty() {
                    return Err(ActionError::EmptyCustomMessage);
                }
                text
            }
        };

        if self.dry_run {
            tracing::info!(target: "actions", message_id, chat_id = %item.chat_id, "dry run, reply not sent");
            return Ok(ActionOutcome::WouldSend {
                message_id: item.message_id,
                chat_id: item.chat_id,
                text,
            });
        }

        if let Err(source) = self.transport.send_message(&item.chat_id, &text).await {
            tracing::error!(
                target: "actions",
                message_id,
                chat_id = %item.chat_id,
                error = %source,
                "reply delivery failed, item stays pending"
            );
            store.set_status(message_id, PendingStatus::DeliveryFailed);
            self.state.save(&store)?;
            return Err(ActionError::Delivery {
                message_id: message_id.to_string(),
                source,
            });
        }

        let archived = match self.transport.archive_conversation(&item.chat_id).await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    target: "actions",
                    chat_id = %item.chat_id,
                    error = %err,
                    "reply sent but archiving failed"
                );
                false
            }
        };

        store.remove(message_id);
        self.state.save(&store)?;
        tracing::info!(target: "actions", message_id, chat_id = %item.chat_id, archived, "reply sent");
        Ok(ActionOutcome::Sent {
            message_id: item.message_id,
            chat_id: item.chat_id,
            text,
            archived,
        })
    }
}

fn modify_prompt(item: &PendingItem) -> ModifyPrompt {
    let prompt = match item.locale {
        Locale::Fr => format!("Quelle réponse veux-tu envoyer à {} ?", item.sender),
        Locale::En => format!("Which reply do you want to send to {}?", item.sender),
    };
    ModifyPrompt {
        message_id: item.message_id.clone(),
        chat_id: item.chat_id.clone(),
        sender: item.sender.clone(),
        category: item.category,
        current_response: item.suggested_response.clone(),
        prompt,
    }
}
