use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    classifier::ProspectionEngine,
    config::TriageConfig,
    domain::{preview, Message, PendingItem, PendingStatus},
    store::{IngestOutcome, StateFile, StoreError},
    transport::{RemoteConversation, RemoteMessage, Transport},
};

const LOG_PREVIEW_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassSummary {
    pub status: PassStatus,
    pub detected: usize,
    pub messages: Vec<PendingItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub skipped_conversations: usize,
    pub pending_total: usize,
    pub dry_run: bool,
}

/// One classification pass over the channel's conversations.
pub struct TriageOrchestrator {
    transport: Arc<dyn Transport>,
    engine: Arc<ProspectionEngine>,
    state: StateFile,
    settings: TriageConfig,
}

impl TriageOrchestrator {
    pub fn new(
        transport: Arc<dyn Transport>,
        engine: Arc<ProspectionEngine>,
        state: StateFile,
        settings: TriageConfig,
    ) -> Self {
        Self {
            transport,
            engine,
            state,
            settings,
        }
    }

    /// Loads the store, ingests every unseen message and saves the store
    /// (unless `dry_run`). Transport failures skip the affected conversation.
    pub async fn run_pass(&self, dry_run: bool) -> Result<PassSummary, StoreError> {
        let mut store = self.state.load()?;

        let conversations = match self
            .transport
            .search_conversations(
                &self.settings.room_query,
                self.settings.chat_limit,
                self.settings.unread_only,
            )
            .await
        {
            Ok(conversations) => conversations,
            Err(err) => {
                tracing::error!(target: "triage", error = %err, "conversation search failed");
                return Ok(PassSummary {
                    status: PassStatus::Error,
                    detected: 0,
                    messages: Vec::new(),
                    error: Some(err.to_string()),
                    skipped_conversations: 0,
                    pending_total: store.pending().len(),
                    dry_run,
                });
            }
        };
        tracing::info!(target: "triage", total = conversations.len(), dry_run, "starting pass");

        let mut detected = Vec::new();
        let mut skipped_conversations = 0;
        for conversation in conversations {
            let remote = match self.transport.list_messages(&conversation.id).await {
                Ok(remote) => remote,
                Err(err) => {
                    tracing::warn!(
                        target: "triage",
                        chat_id = %conversation.id,
                        error = %err,
                        "skipping conversation for this pass"
                    );
                    skipped_conversations += 1;
                    continue;
                }
            };

            for (message, in_thread) in thread_messages(&conversation, remote) {
                if message.is_own {
                    continue;
                }
                if message.id.is_empty() {
                    tracing::warn!(
                        target: "triage",
                        chat_id = %conversation.id,
                        "message without id skipped"
                    );
                    continue;
                }
                if let IngestOutcome::Pending(item) =
                    store.ingest(&message, |message| self.evaluate(message, in_thread))
                {
                    detected.push(item);
                }
            }
        }

        if !dry_run {
            self.state.save(&store)?;
        }

        tracing::info!(
            target: "triage",
            detected = detected.len(),
            skipped_conversations,
            pending_total = store.pending().len(),
            "pass finished"
        );
        Ok(PassSummary {
            status: PassStatus::Ok,
            detected: detected.len(),
            messages: detected,
            error: None,
            skipped_conversations,
            pending_total: store.pending().len(),
            dry_run,
        })
    }

    fn evaluate(&self, message: &Message, in_thread: bool) -> Option<PendingItem> {
        let analysis = self
            .engine
            .analyze(&message.text, &message.sender_name, in_thread);
        if !analysis.verdict.is_spam {
            tracing::debug!(
                target: "triage",
                message_id = %message.id,
                score = analysis.verdict.score,
                "message looks genuine"
            );
            return None;
        }

        tracing::info!(
            target: "triage",
            message_id = %message.id,
            chat_id = %message.conversation_id,
            sender = %message.sender_name,
            category = %analysis.category,
            score = analysis.verdict.score,
            preview = %preview(&message.text, LOG_PREVIEW_CHARS),
            "prospection detected"
        );
        Some(PendingItem {
            message_id: message.id.clone(),
            chat_id: message.conversation_id.clone(),
            chat_title: message.conversation_title.clone(),
            sender: message.sender_name.clone(),
            category: analysis.category,
            locale: analysis.locale,
            text: message.text.clone(),
            verdict: analysis.verdict,
            suggested_response: analysis.suggested_response.unwrap_or_default(),
            status: PendingStatus::PendingConfirmation,
            detected_at: Utc::now(),
        })
    }
}

/// Orders a conversation chronologically and flags messages that follow one
/// of our own, i.e. replies inside an ongoing thread.
fn thread_messages(
    conversation: &RemoteConversation,
    remote: Vec<RemoteMessage>,
) -> Vec<(Message, bool)> {
    let mut messages: Vec<Message> = remote
        .into_iter()
        .map(|raw| Message {
            timestamp: raw.timestamp.as_deref().and_then(parse_timestamp),
            id: raw.id,
            text: raw.text,
            sender_name: raw.sender_name,
            conversation_id: conversation.id.clone(),
            conversation_title: conversation.title.clone(),
            position: 0,
            is_own: raw.is_own,
        })
        .collect();

    if messages.iter().all(|message| message.timestamp.is_some()) {
        messages.sort_by_key(|message| message.timestamp);
    }

    let mut seen_own = false;
    messages
        .into_iter()
        .enumerate()
        .map(|(position, mut message)| {
            message.position = position;
            let in_thread = seen_own;
            seen_own |= message.is_own;
            (message, in_thread)
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::ClassifierConfig,
        transport::testing::{remote, RecordingTransport},
    };

    const PITCH: &str =
        "Hi, I noticed your profile, we help teams scale revenue, would you be open to a quick call?";

    fn settings() -> TriageConfig {
        TriageConfig {
            room_query: "linkedin".to_string(),
            chat_limit: 10,
            unread_only: true,
            seen_capacity: 100,
        }
    }

    fn orchestrator(transport: Arc<RecordingTransport>, state: StateFile) -> TriageOrchestrator {
        let engine = Arc::new(ProspectionEngine::new(&ClassifierConfig::default()).unwrap());
        TriageOrchestrator::new(transport, engine, state, settings())
    }

    #[tokio::test]
    async fn pass_detects_and_persists_prospection() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"), 100);
        let transport = Arc::new(RecordingTransport::default().with_conversation(
            "c1",
            "Sam Carter",
            vec![
                remote("m1", "Sam Carter", PITCH, false),
                remote("m2", "Sam Carter", "haha thanks, see you at the meetup", false),
            ],
        ));

        let summary = orchestrator(transport, state.clone()).run_pass(false).await.unwrap();
        assert_eq!(summary.status, PassStatus::Ok);
        assert_eq!(summary.detected, 1);
        assert_eq!(summary.messages[0].message_id, "m1");
        assert!(summary.messages[0].suggested_response.starts_with("Hi Sam"));

        let store = state.load().unwrap();
        assert!(store.get("m1").is_some());
        assert!(store.seen().contains("m1"));
        assert!(store.seen().contains("m2"));
    }

    #[tokio::test]
    async fn second_pass_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"), 100);
        let transport = Arc::new(RecordingTransport::default().with_conversation(
            "c1",
            "Sam",
            vec![remote("m1", "Sam", PITCH, false)],
        ));
        let triage = orchestrator(transport, state.clone());

        assert_eq!(triage.run_pass(false).await.unwrap().detected, 1);
        let again = triage.run_pass(false).await.unwrap();
        assert_eq!(again.detected, 0);
        assert_eq!(again.pending_total, 1);
    }

    #[tokio::test]
    async fn failing_conversation_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"), 100);
        let mut transport = RecordingTransport::default()
            .with_conversation("broken", "Broken", vec![remote("x1", "X", PITCH, false)])
            .with_conversation("c2", "Sam", vec![remote("m1", "Sam", PITCH, false)]);
        transport.failing_conversations.insert("broken".to_string());
        let transport = Arc::new(transport);

        let summary = orchestrator(transport.clone(), state.clone())
            .run_pass(false)
            .await
            .unwrap();
        assert_eq!(summary.skipped_conversations, 1);
        assert_eq!(summary.detected, 1);
        assert_eq!(transport.listed(), vec!["broken", "c2"]);
        // retried next pass
        assert!(!state.load().unwrap().seen().contains("x1"));
    }

    #[tokio::test]
    async fn media_only_message_does_not_skip_its_conversation() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"), 100);
        let transport = Arc::new(RecordingTransport::default().with_conversation(
            "c1",
            "Sam",
            vec![
                remote("m1", "Sam", "", false),
                remote("m2", "Sam", PITCH, false),
            ],
        ));

        let summary = orchestrator(transport, state.clone()).run_pass(false).await.unwrap();
        assert_eq!(summary.skipped_conversations, 0);
        assert_eq!(summary.detected, 1);
        let store = state.load().unwrap();
        assert!(store.seen().contains("m1"));
        assert!(store.get("m1").is_none());
        assert!(store.get("m2").is_some());
    }

    #[tokio::test]
    async fn search_failure_reports_error_status() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"), 100);
        let transport = RecordingTransport {
            fail_search: true,
            ..RecordingTransport::default()
        };
        let summary = orchestrator(Arc::new(transport), state.clone())
            .run_pass(false)
            .await
            .unwrap();
        assert_eq!(summary.status, PassStatus::Error);
        assert!(summary.error.is_some());
        assert!(!state.path().exists());
    }

    #[tokio::test]
    async fn dry_run_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"), 100);
        let transport = Arc::new(RecordingTransport::default().with_conversation(
            "c1",
            "Sam",
            vec![remote("m1", "Sam", PITCH, false)],
        ));
        let summary = orchestrator(transport, state.clone()).run_pass(true).await.unwrap();
        assert_eq!(summary.detected, 1);
        assert!(summary.dry_run);
        assert!(!state.path().exists());
    }

    #[tokio::test]
    async fn own_messages_are_skipped_and_make_later_ones_replies() {
        let dir = tempfile::tempdir().unwrap();
        let state = StateFile::new(dir.path().join("state.json"), 100);
        // Scores 0.7: spam on a cold open, below the 0.8 reply threshold.
        let pitch = "We help SaaS teams boost growth, open to a demo?";
        let transport = Arc::new(
            RecordingTransport::default()
                .with_conversation(
                    "cold",
                    "Cold",
                    vec![remote("a1", "Ann", pitch, false)],
                )
                .with_conversation(
                    "warm",
                    "Warm",
                    vec![
                        remote("b0", "Me", pitch, true),
                        remote("b1", "Bob", pitch, false),
                    ],
                ),
        );

        let summary = orchestrator(transport, state.clone()).run_pass(false).await.unwrap();
        let ids: Vec<_> = summary.messages.iter().map(|m| m.message_id.as_str()).collect();
        assert_eq!(ids, ["a1"]);
        let store = state.load().unwrap();
        assert!(!store.seen().contains("b0"));
        assert!(store.seen().contains("b1"));
    }

    #[test]
    fn timestamps_order_the_thread() {
        let conversation = RemoteConversation {
            id: "c".into(),
            title: "t".into(),
        };
        let mut newer = remote("2", "Bob", "second", false);
        newer.timestamp = Some("2025-03-01T10:05:00Z".into());
        let mut own = remote("1", "Me", "first", true);
        own.timestamp = Some("2025-03-01T10:00:00+00:00".into());

        let ordered = thread_messages(&conversation, vec![newer, own]);
        assert_eq!(ordered[0].0.id, "1");
        assert_eq!(ordered[1].0.position, 1);
        assert!(ordered[1].1);
        assert!(!ordered[0].1);
    }
}
