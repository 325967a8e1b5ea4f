use chrono::{DateTime, Utc};

/// An inbound message as handed over by the transport. Read-only for the core.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender_name: String,
    pub conversation_id: String,
    pub conversation_title: String,
    pub position: usize,
    pub is_own: bool,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Char-safe prefix of `text`, used wherever message bodies reach logs or summaries.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
