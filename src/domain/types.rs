use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::preview;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

impl Locale {
    /// Suffix used in template keys (`recruiting_fr`).
    pub fn suffix(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Recruiting,
    Outsourcing,
    Crypto,
    Networking,
    Service,
    Spam,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Recruiting,
        Category::Outsourcing,
        Category::Crypto,
        Category::Networking,
        Category::Service,
        Category::Spam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Recruiting => "recruiting",
            Category::Outsourcing => "outsourcing",
            Category::Crypto => "crypto",
            Category::Networking => "networking",
            Category::Service => "service",
            Category::Spam => "spam",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hits for one signal class. `count` is authoritative; `preview` is display only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassMatches {
    pub count: usize,
    pub preview: Vec<String>,
}

impl ClassMatches {
    pub fn from_terms(mut terms: Vec<String>, preview_len: usize) -> Self {
        let count = terms.len();
        terms.truncate(preview_len);
        Self {
            count,
            preview: terms,
        }
    }

    pub fn any(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub recruiting: ClassMatches,
    pub generic_opener: ClassMatches,
    pub commercial_tone: ClassMatches,
    pub cold_outreach: ClassMatches,
    pub technical: ClassMatches,
    pub authentic: ClassMatches,
    /// 0.0 reads personal, 1.0 reads commercial.
    pub tone_score: f64,
    /// Percentage of words drawn from the buzzword and technical lists.
    pub buzzword_density: f64,
    pub word_count: usize,
    pub reply_context: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub is_spam: bool,
    pub score: f64,
    pub threshold: f64,
    pub reasons: Vec<String>,
    pub signals: SignalBundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingStatus {
    PendingConfirmation,
    DeliveryFailed,
}

impl PendingStatus {
    pub fn label(self) -> &'static str {
        match self {
            PendingStatus::PendingConfirmation => "pending_confirmation",
            PendingStatus::DeliveryFailed => "delivery_failed",
        }
    }
}

/// A message classified as prospection, waiting for a human decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingItem {
    pub message_id: String,
    pub chat_id: String,
    pub chat_title: String,
    pub sender: String,
    pub category: Category,
    pub locale: Locale,
    pub text: String,
    pub verdict: Verdict,
    pub suggested_response: String,
    pub status: PendingStatus,
    pub detected_at: DateTime<Utc>,
}

impl PendingItem {
    pub fn text_preview(&self, max_chars: usize) -> String {
        preview(&self.text, max_chars)
    }
}
