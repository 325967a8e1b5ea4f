//! Rule-based prospection scoring: language, signals, verdict, category, reply.

pub mod category;
pub mod language;
pub mod lexicon;
pub mod response;
pub mod scoring;
pub mod signals;

use serde::Serialize;

use crate::{
    config::{ClassifierConfig, ConfigError},
    domain::{Category, Locale, Verdict},
};

pub use category::Categorizer;
pub use language::LanguageDetector;
pub use lexicon::{Lexicon, LexiconTable, SignalClass};
pub use response::{ResponseComposer, TemplateSet};
pub use scoring::{Classifier, ScoringWeights};

#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub locale: Locale,
    pub category: Category,
    pub verdict: Verdict,
    /// Only composed for messages judged as prospection.
    pub suggested_response: Option<String>,
}

/// Owns the compiled lexicon and templates for the whole run.
#[derive(Debug, Clone)]
pub struct ProspectionEngine {
    lexicon: Lexicon,
    templates: TemplateSet,
    weights: ScoringWeights,
}

impl ProspectionEngine {
    pub fn new(config: &ClassifierConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            lexicon: Lexicon::compile(&config.lexicon)?,
            templates: config.templates.clone(),
            weights: ScoringWeights::CANONICAL,
        })
    }

    pub fn analyze(&self, text: &str, sender_name: &str, in_thread: bool) -> Analysis {
        let locale = LanguageDetector::new(&self.lexicon).detect(text);
        let verdict = Classifier::new(&self.lexicon, self.weights).classify(text, in_thread);
        let category = Categorizer::new(&self.lexicon).categorize(text, &verdict.signals);
        let suggested_response = verdict
            .is_spam
            .then(|| ResponseComposer::new(&self.templates).compose(locale, sender_name, category));

        tracing::debug!(
            target: "classifier",
            score = verdict.score,
            threshold = verdict.threshold,
            is_spam = verdict.is_spam,
            category = %category,
            locale = locale.suffix(),
            "message scored"
        );

        Analysis {
            locale,
            category,
            verdict,
            suggested_response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ProspectionEngine {
        ProspectionEngine::new(&ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn cold_pitch_gets_english_reply_for_its_category() {
        let analysis = engine().analyze(
            "Hi, I noticed your profile, we help teams scale revenue, would you be open to a quick call?",
            "Sam Carter",
            false,
        );
        assert!(analysis.verdict.is_spam);
        assert_eq!(analysis.locale, Locale::En);
        assert!(matches!(analysis.category, Category::Recruiting | Category::Service));
        let reply = analysis.suggested_response.unwrap();
        assert!(reply.starts_with("Hi Sam,"), "{reply}");
    }

    #[test]
    fn french_recruiter_gets_french_reply() {
        let analysis = engine().analyze(
            "Bonjour, je me permets de vous contacter car votre profil correspond à un poste en CDI chez notre client.",
            "Claire Dubois",
            false,
        );
        assert!(analysis.verdict.is_spam);
        assert_eq!(analysis.locale, Locale::Fr);
        assert_eq!(analysis.category, Category::Recruiting);
        assert!(analysis.suggested_response.unwrap().starts_with("Bonjour Claire"));
    }

    #[test]
    fn clean_messages_get_no_reply() {
        let analysis = engine().analyze("", "Someone", false);
        assert!(!analysis.verdict.is_spam);
        assert!(analysis.suggested_response.is_none());
        assert_eq!(analysis.category, Category::Spam);
    }

    #[test]
    fn invalid_lexicon_override_fails_construction() {
        let mut config = ClassifierConfig::default();
        config.lexicon.reply_markers = vec!["[".to_string()];
        assert!(ProspectionEngine::new(&config).is_err());
    }
}
