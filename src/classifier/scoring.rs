use crate::domain::{SignalBundle, Verdict};

use super::{
    lexicon::{Lexicon, LEXICON_VERSION},
    signals::SignalExtractor,
};

/// Rule weights. Kept next to the lexicon version they were tuned against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub version: &'static str,
    pub threshold: f64,
    pub reply_threshold: f64,
    pub recruiting: f64,
    pub generic_opener: f64,
    pub high_tone_cutoff: f64,
    pub high_tone_factor: f64,
    pub commercial_single: f64,
    pub commercial_multiple: f64,
    pub cold_outreach_multiple: f64,
    pub density_cutoff: f64,
    pub short_message_words: usize,
    pub technical_burst: usize,
    pub density_bump: f64,
    pub authentic_tone_cutoff: f64,
    pub authentic_discount: f64,
    pub technical_chatter_max: usize,
    pub technical_chatter_tone: f64,
    pub technical_discount: f64,
}

impl ScoringWeights {
    pub const CANONICAL: ScoringWeights = ScoringWeights {
        version: LEXICON_VERSION,
        threshold: 0.5,
        reply_threshold: 0.8,
        recruiting: 0.6,
        generic_opener: 0.4,
        high_tone_cutoff: 0.7,
        high_tone_factor: 0.3,
        commercial_single: 0.2,
        commercial_multiple: 0.4,
        cold_outreach_multiple: 0.3,
        density_cutoff: 10.0,
        short_message_words: 50,
        technical_burst: 3,
        density_bump: 0.3,
        authentic_tone_cutoff: 0.3,
        authentic_discount: 0.2,
        technical_chatter_max: 2,
        technical_chatter_tone: 0.5,
        technical_discount: 0.1,
    };
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self::CANONICAL
    }
}

pub struct Classifier<'a> {
    extractor: SignalExtractor<'a>,
    weights: ScoringWeights,
}

impl<'a> Classifier<'a> {
    pub fn new(lexicon: &'a Lexicon, weights: ScoringWeights) -> Self {
        Self {
            extractor: SignalExtractor::new(lexicon),
            weights,
        }
    }

    pub fn classify(&self, text: &str, in_thread: bool) -> Verdict {
        if text.trim().is_empty() {
            return Verdict {
                threshold: self.threshold(in_thread),
                ..Verdict::default()
            };
        }
        let signals = self.extractor.extract(text);
        self.judge(signals, in_thread)
    }

    /// Scores an already extracted bundle. The thread flag and the detected
    /// reply idioms both raise the threshold.
    pub fn judge(&self, signals: SignalBundle, in_thread: bool) -> Verdict {
        let reply = in_thread || signals.reply_context;
        let threshold = self.threshold(reply);
        let (score, mut reasons) = self.score(&signals);
        if reply {
            reasons.push(format!("reply context (threshold {threshold:.1})"));
        }
        Verdict {
            is_spam: score >= threshold,
            score,
            threshold,
            reasons,
            signals,
        }
    }

    pub fn threshold(&self, reply: bool) -> f64 {
        if reply {
            self.weights.reply_threshold
        } else {
            self.weights.threshold
        }
    }

    fn score(&self, s: &SignalBundle) -> (f64, Vec<String>) {
        let w = &self.weights;
        let mut score = 0.0;
        let mut reasons = Vec::new();

        if s.recruiting.any() {
            score += w.recruiting;
            reasons.push(format!("recruiting: {}", s.recruiting.preview.join(", ")));
        }
        if s.generic_opener.any() {
            score += w.generic_opener;
            reasons.push(format!("generic opener: {}", s.generic_opener.preview.join(", ")));
        }
        if s.tone_score > w.high_tone_cutoff {
            score += s.tone_score * w.high_tone_factor;
            reasons.push(format!("commercial tone {:.2}", s.tone_score));
        }
        match s.commercial_tone.count {
            0 => {}
            1 => {
                score += w.commercial_single;
                reasons.push(format!("commercial phrase: {}", s.commercial_tone.preview.join(", ")));
            }
            n => {
                score += w.commercial_multiple;
                reasons.push(format!(
                    "commercial phrases ({n}): {}",
                    s.commercial_tone.preview.join(", ")
                ));
            }
        }
        if s.cold_outreach.count >= 2 {
            score += w.cold_outreach_multiple;
            reasons.push(format!(
                "buzzwords ({}): {}",
                s.cold_outreach.count,
                s.cold_outreach.preview.join(", ")
            ));
        }
        let technical_burst =
            s.word_count < w.short_message_words && s.technical.count >= w.technical_burst;
        if s.buzzword_density > w.density_cutoff || technical_burst {
            score += w.density_bump;
            if technical_burst {
                reasons.push(format!(
                    "technical burst ({} terms in {} words)",
                    s.technical.count, s.word_count
                ));
            } else {
                reasons.push(format!("buzzword density {:.1}%", s.buzzword_density));
            }
        }
        if s.tone_score < w.authentic_tone_cutoff {
            score -= w.authentic_discount;
            reasons.push(format!("authentic tone {:.2}", s.tone_score));
        }
        if s.technical.any()
            && s.technical.count <= w.technical_chatter_max
            && s.tone_score < w.technical_chatter_tone
        {
            score -= w.technical_discount;
            reasons.push(format!("technical discussion: {}", s.technical.preview.join(", ")));
        }

        (score, reasons)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str, in_thread: bool) -> Verdict {
        let lexicon = Lexicon::default();
        Classifier::new(&lexicon, ScoringWeights::CANONICAL).classify(text, in_thread)
    }

    #[test]
    fn cold_pitch_is_flagged() {
        let verdict = classify(
            "Hi, I noticed your profile, we help teams scale revenue, would you be open to a quick call?",
            false,
        );
        assert!(verdict.is_spam, "{verdict:?}");
        assert_eq!(verdict.threshold, 0.5);
        assert!(verdict.score >= 0.5);
        assert!(verdict.signals.generic_opener.any());
        assert!(verdict.signals.commercial_tone.count >= 2);
    }

    #[test]
    fn french_reply_is_not_flagged() {
        let verdict = classify(
            "Bonjour, merci pour votre message, comme vous l'avez mentionné je reviens vers vous",
            false,
        );
        assert!(verdict.signals.reply_context);
        assert_eq!(verdict.threshold, 0.8);
        assert!(!verdict.is_spam, "{verdict:?}");
    }

    #[test]
    fn empty_text_short_circuits() {
        let verdict = classify("", false);
        assert!(!verdict.is_spam);
        assert_eq!(verdict.score, 0.0);
        assert!(verdict.reasons.is_empty());
        assert_eq!(verdict.signals, SignalBundle::default());

        assert!(!classify("   \n\t", true).is_spam);
    }

    #[test]
    fn thread_flag_raises_threshold() {
        let text = "We help SaaS teams boost growth, open to a demo?";
        let cold = classify(text, false);
        let warm = classify(text, true);
        assert_eq!(cold.score, warm.score);
        assert_eq!(warm.threshold, 0.8);
        assert!(cold.is_spam);
    }

    #[test]
    fn reply_context_never_makes_a_verdict_more_positive() {
        let lexicon = Lexicon::default();
        let classifier = Classifier::new(&lexicon, ScoringWeights::CANONICAL);
        let extractor = SignalExtractor::new(&lexicon);
        let samples = [
            "Hi, I noticed your profile, we help teams scale revenue",
            "Je me permets de vous contacter pour un poste en CDI",
            "Leverage our innovative AI platform to unlock synergy and transform growth",
            "haha thanks, see you at the meetup",
            "Quick question about the API contract you mentioned",
            "We are hiring",
        ];
        for text in samples {
            let mut bundle = extractor.extract(text);
            bundle.reply_context = false;
            let open = classifier.judge(bundle.clone(), false);
            let mut threaded = bundle.clone();
            threaded.reply_context = true;
            let in_reply = classifier.judge(threaded, false);
            let flagged = classifier.judge(bundle, true);
            assert_eq!(open.score, in_reply.score);
            assert!(!in_reply.is_spam || open.is_spam, "{text}");
            assert!(!flagged.is_spam || open.is_spam, "{text}");
        }
    }

    #[test]
    fn personal_technical_chat_gets_discounts() {
        let verdict = classify("Thanks! Sorry, the api was down, cheers", false);
        assert!(!verdict.is_spam);
        assert!(verdict.score < 0.0);
        assert!(verdict.reasons.iter().any(|r| r.starts_with("authentic tone")));
        assert!(verdict.reasons.iter().any(|r| r.starts_with("technical discussion")));
    }

    #[test]
    fn technical_burst_in_short_message() {
        let verdict = classify("Our AI SaaS CRM with API and cloud", false);
        assert!(verdict.signals.technical.count >= 3);
        assert!(verdict.reasons.iter().any(|r| r.starts_with("technical burst")));
    }

    #[test]
    fn density_bump_uses_substring_hits() {
        let verdict = classify(
            "I emailed the team about their maintenance schedule and the rain forecast today",
            false,
        );
        assert!(verdict.signals.buzzword_density > 10.0);
        assert!(verdict
            .reasons
            .iter()
            .any(|r| r.starts_with("buzzword density")));
        assert!((verdict.score - 0.3).abs() < 1e-9);
        assert!(!verdict.is_spam);
    }

    #[test]
    fn weights_follow_lexicon_version() {
        assert_eq!(ScoringWeights::default().version, LEXICON_VERSION);
    }
}
