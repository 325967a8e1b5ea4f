use crate::domain::{ClassMatches, SignalBundle};

use super::lexicon::{Lexicon, SignalClass};

/// Number of matched terms kept per class for display.
pub const PREVIEW_LEN: usize = 5;

const MIN_WORDS_FOR_DENSITY: usize = 10;
const AUTHENTIC_HIT_CAP: usize = 3;
const TONE_BASELINE: f64 = 0.5;
const AUTHENTIC_STEP: f64 = 0.3;
const COMMERCIAL_STEP: f64 = 0.2;
const GENERIC_OPENER_BUMP: f64 = 0.4;

pub struct SignalExtractor<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> SignalExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Scans `text` against every scoring class. `reply_context` reflects only
    /// the reply idioms found in the text; callers OR in their own thread flag.
    pub fn extract(&self, text: &str) -> SignalBundle {
        let text = normalize_quotes(text);
        let text = text.as_str();

        let class = |class: SignalClass| {
            ClassMatches::from_terms(self.lexicon.matches(class, text), PREVIEW_LEN)
        };
        let recruiting = class(SignalClass::Recruiting);
        let generic_opener = class(SignalClass::GenericOpener);
        let commercial_tone = class(SignalClass::CommercialTone);
        let cold_outreach = class(SignalClass::ColdOutreach);
        let technical = class(SignalClass::Technical);
        let authentic = class(SignalClass::Authentic);

        let tone_score = tone_score(
            authentic.count,
            commercial_tone.count,
            generic_opener.any(),
        );

        let word_count = text.split_whitespace().count();
        let buzzword_density = if word_count < MIN_WORDS_FOR_DENSITY {
            0.0
        } else {
            let hits = self.lexicon.substring_occurrences(SignalClass::ColdOutreach, text)
                + self.lexicon.substring_occurrences(SignalClass::Technical, text);
            100.0 * hits as f64 / word_count as f64
        };

        SignalBundle {
            recruiting,
            generic_opener,
            commercial_tone,
            cold_outreach,
            technical,
            authentic,
            tone_score,
            buzzword_density,
            word_count,
            reply_context: self.lexicon.has_reply_marker(text),
        }
    }
}

fn tone_score(authentic_hits: usize, commercial_hits: usize, generic_opener: bool) -> f64 {
    let mut score = TONE_BASELINE;
    score -= AUTHENTIC_STEP * authentic_hits.min(AUTHENTIC_HIT_CAP) as f64;
    score += COMMERCIAL_STEP * commercial_hits as f64;
    if generic_opener {
        score += GENERIC_OPENER_BUMP;
    }
    score.clamp(0.0, 1.0)
}

/// Typographic apostrophes are folded so "I’d" matches the "i'd" terms.
pub(crate) fn normalize_quotes(text: &str) -> String {
    text.replace(['\u{2019}', '\u{2018}'], "'")
}
