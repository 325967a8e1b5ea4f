use crate::domain::{Category, SignalBundle};

use super::{
    lexicon::{Lexicon, SignalClass},
    signals::normalize_quotes,
};

pub struct Categorizer<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> Categorizer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// First matching rule wins; falls through to [`Category::Spam`].
    pub fn categorize(&self, text: &str, signals: &SignalBundle) -> Category {
        let text = normalize_quotes(text);
        let hit = |class| self.lexicon.has_match(class, &text);

        if hit(SignalClass::Outsourcing) {
            Category::Outsourcing
        } else if hit(SignalClass::Crypto) {
            Category::Crypto
        } else if hit(SignalClass::Networking) {
            Category::Networking
        } else if signals.recruiting.any() || hit(SignalClass::JobPosting) {
            Category::Recruiting
        } else if signals.commercial_tone.any() {
            Category::Service
        } else {
            Category::Spam
        }
    }
}
