use once_cell::sync::Lazy;
use regex::Regex;

use super::lexicon::Lexicon;
use crate::domain::Locale;

static FRENCH_ACCENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[éèêëàâùûüôîïçœÉÈÊËÀÂÙÛÜÔÎÏÇŒ]").expect("valid accent regex"));
static WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("valid word regex"));

const MARKER_THRESHOLD: usize = 2;

pub struct LanguageDetector<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> LanguageDetector<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn detect(&self, text: &str) -> Locale {
        if FRENCH_ACCENTS.is_match(text) {
            return Locale::Fr;
        }

        let mut french = 0;
        let mut english = 0;
        for word in WORD.find_iter(text) {
            let word = word.as_str().to_lowercase();
            if self.lexicon.is_french_marker(&word) {
                french += 1;
            }
            if self.lexicon.is_english_marker(&word) {
                english += 1;
            }
        }

        if french >= MARKER_THRESHOLD {
            return Locale::Fr;
        }
        if english < MARKER_THRESHOLD {
            tracing::trace!(target: "classifier", french, english, "ambiguous locale, using default");
        }
        Locale::En
    }
}
