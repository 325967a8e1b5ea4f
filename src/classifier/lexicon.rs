//! Marker phrases per signal class and their compiled patterns.
//!
//! A term matches as a whole word or phrase, case-insensitively. A trailing
//! `*` turns the term into a stem (`recruit*` matches "recruiter").
//! Reply markers are full regular expressions. Buzzword density ignores word
//! boundaries and counts raw substrings of each term instead.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Bumped whenever default terms or scoring weights change.
pub const LEXICON_VERSION: &str = "3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalClass {
    Recruiting,
    GenericOpener,
    CommercialTone,
    ColdOutreach,
    Technical,
    Authentic,
    Outsourcing,
    Crypto,
    Networking,
    JobPosting,
}

impl SignalClass {
    pub const ALL: [SignalClass; 10] = [
        SignalClass::Recruiting,
        SignalClass::GenericOpener,
        SignalClass::CommercialTone,
        SignalClass::ColdOutreach,
        SignalClass::Technical,
        SignalClass::Authentic,
        SignalClass::Outsourcing,
        SignalClass::Crypto,
        SignalClass::Networking,
        SignalClass::JobPosting,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LexiconTable {
    pub recruiting: Vec<String>,
    pub generic_opener: Vec<String>,
    pub commercial_tone: Vec<String>,
    pub cold_outreach: Vec<String>,
    pub technical: Vec<String>,
    pub authentic: Vec<String>,
    pub reply_markers: Vec<String>,
    pub outsourcing: Vec<String>,
    pub crypto: Vec<String>,
    pub networking: Vec<String>,
    pub job_posting: Vec<String>,
    pub french_markers: Vec<String>,
    pub english_markers: Vec<String>,
}

impl LexiconTable {
    pub fn terms(&self, class: SignalClass) -> &[String] {
        match class {
            SignalClass::Recruiting => &self.recruiting,
            SignalClass::GenericOpener => &self.generic_opener,
            SignalClass::CommercialTone => &self.commercial_tone,
            SignalClass::ColdOutreach => &self.cold_outreach,
            SignalClass::Technical => &self.technical,
            SignalClass::Authentic => &self.authentic,
            SignalClass::Outsourcing => &self.outsourcing,
            SignalClass::Crypto => &self.crypto,
            SignalClass::Networking => &self.networking,
            SignalClass::JobPosting => &self.job_posting,
        }
    }
}

fn owned(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|term| term.to_string()).collect()
}

impl Default for LexiconTable {
    fn default() -> Self {
        Self {
            recruiting: owned(&[
                "opportunit*", "opportunité*", "hiring", "recruit*", "recrut*", "talent*",
                "headhunt*", "position", "role", "job offer", "offre d'emploi", "salary",
                "salaire", "rémunération", "cdi", "poste", "candidat*", "candidate*",
                "your profile", "votre profil", "votre parcours", "your background",
                "your experience", "votre expérience",
            ]),
            generic_opener: owned(&[
                "i came across your profile", "i noticed your", "i hope this message finds you well",
                "hope you're doing well", "i hope you are doing well", "i wanted to reach out",
                "i'd love to connect", "quick question", "je me permets", "j'ai vu votre profil",
                "j'ai découvert votre profil", "en parcourant votre profil",
                "j'espère que vous allez bien",
            ]),
            commercial_tone: owned(&[
                "we help", "nous aidons", "scale", "revenue", "chiffre d'affaires", "growth",
                "croissance", "roi", "leads", "quick call", "15 minutes", "15 min", "open to",
                "book a", "demo", "démo", "free trial", "essai gratuit", "partnership",
                "partenariat", "collaboration", "our solution", "notre solution", "our services",
                "nos services", "offer", "offre", "discount", "boost", "increase your",
                "augmenter votre",
            ]),
            cold_outreach: owned(&[
                "synergy", "synergie*", "leverage", "game-changer", "game changer", "disrupt*",
                "cutting-edge", "innovative", "innovant*", "best-in-class", "world-class",
                "seamless*", "streamline", "unlock", "empower*", "solution*", "value proposition",
                "pain point*", "win-win", "gagnant-gagnant", "next level", "transform*",
                "accelerate", "accélérer", "optimize", "optimiser", "tailored", "sur mesure",
            ]),
            technical: owned(&[
                "ai", "ia", "saas", "api", "cloud", "devops", "machine learning", "llm",
                "automation", "automatisation", "kubernetes", "data", "analytics", "crm",
                "platform", "plateforme", "no-code", "low-code", "microservices", "python",
                "rust", "javascript", "react",
            ]),
            authentic: owned(&[
                "merci", "thanks", "thank you", "haha", "lol", "cheers", "désolé", "sorry",
                "remember", "last time", "la dernière fois", "comme promis", "as promised",
                "congrats", "félicitations", "bravo", "à bientôt", "see you",
            ]),
            reply_markers: owned(&[
                r"\bthanks? (you )?for (your|the) (message|reply|response|answer|note)",
                r"\bfollowing up on\b",
                r"\bas (you|we) (mentioned|discussed)\b",
                r"\bper our (conversation|call|discussion)\b",
                r"\bgetting back to you\b",
                r"\bin reply to\b",
                r"\bmerci pour (votre|ton|le|la) (message|retour|réponse)",
                r"\bsuite à (notre|votre|ton|ta) ",
                r"\bcomme (vous l'avez|tu l'as|convenu|évoqué|discuté)",
                r"\bje reviens vers (vous|toi)\b",
                r"\ben réponse à\b",
            ]),
            outsourcing: owned(&[
                "outsourc*", "offshore", "nearshore", "sous-traitance", "sous-traiter",
                "externalis*", "staff augmentation", "dedicated team", "équipe dédiée",
                "white label", "marque blanche", "development team", "équipe de développeurs",
                "freelance developers",
            ]),
            crypto: owned(&[
                "crypto*", "bitcoin", "btc", "ethereum", "eth", "blockchain", "web3", "nft*",
                "token*", "defi", "trading", "forex", "airdrop",
            ]),
            networking: owned(&[
                "connect", "connecting", "let's connect", "expand my network", "your network",
                "mon réseau", "votre réseau", "networking", "se connecter",
                "ajouter à votre réseau", "stay in touch", "rester en contact",
                "same industry", "même secteur",
            ]),
            job_posting: owned(&[
                "job*", "we are looking for", "nous recherchons", "apply", "postuler",
                "freelance", "mission", "contract", "cdd", "full-time", "temps plein", "remote",
                "télétravail", "vacancy", "vacancies",
            ]),
            french_markers: owned(&[
                "bonjour", "merci", "vous", "votre", "vos", "nous", "je", "suis", "avec", "pour",
                "est", "les", "des", "une", "dans", "sur", "cordialement", "salut", "bonne",
            ]),
            english_markers: owned(&[
                "hi", "hello", "the", "you", "your", "and", "thanks", "would", "with", "for",
                "we", "are", "is", "best", "regards",
            ]),
        }
    }
}

#[derive(Debug, Clone)]
struct Term {
    phrase: String,
    needle: String,
    pattern: Regex,
}

/// Precompiled form of a [`LexiconTable`], built once per run.
#[derive(Debug, Clone)]
pub struct Lexicon {
    classes: HashMap<SignalClass, Vec<Term>>,
    reply_markers: Vec<Regex>,
    french_markers: HashSet<String>,
    english_markers: HashSet<String>,
}

impl Lexicon {
    pub fn compile(table: &LexiconTable) -> Result<Self, ConfigError> {
        let mut classes = HashMap::new();
        for class in SignalClass::ALL {
            let terms = table
                .terms(class)
                .iter()
                .map(|phrase| phrase.trim())
                .filter(|phrase| !phrase.is_empty() && *phrase != "*")
                .map(compile_term)
                .collect::<Result<Vec<_>, _>>()?;
            classes.insert(class, terms);
        }

        let reply_markers = table
            .reply_markers
            .iter()
            .map(|pattern| {
                Regex::new(&format!("(?i){pattern}")).map_err(|source| {
                    ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            classes,
            reply_markers,
            french_markers: lowercase_set(&table.french_markers),
            english_markers: lowercase_set(&table.english_markers),
        })
    }

    /// Distinct terms of `class` present in `text`, in lexicon order.
    pub fn matches(&self, class: SignalClass, text: &str) -> Vec<String> {
        self.terms(class)
            .filter(|term| term.pattern.is_match(text))
            .map(|term| term.phrase.clone())
            .collect()
    }

    pub fn has_match(&self, class: SignalClass, text: &str) -> bool {
        self.terms(class).any(|term| term.pattern.is_match(text))
    }

    /// Case-insensitive substring hits of every term of `class`, counting
    /// repeats. "ai" counts inside "emailed".
    pub fn substring_occurrences(&self, class: SignalClass, text: &str) -> usize {
        let lowered = text.to_lowercase();
        self.terms(class)
            .map(|term| lowered.matches(term.needle.as_str()).count())
            .sum()
    }

    pub fn has_reply_marker(&self, text: &str) -> bool {
        self.reply_markers.iter().any(|pattern| pattern.is_match(text))
    }

    pub fn is_french_marker(&self, word: &str) -> bool {
        self.french_markers.contains(word)
    }

    pub fn is_english_marker(&self, word: &str) -> bool {
        self.english_markers.contains(word)
    }

    fn terms(&self, class: SignalClass) -> impl Iterator<Item = &Term> {
        self.classes.get(&class).into_iter().flatten()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        // The built-in table only holds escaped literals and known-good reply patterns.
        Self::compile(&LexiconTable::default()).expect("built-in lexicon compiles")
    }
}

fn compile_term(phrase: &str) -> Result<Term, ConfigError> {
    let (body, is_stem) = match phrase.strip_suffix('*') {
        Some(stem) => (stem, true),
        None => (phrase, false),
    };
    let lead = if body.chars().next().is_some_and(char::is_alphanumeric) {
        r"\b"
    } else {
        ""
    };
    let trail = if !is_stem && body.chars().last().is_some_and(char::is_alphanumeric) {
        r"\b"
    } else {
        ""
    };
    let source = format!("(?i){lead}{}{trail}", regex::escape(body));
    let pattern = Regex::new(&source).map_err(|source| ConfigError::InvalidPattern {
        pattern: phrase.to_string(),
        source,
    })?;
    Ok(Term {
        phrase: body.to_string(),
        needle: body.to_lowercase(),
        pattern,
    })
}

fn lowercase_set(words: &[String]) -> HashSet<String> {
    words.iter().map(|word| word.trim().to_lowercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stems_match_longer_words_but_plain_terms_need_whole_words() {
        let lexicon = Lexicon::default();
        assert!(lexicon.has_match(SignalClass::Recruiting, "Our recruiter will call"));
        assert!(!lexicon.has_match(SignalClass::Recruiting, "total control of the stack"));
        assert!(lexicon.has_match(SignalClass::Recruiting, "A new ROLE opened"));
        assert!(!lexicon.has_match(SignalClass::Technical, "I aim to fix the air con"));
    }

    #[test]
    fn substring_occurrences_count_repeats() {
        let lexicon = Lexicon::default();
        let text = "synergy, more Synergy and even more SYNERGY";
        assert_eq!(lexicon.substring_occurrences(SignalClass::ColdOutreach, text), 3);
        assert_eq!(lexicon.matches(SignalClass::ColdOutreach, text), vec!["synergy"]);
    }

    #[test]
    fn substring_occurrences_ignore_word_boundaries() {
        let lexicon = Lexicon::default();
        let text = "I emailed them about the rain";
        assert!(!lexicon.has_match(SignalClass::Technical, text));
        assert_eq!(lexicon.substring_occurrences(SignalClass::Technical, text), 2);
    }

    #[test]
    fn accented_terms_match_case_insensitively() {
        let lexicon = Lexicon::default();
        assert!(lexicon.has_match(SignalClass::Outsourcing, "Notre ÉQUIPE DÉDIÉE est prête"));
    }

    #[test]
    fn invalid_reply_pattern_is_rejected() {
        let table = LexiconTable {
            reply_markers: vec!["(unclosed".to_string()],
            ..LexiconTable::default()
        };
        let err = Lexicon::compile(&table).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn blank_terms_are_ignored() {
        let table = LexiconTable {
            crypto: vec!["".to_string(), "  ".to_string(), "*".to_string()],
            ..LexiconTable::default()
        };
        let lexicon = Lexicon::compile(&table).unwrap();
        assert!(!lexicon.has_match(SignalClass::Crypto, "anything at all"));
    }
}
