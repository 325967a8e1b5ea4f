use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, Locale};

const NAME_PLACEHOLDER: &str = "{name}";
const FALLBACK_CATEGORY: &str = "spam";

/// Reply templates keyed by `<category>_<locale>`, e.g. `crypto_fr`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateSet(HashMap<String, String>);

impl TemplateSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

impl Default for TemplateSet {
    fn default() -> Self {
        let entries = [
            ("recruiting_en", "Hi {name}, thanks for reaching out! I'm not actively looking for new opportunities at the moment, but feel free to stay in touch."),
            ("recruiting_fr", "Bonjour {name}, merci pour votre message ! Je ne suis pas en recherche active actuellement, mais n'hésitez pas à rester en contact."),
            ("outsourcing_en", "Hi {name}, thanks for the offer, but we don't outsource this kind of work. Best of luck!"),
            ("outsourcing_fr", "Bonjour {name}, merci pour la proposition, mais nous n'externalisons pas ce type de travail. Bonne continuation !"),
            ("crypto_en", "Hi {name}, thanks, but I'm not interested in crypto or trading offers."),
            ("crypto_fr", "Bonjour {name}, merci, mais les offres crypto ou trading ne m'intéressent pas."),
            ("networking_en", "Hi {name}, thanks for connecting! Happy to keep in touch here."),
            ("networking_fr", "Bonjour {name}, merci pour la mise en relation ! Au plaisir d'échanger ici."),
            ("service_en", "Hi {name}, thanks for the message, but we're not looking for this kind of service right now."),
            ("service_fr", "Bonjour {name}, merci pour votre message, mais nous n'avons pas besoin de ce type de service pour le moment."),
            ("spam_en", "Thanks for the message, but I'm not interested. Best of luck!"),
            ("spam_fr", "Merci pour le message, mais ce n'est pas pour moi. Bonne continuation !"),
        ];
        Self(
            entries
                .into_iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
        )
    }
}

pub struct ResponseComposer<'a> {
    templates: &'a TemplateSet,
}

impl<'a> ResponseComposer<'a> {
    pub fn new(templates: &'a TemplateSet) -> Self {
        Self { templates }
    }

    /// Picks `<category>_<locale>`, then `spam_<locale>`, then nothing.
    pub fn compose(&self, locale: Locale, sender_name: &str, category: Category) -> String {
        let specific = format!("{}_{}", category.as_str(), locale.suffix());
        let fallback = format!("{FALLBACK_CATEGORY}_{}", locale.suffix());
        let template = self
            .templates
            .get(&specific)
            .or_else(|| self.templates.get(&fallback))
            .unwrap_or_default();
        template.replace(NAME_PLACEHOLDER, first_name(sender_name))
    }
}

fn first_name(display_name: &str) -> &str {
    display_name.split_whitespace().next().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates(entries: &[(&str, &str)]) -> TemplateSet {
        TemplateSet(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn uses_first_name_only() {
        let set = TemplateSet::default();
        let reply = ResponseComposer::new(&set).compose(Locale::En, "Jane  van Doe", Category::Recruiting);
        assert!(reply.starts_with("Hi Jane, thanks"));
    }

    #[test]
    fn missing_name_substitutes_nothing() {
        let set = templates(&[("crypto_fr", "Bonjour {name}, non merci")]);
        let reply = ResponseComposer::new(&set).compose(Locale::Fr, "", Category::Crypto);
        assert_eq!(reply, "Bonjour , non merci");
    }

    #[test]
    fn falls_back_to_generic_template_of_same_locale() {
        let set = templates(&[("spam_fr", "Non merci {name}"), ("spam_en", "No thanks")]);
        let reply = ResponseComposer::new(&set).compose(Locale::Fr, "Luc Martin", Category::Networking);
        assert_eq!(reply, "Non merci Luc");
    }

    #[test]
    fn degrades_to_empty_string() {
        let set = templates(&[("spam_en", "No thanks")]);
        let reply = ResponseComposer::new(&set).compose(Locale::Fr, "Luc", Category::Service);
        assert_eq!(reply, "");
    }

    #[test]
    fn default_set_covers_every_category_and_locale() {
        let set = TemplateSet::default();
        for category in Category::ALL {
            for locale in [Locale::En, Locale::Fr] {
                let key = format!("{}_{}", category.as_str(), locale.suffix());
                assert!(set.get(&key).is_some(), "missing {key}");
            }
        }
    }
}
