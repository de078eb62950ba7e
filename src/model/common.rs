use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Localized display copy attached to catalog records (products, assortments,
/// variations, options). Breadcrumb resolution denormalizes these into path
/// links so the admin UI can render without a second fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub locale: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

impl LocalizedText {
    pub fn new(locale: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            title: title.into(),
            subtitle: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }
}

/// Pick the best text for a locale: exact match first, then base-language
/// match ("de" for "de-CH"), then nothing.
pub fn pick_text<'a>(texts: &'a [LocalizedText], locale: &str) -> Option<&'a LocalizedText> {
    if let Some(exact) = texts.iter().find(|t| t.locale == locale) {
        return Some(exact);
    }
    let base = locale.split('-').next().unwrap_or(locale);
    texts
        .iter()
        .find(|t| t.locale == base || t.locale.split('-').next() == Some(base))
}
