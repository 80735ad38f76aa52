//! Bilingual text

use krua::language::Language;
use serde::{Deserialize, Serialize};

/// Copy published in both storefront languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub th: String,
}

impl LocalizedText {
    #[must_use]
    pub fn new(en: impl Into<String>, th: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            th: th.into(),
        }
    }

    /// The text in `language`, falling back to English when the Thai copy is blank.
    #[must_use]
    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::Th if !self.th.trim().is_empty() => &self.th,
            Language::En | Language::Th => &self.en,
        }
    }
}
