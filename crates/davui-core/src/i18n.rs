//! Localization lookup.
//!
//! Text is keyed by its English form; a language without a table, or a key
//! missing from the table, falls back to the key itself.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Deserialize;

use crate::config::LOCALES_JSON;

/// English keys of every translatable message shown by the core.
pub mod keys {
    pub const UPLOADING: &str = "Uploading";
    pub const CREATING: &str = "Creating";
    pub const ERRORS_OCCURRED: &str = "Error(s) occurred";
    pub const MORE_THAN_ONE_DAY: &str = "More than 1 day";
    pub const NEW_FOLDER_PROMPT: &str = "New folder name:";
    pub const CLOSE: &str = "Close";
}

type Table = HashMap<String, String>;

/// One bundled translation table. Tables are tried in file order.
#[derive(Debug, Deserialize)]
struct Locale {
    /// Lowercase tag matched against the browser language.
    tag: String,
    messages: Table,
}

static LOCALES: LazyLock<Vec<Locale>> = LazyLock::new(|| {
    match serde_json::from_str(LOCALES_JSON) {
        Ok(locales) => locales,
        Err(err) => {
            tracing::error!(%err, "bundled locale tables are malformed");
            Vec::new()
        }
    }
});

/// Translation table chosen for the browser language.
#[derive(Clone, Copy, Debug, Default)]
pub struct I18n {
    table: Option<&'static Table>,
}

impl I18n {
    /// English (identity) lookup.
    pub fn english() -> Self {
        Self::default()
    }

    /// Pick the first table whose tag occurs in `language` (e.g. `zh` in `zh-CN`).
    pub fn for_language(language: &str) -> Self {
        let language = language.to_lowercase();
        let table = LOCALES
            .iter()
            .find(|locale| language.contains(locale.tag.as_str()))
            .map(|locale| &locale.messages);
        Self { table }
    }

    /// Translate `key`, falling back to the key itself.
    pub fn text<'a>(&self, key: &'a str) -> &'a str {
        self.translate(key).unwrap_or(key)
    }

    /// Like [`I18n::text`], but `None` when no translation exists.
    pub fn translate(&self, key: &str) -> Option<&'static str> {
        self.table
            .and_then(|table| table.get(key))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_is_identity() {
        let i18n = I18n::english();
        assert_eq!(i18n.text(keys::UPLOADING), "Uploading");
        assert_eq!(i18n.translate(keys::UPLOADING), None);
    }

    #[test]
    fn test_chinese_table() {
        let i18n = I18n::for_language("zh-CN");
        assert_eq!(i18n.text(keys::UPLOADING), "上传中");
        assert_eq!(i18n.text(keys::MORE_THAN_ONE_DAY), "超过 1 天");
        assert_eq!(i18n.text("Not a key"), "Not a key");
    }

    #[test]
    fn test_bundled_tables_parse() {
        assert!(!LOCALES.is_empty());
        assert!(LOCALES.iter().all(|l| l.tag == l.tag.to_lowercase()));
    }

    #[test]
    fn test_language_match_is_case_insensitive() {
        assert_eq!(I18n::for_language("ZH-tw").text(keys::CREATING), "创建中");
        assert_eq!(I18n::for_language("en-US").text(keys::CREATING), "Creating");
    }
}
