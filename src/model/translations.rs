use crate::model::Category;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_LANGUAGE: &str = "en";

/// Label tables keyed by language, then by text key.
///
/// Lookups fall back to [`DEFAULT_LANGUAGE`] when the requested language has
/// no text for a key.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize, Debug)]
#[serde(transparent)]
pub struct Translations {
    tables: BTreeMap<String, BTreeMap<String, String>>,
}

impl Translations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: &str, key: &str, text: &str) {
        self.tables
            .entry(language.to_string())
            .or_insert_with(BTreeMap::new)
            .insert(key.to_string(), text.to_string());
    }

    pub fn lookup(&self, language: &str, key: &str) -> Option<&str> {
        self.tables
            .get(language)
            .and_then(|table| table.get(key))
            .or_else(|| {
                self.tables
                    .get(DEFAULT_LANGUAGE)
                    .and_then(|table| table.get(key))
            })
            .map(String::as_str)
    }

    pub fn category_label(&self, language: &str, category: Category) -> String {
        self.lookup(language, category.key())
            .unwrap_or_else(|| category.default_label())
            .to_string()
    }
}
