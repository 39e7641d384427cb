use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-user display preferences, stored next to the user's entries.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct UserSettings {
    pub language: String,
    pub preferences: BTreeMap<String, serde_json::Value>,
}

impl UserSettings {
    pub fn with_language(language: &str) -> Self {
        Self {
            language: language.to_string(),
            preferences: BTreeMap::new(),
        }
    }
}
