use crate::model::{Category, Entry, EntryCollection, ProductionRecord, UserSettings};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("State file io error {0}")]
    Io(#[from] std::io::Error),
    #[error("State file yaml error {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Export json error {0}")]
    Json(#[from] serde_json::Error),
    #[error("State file task failed {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Entry {entry_id} not found or access denied")]
    EntryNotFound { entry_id: i64 },
}

/// Per-user persistence of emission entries.
#[async_trait]
pub trait EntryStoreClient: Send + Sync {
    /// All eight categories are present in the returned collection, possibly empty.
    async fn get_entries(&self, user_id: &str) -> Result<EntryCollection, StoreError>;

    async fn save_entry(
        &self,
        user_id: &str,
        category: Category,
        entry: &Entry,
    ) -> Result<(), StoreError>;

    async fn update_entry(&self, user_id: &str, entry: &Entry) -> Result<(), StoreError>;

    async fn delete_entry(&self, user_id: &str, entry_id: i64) -> Result<(), StoreError>;
}

/// Per-user, per-year persistence of production volumes.
#[async_trait]
pub trait ProductionStoreClient: Send + Sync {
    async fn get_production_data(
        &self,
        user_id: &str,
        year: i32,
    ) -> Result<Option<ProductionRecord>, StoreError>;

    /// Replaces whatever was stored for the record's year.
    async fn save_production_data(
        &self,
        user_id: &str,
        record: &ProductionRecord,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait SettingsStoreClient: Send + Sync {
    /// `None` when the user never saved settings.
    async fn get_user_settings(&self, user_id: &str) -> Result<Option<UserSettings>, StoreError>;

    async fn save_user_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), StoreError>;
}
