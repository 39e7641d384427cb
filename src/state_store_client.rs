use crate::model::*;
use crate::store_client::{
    EntryStoreClient, ProductionStoreClient, SettingsStoreClient, StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::error::Error;
use std::fs;
use std::io::ErrorKind;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, info};

#[derive(Clone, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StoredEntry {
    pub category: String,
    pub entry: Entry,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Default, Serialize, Deserialize, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct UserState {
    pub entries: Vec<StoredEntry>,
    pub production: Vec<ProductionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
}

#[derive(Clone, Default, Serialize, Deserialize, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreState {
    pub users: BTreeMap<String, UserState>,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub entries: BTreeMap<String, usize>,
    pub total_production: f64,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StateExport {
    pub state: StoreState,
    pub export_date: DateTime<Utc>,
}

pub struct StateStoreClientConfig {
    state_file_path: String,
}

impl StateStoreClientConfig {
    pub fn new(state_file_path: &str) -> Result<Self, Box<dyn Error>> {
        debug!("StateStoreClientConfig::new(state_file_path: {})", state_file_path);
        Ok(Self {
            state_file_path: state_file_path.into(),
        })
    }

    pub async fn from_env() -> Result<Self, Box<dyn Error>> {
        let state_file_path =
            env::var("STATE_FILE_PATH").unwrap_or_else(|_| "/state/state.yaml".to_string());

        Self::new(&state_file_path)
    }
}

/// Keeps every user's entries and production records in one YAML state file.
pub struct StateStoreClient {
    config: StateStoreClientConfig,
    state_lock: Mutex<()>,
}

impl StateStoreClient {
    pub fn new(config: StateStoreClientConfig) -> StateStoreClient {
        StateStoreClient {
            config,
            state_lock: Mutex::new(()),
        }
    }

    pub async fn from_env() -> Result<Self, Box<dyn Error>> {
        Ok(Self::new(StateStoreClientConfig::from_env().await?))
    }

    /// A missing state file reads as an empty state.
    pub async fn read_state(&self) -> Result<StoreState, StoreError> {
        let _guard = self.state_lock.lock().await;
        self.load_state().await
    }

    async fn load_state(&self) -> Result<StoreState, StoreError> {
        let state_file_path = self.config.state_file_path.clone();
        let state = task::spawn_blocking(move || read_state_file(&state_file_path)).await??;

        debug!("Read state file at {}", &self.config.state_file_path);

        Ok(state)
    }

    async fn write_state(&self, state: StoreState) -> Result<(), StoreError> {
        let state_file_path = self.config.state_file_path.clone();
        task::spawn_blocking(move || write_state_file(&state_file_path, &state)).await??;

        info!("Stored state file at {}", &self.config.state_file_path);

        Ok(())
    }

    /// Read-modify-write of the state file, one writer at a time.
    async fn modify<F, R>(&self, change: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut StoreState) -> Result<R, StoreError> + Send,
        R: Send,
    {
        let _guard = self.state_lock.lock().await;
        let mut state = self.load_state().await?;
        let result = change(&mut state)?;
        self.write_state(state).await?;
        Ok(result)
    }

    async fn entries_for(&self, user_id: &str) -> Result<EntryCollection, StoreError> {
        let state = self.read_state().await?;
        let mut collection = EntryCollection::new();

        if let Some(user) = state.users.get(user_id) {
            for stored in &user.entries {
                match stored.category.parse::<Category>() {
                    Ok(category) => collection.push(category, stored.entry.clone()),
                    Err(_) => collection.push_unclassified(&stored.category, stored.entry.clone()),
                }
            }
        }

        Ok(collection)
    }

    pub async fn get_user_stats(&self, user_id: &str) -> Result<UserStats, StoreError> {
        let state = self.read_state().await?;
        let mut entries = BTreeMap::new();
        let mut total_production = 0.0;

        if let Some(user) = state.users.get(user_id) {
            for stored in &user.entries {
                *entries.entry(stored.category.clone()).or_insert(0) += 1;
            }
            if let Some(latest) = user.production.iter().max_by_key(|record| record.updated_at) {
                total_production = latest.annual_total;
            }
        }

        Ok(UserStats {
            entries,
            total_production,
        })
    }

    pub async fn export_data(&self) -> Result<String, StoreError> {
        let export = StateExport {
            state: self.read_state().await?,
            export_date: Utc::now(),
        };

        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Replaces the complete state with a previous export.
    pub async fn import_data(&self, export_json: &str) -> Result<(), StoreError> {
        let export: StateExport = serde_json::from_str(export_json)?;

        self.modify(|state| {
            *state = export.state;
            Ok(())
        })
        .await
    }

    /// Drops every user's entries, production records and settings.
    pub async fn clear_all_data(&self) -> Result<(), StoreError> {
        self.modify(|state| {
            *state = StoreState::default();
            Ok(())
        })
        .await?;

        info!("Cleared all data in {}", &self.config.state_file_path);

        Ok(())
    }
}

#[async_trait]
impl EntryStoreClient for StateStoreClient {
    async fn get_entries(&self, user_id: &str) -> Result<EntryCollection, StoreError> {
        self.entries_for(user_id).await
    }

    async fn save_entry(
        &self,
        user_id: &str,
        category: Category,
        entry: &Entry,
    ) -> Result<(), StoreError> {
        let now = Utc::now();
        self.modify(|state| {
            state
                .users
                .entry(user_id.to_string())
                .or_insert_with(UserState::default)
                .entries
                .push(StoredEntry {
                    category: category.key().to_string(),
                    entry: entry.clone(),
                    created_at: now,
                    updated_at: now,
                });
            Ok(())
        })
        .await
    }

    async fn update_entry(&self, user_id: &str, entry: &Entry) -> Result<(), StoreError> {
        self.modify(|state| {
            let stored = state
                .users
                .get_mut(user_id)
                .and_then(|user| user.entries.iter_mut().find(|s| s.entry.id == entry.id))
                .ok_or(StoreError::EntryNotFound { entry_id: entry.id })?;

            stored.entry = entry.clone();
            stored.updated_at = Utc::now();
            Ok(())
        })
        .await
    }

    async fn delete_entry(&self, user_id: &str, entry_id: i64) -> Result<(), StoreError> {
        self.modify(|state| {
            let user = state
                .users
                .get_mut(user_id)
                .ok_or(StoreError::EntryNotFound { entry_id })?;
            let position = user
                .entries
                .iter()
                .position(|s| s.entry.id == entry_id)
                .ok_or(StoreError::EntryNotFound { entry_id })?;

            user.entries.remove(position);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl ProductionStoreClient for StateStoreClient {
    async fn get_production_data(
        &self,
        user_id: &str,
        year: i32,
    ) -> Result<Option<ProductionRecord>, StoreError> {
        let state = self.read_state().await?;

        Ok(state
            .users
            .get(user_id)
            .and_then(|user| user.production.iter().find(|record| record.year == year))
            .cloned())
    }

    async fn save_production_data(
        &self,
        user_id: &str,
        record: &ProductionRecord,
    ) -> Result<(), StoreError> {
        let mut replacement = ProductionRecord::new(record.year, record.monthly_production.clone());
        replacement.updated_at = Some(Utc::now());

        self.modify(|state| {
            let user = state
                .users
                .entry(user_id.to_string())
                .or_insert_with(UserState::default);

            user.production.retain(|existing| existing.year != replacement.year);
            user.production.push(replacement);
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SettingsStoreClient for StateStoreClient {
    async fn get_user_settings(&self, user_id: &str) -> Result<Option<UserSettings>, StoreError> {
        let state = self.read_state().await?;

        Ok(state.users.get(user_id).and_then(|user| user.settings.clone()))
    }

    async fn save_user_settings(
        &self,
        user_id: &str,
        settings: &UserSettings,
    ) -> Result<(), StoreError> {
        self.modify(|state| {
            state
                .users
                .entry(user_id.to_string())
                .or_insert_with(UserState::default)
                .settings = Some(settings.clone());
            Ok(())
        })
        .await
    }
}

fn read_state_file(state_file_path: &str) -> Result<StoreState, StoreError> {
    let state_file_contents = match fs::read_to_string(state_file_path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreState::default()),
        Err(e) => return Err(e.into()),
    };

    Ok(serde_yaml::from_str(&state_file_contents)?)
}

fn write_state_file(state_file_path: &str, state: &StoreState) -> Result<(), StoreError> {
    let yaml = serde_yaml::to_string(state)?;
    fs::write(state_file_path, yaml)?;

    Ok(())
}
