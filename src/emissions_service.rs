use crate::model::*;
use crate::store_client::{EntryStoreClient, ProductionStoreClient, SettingsStoreClient};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

/// Resolves once the store has processed a queued write, whether it
/// succeeded or not.
pub type PendingWrite = oneshot::Receiver<()>;

pub struct EmissionsServiceConfig {
    reporting_config: ReportingConfig,
    entry_store_client: Arc<dyn EntryStoreClient>,
    production_store_client: Arc<dyn ProductionStoreClient>,
    settings_store_client: Arc<dyn SettingsStoreClient>,
}

impl EmissionsServiceConfig {
    pub fn new(
        reporting_config: ReportingConfig,
        entry_store_client: Arc<dyn EntryStoreClient>,
        production_store_client: Arc<dyn ProductionStoreClient>,
        settings_store_client: Arc<dyn SettingsStoreClient>,
    ) -> Result<Self, Box<dyn Error>> {
        Ok(Self {
            reporting_config,
            entry_store_client,
            production_store_client,
            settings_store_client,
        })
    }
}

pub struct EmissionsService {
    config: EmissionsServiceConfig,
}

impl EmissionsService {
    pub fn new(config: EmissionsServiceConfig) -> Self {
        Self { config }
    }

    /// Opens a session holding the user's entries in memory. When the store
    /// can't be read the session starts from an empty collection.
    pub async fn login(&self, user_id: &str) -> EmissionsSession {
        let entries = match self.config.entry_store_client.get_entries(user_id).await {
            Ok(entries) => {
                info!("Loaded {} entries for {}", entries.len(), user_id);
                entries
            }
            Err(e) => {
                error!("Failed loading entries for {}: {}", user_id, e);
                EntryCollection::new()
            }
        };

        let language = match self.config.settings_store_client.get_user_settings(user_id).await {
            Ok(Some(settings)) if !settings.language.trim().is_empty() => settings.language,
            Ok(_) => self.config.reporting_config.language.clone(),
            Err(e) => {
                error!("Failed loading settings for {}: {}", user_id, e);
                self.config.reporting_config.language.clone()
            }
        };

        let (writes, queue) = mpsc::unbounded_channel();
        tokio::spawn(
            StoreWriter {
                user_id: user_id.to_string(),
                entry_store_client: self.config.entry_store_client.clone(),
                production_store_client: self.config.production_store_client.clone(),
                settings_store_client: self.config.settings_store_client.clone(),
            }
            .run(queue),
        );

        EmissionsSession {
            user_id: user_id.to_string(),
            calculator: EmissionsCalculator::new(self.config.reporting_config.natural_gas_method),
            translations: self.config.reporting_config.translations.clone(),
            language: RwLock::new(language),
            entries: RwLock::new(entries),
            production: RwLock::new(BTreeMap::new()),
            production_store_client: self.config.production_store_client.clone(),
            writes,
        }
    }
}

enum StoreWrite {
    SaveEntry { category: Category, entry: Entry },
    UpdateEntry { category: Category, entry: Entry },
    DeleteEntry { category: Category, id: i64 },
    SaveProduction { record: ProductionRecord },
    SaveSettings { settings: UserSettings },
}

/// Applies one session's writes to the stores strictly in the order they
/// were queued.
struct StoreWriter {
    user_id: String,
    entry_store_client: Arc<dyn EntryStoreClient>,
    production_store_client: Arc<dyn ProductionStoreClient>,
    settings_store_client: Arc<dyn SettingsStoreClient>,
}

impl StoreWriter {
    async fn run(self, mut queue: mpsc::UnboundedReceiver<(StoreWrite, oneshot::Sender<()>)>) {
        while let Some((write, done)) = queue.recv().await {
            self.apply(write).await;
            // the caller may have dropped its PendingWrite
            let _ = done.send(());
        }

        debug!("Store writer for {} stopped", self.user_id);
    }

    async fn apply(&self, write: StoreWrite) {
        let user_id = &self.user_id;
        match write {
            StoreWrite::SaveEntry { category, entry } => {
                if let Err(e) = self.entry_store_client.save_entry(user_id, category, &entry).await {
                    error!("Failed saving {} entry {} for {}: {}", category, entry.id, user_id, e);
                }
            }
            StoreWrite::UpdateEntry { category, entry } => {
                if let Err(e) = self.entry_store_client.update_entry(user_id, &entry).await {
                    error!("Failed updating {} entry {} for {}: {}", category, entry.id, user_id, e);
                }
            }
            StoreWrite::DeleteEntry { category, id } => {
                if let Err(e) = self.entry_store_client.delete_entry(user_id, id).await {
                    error!("Failed deleting {} entry {} for {}: {}", category, id, user_id, e);
                }
            }
            StoreWrite::SaveProduction { record } => {
                if let Err(e) = self
                    .production_store_client
                    .save_production_data(user_id, &record)
                    .await
                {
                    error!("Failed saving production data {} for {}: {}", record.year, user_id, e);
                }
            }
            StoreWrite::SaveSettings { settings } => {
                if let Err(e) = self
                    .settings_store_client
                    .save_user_settings(user_id, &settings)
                    .await
                {
                    error!("Failed saving settings for {}: {}", user_id, e);
                }
            }
        }
    }
}

/// One logged-in user's view of their data.
///
/// Mutations apply to memory first and are then queued for the store, which
/// sees them in the same order; a failed write is logged and the in-memory
/// state is kept. The returned [`PendingWrite`]s may be awaited but don't
/// have to be. Must be created within a tokio runtime.
pub struct EmissionsSession {
    user_id: String,
    calculator: EmissionsCalculator,
    translations: Translations,
    language: RwLock<String>,
    entries: RwLock<EntryCollection>,
    production: RwLock<BTreeMap<i32, ProductionRecord>>,
    production_store_client: Arc<dyn ProductionStoreClient>,
    writes: mpsc::UnboundedSender<(StoreWrite, oneshot::Sender<()>)>,
}

impl EmissionsSession {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Must be called while holding the lock guarding the mutated state, so
    /// the queue order matches the in-memory order.
    fn queue_write(&self, write: StoreWrite) -> PendingWrite {
        let (done, pending) = oneshot::channel();
        if self.writes.send((write, done)).is_err() {
            error!("Store writer for {} is gone, write dropped", self.user_id);
        }
        pending
    }

    /// Copy of the current in-memory entries.
    pub fn entries(&self) -> EntryCollection {
        self.entries.read().clone()
    }

    pub fn add_entry(&self, category: Category, entry: Entry) -> (Entry, PendingWrite) {
        let mut entries = self.entries.write();
        let stored = entries.add(category, entry);
        let pending = self.queue_write(StoreWrite::SaveEntry {
            category,
            entry: stored.clone(),
        });

        (stored, pending)
    }

    /// `None` when no entry with `id` exists under `category`.
    pub fn update_entry(
        &self,
        category: Category,
        id: i64,
        entry: Entry,
    ) -> Option<(Entry, PendingWrite)> {
        let mut entries = self.entries.write();
        let updated = entries.update(category, id, entry)?;
        let pending = self.queue_write(StoreWrite::UpdateEntry {
            category,
            entry: updated.clone(),
        });

        Some((updated, pending))
    }

    pub fn delete_entry(&self, category: Category, id: i64) -> Option<PendingWrite> {
        let mut entries = self.entries.write();
        entries.delete(category, id)?;

        Some(self.queue_write(StoreWrite::DeleteEntry { category, id }))
    }

    pub fn language(&self) -> String {
        self.language.read().clone()
    }

    /// Switches the language used for category labels and stores it as the
    /// user's setting.
    pub fn set_language(&self, language: &str) -> PendingWrite {
        let mut current = self.language.write();
        *current = language.to_string();

        self.queue_write(StoreWrite::SaveSettings {
            settings: UserSettings::with_language(language),
        })
    }

    /// Aggregates over a consistent snapshot of the in-memory entries.
    pub fn summary(&self) -> EmissionsSummary {
        let language = self.language();
        let entries = self.entries.read();

        Aggregator::new(&self.calculator, &entries)
            .with_translations(&self.translations, &language)
            .summarize()
    }

    /// Replaces the year's production record.
    pub fn save_production_data(
        &self,
        year: i32,
        monthly_production: MonthlyData,
    ) -> (ProductionRecord, PendingWrite) {
        let record = ProductionRecord::new(year, monthly_production);
        let mut production = self.production.write();
        production.insert(year, record.clone());
        let pending = self.queue_write(StoreWrite::SaveProduction {
            record: record.clone(),
        });

        (record, pending)
    }

    pub async fn production_data(&self, year: i32) -> Option<ProductionRecord> {
        let cached = self.production.read().get(&year).cloned();
        if cached.is_some() {
            return cached;
        }

        match self
            .production_store_client
            .get_production_data(&self.user_id, year)
            .await
        {
            Ok(Some(record)) => Some(self.production.write().entry(year).or_insert(record).clone()),
            Ok(None) => None,
            Err(e) => {
                error!("Failed loading production data {} for {}: {}", year, self.user_id, e);
                None
            }
        }
    }

    /// Emissions per unit of output for `year`, `None` without production data.
    pub async fn emissions_intensity(&self, year: i32) -> Option<EmissionsIntensity> {
        let record = self.production_data(year).await?;
        let entries = self.entries();
        let aggregator = Aggregator::new(&self.calculator, &entries);

        Some(record.emissions_intensity(aggregator.total_emissions(), &aggregator.monthly_breakdown()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_store_client::{StateStoreClient, StateStoreClientConfig};
    use crate::store_client::StoreError;
    use assert2::{check, let_assert};
    use async_trait::async_trait;
    use std::io;
    use tempfile::TempDir;

    struct UnavailableStore;

    fn unavailable() -> StoreError {
        StoreError::Io(io::Error::new(io::ErrorKind::Other, "store unavailable"))
    }

    #[async_trait]
    impl EntryStoreClient for UnavailableStore {
        async fn get_entries(&self, _user_id: &str) -> Result<EntryCollection, StoreError> {
            Err(unavailable())
        }

        async fn save_entry(
            &self,
            _user_id: &str,
            _category: Category,
            _entry: &Entry,
        ) -> Result<(), StoreError> {
            Err(unavailable())
        }

        async fn update_entry(&self, _user_id: &str, _entry: &Entry) -> Result<(), StoreError> {
            Err(unavailable())
        }

        async fn delete_entry(&self, _user_id: &str, _entry_id: i64) -> Result<(), StoreError> {
            Err(unavailable())
        }
    }

    #[async_trait]
    impl SettingsStoreClient for UnavailableStore {
        async fn get_user_settings(
            &self,
            _user_id: &str,
        ) -> Result<Option<UserSettings>, StoreError> {
            Err(unavailable())
        }

        async fn save_user_settings(
            &self,
            _user_id: &str,
            _settings: &UserSettings,
        ) -> Result<(), StoreError> {
            Err(unavailable())
        }
    }

    #[async_trait]
    impl ProductionStoreClient for UnavailableStore {
        async fn get_production_data(
            &self,
            _user_id: &str,
            _year: i32,
        ) -> Result<Option<ProductionRecord>, StoreError> {
            Err(unavailable())
        }

        async fn save_production_data(
            &self,
            _user_id: &str,
            _record: &ProductionRecord,
        ) -> Result<(), StoreError> {
            Err(unavailable())
        }
    }

    fn state_service(dir: &TempDir) -> EmissionsService {
        let path = dir.path().join("state.yaml");
        let store = Arc::new(StateStoreClient::new(
            StateStoreClientConfig::new(&path.to_string_lossy()).unwrap(),
        ));
        EmissionsService::new(
            EmissionsServiceConfig::new(
                ReportingConfig::default(),
                store.clone(),
                store.clone(),
                store,
            )
            .unwrap(),
        )
    }

    fn unavailable_service() -> EmissionsService {
        let store = Arc::new(UnavailableStore);
        EmissionsService::new(
            EmissionsServiceConfig::new(
                ReportingConfig::default(),
                store.clone(),
                store.clone(),
                store,
            )
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn entries_are_persisted_and_reloaded_on_next_login() {
        let dir = TempDir::new().unwrap();
        let service = state_service(&dir);

        let session = service.login("jane@example.com").await;
        let (cars, saving_cars) = session.add_entry(Category::Cars, Entry::with_amount("100", "km"));
        let (_, saving_flights) =
            session.add_entry(Category::Flights, Entry::with_amount("50", "km"));
        saving_cars.await.unwrap();
        saving_flights.await.unwrap();

        let reloaded = service.login("jane@example.com").await;
        let entries = reloaded.entries();
        check!(entries.len() == 2);
        check!(entries.get(Category::Cars)[0].id == cars.id);

        let other = service.login("john@example.com").await;
        check!(other.entries().is_empty());
    }

    #[tokio::test]
    async fn summary_reflects_in_memory_updates_and_deletes() {
        let dir = TempDir::new().unwrap();
        let service = state_service(&dir);
        let session = service.login("jane@example.com").await;

        let (cars, saving_cars) = session.add_entry(Category::Cars, Entry::with_amount("100", "km"));
        let (flights, saving_flights) =
            session.add_entry(Category::Flights, Entry::with_amount("50", "km"));
        saving_cars.await.unwrap();
        saving_flights.await.unwrap();

        let summary = session.summary();
        check!(summary.total_emissions == 75.0);
        check!(summary.main_category.category == Category::Cars);

        let_assert!(
            Some((updated, updating)) =
                session.update_entry(Category::Flights, flights.id, Entry::with_amount("300", "km"))
        );
        check!(updated.id == flights.id);
        updating.await.unwrap();
        check!(session.summary().main_category.category == Category::Flights);

        let_assert!(Some(deleting) = session.delete_entry(Category::Cars, cars.id));
        deleting.await.unwrap();
        check!(session.summary().total_emissions == 150.0);
        check!(session.delete_entry(Category::Cars, cars.id).is_none());

        let reloaded = service.login("jane@example.com").await.entries();
        let_assert!([flight] = reloaded.get(Category::Flights));
        check!(flight.amount.as_str() == "300");
    }

    #[tokio::test]
    async fn failed_persistence_keeps_in_memory_state() {
        let service = unavailable_service();

        let session = service.login("jane@example.com").await;
        check!(session.entries().is_empty());

        let (entry, saving) = session.add_entry(Category::Refrigerants, Entry::with_amount("4", "kg"));
        saving.await.unwrap();

        check!(session.entries().len() == 1);
        check!(session.summary().total_emissions == 2.0);

        let_assert!(Some(deleting) = session.delete_entry(Category::Refrigerants, entry.id));
        deleting.await.unwrap();
        check!(session.entries().is_empty());

        let (record, saving) = session.save_production_data(
            2025,
            MonthlyData::from_values(["4", "", "", "", "", "", "", "", "", "", "", ""]),
        );
        saving.await.unwrap();
        let cached = session.production_data(2025).await;
        let unavailable = session.production_data(2024).await;
        check!(cached == Some(record));
        check!(unavailable.is_none());
    }

    #[tokio::test]
    async fn emissions_intensity_uses_saved_production() {
        let dir = TempDir::new().unwrap();
        let service = state_service(&dir);
        let session = service.login("jane@example.com").await;

        let (_, saving_entry) = session.add_entry(
            Category::Electricity,
            Entry {
                supplier_factor: "0.5".into(),
                ..Entry::with_monthly_data(MonthlyData::from_values([
                    "40", "", "", "", "", "", "", "", "", "", "", "",
                ]))
            },
        );
        let (_, saving) = session.save_production_data(
            2025,
            MonthlyData::from_values(["10", "10", "", "", "", "", "", "", "", "", "", ""]),
        );
        saving_entry.await.unwrap();
        saving.await.unwrap();

        let_assert!(Some(intensity) = session.emissions_intensity(2025).await);
        check!(intensity.annual == 1.0);
        check!(intensity.monthly[0] == 2.0);
        let_assert!(None = session.emissions_intensity(2030).await);

        let reloaded = service.login("jane@example.com").await;
        let_assert!(Some(record) = reloaded.production_data(2025).await);
        check!(record.annual_total == 20.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn store_sees_writes_in_the_order_they_were_made() {
        let dir = TempDir::new().unwrap();
        let service = state_service(&dir);
        let session = service.login("jane@example.com").await;

        let mut last_write = None;
        for _ in 0..25 {
            let (cars, _) = session.add_entry(Category::Cars, Entry::with_amount("100", "km"));
            let_assert!(Some(deleting) = session.delete_entry(Category::Cars, cars.id));

            let (flights, _) = session.add_entry(Category::Flights, Entry::with_amount("50", "km"));
            let_assert!(
                Some((_, updating)) =
                    session.update_entry(Category::Flights, flights.id, Entry::with_amount("300", "km"))
            );

            drop(deleting);
            last_write = Some(updating);
        }
        let_assert!(Some(last_write) = last_write);
        last_write.await.unwrap();

        let reloaded = service.login("jane@example.com").await.entries();
        check!(reloaded.get(Category::Cars).is_empty());
        check!(reloaded.get(Category::Flights).len() == 25);
        check!(reloaded.get(Category::Flights).iter().all(|flight| flight.amount.as_str() == "300"));
        check!(reloaded == session.entries());
    }

    #[tokio::test]
    async fn language_setting_is_per_user_and_labels_the_summary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.yaml");
        let store = Arc::new(StateStoreClient::new(
            StateStoreClientConfig::new(&path.to_string_lossy()).unwrap(),
        ));
        let mut translations = Translations::new();
        translations.insert("de", "cars", "Autos");
        let reporting_config = ReportingConfig {
            language: "en".to_string(),
            translations,
            ..ReportingConfig::default()
        };
        let service = EmissionsService::new(
            EmissionsServiceConfig::new(reporting_config, store.clone(), store.clone(), store)
                .unwrap(),
        );

        let session = service.login("jane@example.com").await;
        check!(session.language() == "en");
        let (_, saving) = session.add_entry(Category::Cars, Entry::with_amount("10", "km"));
        saving.await.unwrap();
        check!(session.summary().main_category.name == "Cars");

        session.set_language("de").await.unwrap();
        check!(session.summary().main_category.name == "Autos");

        let reloaded = service.login("jane@example.com").await;
        check!(reloaded.language() == "de");
        check!(reloaded.summary().main_category.name == "Autos");

        let other = service.login("john@example.com").await;
        check!(other.language() == "en");
    }
}
