use crate::model::{Category, MonthlyData, NumericField};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum ElectricitySource {
    Purchased,
    Renewable,
}

impl Default for ElectricitySource {
    fn default() -> Self {
        ElectricitySource::Purchased
    }
}

/// One user-submitted measurement record. The category is the key of the
/// [`EntryCollection`] list the entry lives in.
#[derive(Clone, PartialEq, Default, Serialize, Deserialize, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct Entry {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<ElectricitySource>,

    pub usage: NumericField,
    pub amount: NumericField,
    pub unit_of_measure: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_data: Option<MonthlyData>,

    // electricity
    pub supplier_factor: NumericField,
    pub co2_emission_factor: NumericField,
    pub country: String,
    pub year: String,

    // natural gas
    pub net_calorific_value: NumericField,
    pub co2_emission: NumericField,
    pub ch4_emission: NumericField,
    pub n2o_emission: NumericField,
    pub ch4_global_warming_power: NumericField,
    pub n2o_global_warming_power: NumericField,
    pub conversion_factor: NumericField,

    // fuel (diesel)
    pub volume_biodiesel: NumericField,
    pub diesel_specific_gravity: NumericField,
    pub diesel_net_calorific_value: NumericField,
    pub diesel_co2_emission: NumericField,
    pub diesel_ch4_emission: NumericField,
    pub diesel_n2o_emission: NumericField,
    pub diesel_ch4_global_warming_power: NumericField,
    pub diesel_n2o_global_warming_power: NumericField,
    pub diesel_conversion_factor: NumericField,

    pub link: String,
    pub comments: String,
}

impl Entry {
    /// Scalar-amount entry as used by the generic categories.
    pub fn with_amount<A: Into<NumericField>>(amount: A, unit_of_measure: &str) -> Self {
        Self {
            amount: amount.into(),
            unit_of_measure: unit_of_measure.to_string(),
            ..Default::default()
        }
    }

    pub fn with_monthly_data(monthly_data: MonthlyData) -> Self {
        Self {
            monthly_data: Some(monthly_data),
            ..Default::default()
        }
    }
}

type RawEntryCollection = BTreeMap<String, Vec<Entry>>;

/// Category-keyed, insertion-ordered entry lists for one user.
///
/// All eight categories are always present. Lists stored under a key outside
/// the fixed enumeration are kept aside in `unclassified` and never take part
/// in any emissions sum.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(from = "RawEntryCollection", into = "RawEntryCollection")]
pub struct EntryCollection {
    entries: BTreeMap<Category, Vec<Entry>>,
    unclassified: BTreeMap<String, Vec<Entry>>,
}

impl Default for EntryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryCollection {
    pub fn new() -> Self {
        Self {
            entries: Category::ALL.iter().map(|c| (*c, vec![])).collect(),
            unclassified: BTreeMap::new(),
        }
    }

    pub fn get(&self, category: Category) -> &[Entry] {
        self.entries
            .get(&category)
            .map(|entries| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn find(&self, category: Category, id: i64) -> Option<&Entry> {
        self.get(category).iter().find(|entry| entry.id == id)
    }

    /// All classified entries, categories in enumeration order, entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &Entry)> + '_ {
        self.entries
            .iter()
            .flat_map(|(category, entries)| entries.iter().map(move |entry| (*category, entry)))
    }

    pub fn unclassified(&self) -> &BTreeMap<String, Vec<Entry>> {
        &self.unclassified
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries per category, all categories present.
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        self.entries
            .iter()
            .map(|(category, entries)| (*category, entries.len()))
            .collect()
    }

    /// Timestamp-derived id, strictly above every id already in the collection.
    pub fn next_id(&self) -> i64 {
        let last_id = self
            .entries
            .values()
            .chain(self.unclassified.values())
            .flat_map(|entries| entries.iter().map(|entry| entry.id))
            .max()
            .unwrap_or(0);

        std::cmp::max(Utc::now().timestamp_millis(), last_id + 1)
    }

    /// Appends the entry under a fresh id and returns the stored entry.
    pub fn add(&mut self, category: Category, mut entry: Entry) -> Entry {
        entry.id = self.next_id();
        self.entries
            .entry(category)
            .or_insert_with(Vec::new)
            .push(entry.clone());
        entry
    }

    /// Appends the entry keeping its id, as done when loading persisted entries.
    pub fn push(&mut self, category: Category, entry: Entry) {
        self.entries.entry(category).or_insert_with(Vec::new).push(entry);
    }

    /// Replaces the entry with `id` in place, preserving the id and position.
    pub fn update(&mut self, category: Category, id: i64, mut entry: Entry) -> Option<Entry> {
        let slot = self
            .entries
            .get_mut(&category)?
            .iter_mut()
            .find(|existing| existing.id == id)?;

        entry.id = id;
        *slot = entry.clone();
        Some(entry)
    }

    pub fn delete(&mut self, category: Category, id: i64) -> Option<Entry> {
        let entries = self.entries.get_mut(&category)?;
        let position = entries.iter().position(|entry| entry.id == id)?;
        Some(entries.remove(position))
    }

    pub fn push_unclassified(&mut self, category_key: &str, entry: Entry) {
        warn!(
            "Entry {} is stored under unknown category '{}' and is excluded from emissions totals",
            entry.id, category_key
        );
        self.unclassified
            .entry(category_key.to_string())
            .or_insert_with(Vec::new)
            .push(entry);
    }
}

impl From<RawEntryCollection> for EntryCollection {
    fn from(raw: RawEntryCollection) -> Self {
        let mut collection = EntryCollection::new();
        for (key, entries) in raw {
            match key.parse::<Category>() {
                Ok(category) => {
                    for entry in entries {
                        collection.push(category, entry);
                    }
                }
                Err(_) => {
                    for entry in entries {
                        collection.push_unclassified(&key, entry);
                    }
                }
            }
        }
        collection
    }
}

impl From<EntryCollection> for RawEntryCollection {
    fn from(collection: EntryCollection) -> Self {
        let mut raw: RawEntryCollection = collection.unclassified;
        for (category, entries) in collection.entries {
            raw.insert(category.key().to_string(), entries);
        }
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn new_collection_has_all_categories_empty() {
        let collection = EntryCollection::new();

        check!(collection.is_empty());
        check!(collection.counts().len() == 8);
        for category in Category::ALL.iter() {
            check!(collection.get(*category).is_empty());
        }
    }

    #[test]
    fn add_assigns_increasing_unique_ids_and_keeps_insertion_order() {
        let mut collection = EntryCollection::new();

        let first = collection.add(Category::Cars, Entry::with_amount("100", "km"));
        let second = collection.add(Category::Cars, Entry::with_amount("50", "km"));

        check!(second.id > first.id);
        let_assert!([a, b] = collection.get(Category::Cars));
        check!(a.id == first.id);
        check!(b.amount.as_str() == "50");
    }

    #[test]
    fn update_replaces_in_place_and_preserves_id() {
        let mut collection = EntryCollection::new();
        let first = collection.add(Category::Flights, Entry::with_amount("10", "km"));
        let second = collection.add(Category::Flights, Entry::with_amount("20", "km"));

        let mut replacement = Entry::with_amount("15", "km");
        replacement.id = 42;
        let_assert!(Some(updated) = collection.update(Category::Flights, first.id, replacement));

        check!(updated.id == first.id);
        let_assert!([a, b] = collection.get(Category::Flights));
        check!(a.id == first.id);
        check!(a.amount.as_str() == "15");
        check!(b.id == second.id);
    }

    #[test]
    fn update_and_delete_return_none_for_unknown_id() {
        let mut collection = EntryCollection::new();
        collection.add(Category::Fuel, Entry::with_amount("1", "L"));

        check!(collection.update(Category::Fuel, -1, Entry::default()).is_none());
        check!(collection.delete(Category::Cars, -1).is_none());
        check!(collection.len() == 1);
    }

    #[test]
    fn delete_removes_entry() {
        let mut collection = EntryCollection::new();
        let entry = collection.add(Category::Refrigerants, Entry::with_amount("3", "kg"));

        let_assert!(Some(deleted) = collection.delete(Category::Refrigerants, entry.id));

        check!(deleted.id == entry.id);
        check!(collection.is_empty());
    }

    #[test]
    fn deserializing_keeps_unknown_categories_aside() {
        let_assert!(
            Ok(collection) = serde_json::from_str::<EntryCollection>(
                r#"{
  "cars": [{"id": 1, "amount": "100", "unitOfMeasure": "km"}],
  "homeWorkers": [{"id": 2, "amount": "4"}],
  "spaceTravel": [{"id": 3, "amount": "9"}]
}"#
            )
        );

        check!(collection.len() == 2);
        check!(collection.get(Category::RemoteWorking).len() == 1);
        check!(collection.get(Category::Electricity).is_empty());
        let_assert!(Some(unknown) = collection.unclassified().get("spaceTravel"));
        check!(unknown.len() == 1);
        check!(collection.next_id() >= 4);
    }

    #[test]
    fn entry_deserializes_from_original_field_names() {
        let_assert!(
            Ok(entry) = serde_json::from_str::<Entry>(
                r#"{
  "id": 1700000000000,
  "source": "renewable",
  "supplierFactor": "",
  "co2EmissionFactor": "0.43",
  "country": "NL",
  "year": "2025",
  "monthlyData": {"jan": "100", "feb": "200"},
  "link": "https://example.org",
  "comments": "meter readings"
}"#
            )
        );

        check!(entry.id == 1_700_000_000_000);
        check!(entry.source == Some(ElectricitySource::Renewable));
        check!(entry.supplier_factor.is_blank());
        check!(entry.co2_emission_factor.value() == 0.43);
        let_assert!(Some(monthly_data) = entry.monthly_data);
        check!(monthly_data.total() == 300.0);
        check!(entry.comments == "meter readings");
    }
}
