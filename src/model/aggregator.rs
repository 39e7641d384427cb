use crate::model::emissions_calculator::{EmissionsCalculator, EntryEmissions};
use crate::model::{Category, EntryCollection, Month, Scope, Translations, DEFAULT_LANGUAGE};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EntryRow {
    pub id: i64,
    pub category: Category,
    pub category_label: String,
    pub emissions: EntryEmissions,
}

#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScopeShare {
    pub scope: Scope,
    pub emissions: f64,
    /// Share of total direct emissions, 0 when there are none.
    pub percentage: f64,
}

impl ScopeShare {
    pub fn percentage_label(&self) -> String {
        format!("{:.1}", self.percentage)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ScopeBreakdown {
    pub scopes: Vec<ScopeShare>,
}

impl ScopeBreakdown {
    pub fn get(&self, scope: Scope) -> Option<&ScopeShare> {
        self.scopes.iter().find(|share| share.scope == scope)
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CategoryEmissions {
    pub category: Category,
    pub name: String,
    pub value: f64,
    pub full_value: String,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRow {
    pub label: String,
    pub emissions: f64,
    pub wtt: f64,
}

impl MonthlyRow {
    pub fn total(&self) -> f64 {
        self.emissions + self.wtt
    }
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBreakdown {
    /// Jan to Dec.
    pub months: Vec<MonthlyRow>,
    pub yearly_total: MonthlyRow,
}

#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct MainCategory {
    pub category: Category,
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

/// Plain-data result of every aggregation over one snapshot.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsSummary {
    pub total_entries: usize,
    pub total_emissions: f64,
    pub total_wtt: f64,
    pub overall_total: f64,
    pub scope_breakdown: ScopeBreakdown,
    pub category_breakdown: Vec<CategoryEmissions>,
    pub monthly_breakdown: MonthlyBreakdown,
    pub main_category: MainCategory,
    pub entries: Vec<EntryRow>,
}

fn percentage_of(value: f64, total: f64) -> f64 {
    if total != 0.0 {
        value / total * 100.0
    } else {
        0.0
    }
}

/// Read-only summaries over an entry snapshot.
pub struct Aggregator<'a> {
    calculator: &'a EmissionsCalculator,
    entries: &'a EntryCollection,
    translations: Option<&'a Translations>,
    language: &'a str,
}

impl<'a> Aggregator<'a> {
    pub fn new(calculator: &'a EmissionsCalculator, entries: &'a EntryCollection) -> Self {
        Self {
            calculator,
            entries,
            translations: None,
            language: DEFAULT_LANGUAGE,
        }
    }

    pub fn with_translations(mut self, translations: &'a Translations, language: &'a str) -> Self {
        self.translations = Some(translations);
        self.language = language;
        self
    }

    fn label(&self, category: Category) -> String {
        match self.translations {
            Some(translations) => translations.category_label(self.language, category),
            None => category.default_label().to_string(),
        }
    }

    pub fn entry_rows(&self) -> Vec<EntryRow> {
        self.entries
            .iter()
            .map(|(category, entry)| EntryRow {
                id: entry.id,
                category,
                category_label: self.label(category),
                emissions: self.calculator.entry_emissions(category, entry),
            })
            .collect()
    }

    pub fn total_emissions(&self) -> f64 {
        self.entries
            .iter()
            .map(|(category, entry)| self.calculator.direct_emissions(category, entry))
            .sum()
    }

    pub fn total_wtt(&self) -> f64 {
        self.entries
            .iter()
            .map(|(category, entry)| self.calculator.entry_emissions(category, entry).wtt)
            .sum()
    }

    pub fn overall_total(&self) -> f64 {
        self.total_emissions() + self.total_wtt()
    }

    pub fn scope_breakdown(&self) -> ScopeBreakdown {
        let mut totals = [0.0; 3];
        for (category, entry) in self.entries.iter() {
            let slot = match category.scope() {
                Scope::Scope1 => 0,
                Scope::Scope2 => 1,
                Scope::Scope3 => 2,
            };
            totals[slot] += self.calculator.direct_emissions(category, entry);
        }

        let total: f64 = totals.iter().sum();

        ScopeBreakdown {
            scopes: Scope::ALL
                .iter()
                .zip(totals.iter())
                .map(|(scope, emissions)| ScopeShare {
                    scope: *scope,
                    emissions: *emissions,
                    percentage: percentage_of(*emissions, total),
                })
                .collect(),
        }
    }

    /// Per-category totals, highest first; equal totals keep enumeration order.
    pub fn category_breakdown(&self) -> Vec<CategoryEmissions> {
        let mut breakdown: Vec<CategoryEmissions> = Category::ALL
            .iter()
            .map(|category| {
                let value: f64 = self
                    .entries
                    .get(*category)
                    .iter()
                    .fold(0.0, |sum, entry| {
                        sum + self.calculator.direct_emissions(*category, entry)
                    });

                CategoryEmissions {
                    category: *category,
                    name: self.label(*category),
                    value,
                    full_value: format!("{:.2}", value),
                }
            })
            .collect();

        breakdown.sort_by(|a, b| b.value.total_cmp(&a.value));

        breakdown
    }

    /// Calendar-month totals over entries with a monthly grid; a month only
    /// counts an entry whose value for that month is above zero.
    pub fn monthly_breakdown(&self) -> MonthlyBreakdown {
        let mut emissions = [0.0; 12];
        let mut wtt = [0.0; 12];

        for (category, entry) in self.entries.iter() {
            let (monthly_data, monthly_emissions) = match (
                &entry.monthly_data,
                self.calculator.monthly_direct_emissions(category, entry),
            ) {
                (Some(monthly_data), Some(monthly_emissions)) => (monthly_data, monthly_emissions),
                _ => continue,
            };

            let values = monthly_data.values();
            for month in Month::ALL.iter() {
                let i = month.index();
                if values[i] > 0.0 {
                    let month_emissions = EntryEmissions::from_direct(monthly_emissions[i]);
                    emissions[i] += month_emissions.direct;
                    wtt[i] += month_emissions.wtt;
                }
            }
        }

        let months: Vec<MonthlyRow> = Month::ALL
            .iter()
            .map(|month| MonthlyRow {
                label: month.label().to_string(),
                emissions: emissions[month.index()],
                wtt: wtt[month.index()],
            })
            .collect();

        let yearly_total = months.iter().fold(
            MonthlyRow {
                label: "Total".to_string(),
                emissions: 0.0,
                wtt: 0.0,
            },
            |mut total, row| {
                total.emissions += row.emissions;
                total.wtt += row.wtt;
                total
            },
        );

        MonthlyBreakdown {
            months,
            yearly_total,
        }
    }

    pub fn main_category(&self) -> MainCategory {
        let total = self.total_emissions();

        match self.category_breakdown().into_iter().next() {
            Some(top) => MainCategory {
                category: top.category,
                name: top.name,
                value: top.value,
                percentage: percentage_of(top.value, total),
            },
            None => MainCategory {
                category: Category::Electricity,
                name: self.label(Category::Electricity),
                value: 0.0,
                percentage: 0.0,
            },
        }
    }

    pub fn summarize(&self) -> EmissionsSummary {
        let total_emissions = self.total_emissions();
        let total_wtt = self.total_wtt();

        debug!(
            "Summarized {} entries: {} tCO2e direct, {} tCO2e well-to-tank",
            self.entries.len(),
            total_emissions,
            total_wtt
        );

        EmissionsSummary {
            total_entries: self.entries.len(),
            total_emissions,
            total_wtt,
            overall_total: total_emissions + total_wtt,
            scope_breakdown: self.scope_breakdown(),
            category_breakdown: self.category_breakdown(),
            monthly_breakdown: self.monthly_breakdown(),
            main_category: self.main_category(),
            entries: self.entry_rows(),
        }
    }
}
