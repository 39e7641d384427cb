use crate::model::emission_factors::*;
use crate::model::{Category, Entry, Month, MonthlyData, NaturalGasMethod};
use serde::{Deserialize, Serialize};

/// kWh → MWh for legacy single-value electricity entries.
const LEGACY_ELECTRICITY_DIVISOR: f64 = 1000.0;
/// Folds the Kcal, TJ and kg conversions of the diesel chain into one constant.
const DIESEL_SCALE: f64 = 1e-6;
/// Kcal × J/cal → TJ.
const KCAL_TO_TERAJOULE: f64 = 1e-9;
const KG_TO_TONNE: f64 = 1e-3;

#[derive(Copy, Clone, PartialEq, Default, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EntryEmissions {
    pub direct: f64,
    pub wtt: f64,
}

impl EntryEmissions {
    pub fn from_direct(direct: f64) -> Self {
        Self {
            direct,
            wtt: wtt_emissions(direct),
        }
    }

    pub fn total(&self) -> f64 {
        self.direct + self.wtt
    }
}

/// Upstream emissions for any entry, independent of category.
pub fn wtt_emissions(direct_emissions: f64) -> f64 {
    direct_emissions * WTT_RATIO
}

/// tCO₂e for `consumption_litres` of diesel.
pub fn diesel_emissions(consumption_litres: f64, factors: &DieselFactors) -> f64 {
    consumption_litres
        * factors.specific_gravity
        * factors.net_calorific_value
        * factors.co2_emission
        * DIESEL_SCALE
}

/// tCO₂e for `consumption` m³ of natural gas along the IPCC chain:
/// energy in TJ times the CO₂-equivalent intensity of CO₂, CH₄ and N₂O.
pub fn natural_gas_emissions(consumption: f64, factors: &NaturalGasFactors) -> f64 {
    let energy_terajoule =
        consumption * factors.net_calorific_value * factors.conversion_factor * KCAL_TO_TERAJOULE;
    let co2e_per_terajoule = factors.co2_emission
        + factors.ch4_emission * factors.ch4_global_warming_power
        + factors.n2o_emission * factors.n2o_global_warming_power;

    energy_terajoule * co2e_per_terajoule * KG_TO_TONNE
}

/// Rounds for presentation only; sums are always taken over unrounded values.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turns raw entries into direct emissions (tCO₂e).
///
/// Electricity entries with a monthly grid are read as MWh, legacy entries
/// with a single `usage` value as kWh.
#[derive(Copy, Clone, Default, Debug)]
pub struct EmissionsCalculator {
    natural_gas_method: NaturalGasMethod,
}

impl EmissionsCalculator {
    pub fn new(natural_gas_method: NaturalGasMethod) -> Self {
        Self { natural_gas_method }
    }

    pub fn natural_gas_method(&self) -> NaturalGasMethod {
        self.natural_gas_method
    }

    pub fn entry_emissions(&self, category: Category, entry: &Entry) -> EntryEmissions {
        EntryEmissions::from_direct(self.direct_emissions(category, entry))
    }

    /// Annual direct emissions of one entry.
    pub fn direct_emissions(&self, category: Category, entry: &Entry) -> f64 {
        match resolve(category, entry) {
            ResolvedFactors::Electricity(factor) => match &entry.monthly_data {
                Some(monthly_data) => monthly_data.total() * factor.value,
                None => entry.usage.value() * factor.value / LEGACY_ELECTRICITY_DIVISOR,
            },
            ResolvedFactors::Fuel(factors) => match &entry.monthly_data {
                Some(monthly_data) => monthly_data
                    .values()
                    .iter()
                    .map(|consumption| diesel_emissions(*consumption, &factors))
                    .sum(),
                None => entry.amount.value() * GENERIC_EMISSION_FACTOR,
            },
            ResolvedFactors::NaturalGas(factors) => {
                self.natural_gas_direct(quantity(entry), &factors)
            }
            ResolvedFactors::Generic { factor } => quantity(entry) * factor,
        }
    }

    /// Direct emissions per calendar month, or `None` for entries without a monthly grid.
    pub fn monthly_direct_emissions(&self, category: Category, entry: &Entry) -> Option<[f64; 12]> {
        let monthly_data = entry.monthly_data.as_ref()?;
        let factors = resolve(category, entry);

        Some(per_month(monthly_data, |consumption| match &factors {
            ResolvedFactors::Electricity(factor) => consumption * factor.value,
            ResolvedFactors::Fuel(diesel) => diesel_emissions(consumption, diesel),
            ResolvedFactors::NaturalGas(natural_gas) => {
                self.natural_gas_direct(consumption, natural_gas)
            }
            ResolvedFactors::Generic { factor } => consumption * factor,
        }))
    }

    fn natural_gas_direct(&self, consumption: f64, factors: &NaturalGasFactors) -> f64 {
        let full_formula = match self.natural_gas_method {
            NaturalGasMethod::Auto => factors.explicit,
            NaturalGasMethod::FlatFactor => false,
            NaturalGasMethod::FullFormula => true,
        };

        if full_formula {
            natural_gas_emissions(consumption, factors)
        } else {
            consumption * GENERIC_EMISSION_FACTOR
        }
    }
}

/// Monthly grid total when present, the scalar `amount` otherwise.
fn quantity(entry: &Entry) -> f64 {
    match &entry.monthly_data {
        Some(monthly_data) => monthly_data.total(),
        None => entry.amount.value(),
    }
}

fn per_month<F>(monthly_data: &MonthlyData, emissions_for: F) -> [f64; 12]
where
    F: Fn(f64) -> f64,
{
    let values = monthly_data.values();
    let mut emissions = [0.0; 12];
    for month in Month::ALL.iter() {
        emissions[month.index()] = emissions_for(values[month.index()]);
    }
    emissions
}
