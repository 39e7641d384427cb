use crate::model::{Category, Entry, NumericField};
use serde::{Deserialize, Serialize};

/// tCO₂e per unit of electricity usage when the entry names no factor.
pub const DEFAULT_ELECTRICITY_FACTOR: f64 = 0.4;
/// tCO₂e per unit of quantity for categories without a dedicated formula.
pub const GENERIC_EMISSION_FACTOR: f64 = 0.5;
/// Upstream (well-to-tank) emissions as a share of direct emissions.
pub const WTT_RATIO: f64 = 0.15;

pub const NATURAL_GAS_NET_CALORIFIC_VALUE: f64 = 184625.6;
pub const NATURAL_GAS_CO2_EMISSION: f64 = 56.100;
pub const NATURAL_GAS_CH4_EMISSION: f64 = 1.0;
pub const NATURAL_GAS_N2O_EMISSION: f64 = 0.1;
pub const NATURAL_GAS_CH4_GLOBAL_WARMING_POWER: f64 = 21.0;
pub const NATURAL_GAS_N2O_GLOBAL_WARMING_POWER: f64 = 310.0;
pub const NATURAL_GAS_CONVERSION_FACTOR: f64 = 4.186;

pub const DIESEL_SPECIFIC_GRAVITY: f64 = 0.83;
pub const DIESEL_NET_CALORIFIC_VALUE: f64 = 10.272;
pub const DIESEL_CO2_EMISSION: f64 = 74.100;
pub const DIESEL_CH4_EMISSION: f64 = 4.15;
pub const DIESEL_N2O_EMISSION: f64 = 28.60;
pub const DIESEL_CH4_GLOBAL_WARMING_POWER: f64 = 21.0;
pub const DIESEL_N2O_GLOBAL_WARMING_POWER: f64 = 310.0;
pub const DIESEL_CONVERSION_FACTOR: f64 = 4.186;

#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum FactorOrigin {
    SupplierFactor,
    Co2EmissionFactor,
    Default,
}

#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ElectricityFactor {
    pub value: f64,
    pub origin: FactorOrigin,
}

/// IPCC parameter set for natural gas combustion.
#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct NaturalGasFactors {
    pub net_calorific_value: f64,
    pub co2_emission: f64,
    pub ch4_emission: f64,
    pub n2o_emission: f64,
    pub ch4_global_warming_power: f64,
    pub n2o_global_warming_power: f64,
    pub conversion_factor: f64,
    /// Whether any parameter came from the entry rather than the defaults.
    pub explicit: bool,
}

impl Default for NaturalGasFactors {
    fn default() -> Self {
        Self {
            net_calorific_value: NATURAL_GAS_NET_CALORIFIC_VALUE,
            co2_emission: NATURAL_GAS_CO2_EMISSION,
            ch4_emission: NATURAL_GAS_CH4_EMISSION,
            n2o_emission: NATURAL_GAS_N2O_EMISSION,
            ch4_global_warming_power: NATURAL_GAS_CH4_GLOBAL_WARMING_POWER,
            n2o_global_warming_power: NATURAL_GAS_N2O_GLOBAL_WARMING_POWER,
            conversion_factor: NATURAL_GAS_CONVERSION_FACTOR,
            explicit: false,
        }
    }
}

/// IPCC parameter set for diesel.
#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DieselFactors {
    pub specific_gravity: f64,
    pub net_calorific_value: f64,
    pub co2_emission: f64,
    pub ch4_emission: f64,
    pub n2o_emission: f64,
    pub ch4_global_warming_power: f64,
    pub n2o_global_warming_power: f64,
    pub conversion_factor: f64,
}

impl Default for DieselFactors {
    fn default() -> Self {
        Self {
            specific_gravity: DIESEL_SPECIFIC_GRAVITY,
            net_calorific_value: DIESEL_NET_CALORIFIC_VALUE,
            co2_emission: DIESEL_CO2_EMISSION,
            ch4_emission: DIESEL_CH4_EMISSION,
            n2o_emission: DIESEL_N2O_EMISSION,
            ch4_global_warming_power: DIESEL_CH4_GLOBAL_WARMING_POWER,
            n2o_global_warming_power: DIESEL_N2O_GLOBAL_WARMING_POWER,
            conversion_factor: DIESEL_CONVERSION_FACTOR,
        }
    }
}

/// The effective factors for one entry. Resolution never fails.
#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum ResolvedFactors {
    Electricity(ElectricityFactor),
    NaturalGas(NaturalGasFactors),
    Fuel(DieselFactors),
    Generic { factor: f64 },
}

fn or_default(field: &NumericField, default: f64) -> f64 {
    field.parse().unwrap_or(default)
}

pub fn resolve_electricity_factor(entry: &Entry) -> ElectricityFactor {
    if let Some(value) = entry.supplier_factor.parse() {
        ElectricityFactor {
            value,
            origin: FactorOrigin::SupplierFactor,
        }
    } else if let Some(value) = entry.co2_emission_factor.parse() {
        ElectricityFactor {
            value,
            origin: FactorOrigin::Co2EmissionFactor,
        }
    } else {
        ElectricityFactor {
            value: DEFAULT_ELECTRICITY_FACTOR,
            origin: FactorOrigin::Default,
        }
    }
}

pub fn resolve_natural_gas_factors(entry: &Entry) -> NaturalGasFactors {
    let fields = [
        &entry.net_calorific_value,
        &entry.co2_emission,
        &entry.ch4_emission,
        &entry.n2o_emission,
        &entry.ch4_global_warming_power,
        &entry.n2o_global_warming_power,
        &entry.conversion_factor,
    ];

    NaturalGasFactors {
        net_calorific_value: or_default(&entry.net_calorific_value, NATURAL_GAS_NET_CALORIFIC_VALUE),
        co2_emission: or_default(&entry.co2_emission, NATURAL_GAS_CO2_EMISSION),
        ch4_emission: or_default(&entry.ch4_emission, NATURAL_GAS_CH4_EMISSION),
        n2o_emission: or_default(&entry.n2o_emission, NATURAL_GAS_N2O_EMISSION),
        ch4_global_warming_power: or_default(
            &entry.ch4_global_warming_power,
            NATURAL_GAS_CH4_GLOBAL_WARMING_POWER,
        ),
        n2o_global_warming_power: or_default(
            &entry.n2o_global_warming_power,
            NATURAL_GAS_N2O_GLOBAL_WARMING_POWER,
        ),
        conversion_factor: or_default(&entry.conversion_factor, NATURAL_GAS_CONVERSION_FACTOR),
        explicit: fields.iter().any(|field| field.parse().is_some()),
    }
}

pub fn resolve_diesel_factors(entry: &Entry) -> DieselFactors {
    DieselFactors {
        specific_gravity: or_default(&entry.diesel_specific_gravity, DIESEL_SPECIFIC_GRAVITY),
        net_calorific_value: or_default(
            &entry.diesel_net_calorific_value,
            DIESEL_NET_CALORIFIC_VALUE,
        ),
        co2_emission: or_default(&entry.diesel_co2_emission, DIESEL_CO2_EMISSION),
        ch4_emission: or_default(&entry.diesel_ch4_emission, DIESEL_CH4_EMISSION),
        n2o_emission: or_default(&entry.diesel_n2o_emission, DIESEL_N2O_EMISSION),
        ch4_global_warming_power: or_default(
            &entry.diesel_ch4_global_warming_power,
            DIESEL_CH4_GLOBAL_WARMING_POWER,
        ),
        n2o_global_warming_power: or_default(
            &entry.diesel_n2o_global_warming_power,
            DIESEL_N2O_GLOBAL_WARMING_POWER,
        ),
        conversion_factor: or_default(&entry.diesel_conversion_factor, DIESEL_CONVERSION_FACTOR),
    }
}

/// Selects the factors that apply to `entry` under `category`, falling back
/// to the default constants for anything missing or unparseable.
pub fn resolve(category: Category, entry: &Entry) -> ResolvedFactors {
    match category {
        Category::Electricity => ResolvedFactors::Electricity(resolve_electricity_factor(entry)),
        Category::NaturalGas => ResolvedFactors::NaturalGas(resolve_natural_gas_factors(entry)),
        Category::Fuel => ResolvedFactors::Fuel(resolve_diesel_factors(entry)),
        Category::Cars
        | Category::Flights
        | Category::PublicTransport
        | Category::Refrigerants
        | Category::RemoteWorking => ResolvedFactors::Generic {
            factor: GENERIC_EMISSION_FACTOR,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};
    use pretty_assertions::assert_eq;

    #[test]
    fn electricity_prefers_supplier_factor() {
        let entry = Entry {
            supplier_factor: "0.3".into(),
            co2_emission_factor: "0.43".into(),
            ..Default::default()
        };

        let factor = resolve_electricity_factor(&entry);

        check!(factor.value == 0.3);
        check!(factor.origin == FactorOrigin::SupplierFactor);
    }

    #[test]
    fn electricity_falls_back_to_co2_emission_factor_when_supplier_factor_is_unparseable() {
        let entry = Entry {
            supplier_factor: "n/a".into(),
            co2_emission_factor: "0.43".into(),
            ..Default::default()
        };

        let factor = resolve_electricity_factor(&entry);

        check!(factor.value == 0.43);
        check!(factor.origin == FactorOrigin::Co2EmissionFactor);
    }

    #[test]
    fn electricity_falls_back_to_default() {
        let factor = resolve_electricity_factor(&Entry::default());

        check!(factor.value == DEFAULT_ELECTRICITY_FACTOR);
        check!(factor.origin == FactorOrigin::Default);
    }

    #[test]
    fn electricity_keeps_explicit_zero_supplier_factor() {
        let entry = Entry {
            supplier_factor: "0".into(),
            ..Default::default()
        };

        check!(resolve_electricity_factor(&entry).value == 0.0);
    }

    #[test]
    fn blank_natural_gas_entry_resolves_to_default_table() {
        let factors = resolve_natural_gas_factors(&Entry::default());

        assert_eq!(
            factors,
            NaturalGasFactors {
                net_calorific_value: 184625.6,
                co2_emission: 56.1,
                ch4_emission: 1.0,
                n2o_emission: 0.1,
                ch4_global_warming_power: 21.0,
                n2o_global_warming_power: 310.0,
                conversion_factor: 4.186,
                explicit: false,
            }
        );
    }

    #[test]
    fn blank_fuel_entry_resolves_to_default_table() {
        let factors = resolve_diesel_factors(&Entry::default());

        assert_eq!(
            factors,
            DieselFactors {
                specific_gravity: 0.83,
                net_calorific_value: 10.272,
                co2_emission: 74.1,
                ch4_emission: 4.15,
                n2o_emission: 28.6,
                ch4_global_warming_power: 21.0,
                n2o_global_warming_power: 310.0,
                conversion_factor: 4.186,
            }
        );
    }

    #[test]
    fn natural_gas_overrides_single_parameter_and_marks_explicit() {
        let entry = Entry {
            co2_emission: "60".into(),
            ch4_emission: "garbage".into(),
            ..Default::default()
        };

        let factors = resolve_natural_gas_factors(&entry);

        check!(factors.co2_emission == 60.0);
        check!(factors.ch4_emission == NATURAL_GAS_CH4_EMISSION);
        check!(factors.explicit);
    }

    #[test]
    fn resolve_dispatches_on_category() {
        let entry = Entry::default();

        let_assert!(ResolvedFactors::Electricity(_) = resolve(Category::Electricity, &entry));
        let_assert!(ResolvedFactors::NaturalGas(_) = resolve(Category::NaturalGas, &entry));
        let_assert!(ResolvedFactors::Fuel(_) = resolve(Category::Fuel, &entry));
        for category in [
            Category::Cars,
            Category::Flights,
            Category::PublicTransport,
            Category::Refrigerants,
            Category::RemoteWorking,
        ]
        .iter()
        {
            let_assert!(ResolvedFactors::Generic { factor } = resolve(*category, &entry));
            check!(factor == GENERIC_EMISSION_FACTOR);
        }
    }
}
