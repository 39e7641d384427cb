use crate::model::MonthlyData;
use serde::{Deserialize, Serialize};

/// Avoided emissions per MWh of self-generated renewable electricity.
pub const RENEWABLE_REDUCTION_FACTOR: f64 = 1.0;

#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub enum EnergyType {
    Solar,
    Wind,
    Hydro,
    Fusion,
}

impl EnergyType {
    pub fn label(self) -> &'static str {
        match self {
            EnergyType::Solar => "Solar Energy",
            EnergyType::Wind => "Wind Energy",
            EnergyType::Hydro => "Hydroelectric",
            EnergyType::Fusion => "Nuclear Fusion",
        }
    }
}

/// Monthly MWh generated by one renewable installation.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RenewableGeneration {
    pub id: i64,
    #[serde(rename = "type")]
    pub energy_type: EnergyType,
    pub data: MonthlyData,
}

#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerationTotals {
    pub annual: f64,
    pub monthly_average: f64,
    pub co2_reduction: f64,
}

impl RenewableGeneration {
    pub fn totals(&self) -> GenerationTotals {
        let annual = self.data.total();
        GenerationTotals {
            annual,
            monthly_average: annual / 12.0,
            co2_reduction: annual * RENEWABLE_REDUCTION_FACTOR,
        }
    }
}

/// Avoided tCO₂ across all installations.
pub fn total_reduction(generations: &[RenewableGeneration]) -> f64 {
    generations
        .iter()
        .map(|generation| generation.totals().co2_reduction)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    #[test]
    fn totals_use_one_tonne_per_mwh() {
        let generation = RenewableGeneration {
            id: 1,
            energy_type: EnergyType::Solar,
            data: MonthlyData::from_values(["10", "20", "", "", "", "", "", "", "", "", "", "6"]),
        };

        let totals = generation.totals();

        check!(totals.annual == 36.0);
        check!(totals.monthly_average == 3.0);
        check!(totals.co2_reduction == 36.0);
    }

    #[test]
    fn total_reduction_sums_installations() {
        let_assert!(
            Ok(generations) = serde_json::from_str::<Vec<RenewableGeneration>>(
                r#"[
  {"id": 1, "type": "Solar", "data": {"jan": "5"}},
  {"id": 2, "type": "Wind", "data": {"jun": "7.5", "jul": "bad"}}
]"#
            )
        );

        check!(total_reduction(&generations) == 12.5);
        check!(generations[1].energy_type.label() == "Wind Energy");
    }
}
