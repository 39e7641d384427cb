use crate::model::aggregator::MonthlyBreakdown;
use crate::model::{Month, MonthlyData};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A year of monthly production volumes. Saving a year replaces the whole
/// record; nothing is merged with what was stored before.
#[derive(Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRecord {
    pub year: i32,
    pub monthly_production: MonthlyData,
    pub annual_total: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductionTotals {
    pub monthly: [f64; 12],
    pub accumulated: [f64; 12],
    pub annual: f64,
}

/// Emissions per unit of output; 0 wherever production is 0.
#[derive(Copy, Clone, PartialEq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EmissionsIntensity {
    pub annual: f64,
    pub monthly: [f64; 12],
}

fn per_unit(emissions: f64, production: f64) -> f64 {
    if production != 0.0 {
        emissions / production
    } else {
        0.0
    }
}

impl ProductionRecord {
    pub fn new(year: i32, monthly_production: MonthlyData) -> Self {
        let annual_total = monthly_production.total();
        Self {
            year,
            monthly_production,
            annual_total,
            updated_at: None,
        }
    }

    pub fn totals(&self) -> ProductionTotals {
        ProductionTotals {
            monthly: self.monthly_production.values(),
            accumulated: self.monthly_production.accumulated(),
            annual: self.annual_total,
        }
    }

    /// Annual intensity divides the annual emissions total by the annual
    /// production; monthly intensity pairs each month row with its volume.
    pub fn emissions_intensity(
        &self,
        total_emissions: f64,
        monthly_breakdown: &MonthlyBreakdown,
    ) -> EmissionsIntensity {
        let production = self.monthly_production.values();
        let mut monthly = [0.0; 12];
        for (month, row) in Month::ALL.iter().zip(monthly_breakdown.months.iter()) {
            monthly[month.index()] = per_unit(row.emissions, production[month.index()]);
        }

        EmissionsIntensity {
            annual: per_unit(total_emissions, self.annual_total),
            monthly,
        }
    }
}
