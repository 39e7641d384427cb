mod numeric;
mod month;
mod category;
mod entry;
mod translations;
mod reporting_config;
mod user_settings;
pub mod emission_factors;
pub mod emissions_calculator;
pub mod aggregator;
pub mod production;
pub mod renewable;

pub use crate::model::numeric::{parse_leading_number, NumericField};
pub use crate::model::month::{Month, MonthlyData};
pub use crate::model::category::{classify, Category, Scope, UnknownCategory};
pub use crate::model::entry::{ElectricitySource, Entry, EntryCollection};
pub use crate::model::translations::{Translations, DEFAULT_LANGUAGE};
pub use crate::model::reporting_config::{NaturalGasMethod, ReportingConfig};
pub use crate::model::user_settings::UserSettings;
pub use crate::model::emission_factors::{resolve, ResolvedFactors};
pub use crate::model::emissions_calculator::{wtt_emissions, EmissionsCalculator, EntryEmissions};
pub use crate::model::aggregator::{Aggregator, EmissionsSummary};
pub use crate::model::production::{EmissionsIntensity, ProductionRecord, ProductionTotals};
pub use crate::model::renewable::{EnergyType, RenewableGeneration};
