use crate::config_client::SetDefaults;
use crate::model::Translations;
use serde::{Deserialize, Serialize};

/// How natural gas consumption is turned into emissions.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum NaturalGasMethod {
    /// Full IPCC chain when the entry carries any IPCC parameter, flat factor otherwise.
    Auto,
    /// Always the flat generic factor.
    FlatFactor,
    /// Always the full IPCC chain, defaults filling missing parameters.
    FullFormula,
}

impl Default for NaturalGasMethod {
    fn default() -> Self {
        NaturalGasMethod::Auto
    }
}

#[derive(Clone, Default, Serialize, Deserialize, Debug)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportingConfig {
    pub language: String,
    pub natural_gas_method: NaturalGasMethod,
    pub translations: Translations,
}

impl SetDefaults for ReportingConfig {
    fn set_defaults(&mut self) {
        if self.language.trim().is_empty() {
            self.language = "en".to_string();
        }
    }
}
