use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Emission categories in their fixed enumeration order, which also decides
/// ties wherever categories are ranked.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Electricity,
    NaturalGas,
    Fuel,
    Cars,
    Flights,
    PublicTransport,
    Refrigerants,
    #[serde(alias = "homeWorkers")]
    RemoteWorking,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Debug)]
pub enum Scope {
    #[serde(rename = "SCOPE_1")]
    Scope1,
    #[serde(rename = "SCOPE_2")]
    Scope2,
    #[serde(rename = "SCOPE_3")]
    Scope3,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Electricity,
        Category::NaturalGas,
        Category::Fuel,
        Category::Cars,
        Category::Flights,
        Category::PublicTransport,
        Category::Refrigerants,
        Category::RemoteWorking,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Electricity => "electricity",
            Category::NaturalGas => "naturalGas",
            Category::Fuel => "fuel",
            Category::Cars => "cars",
            Category::Flights => "flights",
            Category::PublicTransport => "publicTransport",
            Category::Refrigerants => "refrigerants",
            Category::RemoteWorking => "remoteWorking",
        }
    }

    /// English label, used when no translation table provides one.
    pub fn default_label(self) -> &'static str {
        match self {
            Category::Electricity => "Electricity",
            Category::NaturalGas => "Natural Gas",
            Category::Fuel => "Fuel",
            Category::Cars => "Cars",
            Category::Flights => "Flights",
            Category::PublicTransport => "Public Transport",
            Category::Refrigerants => "Refrigerants",
            Category::RemoteWorking => "Remote Working",
        }
    }

    /// GHG Protocol scope of the category.
    pub fn scope(self) -> Scope {
        match self {
            Category::Fuel | Category::Cars | Category::NaturalGas | Category::Refrigerants => {
                Scope::Scope1
            }
            Category::Electricity => Scope::Scope2,
            Category::Flights | Category::PublicTransport | Category::RemoteWorking => {
                Scope::Scope3
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown emission category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "homeWorkers" => Ok(Category::RemoteWorking),
            _ => Category::ALL
                .iter()
                .copied()
                .find(|category| category.key() == key)
                .ok_or_else(|| UnknownCategory(key.to_string())),
        }
    }
}

/// Scope lookup on a raw category key; `None` for keys outside the fixed enumeration.
pub fn classify(category_key: &str) -> Option<Scope> {
    category_key.parse::<Category>().ok().map(Category::scope)
}

impl Scope {
    pub const ALL: [Scope; 3] = [Scope::Scope1, Scope::Scope2, Scope::Scope3];

    pub fn label(self) -> &'static str {
        match self {
            Scope::Scope1 => "Scope 1",
            Scope::Scope2 => "Scope 2",
            Scope::Scope3 => "Scope 3",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
