//! Type-safe enums shared by definitions, the store and the engine
//!
//! Stringly-typed settings from wizard definitions are parsed into these enums
//! once, so the rest of the engine matches exhaustively.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// How many options a slot may hold at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Cardinality {
    /// At most one option; selecting it again clears the slot
    #[default]
    Single,
    /// Any subset of the catalog
    Multi,
}

/// Which product flow a definition drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WizardKind {
    Performance,
    Rental,
    DriverOnboarding,
    #[default]
    Custom,
}

/// Unit of the aggregated duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Hours,
    Days,
}

/// Declared type of a free-form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Number,
    Flag,
    Date,
}

/// How an option's price scales
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Pricing {
    /// Charged once
    #[default]
    Fixed,
    /// Multiplied by the definition's quantity (e.g. rental days)
    PerUnit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_cardinality_parse() {
        assert_eq!("single".parse::<Cardinality>().unwrap(), Cardinality::Single);
        assert_eq!("multi".parse::<Cardinality>().unwrap(), Cardinality::Multi);
        assert!("several".parse::<Cardinality>().is_err());
    }

    #[test]
    fn test_kind_display_matches_serde() {
        for kind in WizardKind::iter() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn test_pricing_default_is_fixed() {
        assert_eq!(Pricing::default(), Pricing::Fixed);
        assert_eq!(Pricing::PerUnit.to_string(), "per-unit");
    }
}
