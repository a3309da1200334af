//! Option catalogs
//!
//! A catalog lists every slot a wizard exposes together with the options a
//! user may pick for it. Catalogs are static configuration: they are loaded
//! once when a wizard opens and never change for the life of the session.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{Result, WizardError};
use crate::types::{Cardinality, Pricing};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Stable identifier of a selectable category (e.g. `intake`, `insurance`)
    SlotId
);

string_id!(
    /// Stable identifier of one catalog choice within a slot
    OptionId
);

/// One concrete choice for a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogOption {
    pub id: OptionId,
    pub label: String,
    /// Price in whole currency units
    #[serde(default)]
    pub price: u64,
    #[serde(default)]
    pub pricing: Pricing,
    /// Work or booking time, in the definition's duration unit
    #[serde(default)]
    pub duration: u32,
    /// Signed contribution to named metrics
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub effects: BTreeMap<String, f64>,
    /// Compatibility and trigger tags (e.g. `ecu-tuning`, `dyno`)
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl CatalogOption {
    /// Create a fixed-price option with no duration, effects or tags
    pub fn new(id: &str, label: &str, price: u64) -> Self {
        Self {
            id: OptionId::from(id),
            label: label.to_string(),
            price,
            pricing: Pricing::Fixed,
            duration: 0,
            effects: BTreeMap::new(),
            tags: BTreeSet::new(),
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_effect(mut self, metric: &str, delta: f64) -> Self {
        self.effects.insert(metric.to_string(), delta);
        self
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tags.insert(tag.to_string());
        self
    }

    /// Charge the price (and duration) once per unit of quantity
    pub fn per_unit(mut self) -> Self {
        self.pricing = Pricing::PerUnit;
        self
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// A named selectable category and its options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotDefinition {
    pub id: SlotId,
    pub label: String,
    #[serde(default)]
    pub cardinality: Cardinality,
    pub options: Vec<CatalogOption>,
}

impl SlotDefinition {
    pub fn single(id: &str, label: &str, options: Vec<CatalogOption>) -> Self {
        Self {
            id: SlotId::from(id),
            label: label.to_string(),
            cardinality: Cardinality::Single,
            options,
        }
    }

    pub fn multi(id: &str, label: &str, options: Vec<CatalogOption>) -> Self {
        Self {
            id: SlotId::from(id),
            label: label.to_string(),
            cardinality: Cardinality::Multi,
            options,
        }
    }

    /// Look up an option by id
    pub fn option(&self, id: &str) -> Option<&CatalogOption> {
        self.options.iter().find(|o| o.id.as_str() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.option(id).is_some()
    }
}

/// Every slot of a wizard, in display order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    slots: Vec<SlotDefinition>,
}

impl Catalog {
    pub fn new(slots: Vec<SlotDefinition>) -> Self {
        Self { slots }
    }

    pub fn slots(&self) -> &[SlotDefinition] {
        &self.slots
    }

    pub fn slot(&self, id: &str) -> Option<&SlotDefinition> {
        self.slots.iter().find(|s| s.id.as_str() == id)
    }

    pub fn option(&self, slot: &str, option: &str) -> Option<&CatalogOption> {
        self.slot(slot).and_then(|s| s.option(option))
    }

    /// Resolve a stored selection, failing loudly when the catalog lost it.
    ///
    /// Used by derivation: a selected id missing here means the catalog and the
    /// store disagree, which is a data error and never a zero contribution.
    pub fn resolve(&self, slot: &SlotId, option: &OptionId) -> Result<&CatalogOption> {
        self.option(slot.as_str(), option.as_str())
            .ok_or_else(|| WizardError::catalog_integrity(slot.clone(), option.clone()))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brakes() -> SlotDefinition {
        SlotDefinition::multi(
            "brakes",
            "Brake upgrades",
            vec![
                CatalogOption::new("big-brake-kit", "Big brake kit", 70000)
                    .with_duration(5)
                    .with_effect("braking_distance", -5.0),
                CatalogOption::new("pads", "Performance pads", 12000).with_tag("street"),
            ],
        )
    }

    #[test]
    fn test_option_builder() {
        let option = CatalogOption::new("stage-1", "ECU remap", 15000)
            .with_duration(3)
            .with_effect("horsepower", 30.0)
            .with_tag("ecu-tuning");
        assert_eq!(option.id.as_str(), "stage-1");
        assert_eq!(option.pricing, Pricing::Fixed);
        assert_eq!(option.duration, 3);
        assert_eq!(option.effects.get("horsepower"), Some(&30.0));
        assert!(option.has_tag("ecu-tuning"));
        assert_eq!(option.per_unit().pricing, Pricing::PerUnit);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = Catalog::new(vec![brakes()]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.slot("brakes").is_some());
        assert!(catalog.slot("intake").is_none());
        assert_eq!(
            catalog.option("brakes", "pads").map(|o| o.price),
            Some(12000)
        );
        assert!(catalog.option("brakes", "drums").is_none());
    }

    #[test]
    fn test_resolve_missing_is_integrity_error() {
        let catalog = Catalog::new(vec![brakes()]);
        let err = catalog
            .resolve(&SlotId::from("brakes"), &OptionId::from("drums"))
            .unwrap_err();
        assert!(matches!(err, WizardError::CatalogIntegrity { .. }));
    }

    #[test]
    fn test_option_serde_omits_empty_collections() {
        let option = CatalogOption::new("gps", "GPS unit", 200).per_unit();
        let json = serde_json::to_value(&option).unwrap();
        assert!(json.get("effects").is_none());
        assert!(json.get("tags").is_none());
        assert_eq!(json["pricing"], "per-unit");

        let parsed: CatalogOption =
            serde_json::from_str(r#"{"id":"gps","label":"GPS unit"}"#).unwrap();
        assert_eq!(parsed.price, 0);
        assert_eq!(parsed.pricing, Pricing::Fixed);
    }
}
