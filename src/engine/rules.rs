//! Conditional surcharges and quantity sources.
//!
//! A surcharge is a cost and/or duration add-on that belongs to a combination
//! of selections rather than to any single option (e.g. an ECU remap done by
//! a specialist with a dyno needs a calibration session). Rules are data: a
//! name, a list of conditions that must all hold, and the amounts to add.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, OptionId, SlotId};
use crate::error::Result;
use crate::selection::SelectionSnapshot;

/// One trigger condition of a surcharge rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "kebab-case")]
pub enum Condition {
    /// A specific option is chosen
    OptionSelected { slot: SlotId, option: OptionId },
    /// The slot holds any choice
    SlotFilled { slot: SlotId },
    /// Some chosen option carries the tag (in `slot`, or in any slot)
    TagSelected {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        slot: Option<SlotId>,
        tag: String,
    },
    /// A flag field is true
    FlagSet { field: String },
}

impl Condition {
    pub fn option_selected(slot: &str, option: &str) -> Self {
        Self::OptionSelected {
            slot: SlotId::from(slot),
            option: OptionId::from(option),
        }
    }

    pub fn tag_in(slot: &str, tag: &str) -> Self {
        Self::TagSelected {
            slot: Some(SlotId::from(slot)),
            tag: tag.to_string(),
        }
    }

    /// Evaluate against the selections.
    ///
    /// # Errors
    ///
    /// `CatalogIntegrity` when a tag lookup meets a selected id the catalog
    /// does not know.
    pub fn holds(&self, selection: &SelectionSnapshot, catalog: &Catalog) -> Result<bool> {
        match self {
            Self::OptionSelected { slot, option } => {
                Ok(selection.contains(slot.as_str(), option.as_str()))
            }
            Self::SlotFilled { slot } => Ok(selection.is_filled(slot.as_str())),
            Self::TagSelected { slot, tag } => {
                for (selected_slot, option) in selection.selected() {
                    if slot.as_ref().is_some_and(|s| s != selected_slot) {
                        continue;
                    }
                    if catalog.resolve(selected_slot, option)?.has_tag(tag) {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::FlagSet { field } => Ok(selection.flag(field).unwrap_or(false)),
        }
    }
}

/// Extra cost and duration triggered by a combination of selections
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurchargeRule {
    pub name: String,
    pub label: String,
    /// All conditions must hold
    pub when: Vec<Condition>,
    #[serde(default)]
    pub cost: u64,
    #[serde(default)]
    pub duration: u32,
}

impl SurchargeRule {
    pub fn new(name: &str, label: &str, cost: u64, duration: u32) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            when: Vec::new(),
            cost,
            duration,
        }
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when.push(condition);
        self
    }

    /// True when every condition holds; a rule without conditions never fires
    pub fn applies(&self, selection: &SelectionSnapshot, catalog: &Catalog) -> Result<bool> {
        if self.when.is_empty() {
            return Ok(false);
        }
        for condition in &self.when {
            if !condition.holds(selection, catalog)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Where the multiplier for per-unit prices comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum QuantitySource {
    /// Whole days between two date fields, at least one
    DaysBetween { start: String, end: String },
    /// A number field, rounded to the nearest whole unit
    Field { name: String },
}

impl QuantitySource {
    /// Resolve the quantity; None while inputs are missing or inconsistent
    pub fn resolve(&self, selection: &SelectionSnapshot) -> Option<u32> {
        match self {
            Self::DaysBetween { start, end } => {
                let (start, end) = (selection.date(start)?, selection.date(end)?);
                let days = (end - start).num_days();
                if days < 0 {
                    return None;
                }
                u32::try_from(days.max(1)).ok()
            }
            Self::Field { name } => {
                let n = selection.number(name)?;
                if !n.is_finite() || n < 0.0 {
                    return None;
                }
                Some(n.round() as u32)
            }
        }
    }
}
