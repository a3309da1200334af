//! Derivation Engine
//!
//! `derive()` turns the current selections into a fresh `DerivedSnapshot`:
//!
//! 1. Resolve every selected option against the catalog (missing => error)
//! 2. Sum prices and durations; per-unit options scale by the quantity
//! 3. Evaluate surcharge rules on top of the base sums
//! 4. Aggregate option effects into the declared metrics
//!
//! The function is pure. Snapshots are never patched in place; callers keep
//! the newest one and drop the old.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{OptionId, SlotId};
use crate::definition::WizardDefinition;
use crate::engine::financing::{FinancingQuote, FinancingTerms};
use crate::engine::metrics::{self, MetricValue};
use crate::error::{Result, WizardError};
use crate::selection::SelectionSnapshot;
use crate::types::{DurationUnit, Pricing};

/// Priced contribution of one selected option
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub slot: SlotId,
    pub option: OptionId,
    pub label: String,
    pub unit_price: u64,
    pub units: u32,
    pub amount: u64,
    pub duration: u32,
}

/// A surcharge rule that fired
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedSurcharge {
    pub name: String,
    pub label: String,
    pub cost: u64,
    pub duration: u32,
}

/// Totals and metrics computed from one selection state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSnapshot {
    pub line_items: Vec<LineItem>,
    /// Multiplier applied to per-unit options
    pub quantity: u32,
    pub base_cost: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub surcharges: Vec<AppliedSurcharge>,
    pub total_cost: u64,
    pub base_duration: u32,
    pub total_duration: u32,
    pub duration_unit: DurationUnit,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metrics: BTreeMap<String, MetricValue>,
}

impl DerivedSnapshot {
    pub fn surcharge_cost(&self) -> u64 {
        self.total_cost - self.base_cost
    }

    pub fn metric(&self, name: &str) -> Option<&MetricValue> {
        self.metrics.get(name)
    }

    /// Installment view of the total cost under the given terms
    pub fn financing(&self, terms: &FinancingTerms) -> FinancingQuote {
        terms.quote(self.total_cost)
    }
}

/// Recompute every derived value from the selections.
///
/// # Errors
///
/// `CatalogIntegrity` when a selected option (or a slot holding one) is not
/// in the definition's catalog. Contributions are never silently dropped.
pub fn derive(
    selection: &SelectionSnapshot,
    definition: &WizardDefinition,
) -> Result<DerivedSnapshot> {
    let catalog = &definition.catalog;
    let quantity = definition
        .quantity
        .as_ref()
        .and_then(|source| source.resolve(selection))
        .unwrap_or(1);

    let mut ordered = Vec::new();
    let mut contributions: BTreeMap<String, f64> = BTreeMap::new();

    for (slot, option_id) in selection.selected() {
        let integrity = || WizardError::catalog_integrity(slot.clone(), option_id.clone());
        let slot_pos = catalog
            .slots()
            .iter()
            .position(|s| &s.id == slot)
            .ok_or_else(integrity)?;
        let slot_def = &catalog.slots()[slot_pos];
        let option_pos = slot_def
            .options
            .iter()
            .position(|o| &o.id == option_id)
            .ok_or_else(integrity)?;
        let option = &slot_def.options[option_pos];

        let units = match option.pricing {
            Pricing::Fixed => 1,
            Pricing::PerUnit => quantity,
        };
        for (metric, delta) in &option.effects {
            *contributions.entry(metric.clone()).or_insert(0.0) += delta;
        }
        ordered.push((
            (slot_pos, option_pos),
            LineItem {
                slot: slot.clone(),
                option: option_id.clone(),
                label: option.label.clone(),
                unit_price: option.price,
                units,
                amount: option.price.saturating_mul(u64::from(units)),
                duration: option.duration.saturating_mul(units),
            },
        ));
    }

    // Catalog order, so summaries list items the way the wizard shows them
    ordered.sort_by_key(|(pos, _)| *pos);
    let line_items: Vec<LineItem> = ordered.into_iter().map(|(_, item)| item).collect();

    let base_cost = line_items
        .iter()
        .fold(0u64, |acc, item| acc.saturating_add(item.amount));
    let base_duration = line_items
        .iter()
        .fold(0u32, |acc, item| acc.saturating_add(item.duration));

    let mut surcharges = Vec::new();
    for rule in &definition.surcharges {
        if rule.applies(selection, catalog)? {
            surcharges.push(AppliedSurcharge {
                name: rule.name.clone(),
                label: rule.label.clone(),
                cost: rule.cost,
                duration: rule.duration,
            });
        }
    }
    let total_cost = surcharges
        .iter()
        .fold(base_cost, |acc, s| acc.saturating_add(s.cost));
    let total_duration = surcharges
        .iter()
        .fold(base_duration, |acc, s| acc.saturating_add(s.duration));

    Ok(DerivedSnapshot {
        line_items,
        quantity,
        base_cost,
        surcharges,
        total_cost,
        base_duration,
        total_duration,
        duration_unit: definition.duration_unit,
        metrics: metrics::evaluate(&definition.metrics, &contributions),
    })
}
