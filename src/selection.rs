//! Selection Store
//!
//! Holds the current value of every slot plus the free-form fields of one
//! wizard session. The store is the only mutable state of a session and
//! enforces its invariants centrally:
//!
//! - a slot only ever references option ids present in its catalog,
//! - single slots use toggle semantics (selecting the current id clears it),
//! - every successful mutation bumps a revision counter,
//! - once sealed (the wizard completed) all mutation is rejected until
//!   the store is cleared.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::catalog::{Catalog, OptionId, SlotId};
use crate::error::{Result, WizardError};
use crate::types::{Cardinality, FieldKind};

/// Value of a free-form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Flag(bool),
    Date(NaiveDate),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Number(_) => FieldKind::Number,
            Self::Flag(_) => FieldKind::Flag,
            Self::Date(_) => FieldKind::Date,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Blank text counts as unset for required-field checks
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(s) if s.trim().is_empty())
    }
}

/// Current value of one slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    Single(Option<OptionId>),
    Multi(BTreeSet<OptionId>),
}

impl SlotValue {
    fn empty(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Single => Self::Single(None),
            Cardinality::Multi => Self::Multi(BTreeSet::new()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(v) => v.is_none(),
            Self::Multi(set) => set.is_empty(),
        }
    }

    pub fn contains(&self, option: &str) -> bool {
        match self {
            Self::Single(v) => v.as_ref().is_some_and(|id| id.as_str() == option),
            Self::Multi(set) => set.contains(option),
        }
    }

    /// Chosen ids, in stable order
    pub fn ids(&self) -> Vec<&OptionId> {
        match self {
            Self::Single(v) => v.iter().collect(),
            Self::Multi(set) => set.iter().collect(),
        }
    }
}

/// Read-only view of every slot and field value at one point in time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub slots: BTreeMap<SlotId, SlotValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, FieldValue>,
}

impl SelectionSnapshot {
    pub fn slot(&self, slot: &str) -> Option<&SlotValue> {
        self.slots.get(slot)
    }

    pub fn is_filled(&self, slot: &str) -> bool {
        self.slot(slot).is_some_and(|v| !v.is_empty())
    }

    pub fn contains(&self, slot: &str, option: &str) -> bool {
        self.slot(slot).is_some_and(|v| v.contains(option))
    }

    /// The chosen id of a single slot
    pub fn single(&self, slot: &str) -> Option<&OptionId> {
        match self.slot(slot) {
            Some(SlotValue::Single(v)) => v.as_ref(),
            _ => None,
        }
    }

    /// Every populated `(slot, option)` pair in slot order
    pub fn selected(&self) -> impl Iterator<Item = (&SlotId, &OptionId)> {
        self.slots
            .iter()
            .flat_map(|(slot, value)| value.ids().into_iter().map(move |id| (slot, id)))
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(FieldValue::as_text)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.field(name).and_then(FieldValue::as_number)
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.field(name).and_then(FieldValue::as_flag)
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        self.field(name).and_then(FieldValue::as_date)
    }

    /// True when the field holds a value that is not blank text
    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some_and(|v| !v.is_blank())
    }

    /// True when no slot and no field holds a value
    pub fn is_empty(&self) -> bool {
        self.slots.values().all(SlotValue::is_empty) && self.fields.is_empty()
    }
}

/// Mutable selection state of one wizard session
#[derive(Debug, Clone)]
pub struct SelectionStore {
    catalog: Arc<Catalog>,
    field_kinds: BTreeMap<String, FieldKind>,
    values: SelectionSnapshot,
    revision: u64,
    sealed: bool,
}

impl SelectionStore {
    /// Create an empty store for the given catalog and declared fields
    pub fn new(catalog: Arc<Catalog>, field_kinds: BTreeMap<String, FieldKind>) -> Self {
        let values = Self::empty_values(&catalog);
        Self {
            catalog,
            field_kinds,
            values,
            revision: 0,
            sealed: false,
        }
    }

    fn empty_values(catalog: &Catalog) -> SelectionSnapshot {
        SelectionSnapshot {
            slots: catalog
                .slots()
                .iter()
                .map(|s| (s.id.clone(), SlotValue::empty(s.cardinality)))
                .collect(),
            fields: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Monotonic mutation counter, for cheap staleness checks
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Reject every further mutation until `clear()`
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.sealed {
            return Err(WizardError::ResetAfterComplete);
        }
        Ok(())
    }

    fn checked_slot(
        &self,
        slot: &str,
        expected: Cardinality,
        option: Option<&str>,
    ) -> Result<SlotId> {
        let def = self
            .catalog
            .slot(slot)
            .ok_or_else(|| WizardError::UnknownSlot(SlotId::from(slot)))?;
        if def.cardinality != expected {
            return Err(WizardError::CardinalityMismatch {
                slot: def.id.clone(),
                cardinality: def.cardinality,
            });
        }
        if let Some(option) = option {
            if !def.contains(option) {
                return Err(WizardError::invalid_option(def.id.clone(), option));
            }
        }
        Ok(def.id.clone())
    }

    /// Replace a single slot's value.
    ///
    /// Passing the id that is already selected clears the slot; `None` clears
    /// it unconditionally. Returns the slot's new value.
    pub fn set_single(&mut self, slot: &str, option: Option<&str>) -> Result<Option<OptionId>> {
        self.ensure_writable()?;
        let slot_id = self.checked_slot(slot, Cardinality::Single, option)?;

        let next = match (self.values.single(slot), option) {
            (Some(current), Some(requested)) if current.as_str() == requested => None,
            (_, requested) => requested.map(OptionId::from),
        };
        self.values
            .slots
            .insert(slot_id, SlotValue::Single(next.clone()));
        self.revision += 1;
        Ok(next)
    }

    /// Add the option to a multi slot if absent, remove it if present.
    ///
    /// Returns true when the option is selected afterwards.
    pub fn toggle_multi(&mut self, slot: &str, option: &str) -> Result<bool> {
        self.ensure_writable()?;
        let slot_id = self.checked_slot(slot, Cardinality::Multi, Some(option))?;

        let entry = self
            .values
            .slots
            .entry(slot_id)
            .or_insert_with(|| SlotValue::Multi(BTreeSet::new()));
        let selected = match entry {
            SlotValue::Multi(set) => {
                if set.remove(option) {
                    false
                } else {
                    set.insert(OptionId::from(option));
                    true
                }
            }
            // checked_slot guarantees a multi slot
            SlotValue::Single(_) => false,
        };
        self.revision += 1;
        Ok(selected)
    }

    /// Assign a free-form field declared by the definition
    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        self.ensure_writable()?;
        let expected = *self
            .field_kinds
            .get(name)
            .ok_or_else(|| WizardError::UnknownField(name.to_string()))?;
        if value.kind() != expected {
            return Err(WizardError::FieldKindMismatch {
                field: name.to_string(),
                expected,
                found: value.kind(),
            });
        }
        self.values.fields.insert(name.to_string(), value);
        self.revision += 1;
        Ok(())
    }

    pub fn clear_field(&mut self, name: &str) -> Result<()> {
        self.ensure_writable()?;
        if !self.field_kinds.contains_key(name) {
            return Err(WizardError::UnknownField(name.to_string()));
        }
        self.values.fields.remove(name);
        self.revision += 1;
        Ok(())
    }

    /// Borrowed view of the current values
    pub fn values(&self) -> &SelectionSnapshot {
        &self.values
    }

    /// Owned read-only copy of the current values
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.values.clone()
    }

    /// Empty every slot and field and lift the seal.
    ///
    /// The revision keeps counting so that values derived before the clear
    /// are recognizably stale.
    pub fn clear(&mut self) {
        self.values = Self::empty_values(&self.catalog);
        self.sealed = false;
        self.revision += 1;
    }
}
