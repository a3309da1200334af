//! Wizard definitions: the declarative configuration of one wizard.
//!
//! A definition bundles the option catalog, free-form field declarations,
//! ordered steps, surcharge rules, metric declarations, the quantity source
//! for per-unit pricing, and optional financing terms. Definitions are plain
//! data and can be saved to and loaded from JSON files.

use anyhow::{Context, Result as AnyResult};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::catalog::{Catalog, SlotDefinition};
use crate::clock::Clock;
use crate::engine::financing::FinancingTerms;
use crate::engine::metrics::{MetricDefinition, MetricRule};
use crate::engine::rules::{Condition, QuantitySource, SurchargeRule};
use crate::error::{Result, WizardError};
use crate::selection::FieldValue;
use crate::step::{Step, StepCheck, StepDefinition};
use crate::types::{DurationUnit, FieldKind, WizardKind};

/// Initial value of a field, resolved when a session opens or resets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "default", rename_all = "kebab-case")]
pub enum FieldDefault {
    /// The clock's current date
    Today,
    /// The clock's current date shifted by `days`
    DaysFromToday { days: i64 },
    /// A fixed value
    Value { value: FieldValue },
}

impl FieldDefault {
    pub fn resolve(&self, clock: &dyn Clock) -> FieldValue {
        match self {
            Self::Today => FieldValue::Date(clock.today()),
            Self::DaysFromToday { days } => {
                let today = clock.today();
                FieldValue::Date(
                    TimeDelta::try_days(*days)
                        .and_then(|delta| today.checked_add_signed(delta))
                        .unwrap_or(today),
                )
            }
            Self::Value { value } => value.clone(),
        }
    }

    fn kind(&self) -> FieldKind {
        match self {
            Self::Today | Self::DaysFromToday { .. } => FieldKind::Date,
            Self::Value { value } => value.kind(),
        }
    }
}

/// Declaration of one free-form field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<FieldDefault>,
}

impl FieldSpec {
    pub fn new(name: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            kind,
            default: None,
        }
    }

    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// Complete configuration of one wizard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: WizardKind,
    #[serde(default)]
    pub duration_unit: DurationUnit,
    #[serde(rename = "slots")]
    pub catalog: Catalog,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
    pub steps: Vec<StepDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub surcharges: Vec<SurchargeRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metrics: Vec<MetricDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<QuantitySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<FinancingTerms>,
}

impl WizardDefinition {
    /// Save the definition to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> AnyResult<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize wizard definition to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write wizard definition to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load a definition from a JSON file (not yet validated)
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> AnyResult<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read wizard definition from {:?}", path.as_ref()))?;

        let definition: Self =
            serde_json::from_str(&content).context("Failed to parse wizard definition JSON")?;

        Ok(definition)
    }

    /// Declared kind of every field
    pub fn field_kinds(&self) -> BTreeMap<String, FieldKind> {
        self.fields
            .iter()
            .map(|f| (f.name.clone(), f.kind))
            .collect()
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Runtime steps, with patterns compiled
    pub fn build_steps(&self) -> Result<Vec<Step>> {
        self.steps
            .iter()
            .enumerate()
            .map(|(i, def)| Step::from_definition(i, def))
            .collect()
    }

    /// Check internal consistency of the definition.
    ///
    /// Every reference (slots, options, fields, metrics) must resolve, ids
    /// must be unique, and bounds and terms must be sane.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(WizardError::definition("wizard name must not be empty"));
        }
        if self.steps.is_empty() {
            return Err(WizardError::definition("a wizard needs at least one step"));
        }

        self.validate_catalog()?;
        self.validate_fields()?;
        for (index, step) in self.steps.iter().enumerate() {
            self.validate_step(index, step)?;
        }
        self.validate_surcharges()?;
        self.validate_metrics()?;

        if let Some(source) = &self.quantity {
            match source {
                QuantitySource::DaysBetween { start, end } => {
                    self.expect_field(start, FieldKind::Date, "quantity")?;
                    self.expect_field(end, FieldKind::Date, "quantity")?;
                }
                QuantitySource::Field { name } => {
                    self.expect_field(name, FieldKind::Number, "quantity")?;
                }
            }
        }

        if let Some(terms) = &self.financing {
            if terms.months == 0 {
                return Err(WizardError::definition("financing term must be at least one month"));
            }
            if !terms.annual_rate_pct.is_finite() || terms.annual_rate_pct < 0.0 {
                return Err(WizardError::definition("financing rate must be a non-negative number"));
            }
        }

        // Patterns compile
        self.build_steps().map(|_| ())
    }

    fn validate_catalog(&self) -> Result<()> {
        let mut slot_ids = BTreeSet::new();
        for slot in self.catalog.slots() {
            if !slot_ids.insert(slot.id.as_str()) {
                return Err(WizardError::definition(format!("duplicate slot '{}'", slot.id)));
            }
            if slot.options.is_empty() {
                return Err(WizardError::definition(format!("slot '{}' has no options", slot.id)));
            }
            let mut option_ids = BTreeSet::new();
            for option in &slot.options {
                if !option_ids.insert(option.id.as_str()) {
                    return Err(WizardError::definition(format!(
                        "duplicate option '{}' in slot '{}'",
                        option.id, slot.id
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_fields(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for field in &self.fields {
            if !names.insert(field.name.as_str()) {
                return Err(WizardError::definition(format!("duplicate field '{}'", field.name)));
            }
            if let Some(default) = &field.default {
                if default.kind() != field.kind {
                    return Err(WizardError::definition(format!(
                        "default of field '{}' is a {} value, field is {}",
                        field.name,
                        default.kind(),
                        field.kind
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_step(&self, index: usize, step: &StepDefinition) -> Result<()> {
        let ctx = format!("step {} ('{}')", index + 1, step.title);
        for slot in &step.required_slots {
            self.expect_slot(slot.as_str(), &ctx)?;
        }
        for field in &step.required_fields {
            if self.field(field).is_none() {
                return Err(WizardError::definition(format!(
                    "{ctx} requires unknown field '{field}'"
                )));
            }
        }
        for check in &step.checks {
            match check {
                StepCheck::DateOrder { start, end } => {
                    self.expect_field(start, FieldKind::Date, &ctx)?;
                    self.expect_field(end, FieldKind::Date, &ctx)?;
                }
                StepCheck::FlagSet { field } => self.expect_field(field, FieldKind::Flag, &ctx)?,
                StepCheck::MinNumber { field, .. } => {
                    self.expect_field(field, FieldKind::Number, &ctx)?
                }
                StepCheck::Pattern { field, .. } => {
                    self.expect_field(field, FieldKind::Text, &ctx)?
                }
                StepCheck::AnyFilled { slots } => {
                    if slots.is_empty() {
                        return Err(WizardError::definition(format!(
                            "{ctx} has an any-filled check without slots"
                        )));
                    }
                    for slot in slots {
                        self.expect_slot(slot.as_str(), &ctx)?;
                    }
                }
                StepCheck::TagRequires { if_slot, then_slot, .. } => {
                    self.expect_slot(if_slot.as_str(), &ctx)?;
                    self.expect_slot(then_slot.as_str(), &ctx)?;
                }
            }
        }
        Ok(())
    }

    fn validate_surcharges(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for rule in &self.surcharges {
            let ctx = format!("surcharge '{}'", rule.name);
            if !names.insert(rule.name.as_str()) {
                return Err(WizardError::definition(format!("duplicate {ctx}")));
            }
            if rule.when.is_empty() {
                return Err(WizardError::definition(format!("{ctx} has no trigger conditions")));
            }
            for condition in &rule.when {
                match condition {
                    Condition::OptionSelected { slot, option } => {
                        let def = self.expect_slot(slot.as_str(), &ctx)?;
                        if !def.contains(option.as_str()) {
                            return Err(WizardError::definition(format!(
                                "{ctx} references unknown option '{option}' of slot '{slot}'"
                            )));
                        }
                    }
                    Condition::SlotFilled { slot } => {
                        self.expect_slot(slot.as_str(), &ctx)?;
                    }
                    Condition::TagSelected { slot, .. } => {
                        if let Some(slot) = slot {
                            self.expect_slot(slot.as_str(), &ctx)?;
                        }
                    }
                    Condition::FlagSet { field } => {
                        self.expect_field(field, FieldKind::Flag, &ctx)?
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_metrics(&self) -> Result<()> {
        let mut names = BTreeMap::new();
        for metric in &self.metrics {
            if names.insert(metric.name.as_str(), metric).is_some() {
                return Err(WizardError::definition(format!("duplicate metric '{}'", metric.name)));
            }
            if let (Some(floor), Some(ceiling)) = (metric.floor, metric.ceiling) {
                if floor > ceiling {
                    return Err(WizardError::definition(format!(
                        "metric '{}' has floor {} above ceiling {}",
                        metric.name, floor, ceiling
                    )));
                }
            }
        }
        for metric in &self.metrics {
            if let MetricRule::Dampened { driver, .. } = &metric.rule {
                match names.get(driver.as_str()) {
                    Some(d) if d.rule == MetricRule::Additive => {}
                    Some(_) => {
                        return Err(WizardError::definition(format!(
                            "metric '{}' is dampened by '{}', which is not additive",
                            metric.name, driver
                        )));
                    }
                    None => {
                        return Err(WizardError::definition(format!(
                            "metric '{}' is dampened by unknown metric '{}'",
                            metric.name, driver
                        )));
                    }
                }
            }
        }
        for slot in self.catalog.slots() {
            for option in &slot.options {
                for metric in option.effects.keys() {
                    if !names.contains_key(metric.as_str()) {
                        return Err(WizardError::definition(format!(
                            "option '{}' of slot '{}' affects undeclared metric '{}'",
                            option.id, slot.id, metric
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn expect_slot(&self, slot: &str, ctx: &str) -> Result<&SlotDefinition> {
        self.catalog.slot(slot).ok_or_else(|| {
            WizardError::definition(format!("{ctx} references unknown slot '{slot}'"))
        })
    }

    fn expect_field(&self, name: &str, kind: FieldKind, ctx: &str) -> Result<()> {
        match self.field(name) {
            Some(field) if field.kind == kind => Ok(()),
            Some(field) => Err(WizardError::definition(format!(
                "{ctx} needs '{name}' to be a {kind} field, it is {}",
                field.kind
            ))),
            None => Err(WizardError::definition(format!(
                "{ctx} references unknown field '{name}'"
            ))),
        }
    }
}
