//! Step Controller
//!
//! This module provides the authoritative source of truth for wizard progress.
//! It enforces valid transitions and makes it impossible to skip steps.
//!
//! # Design Principles
//!
//! - **Linear**: `advance()` moves exactly one step forward, `retreat()` one back
//! - **Gated**: a step is left forward only when its requirements hold
//! - **Fail Fast**: a rejected advance reports every unmet requirement at once
//!   and leaves the position untouched
//!
//! # Position Flow
//!
//! ```text
//! Step 0 <-> Step 1 <-> ... <-> Step n-1
//!                                  |
//!                                  v  (advance, validated)
//!                               Complete   (only reset() leaves it)
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{Catalog, SlotId};
use crate::error::{Result, WizardError};
use crate::selection::SelectionSnapshot;

/// Where the wizard currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepPosition {
    /// Zero-based index of the active step
    At(usize),
    /// Virtual terminal state after the last step
    Complete,
}

impl StepPosition {
    #[inline]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::At(i) => Some(i),
            Self::Complete => None,
        }
    }

    #[inline]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl fmt::Display for StepPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(i) => write!(f, "step {}", i + 1),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// One unmet requirement, suitable for a field-level message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail", rename_all = "lowercase")]
pub enum Requirement {
    /// A required slot is empty
    Slot(SlotId),
    /// A required field is unset or blank
    Field(String),
    /// A declarative or custom check failed
    Check { name: String, message: String },
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot(slot) => write!(f, "select an option for '{}'", slot),
            Self::Field(field) => write!(f, "'{}' is required", field),
            Self::Check { message, .. } => f.write_str(message),
        }
    }
}

/// The current step's requirements are not satisfied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Step {} is incomplete: {}", .step + 1, join_requirements(.unmet))]
pub struct StepValidationError {
    /// Zero-based index of the rejecting step
    pub step: usize,
    pub unmet: Vec<Requirement>,
}

fn join_requirements(unmet: &[Requirement]) -> String {
    unmet
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors for moves the controller never allows
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepTransitionError {
    #[error("Wizard is complete; only reset is possible")]
    FromComplete,

    #[error("Summary can only be assembled once the wizard is complete (currently at {at})")]
    NotComplete { at: StepPosition },
}

/// Declarative predicate over the whole selection state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "kebab-case")]
pub enum StepCheck {
    /// `end` must not be earlier than `start` (skipped while either is unset)
    DateOrder { start: String, end: String },
    /// A flag field must be true (e.g. terms accepted)
    FlagSet { field: String },
    /// A number field must be at least `min` (skipped while unset)
    MinNumber { field: String, min: f64 },
    /// A text field must match the pattern (skipped while unset)
    Pattern { field: String, pattern: String },
    /// At least one of the slots must be filled
    AnyFilled { slots: Vec<SlotId> },
    /// Choosing an option tagged `if_tag` in `if_slot` requires an option
    /// tagged `then_tag` in `then_slot`
    TagRequires {
        if_slot: SlotId,
        if_tag: String,
        then_slot: SlotId,
        then_tag: String,
    },
}

impl StepCheck {
    /// Stable name used in reported requirements
    pub fn name(&self) -> String {
        match self {
            Self::DateOrder { start, end } => format!("date-order:{start}:{end}"),
            Self::FlagSet { field } => format!("flag-set:{field}"),
            Self::MinNumber { field, .. } => format!("min-number:{field}"),
            Self::Pattern { field, .. } => format!("pattern:{field}"),
            Self::AnyFilled { .. } => "any-filled".to_string(),
            Self::TagRequires { if_slot, then_slot, .. } => {
                format!("tag-requires:{if_slot}:{then_slot}")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            Self::DateOrder { start, end } => format!("'{end}' must not be before '{start}'"),
            Self::FlagSet { field } => format!("'{field}' must be confirmed"),
            Self::MinNumber { field, min } => format!("'{field}' must be at least {min}"),
            Self::Pattern { field, .. } => format!("'{field}' has an invalid format"),
            Self::AnyFilled { slots } => {
                let names: Vec<&str> = slots.iter().map(SlotId::as_str).collect();
                format!("choose at least one of: {}", names.join(", "))
            }
            Self::TagRequires {
                if_slot,
                if_tag,
                then_slot,
                then_tag,
            } => format!(
                "a '{if_tag}' choice in '{if_slot}' needs a '{then_tag}' choice in '{then_slot}'"
            ),
        }
    }
}

type Predicate = dyn Fn(&SelectionSnapshot) -> bool + Send + Sync;

/// Programmatic predicate attached to a step in code
#[derive(Clone)]
pub struct CustomCheck {
    pub name: String,
    pub message: String,
    predicate: Arc<Predicate>,
}

impl CustomCheck {
    pub fn new<F>(name: &str, message: &str, predicate: F) -> Self
    where
        F: Fn(&SelectionSnapshot) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            message: message.to_string(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn holds(&self, snapshot: &SelectionSnapshot) -> bool {
        (self.predicate)(snapshot)
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCheck")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Declarative configuration of one step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepDefinition {
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_slots: Vec<SlotId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<StepCheck>,
    /// Code-only predicates; not part of the serialized definition
    #[serde(skip)]
    pub custom: Vec<CustomCheck>,
}

impl StepDefinition {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn require_slot(mut self, slot: &str) -> Self {
        self.required_slots.push(SlotId::from(slot));
        self
    }

    pub fn require_field(mut self, field: &str) -> Self {
        self.required_fields.push(field.to_string());
        self
    }

    pub fn check(mut self, check: StepCheck) -> Self {
        self.checks.push(check);
        self
    }

    pub fn custom_check(mut self, check: CustomCheck) -> Self {
        self.custom.push(check);
        self
    }
}

/// A check ready for evaluation (patterns compiled once)
#[derive(Debug, Clone)]
struct CompiledCheck {
    check: StepCheck,
    regex: Option<Regex>,
}

impl CompiledCheck {
    fn compile(check: &StepCheck) -> Result<Self> {
        let regex = match check {
            StepCheck::Pattern { field, pattern } => Some(Regex::new(pattern).map_err(|e| {
                WizardError::definition(format!("invalid pattern for field '{field}': {e}"))
            })?),
            _ => None,
        };
        Ok(Self {
            check: check.clone(),
            regex,
        })
    }

    fn holds(&self, snapshot: &SelectionSnapshot, catalog: &Catalog) -> bool {
        match &self.check {
            StepCheck::DateOrder { start, end } => {
                match (snapshot.date(start), snapshot.date(end)) {
                    (Some(s), Some(e)) => e >= s,
                    _ => true,
                }
            }
            StepCheck::FlagSet { field } => snapshot.flag(field).unwrap_or(false),
            StepCheck::MinNumber { field, min } => {
                snapshot.number(field).is_none_or(|n| n >= *min)
            }
            StepCheck::Pattern { field, .. } => match (snapshot.text(field), &self.regex) {
                (Some(text), Some(re)) => re.is_match(text.trim()),
                _ => true,
            },
            StepCheck::AnyFilled { slots } => slots.iter().any(|s| snapshot.is_filled(s.as_str())),
            StepCheck::TagRequires {
                if_slot,
                if_tag,
                then_slot,
                then_tag,
            } => {
                let tagged = |slot: &SlotId, tag: &str| {
                    snapshot.slot(slot.as_str()).is_some_and(|value| {
                        value.ids().into_iter().any(|id| {
                            catalog
                                .option(slot.as_str(), id.as_str())
                                .is_some_and(|o| o.has_tag(tag))
                        })
                    })
                };
                !tagged(if_slot, if_tag) || tagged(then_slot, then_tag)
            }
        }
    }
}

/// Runtime form of a step: immutable after construction
#[derive(Debug, Clone)]
pub struct Step {
    index: usize,
    title: String,
    required_slots: Vec<SlotId>,
    required_fields: Vec<String>,
    checks: Vec<CompiledCheck>,
    custom: Vec<CustomCheck>,
}

impl Step {
    pub fn from_definition(index: usize, def: &StepDefinition) -> Result<Self> {
        let checks = def
            .checks
            .iter()
            .map(CompiledCheck::compile)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            index,
            title: def.title.clone(),
            required_slots: def.required_slots.clone(),
            required_fields: def.required_fields.clone(),
            checks,
            custom: def.custom.clone(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn required_slots(&self) -> &[SlotId] {
        &self.required_slots
    }

    /// Every unmet requirement, in declaration order: slots, fields, checks,
    /// then custom predicates.
    pub fn unmet(&self, snapshot: &SelectionSnapshot, catalog: &Catalog) -> Vec<Requirement> {
        let slots = self
            .required_slots
            .iter()
            .filter(|s| !snapshot.is_filled(s.as_str()))
            .map(|s| Requirement::Slot(s.clone()));
        let fields = self
            .required_fields
            .iter()
            .filter(|f| !snapshot.has_field(f))
            .map(|f| Requirement::Field(f.clone()));
        let checks = self
            .checks
            .iter()
            .filter(|c| !c.holds(snapshot, catalog))
            .map(|c| Requirement::Check {
                name: c.check.name(),
                message: c.check.message(),
            });
        let custom = self
            .custom
            .iter()
            .filter(|c| !c.holds(snapshot))
            .map(|c| Requirement::Check {
                name: c.name.clone(),
                message: c.message.clone(),
            });

        slots.chain(fields).chain(checks).chain(custom).collect()
    }
}

/// Owns the current position and the immutable step list.
///
/// # Example
///
/// ```
/// use vehicle_wizard::catalog::Catalog;
/// use vehicle_wizard::selection::SelectionSnapshot;
/// use vehicle_wizard::step::{Step, StepController, StepDefinition, StepPosition};
///
/// let steps = vec![
///     Step::from_definition(0, &StepDefinition::new("Choose")).unwrap(),
///     Step::from_definition(1, &StepDefinition::new("Confirm")).unwrap(),
/// ];
/// let mut controller = StepController::new(steps).unwrap();
/// let catalog = Catalog::default();
/// let snapshot = SelectionSnapshot::default();
///
/// controller.advance(&snapshot, &catalog).unwrap();
/// controller.advance(&snapshot, &catalog).unwrap();
/// assert_eq!(controller.position(), StepPosition::Complete);
/// ```
#[derive(Debug, Clone)]
pub struct StepController {
    steps: Vec<Step>,
    position: StepPosition,
}

impl StepController {
    /// Create a controller positioned at the first step
    pub fn new(steps: Vec<Step>) -> Result<Self> {
        if steps.is_empty() {
            return Err(WizardError::definition("a wizard needs at least one step"));
        }
        Ok(Self {
            steps,
            position: StepPosition::At(0),
        })
    }

    #[inline]
    pub fn position(&self) -> StepPosition {
        self.position
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The active step, or None once complete
    pub fn current_step(&self) -> Option<&Step> {
        self.position.index().and_then(|i| self.steps.get(i))
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.position.is_complete()
    }

    /// Share of steps passed, 0-100
    pub fn progress_percent(&self) -> u8 {
        let done = self.position.index().unwrap_or(self.steps.len());
        ((done * 100) / self.steps.len()) as u8
    }

    /// Unmet requirements of the active step (empty once complete)
    pub fn unmet(&self, snapshot: &SelectionSnapshot, catalog: &Catalog) -> Vec<Requirement> {
        self.current_step()
            .map(|step| step.unmet(snapshot, catalog))
            .unwrap_or_default()
    }

    /// Validate the active step and move forward by one.
    ///
    /// # Errors
    ///
    /// - `StepValidation` listing every unmet requirement; position unchanged
    /// - `Transition` when already complete
    pub fn advance(
        &mut self,
        snapshot: &SelectionSnapshot,
        catalog: &Catalog,
    ) -> Result<StepPosition> {
        let index = self
            .position
            .index()
            .ok_or(StepTransitionError::FromComplete)?;

        let unmet = self.steps[index].unmet(snapshot, catalog);
        if !unmet.is_empty() {
            return Err(StepValidationError { step: index, unmet }.into());
        }

        self.position = if index + 1 < self.steps.len() {
            StepPosition::At(index + 1)
        } else {
            StepPosition::Complete
        };
        Ok(self.position)
    }

    /// Move back by one step without validation.
    ///
    /// At the first step this is a no-op that reports the unchanged position.
    ///
    /// # Errors
    ///
    /// - `FromComplete` once the wizard has completed
    pub fn retreat(&mut self) -> std::result::Result<StepPosition, StepTransitionError> {
        match self.position {
            StepPosition::Complete => Err(StepTransitionError::FromComplete),
            StepPosition::At(i) => {
                self.position = StepPosition::At(i.saturating_sub(1));
                Ok(self.position)
            }
        }
    }

    /// Return to the first step
    pub fn reset(&mut self) {
        self.position = StepPosition::At(0);
    }
}
