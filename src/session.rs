//! Wizard session: the single owner of one wizard's mutable state.
//!
//! A session ties the Selection Store, the Step Controller, the Derivation
//! Engine and the Summary Assembler together:
//!
//! ```text
//! mutation -> store (revision + 1) -> derive -> cached DerivedSnapshot
//! advance  -> step checks -> next step | Complete (timestamp captured, store sealed)
//! assemble -> derive again -> Summary
//! ```
//!
//! Everything runs synchronously on the caller's thread.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::OptionId;
use crate::clock::Clock;
use crate::definition::{FieldSpec, WizardDefinition};
use crate::engine::derivation::{self, DerivedSnapshot};
use crate::engine::financing::FinancingQuote;
use crate::error::{Result, WizardError};
use crate::selection::{FieldValue, SelectionSnapshot, SelectionStore};
use crate::step::{Requirement, Step, StepController, StepPosition, StepTransitionError};
use crate::submit::Submitter;
use crate::summary::{self, Summary};

pub struct WizardSession {
    definition: Arc<WizardDefinition>,
    store: SelectionStore,
    controller: StepController,
    clock: Box<dyn Clock>,
    derived: DerivedSnapshot,
    /// Store revision `derived` was computed from
    derived_revision: u64,
    completed_at: Option<DateTime<Utc>>,
    summary: Option<Summary>,
}

fn apply_defaults(
    store: &mut SelectionStore,
    fields: &[FieldSpec],
    clock: &dyn Clock,
) -> Result<()> {
    for field in fields {
        if let Some(default) = &field.default {
            store.set_field(&field.name, default.resolve(clock))?;
        }
    }
    Ok(())
}

impl WizardSession {
    /// Open a session at the first step with field defaults applied.
    ///
    /// # Errors
    ///
    /// `Definition` when the definition fails validation.
    pub fn new(
        definition: impl Into<Arc<WizardDefinition>>,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        let definition = definition.into();
        definition.validate()?;

        let controller = StepController::new(definition.build_steps()?)?;
        let mut store = SelectionStore::new(
            Arc::new(definition.catalog.clone()),
            definition.field_kinds(),
        );
        apply_defaults(&mut store, &definition.fields, &clock)?;
        let derived = derivation::derive(store.values(), &definition)?;

        info!(
            wizard = %definition.name,
            kind = %definition.kind,
            steps = controller.steps().len(),
            "Wizard session opened"
        );

        Ok(Self {
            derived_revision: store.revision(),
            definition,
            store,
            controller,
            clock: Box::new(clock),
            derived,
            completed_at: None,
            summary: None,
        })
    }

    pub fn definition(&self) -> &WizardDefinition {
        &self.definition
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Choose (or with `None`, clear) the option of a single slot.
    ///
    /// Choosing the option that is already selected clears the slot. Every
    /// mutation fails with `ResetAfterComplete` once the wizard is complete.
    pub fn set_single(&mut self, slot: &str, option: Option<&str>) -> Result<Option<OptionId>> {
        let value = self.store.set_single(slot, option)?;
        debug!(slot, option = ?value, "Single slot updated");
        self.refresh()?;
        Ok(value)
    }

    /// Add or remove an option of a multi slot; true when now selected
    pub fn toggle_multi(&mut self, slot: &str, option: &str) -> Result<bool> {
        let selected = self.store.toggle_multi(slot, option)?;
        debug!(slot, option, selected, "Multi slot toggled");
        self.refresh()?;
        Ok(selected)
    }

    pub fn set_field(&mut self, name: &str, value: FieldValue) -> Result<()> {
        self.store.set_field(name, value)?;
        debug!(field = name, "Field updated");
        self.refresh()
    }

    pub fn clear_field(&mut self, name: &str) -> Result<()> {
        self.store.clear_field(name)?;
        debug!(field = name, "Field cleared");
        self.refresh()
    }

    /// Recompute the derived snapshot if the store moved past it
    fn refresh(&mut self) -> Result<()> {
        if self.derived_revision == self.store.revision() {
            return Ok(());
        }
        self.derived = derivation::derive(self.store.values(), &self.definition)?;
        self.derived_revision = self.store.revision();
        Ok(())
    }

    // ========================================================================
    // Read access
    // ========================================================================

    /// Owned copy of every slot and field value
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.store.snapshot()
    }

    /// Borrowed view of every slot and field value
    pub fn values(&self) -> &SelectionSnapshot {
        self.store.values()
    }

    /// Derived values of the current selections
    pub fn derived(&self) -> &DerivedSnapshot {
        &self.derived
    }

    /// Installment view of the current total, if the wizard offers financing
    pub fn financing(&self) -> Option<FinancingQuote> {
        self.definition
            .financing
            .map(|terms| self.derived.financing(&terms))
    }

    pub fn revision(&self) -> u64 {
        self.store.revision()
    }

    pub fn position(&self) -> StepPosition {
        self.controller.position()
    }

    pub fn current_step(&self) -> Option<&Step> {
        self.controller.current_step()
    }

    pub fn steps(&self) -> &[Step] {
        self.controller.steps()
    }

    pub fn progress_percent(&self) -> u8 {
        self.controller.progress_percent()
    }

    pub fn is_complete(&self) -> bool {
        self.controller.is_complete()
    }

    /// What still blocks `advance()` on the active step
    pub fn unmet(&self) -> Vec<Requirement> {
        self.controller
            .unmet(self.store.values(), self.store.catalog())
    }

    pub fn can_advance(&self) -> bool {
        !self.is_complete() && self.unmet().is_empty()
    }

    /// The assembled summary, if any since the last reset
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Validate the active step and move on.
    ///
    /// # Errors
    ///
    /// - `StepValidation` with every unmet requirement; nothing changes
    /// - `Transition` once complete
    ///
    /// Reaching `Complete` seals the selections until `reset()`.
    pub fn advance(&mut self) -> Result<StepPosition> {
        let from = self.controller.position();
        match self.controller.advance(self.store.values(), self.store.catalog()) {
            Ok(StepPosition::Complete) => {
                self.store.seal();
                let at = self.clock.now();
                self.completed_at = Some(at);
                info!(wizard = %self.definition.name, completed_at = %at, "Wizard completed");
                Ok(StepPosition::Complete)
            }
            Ok(position) => {
                info!(from = %from, to = %position, "Advanced");
                Ok(position)
            }
            Err(e) => {
                warn!(at = %from, "Advance rejected: {}", e);
                Err(e)
            }
        }
    }

    /// Step back without validation; a no-op on the first step
    pub fn retreat(&mut self) -> Result<StepPosition> {
        let position = self.controller.retreat().map_err(|e| {
            warn!("Retreat rejected: {}", e);
            WizardError::from(e)
        })?;
        info!(to = %position, "Retreated");
        Ok(position)
    }

    /// Back to the first step with empty selections and fresh defaults.
    ///
    /// Afterwards the session is indistinguishable from a newly opened one,
    /// except that the revision counter keeps increasing.
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear();
        self.controller.reset();
        self.completed_at = None;
        self.summary = None;
        apply_defaults(&mut self.store, &self.definition.fields, self.clock.as_ref())?;
        self.refresh()?;
        info!(wizard = %self.definition.name, "Wizard reset");
        Ok(())
    }

    // ========================================================================
    // Completion
    // ========================================================================

    /// Assemble the summary of a completed wizard.
    ///
    /// Derivation runs again from the final selections. Those were sealed on
    /// completion, so repeated calls before `reset()` return equal summaries.
    ///
    /// # Errors
    ///
    /// `Transition` when the wizard is not complete.
    pub fn assemble(&mut self) -> Result<&Summary> {
        let completed_at = match (self.controller.position(), self.completed_at) {
            (StepPosition::Complete, Some(at)) => at,
            (at, _) => return Err(StepTransitionError::NotComplete { at }.into()),
        };

        let summary = summary::assemble(&self.definition, self.store.snapshot(), completed_at)?;
        info!(
            wizard = %self.definition.name,
            total_cost = summary.total_cost(),
            total_duration = summary.total_duration(),
            "Summary assembled"
        );
        Ok(self.summary.insert(summary))
    }

    /// Hand the summary to an external collaborator, assembling it first if
    /// needed.
    ///
    /// A failing submitter surfaces as `Submit`; the session stays assembled
    /// and the call may be retried.
    pub fn submit<S: Submitter + ?Sized>(&mut self, submitter: &mut S) -> Result<&Summary> {
        if self.summary.is_none() {
            self.assemble()?;
        }
        let summary = self
            .summary
            .as_ref()
            .ok_or(StepTransitionError::NotComplete {
                at: self.controller.position(),
            })?;

        match submitter.submit(summary) {
            Ok(()) => {
                info!(wizard = %self.definition.name, "Summary submitted");
                Ok(summary)
            }
            Err(e) => {
                warn!(wizard = %self.definition.name, "Submission failed: {:#}", e);
                Err(WizardError::Submit(e))
            }
        }
    }
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("wizard", &self.definition.name)
            .field("position", &self.controller.position())
            .field("revision", &self.store.revision())
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}
