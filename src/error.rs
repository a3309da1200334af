//! Error handling module for the wizard engine
//!
//! Provides centralized error handling with proper error types using thiserror.
//! Only `StepValidation` is expected during normal operation; every other
//! variant points at a defect in the surrounding integration or definition data.

use thiserror::Error;

use crate::catalog::{OptionId, SlotId};
use crate::step::{StepTransitionError, StepValidationError};
use crate::types::{Cardinality, FieldKind};

/// Main error type for the wizard engine
#[derive(Error, Debug)]
pub enum WizardError {
    /// A mutation referenced an option id absent from the slot's catalog
    #[error("Invalid option '{option}' for slot '{slot}'")]
    InvalidOption { slot: SlotId, option: OptionId },

    /// A mutation referenced a slot the definition does not declare
    #[error("Unknown slot '{0}'")]
    UnknownSlot(SlotId),

    /// A single-choice operation was used on a multi slot, or vice versa
    #[error("Slot '{slot}' holds {cardinality} selections")]
    CardinalityMismatch { slot: SlotId, cardinality: Cardinality },

    /// A mutation referenced a field the definition does not declare
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    /// A field was assigned a value of the wrong kind
    #[error("Field '{field}' expects a {expected} value, got {found}")]
    FieldKindMismatch {
        field: String,
        expected: FieldKind,
        found: FieldKind,
    },

    /// The current step's requirements are not satisfied
    #[error(transparent)]
    StepValidation(#[from] StepValidationError),

    /// Derivation met a selected option missing from its catalog
    #[error("Catalog integrity error: option '{option}' of slot '{slot}' is not in the catalog")]
    CatalogIntegrity { slot: SlotId, option: OptionId },

    /// Mutation attempted once the wizard reached `Complete`
    #[error("Selections are sealed once the wizard is complete; reset the wizard first")]
    ResetAfterComplete,

    /// A move the step controller never allows
    #[error("Transition error: {0}")]
    Transition(#[from] StepTransitionError),

    /// Definition errors (loading, validation)
    #[error("Definition error: {0}")]
    Definition(String),

    /// The external submit collaborator rejected the summary
    #[error("Submit failed: {0}")]
    Submit(anyhow::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for wizard operations
pub type Result<T> = std::result::Result<T, WizardError>;

// Convenient error constructors
impl WizardError {
    /// Create an invalid option error
    pub fn invalid_option(slot: impl Into<SlotId>, option: impl Into<OptionId>) -> Self {
        Self::InvalidOption {
            slot: slot.into(),
            option: option.into(),
        }
    }

    /// Create a catalog integrity error
    pub fn catalog_integrity(slot: impl Into<SlotId>, option: impl Into<OptionId>) -> Self {
        Self::CatalogIntegrity {
            slot: slot.into(),
            option: option.into(),
        }
    }

    /// Create a definition error
    pub fn definition(msg: impl Into<String>) -> Self {
        Self::Definition(msg.into())
    }

    /// Returns true for errors the UI is expected to surface and recover from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::StepValidation(_))
    }

    /// Unmet requirements carried by a validation failure, if any.
    pub fn unmet_requirements(&self) -> Option<&[crate::step::Requirement]> {
        match self {
            Self::StepValidation(err) => Some(&err.unmet),
            _ => None,
        }
    }
}
