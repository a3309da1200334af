//! Vehicle Wizard Library
//!
//! A generic engine for multi-step configuration wizards: a selection store,
//! a forward-only step controller, a pure derivation engine for costs,
//! durations and simulated metrics, and an assembler for the final summary.
//! Product flows (performance tuning, rental, driver onboarding) are plain
//! data in [`presets`].

pub mod catalog;
pub mod cli;
pub mod clock;
pub mod definition;
pub mod engine;
pub mod error;
pub mod presets;
pub mod replay;
pub mod selection;
pub mod session;
pub mod step;
pub mod submit;
pub mod summary;
pub mod types;

// Re-export main types for convenience
pub use catalog::{Catalog, CatalogOption, OptionId, SlotDefinition, SlotId};
pub use clock::{Clock, FixedClock, SystemClock};
pub use definition::{FieldDefault, FieldSpec, WizardDefinition};
pub use engine::{derive, DerivedSnapshot, FinancingQuote, FinancingTerms, LineItem};
pub use error::{Result, WizardError};
pub use presets::Preset;
pub use replay::{replay, Action, ReplayError};
pub use selection::{FieldValue, SelectionSnapshot, SelectionStore, SlotValue};
pub use session::WizardSession;
pub use step::{
    CustomCheck, Requirement, StepCheck, StepController, StepDefinition, StepPosition,
    StepTransitionError, StepValidationError,
};
pub use submit::{JsonSubmitter, Submitter};
pub use summary::{assemble, Summary};
pub use types::{Cardinality, DurationUnit, FieldKind, Pricing, WizardKind};
