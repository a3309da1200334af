//! Engine modules: the pure computations behind every wizard.
//!
//! Nothing in here mutates state or performs I/O. Each function takes the
//! current selections plus static definition data and returns a fresh value.
//!
//! - `rules` - conditional surcharges and quantity sources
//! - `metrics` - signed effect aggregation with dampening and named bounds
//! - `financing` - amortized installment quotes
//! - `derivation` - the `derive()` entry point producing a `DerivedSnapshot`

pub mod derivation;
pub mod financing;
pub mod metrics;
pub mod rules;

pub use derivation::{derive, DerivedSnapshot, LineItem};
pub use financing::{FinancingQuote, FinancingTerms};
pub use metrics::{Bound, MetricDefinition, MetricRule, MetricValue};
pub use rules::{Condition, QuantitySource, SurchargeRule};
