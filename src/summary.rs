//! Summary Assembler
//!
//! The immutable record handed to the outside world once a wizard completes:
//! every selection, the derivation of exactly those selections, and the
//! completion timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::definition::WizardDefinition;
use crate::engine::derivation::{self, DerivedSnapshot};
use crate::engine::financing::FinancingQuote;
use crate::error::Result;
use crate::selection::SelectionSnapshot;
use crate::types::WizardKind;

/// Final state of one completed wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub wizard: String,
    pub kind: WizardKind,
    pub selections: SelectionSnapshot,
    pub derived: DerivedSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financing: Option<FinancingQuote>,
    pub completed_at: DateTime<Utc>,
}

impl Summary {
    pub fn total_cost(&self) -> u64 {
        self.derived.total_cost
    }

    pub fn total_duration(&self) -> u32 {
        self.derived.total_duration
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the summary from the final selections.
///
/// Derivation runs again here instead of trusting any cached snapshot, so the
/// totals always describe `selections` exactly.
pub fn assemble(
    definition: &WizardDefinition,
    selections: SelectionSnapshot,
    completed_at: DateTime<Utc>,
) -> Result<Summary> {
    let derived = derivation::derive(&selections, definition)?;
    let financing = definition.financing.map(|terms| derived.financing(&terms));

    Ok(Summary {
        wizard: definition.name.clone(),
        kind: definition.kind,
        selections,
        derived,
        financing,
        completed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogOption, OptionId, SlotDefinition, SlotId};
    use crate::engine::financing::FinancingTerms;
    use crate::selection::SlotValue;
    use crate::step::StepDefinition;
    use crate::types::DurationUnit;
    use std::collections::BTreeMap;

    fn definition() -> WizardDefinition {
        WizardDefinition {
            name: "exhaust-only".into(),
            kind: WizardKind::Performance,
            duration_unit: DurationUnit::Hours,
            catalog: Catalog::new(vec![SlotDefinition::single(
                "exhaust",
                "Exhaust",
                vec![CatalogOption::new("cat-back", "Cat-back", 45000).with_duration(4)],
            )]),
            fields: Vec::new(),
            steps: vec![StepDefinition::new("Exhaust").require_slot("exhaust")],
            surcharges: Vec::new(),
            metrics: Vec::new(),
            quantity: None,
            financing: Some(FinancingTerms::new(12, 0.0)),
        }
    }

    fn selections() -> SelectionSnapshot {
        SelectionSnapshot {
            slots: BTreeMap::from([(
                SlotId::from("exhaust"),
                SlotValue::Single(Some(OptionId::from("cat-back"))),
            )]),
            fields: BTreeMap::new(),
        }
    }

    #[test]
    fn test_assemble_derives_from_selections() {
        let at = Utc::now();
        let summary = assemble(&definition(), selections(), at).unwrap();
        assert_eq!(summary.total_cost(), 45000);
        assert_eq!(summary.total_duration(), 4);
        assert_eq!(summary.completed_at, at);
        assert_eq!(summary.financing.unwrap().installment, 3750.0);
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let at = Utc::now();
        let first = assemble(&definition(), selections(), at).unwrap();
        let second = assemble(&definition(), selections(), at).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_json() {
        let summary = assemble(&definition(), selections(), Utc::now()).unwrap();
        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["wizard"], "exhaust-only");
        assert_eq!(json["kind"], "performance");
        assert_eq!(json["selections"]["slots"]["exhaust"], "cat-back");
        assert_eq!(json["derived"]["total_cost"], 45000);
    }
}
