//! Driver onboarding: personal details, license checks, vehicle class.
//!
//! Costs are verification and training fees; durations are processing days.

use crate::catalog::{Catalog, CatalogOption, SlotDefinition};
use crate::definition::{FieldDefault, FieldSpec, WizardDefinition};
use crate::engine::rules::{Condition, SurchargeRule};
use crate::selection::FieldValue;
use crate::step::{StepCheck, StepDefinition};
use crate::types::{DurationUnit, FieldKind, WizardKind};

const PHONE_PATTERN: &str = r"^\+?[0-9][0-9 ]{6,15}$";
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$";
const LICENSE_PATTERN: &str = r"^[A-Z0-9]{5,16}$";

fn catalog() -> Catalog {
    Catalog::new(vec![
        SlotDefinition::single(
            "vehicle_class",
            "Vehicle class",
            vec![
                CatalogOption::new("standard", "Standard", 0),
                CatalogOption::new("comfort", "Comfort", 0),
                CatalogOption::new("premium", "Premium", 0).with_tag("premium"),
            ],
        ),
        SlotDefinition::single(
            "verification",
            "Document verification",
            vec![
                CatalogOption::new("basic-check", "Standard verification", 2500).with_duration(3),
                CatalogOption::new("express-check", "Express verification", 6000).with_duration(1),
            ],
        ),
        SlotDefinition::multi(
            "training",
            "Training",
            vec![
                CatalogOption::new("safety-course", "Defensive driving course", 4000)
                    .with_duration(1),
                CatalogOption::new("customer-service", "Customer service basics", 3000)
                    .with_duration(1),
                CatalogOption::new("premium-service", "Premium passenger service", 5000)
                    .with_duration(2)
                    .with_tag("premium-training"),
            ],
        ),
    ])
}

pub(super) fn definition() -> WizardDefinition {
    let pattern = |field: &str, pattern: &str| StepCheck::Pattern {
        field: field.into(),
        pattern: pattern.into(),
    };

    WizardDefinition {
        name: "driver-onboarding".into(),
        kind: WizardKind::DriverOnboarding,
        duration_unit: DurationUnit::Days,
        catalog: catalog(),
        fields: vec![
            FieldSpec::new("full_name", "Full name", FieldKind::Text),
            FieldSpec::new("phone", "Phone number", FieldKind::Text),
            FieldSpec::new("email", "Email address", FieldKind::Text),
            FieldSpec::new("license_number", "License number", FieldKind::Text),
            FieldSpec::new("onboarding_date", "Onboarding date", FieldKind::Date)
                .with_default(FieldDefault::Today),
            FieldSpec::new("license_expiry", "License expiry date", FieldKind::Date),
            FieldSpec::new("experience_years", "Years of driving experience", FieldKind::Number),
            FieldSpec::new("terms_accepted", "I accept the partner agreement", FieldKind::Flag)
                .with_default(FieldDefault::Value {
                    value: FieldValue::Flag(false),
                }),
        ],
        steps: vec![
            StepDefinition::new("Personal details")
                .require_field("full_name")
                .require_field("phone")
                .require_field("email")
                .check(pattern("phone", PHONE_PATTERN))
                .check(pattern("email", EMAIL_PATTERN)),
            StepDefinition::new("License")
                .require_field("license_number")
                .require_field("license_expiry")
                .require_field("experience_years")
                .check(pattern("license_number", LICENSE_PATTERN))
                .check(StepCheck::DateOrder {
                    start: "onboarding_date".into(),
                    end: "license_expiry".into(),
                })
                .check(StepCheck::MinNumber {
                    field: "experience_years".into(),
                    min: 1.0,
                }),
            StepDefinition::new("Vehicle & training")
                .require_slot("vehicle_class")
                .require_slot("verification")
                .check(StepCheck::TagRequires {
                    if_slot: "vehicle_class".into(),
                    if_tag: "premium".into(),
                    then_slot: "training".into(),
                    then_tag: "premium-training".into(),
                }),
            StepDefinition::new("Agreement").check(StepCheck::FlagSet {
                field: "terms_accepted".into(),
            }),
        ],
        surcharges: vec![
            SurchargeRule::new("background-check", "Extended background check", 3500, 2)
                .when(Condition::tag_in("vehicle_class", "premium")),
        ],
        metrics: Vec::new(),
        quantity: None,
        financing: None,
    }
}
