//! Vehicle rental priced per day between pickup and return.

use crate::catalog::{Catalog, CatalogOption, SlotDefinition};
use crate::definition::{FieldDefault, FieldSpec, WizardDefinition};
use crate::engine::rules::{Condition, QuantitySource, SurchargeRule};
use crate::selection::FieldValue;
use crate::step::{StepCheck, StepDefinition};
use crate::types::{DurationUnit, FieldKind, WizardKind};

fn catalog() -> Catalog {
    Catalog::new(vec![
        // The vehicle carries the rental length as its duration
        SlotDefinition::single(
            "vehicle",
            "Vehicle",
            vec![
                CatalogOption::new("economy", "Economy hatchback", 3500)
                    .with_duration(1)
                    .per_unit(),
                CatalogOption::new("compact", "Compact sedan", 4500)
                    .with_duration(1)
                    .per_unit(),
                CatalogOption::new("suv", "Full-size SUV", 7900)
                    .with_duration(1)
                    .with_tag("premium")
                    .per_unit(),
                CatalogOption::new("convertible", "Convertible", 9900)
                    .with_duration(1)
                    .with_tag("premium")
                    .per_unit(),
            ],
        ),
        SlotDefinition::single(
            "insurance",
            "Insurance",
            vec![
                CatalogOption::new("basic", "Basic liability", 900).per_unit(),
                CatalogOption::new("full", "Full cover, no excess", 1900)
                    .with_tag("full-cover")
                    .per_unit(),
            ],
        ),
        SlotDefinition::multi(
            "extras",
            "Extras",
            vec![
                CatalogOption::new("gps", "Navigation unit", 500).per_unit(),
                CatalogOption::new("child-seat", "Child seat", 700).per_unit(),
                CatalogOption::new("additional-driver", "Additional driver", 1200).per_unit(),
                CatalogOption::new("fuel-prepay", "Prepaid full tank", 6000),
            ],
        ),
    ])
}

pub(super) fn definition() -> WizardDefinition {
    WizardDefinition {
        name: "rental".into(),
        kind: WizardKind::Rental,
        duration_unit: DurationUnit::Days,
        catalog: catalog(),
        fields: vec![
            FieldSpec::new("pickup_date", "Pickup date", FieldKind::Date)
                .with_default(FieldDefault::Today),
            FieldSpec::new("return_date", "Return date", FieldKind::Date)
                .with_default(FieldDefault::DaysFromToday { days: 1 }),
            FieldSpec::new("driver_under_25", "Main driver is under 25", FieldKind::Flag)
                .with_default(FieldDefault::Value {
                    value: FieldValue::Flag(false),
                }),
            FieldSpec::new("terms_accepted", "I accept the rental terms", FieldKind::Flag)
                .with_default(FieldDefault::Value {
                    value: FieldValue::Flag(false),
                }),
        ],
        steps: vec![
            StepDefinition::new("Vehicle").require_slot("vehicle"),
            StepDefinition::new("Rental period")
                .require_field("pickup_date")
                .require_field("return_date")
                .check(StepCheck::DateOrder {
                    start: "pickup_date".into(),
                    end: "return_date".into(),
                }),
            StepDefinition::new("Protection")
                .require_slot("insurance")
                .check(StepCheck::TagRequires {
                    if_slot: "vehicle".into(),
                    if_tag: "premium".into(),
                    then_slot: "insurance".into(),
                    then_tag: "full-cover".into(),
                }),
            StepDefinition::new("Confirm").check(StepCheck::FlagSet {
                field: "terms_accepted".into(),
            }),
        ],
        surcharges: vec![
            SurchargeRule::new("young-driver", "Young driver fee", 2000, 0).when(
                Condition::FlagSet {
                    field: "driver_under_25".into(),
                },
            ),
        ],
        metrics: Vec::new(),
        quantity: Some(QuantitySource::DaysBetween {
            start: "pickup_date".into(),
            end: "return_date".into(),
        }),
        financing: None,
    }
}
