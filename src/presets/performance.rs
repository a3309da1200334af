//! Performance upgrades: parts, specialist booking and financing.

use crate::catalog::{Catalog, CatalogOption, SlotDefinition};
use crate::definition::{FieldDefault, FieldSpec, WizardDefinition};
use crate::engine::financing::FinancingTerms;
use crate::engine::metrics::MetricDefinition;
use crate::engine::rules::{Condition, SurchargeRule};
use crate::selection::FieldValue;
use crate::step::{StepCheck, StepDefinition};
use crate::types::{DurationUnit, FieldKind, WizardKind};

fn catalog() -> Catalog {
    Catalog::new(vec![
        SlotDefinition::single(
            "intake",
            "Air intake",
            vec![
                CatalogOption::new("cold-air", "Cold air intake", 15000)
                    .with_duration(2)
                    .with_effect("horsepower", 12.0)
                    .with_effect("torque", 8.0)
                    .with_effect("power_gain", 3.0),
                CatalogOption::new("panel-filter", "High-flow panel filter", 4500)
                    .with_duration(1)
                    .with_effect("horsepower", 4.0)
                    .with_effect("torque", 2.0)
                    .with_effect("power_gain", 1.0),
            ],
        ),
        SlotDefinition::single(
            "exhaust",
            "Exhaust",
            vec![
                CatalogOption::new("cat-back", "Cat-back exhaust", 45000)
                    .with_duration(4)
                    .with_tag("high-flow")
                    .with_effect("horsepower", 18.0)
                    .with_effect("torque", 15.0)
                    .with_effect("power_gain", 4.0),
                CatalogOption::new("turbo-back", "Turbo-back exhaust", 78000)
                    .with_duration(6)
                    .with_tag("high-flow")
                    .with_effect("horsepower", 28.0)
                    .with_effect("torque", 25.0)
                    .with_effect("power_gain", 7.0),
            ],
        ),
        SlotDefinition::single(
            "ecu",
            "ECU tune",
            vec![
                CatalogOption::new("stage-1", "Stage 1 remap", 15000)
                    .with_duration(3)
                    .with_tag("ecu-tuning")
                    .with_effect("horsepower", 30.0)
                    .with_effect("torque", 40.0)
                    .with_effect("power_gain", 10.0),
                CatalogOption::new("stage-2", "Stage 2 remap", 32000)
                    .with_duration(4)
                    .with_tag("ecu-tuning")
                    .with_tag("stage-2")
                    .with_effect("horsepower", 55.0)
                    .with_effect("torque", 70.0)
                    .with_effect("power_gain", 18.0),
            ],
        ),
        SlotDefinition::single(
            "suspension",
            "Suspension",
            vec![
                CatalogOption::new("lowering-springs", "Lowering springs", 28000)
                    .with_duration(3)
                    .with_effect("lateral_grip", 0.04)
                    .with_effect("braking_distance", -1.0),
                CatalogOption::new("coilovers", "Adjustable coilovers", 95000)
                    .with_duration(6)
                    .with_effect("lateral_grip", 0.09)
                    .with_effect("braking_distance", -2.0),
            ],
        ),
        SlotDefinition::multi(
            "brakes",
            "Brakes",
            vec![
                CatalogOption::new("big-brake-kit", "Big brake kit", 120000)
                    .with_duration(5)
                    .with_effect("braking_distance", -5.0),
                CatalogOption::new("performance-pads", "Performance pads", 18000)
                    .with_duration(1)
                    .with_effect("braking_distance", -3.0),
                CatalogOption::new("sport-rotors", "Slotted sport rotors", 36000)
                    .with_duration(2)
                    .with_effect("braking_distance", -4.0),
                CatalogOption::new("braided-lines", "Braided brake lines", 9000)
                    .with_duration(1)
                    .with_effect("braking_distance", -2.0),
            ],
        ),
        SlotDefinition::single(
            "specialist",
            "Specialist",
            vec![
                CatalogOption::new("dyno-lab", "Dyno-equipped tuning lab", 0).with_tag("dyno"),
                CatalogOption::new("street-garage", "Street garage", 0),
            ],
        ),
    ])
}

fn metrics() -> Vec<MetricDefinition> {
    vec![
        MetricDefinition::additive("horsepower", "Power", "hp", 300.0),
        MetricDefinition::additive("torque", "Torque", "Nm", 400.0),
        MetricDefinition::additive("power_gain", "Power gain", "%", 0.0),
        MetricDefinition::additive("zero_to_hundred", "0-100 km/h", "s", 6.2)
            .dampened("power_gain", 1.0),
        MetricDefinition::additive("braking_distance", "Braking 100-0 km/h", "m", 42.0)
            .with_floor(32.0),
        MetricDefinition::additive("lateral_grip", "Lateral grip", "g", 0.92),
    ]
}

pub(super) fn definition() -> WizardDefinition {
    WizardDefinition {
        name: "performance".into(),
        kind: WizardKind::Performance,
        duration_unit: DurationUnit::Hours,
        catalog: catalog(),
        fields: vec![
            FieldSpec::new("appointment_date", "Appointment date", FieldKind::Date)
                .with_default(FieldDefault::DaysFromToday { days: 1 }),
            FieldSpec::new("notes", "Notes for the workshop", FieldKind::Text),
            FieldSpec::new("terms_accepted", "I accept the workshop terms", FieldKind::Flag)
                .with_default(FieldDefault::Value {
                    value: FieldValue::Flag(false),
                }),
        ],
        steps: vec![
            StepDefinition::new("Power")
                .check(StepCheck::AnyFilled {
                    slots: vec!["intake".into(), "exhaust".into(), "ecu".into()],
                })
                .check(StepCheck::TagRequires {
                    if_slot: "ecu".into(),
                    if_tag: "stage-2".into(),
                    then_slot: "exhaust".into(),
                    then_tag: "high-flow".into(),
                }),
            StepDefinition::new("Handling"),
            StepDefinition::new("Specialist")
                .require_slot("specialist")
                .require_field("appointment_date"),
            StepDefinition::new("Review").check(StepCheck::FlagSet {
                field: "terms_accepted".into(),
            }),
        ],
        surcharges: vec![
            SurchargeRule::new("dyno-calibration", "Dyno calibration session", 15000, 2)
                .when(Condition::tag_in("ecu", "ecu-tuning"))
                .when(Condition::tag_in("specialist", "dyno")),
        ],
        metrics: metrics(),
        quantity: None,
        financing: Some(FinancingTerms::new(36, 9.5)),
    }
}
