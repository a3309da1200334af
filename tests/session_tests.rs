//! Session flow tests over the built-in presets
//!
//! Every test runs against a fixed clock (2026-10-16) so date defaults and
//! summary timestamps are reproducible.

use chrono::NaiveDate;
use vehicle_wizard::{
    FieldValue, FixedClock, Preset, Requirement, SlotId, StepPosition, Summary, WizardError,
    WizardSession,
};

fn clock() -> FixedClock {
    FixedClock::at_date(2026, 10, 16).expect("valid date")
}

fn open(preset: Preset) -> WizardSession {
    WizardSession::new(preset.definition(), clock()).expect("preset opens")
}

fn date(day: u32) -> FieldValue {
    FieldValue::Date(NaiveDate::from_ymd_opt(2026, 10, day).expect("valid date"))
}

fn text(value: &str) -> FieldValue {
    FieldValue::Text(value.to_string())
}

// =============================================================================
// Performance preset
// =============================================================================

#[test]
fn test_performance_dyno_surcharge_flow() {
    let mut session = open(Preset::Performance);

    session.set_single("ecu", Some("stage-1")).unwrap();
    session.set_single("exhaust", Some("cat-back")).unwrap();
    assert_eq!(session.derived().total_cost, 60000);
    assert_eq!(session.derived().total_duration, 7);

    assert_eq!(session.advance().unwrap(), StepPosition::At(1));
    assert_eq!(session.advance().unwrap(), StepPosition::At(2));

    session.set_single("specialist", Some("street-garage")).unwrap();
    assert_eq!(session.derived().total_cost, 60000);

    session.set_single("specialist", Some("dyno-lab")).unwrap();
    let derived = session.derived();
    assert_eq!(derived.total_cost, 75000);
    assert_eq!(derived.surcharge_cost(), 15000);
    assert_eq!(derived.total_duration, 9);
    assert_eq!(derived.surcharges[0].name, "dyno-calibration");

    assert_eq!(session.advance().unwrap(), StepPosition::At(3));
    session.set_field("terms_accepted", FieldValue::Flag(true)).unwrap();
    assert_eq!(session.advance().unwrap(), StepPosition::Complete);

    let summary = session.assemble().unwrap().clone();
    assert_eq!(summary.total_cost(), 75000);
    assert_eq!(summary.wizard, "performance");
    assert_eq!(summary.completed_at, clock().0);
    let financing = summary.financing.expect("performance offers financing");
    assert_eq!(financing.months, 36);
    assert!(financing.installment > 75000.0 / 36.0);
}

#[test]
fn test_performance_metrics() {
    let mut session = open(Preset::Performance);
    session.set_single("ecu", Some("stage-1")).unwrap();
    session.set_single("exhaust", Some("cat-back")).unwrap();

    let derived = session.derived();
    assert_eq!(derived.metric("horsepower").unwrap().value, 348.0);
    assert_eq!(derived.metric("power_gain").unwrap().value, 14.0);
    let zero_to_hundred = derived.metric("zero_to_hundred").unwrap().value;
    assert!((zero_to_hundred - 6.2 / 1.14).abs() < 1e-9);
    // Untouched metrics report their baseline
    assert_eq!(derived.metric("lateral_grip").unwrap().value, 0.92);
}

#[test]
fn test_braking_distance_floor() {
    let mut session = open(Preset::Performance);
    for option in ["big-brake-kit", "performance-pads", "sport-rotors", "braided-lines"] {
        assert!(session.toggle_multi("brakes", option).unwrap());
    }
    let braking = session.derived().metric("braking_distance").unwrap().clone();
    assert_eq!(braking.raw, 28.0);
    assert_eq!(braking.value, 32.0);

    session.toggle_multi("brakes", "big-brake-kit").unwrap();
    assert_eq!(session.derived().metric("braking_distance").unwrap().value, 33.0);
}

#[test]
fn test_power_step_needs_some_upgrade() {
    let mut session = open(Preset::Performance);
    let err = session.advance().unwrap_err();
    let unmet = err.unmet_requirements().expect("validation failure");
    assert_eq!(unmet.len(), 1);
    assert!(matches!(&unmet[0], Requirement::Check { name, .. } if name == "any-filled"));
    assert_eq!(session.position(), StepPosition::At(0));
}

#[test]
fn test_stage_two_needs_high_flow_exhaust() {
    let mut session = open(Preset::Performance);
    session.set_single("ecu", Some("stage-2")).unwrap();
    assert!(!session.can_advance());
    session.set_single("exhaust", Some("turbo-back")).unwrap();
    assert!(session.can_advance());
}

#[test]
fn test_specialist_step_lists_missing_slot() {
    let mut session = open(Preset::Performance);
    session.set_single("intake", Some("cold-air")).unwrap();
    session.advance().unwrap();
    session.advance().unwrap();

    session.clear_field("appointment_date").unwrap();
    let err = session.advance().unwrap_err();
    assert_eq!(
        err.unmet_requirements().unwrap(),
        &[
            Requirement::Slot(SlotId::from("specialist")),
            Requirement::Field("appointment_date".into()),
        ]
    );
    assert_eq!(session.position(), StepPosition::At(2));
}

// =============================================================================
// Rental preset
// =============================================================================

#[test]
fn test_rental_per_day_pricing() {
    let mut session = open(Preset::Rental);
    assert_eq!(session.values().date("pickup_date"), date(16).as_date());
    assert_eq!(session.values().date("return_date"), date(17).as_date());

    session.set_single("vehicle", Some("compact")).unwrap();
    assert_eq!(session.derived().quantity, 1);
    assert_eq!(session.derived().total_cost, 4500);

    session.set_field("return_date", date(20)).unwrap();
    session.set_single("insurance", Some("full")).unwrap();
    session.toggle_multi("extras", "gps").unwrap();
    session.toggle_multi("extras", "fuel-prepay").unwrap();

    let derived = session.derived();
    assert_eq!(derived.quantity, 4);
    assert_eq!(derived.total_cost, 18000 + 7600 + 2000 + 6000);
    assert_eq!(derived.total_duration, 4);

    session.set_field("driver_under_25", FieldValue::Flag(true)).unwrap();
    assert_eq!(session.derived().total_cost, 35600);
}

#[test]
fn test_rental_date_order_blocks_advance() {
    let mut session = open(Preset::Rental);
    session.set_single("vehicle", Some("economy")).unwrap();
    session.advance().unwrap();

    session.set_field("return_date", date(10)).unwrap();
    let err = session.advance().unwrap_err();
    let unmet = err.unmet_requirements().unwrap();
    assert!(matches!(&unmet[0], Requirement::Check { name, .. } if name.starts_with("date-order")));
    assert_eq!(session.position(), StepPosition::At(1));

    // Same-day return is a valid one-day rental
    session.set_field("return_date", date(16)).unwrap();
    assert_eq!(session.advance().unwrap(), StepPosition::At(2));
    assert_eq!(session.derived().quantity, 1);
}

#[test]
fn test_premium_vehicle_needs_full_cover() {
    let mut session = open(Preset::Rental);
    session.set_single("vehicle", Some("suv")).unwrap();
    session.advance().unwrap();
    session.advance().unwrap();

    session.set_single("insurance", Some("basic")).unwrap();
    assert!(session.advance().is_err());
    session.set_single("insurance", Some("full")).unwrap();
    assert_eq!(session.advance().unwrap(), StepPosition::At(3));
}

#[test]
fn test_rental_unknown_ids_rejected() {
    let mut session = open(Preset::Rental);
    let revision = session.revision();

    assert!(matches!(
        session.set_single("vehicle", Some("spaceship")),
        Err(WizardError::InvalidOption { .. })
    ));
    assert!(matches!(
        session.set_single("boat", Some("dinghy")),
        Err(WizardError::UnknownSlot(_))
    ));
    assert!(matches!(
        session.toggle_multi("vehicle", "suv"),
        Err(WizardError::CardinalityMismatch { .. })
    ));
    assert!(matches!(
        session.set_field("pickup_date", text("tomorrow")),
        Err(WizardError::FieldKindMismatch { .. })
    ));
    assert_eq!(session.revision(), revision);
}

// =============================================================================
// Driver onboarding preset
// =============================================================================

#[test]
fn test_onboarding_flow() {
    let mut session = open(Preset::DriverOnboarding);

    session.set_field("full_name", text("Alex Doe")).unwrap();
    session.set_field("phone", text("call me")).unwrap();
    session.set_field("email", text("alex@example")).unwrap();
    let err = session.advance().unwrap_err();
    let names: Vec<String> = err
        .unmet_requirements()
        .unwrap()
        .iter()
        .map(|r| match r {
            Requirement::Check { name, .. } => name.clone(),
            other => other.to_string(),
        })
        .collect();
    assert_eq!(names, vec!["pattern:phone", "pattern:email"]);

    session.set_field("phone", text("+49 170 1234567")).unwrap();
    session.set_field("email", text("alex@example.com")).unwrap();
    assert_eq!(session.advance().unwrap(), StepPosition::At(1));

    session.set_field("license_number", text("b072rrE25")).unwrap();
    session.set_field("license_expiry", date(1)).unwrap();
    session.set_field("experience_years", FieldValue::Number(0.5)).unwrap();
    let err = session.advance().unwrap_err();
    assert_eq!(err.unmet_requirements().unwrap().len(), 3);

    session.set_field("license_number", text("B072RRE25")).unwrap();
    session.set_field("license_expiry", date(30)).unwrap();
    session.set_field("experience_years", FieldValue::Number(4.0)).unwrap();
    assert_eq!(session.advance().unwrap(), StepPosition::At(2));

    session.set_single("vehicle_class", Some("premium")).unwrap();
    session.set_single("verification", Some("express-check")).unwrap();
    assert!(!session.can_advance());
    session.toggle_multi("training", "premium-service").unwrap();
    assert_eq!(session.advance().unwrap(), StepPosition::At(3));

    let derived = session.derived();
    assert_eq!(derived.total_cost, 6000 + 5000 + 3500);
    assert_eq!(derived.total_duration, 1 + 2 + 2);

    session.set_field("terms_accepted", FieldValue::Flag(true)).unwrap();
    session.advance().unwrap();
    assert!(session.is_complete());
}

// =============================================================================
// Lifecycle
// =============================================================================

fn complete_performance() -> WizardSession {
    let mut session = open(Preset::Performance);
    session.set_single("exhaust", Some("cat-back")).unwrap();
    session.advance().unwrap();
    session.advance().unwrap();
    session.set_single("specialist", Some("street-garage")).unwrap();
    session.advance().unwrap();
    session.set_field("terms_accepted", FieldValue::Flag(true)).unwrap();
    session.advance().unwrap();
    session
}

#[test]
fn test_retreat_at_first_step_is_noop() {
    let mut session = open(Preset::Rental);
    assert_eq!(session.retreat().unwrap(), StepPosition::At(0));
    assert_eq!(session.position(), StepPosition::At(0));
}

#[test]
fn test_retreat_keeps_selections() {
    let mut session = open(Preset::Rental);
    session.set_single("vehicle", Some("economy")).unwrap();
    session.advance().unwrap();
    assert_eq!(session.retreat().unwrap(), StepPosition::At(0));
    assert!(session.values().contains("vehicle", "economy"));
}

#[test]
fn test_complete_only_allows_reset() {
    let mut session = complete_performance();
    assert!(matches!(session.advance(), Err(WizardError::Transition(_))));
    assert!(matches!(session.retreat(), Err(WizardError::Transition(_))));
    assert_eq!(session.progress_percent(), 100);
    assert!(session.current_step().is_none());
}

#[test]
fn test_assemble_twice_is_equal() {
    let mut session = complete_performance();
    let first = session.assemble().unwrap().clone();
    let second = session.assemble().unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(first.total_cost(), 45000);
}

#[test]
fn test_mutation_after_assembly_rejected() {
    let mut session = complete_performance();
    session.assemble().unwrap();
    assert!(matches!(
        session.toggle_multi("brakes", "braided-lines"),
        Err(WizardError::ResetAfterComplete)
    ));
    assert!(matches!(
        session.set_field("notes", text("late")),
        Err(WizardError::ResetAfterComplete)
    ));
}

#[test]
fn test_complete_rejects_mutation_before_assembly() {
    let mut session = open(Preset::Rental);
    session.set_single("vehicle", Some("suv")).unwrap();
    session.advance().unwrap();
    session.advance().unwrap();
    session.set_single("insurance", Some("full")).unwrap();
    session.advance().unwrap();
    session.set_field("terms_accepted", FieldValue::Flag(true)).unwrap();
    assert_eq!(session.advance().unwrap(), StepPosition::Complete);
    let revision = session.revision();

    assert!(matches!(
        session.set_single("vehicle", None),
        Err(WizardError::ResetAfterComplete)
    ));
    assert!(matches!(
        session.set_single("insurance", None),
        Err(WizardError::ResetAfterComplete)
    ));
    assert!(matches!(
        session.set_field("terms_accepted", FieldValue::Flag(false)),
        Err(WizardError::ResetAfterComplete)
    ));
    assert!(matches!(
        session.toggle_multi("extras", "gps"),
        Err(WizardError::ResetAfterComplete)
    ));
    assert!(matches!(
        session.clear_field("return_date"),
        Err(WizardError::ResetAfterComplete)
    ));
    assert_eq!(session.revision(), revision);

    let summary = session.assemble().unwrap();
    assert!(summary.selections.contains("vehicle", "suv"));
    assert!(summary.selections.contains("insurance", "full"));
    assert_eq!(summary.selections.flag("terms_accepted"), Some(true));
    assert_eq!(summary.total_cost(), 7900 + 1900);
}

#[test]
fn test_reset_equals_fresh_session() {
    let fresh = open(Preset::Rental);
    let mut session = open(Preset::Rental);
    session.set_single("vehicle", Some("convertible")).unwrap();
    session.set_field("return_date", date(25)).unwrap();
    session.advance().unwrap();
    session.reset().unwrap();

    assert_eq!(session.snapshot(), fresh.snapshot());
    assert_eq!(session.position(), fresh.position());
    assert_eq!(session.derived(), fresh.derived());
    assert!(session.summary().is_none());
    assert!(session.revision() > fresh.revision());
}

#[test]
fn test_reset_after_submit_starts_over() {
    let mut session = complete_performance();
    let mut submitted: Vec<Summary> = Vec::new();
    session
        .submit(&mut |s: &Summary| -> anyhow::Result<()> {
            submitted.push(s.clone());
            Ok(())
        })
        .unwrap();
    assert_eq!(submitted.len(), 1);

    session.reset().unwrap();
    assert_eq!(session.position(), StepPosition::At(0));
    session.set_single("ecu", Some("stage-1")).unwrap();
    assert_eq!(session.derived().total_cost, 15000);
}

#[test]
fn test_json_submitter_writes_summary() {
    let mut session = complete_performance();
    let mut submitter = vehicle_wizard::JsonSubmitter::new(Vec::new());
    session.submit(&mut submitter).unwrap();

    let written: Summary = serde_json::from_slice(&submitter.into_inner()).unwrap();
    let summary = session.summary().unwrap();
    assert_eq!(written.wizard, summary.wizard);
    assert_eq!(written.selections, summary.selections);
    assert_eq!(written.derived.line_items, summary.derived.line_items);
    assert_eq!(written.completed_at, summary.completed_at);
}
