//! Definition file tests: save/load through real files, validation of
//! hand-written JSON, and sessions opened from loaded definitions.

use std::fs;
use strum::IntoEnumIterator;
use tempfile::TempDir;
use vehicle_wizard::{
    FixedClock, Preset, StepPosition, WizardDefinition, WizardError, WizardSession,
};

const HAND_WRITTEN: &str = r#"{
  "name": "detailing",
  "kind": "custom",
  "duration_unit": "hours",
  "slots": [
    {
      "id": "package",
      "label": "Package",
      "cardinality": "single",
      "options": [
        { "id": "wash", "label": "Hand wash", "price": 4000, "duration": 1 },
        { "id": "ceramic", "label": "Ceramic coating", "price": 60000, "duration": 8, "tags": ["coating"] }
      ]
    },
    {
      "id": "addons",
      "label": "Add-ons",
      "cardinality": "multi",
      "options": [
        { "id": "interior", "label": "Interior clean", "price": 5000, "duration": 2 }
      ]
    }
  ],
  "fields": [
    { "name": "terms", "label": "Accept terms", "kind": "flag" }
  ],
  "steps": [
    { "title": "Package", "required_slots": ["package"] },
    { "title": "Confirm", "checks": [ { "check": "flag-set", "field": "terms" } ] }
  ],
  "surcharges": [
    {
      "name": "curing",
      "label": "Coating cure time",
      "when": [ { "when": "tag-selected", "slot": "package", "tag": "coating" } ],
      "cost": 0,
      "duration": 12
    }
  ]
}"#;

#[test]
fn test_presets_survive_file_round_trip() {
    let dir = TempDir::new().unwrap();
    for preset in Preset::iter() {
        let path = dir.path().join(format!("{preset}.json"));
        let original = preset.definition();
        original.save_to_file(&path).unwrap();

        let loaded = WizardDefinition::load_from_file(&path).unwrap();
        loaded.validate().unwrap();
        assert_eq!(
            serde_json::to_value(&loaded).unwrap(),
            serde_json::to_value(&original).unwrap()
        );
    }
}

#[test]
fn test_hand_written_definition_runs() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("detailing.json");
    fs::write(&path, HAND_WRITTEN).unwrap();

    let definition = WizardDefinition::load_from_file(&path).unwrap();
    assert_eq!(definition.catalog.len(), 2);

    let clock = FixedClock::at_date(2026, 10, 16).unwrap();
    let mut session = WizardSession::new(definition, clock).unwrap();
    session.set_single("package", Some("ceramic")).unwrap();
    session.toggle_multi("addons", "interior").unwrap();
    assert_eq!(session.derived().total_cost, 65000);
    assert_eq!(session.derived().total_duration, 8 + 2 + 12);

    assert_eq!(session.advance().unwrap(), StepPosition::At(1));
    assert!(session.advance().is_err());
}

#[test]
fn test_load_missing_file_has_context() {
    let dir = TempDir::new().unwrap();
    let err = WizardDefinition::load_from_file(dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("Failed to read wizard definition"));
}

#[test]
fn test_load_malformed_json_has_context() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ \"name\": ").unwrap();
    let err = WizardDefinition::load_from_file(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse wizard definition JSON"));
}

#[test]
fn test_session_refuses_invalid_definition() {
    let json = HAND_WRITTEN.replace(
        r#""required_slots": ["package"]"#,
        r#""required_slots": ["paint"]"#,
    );
    let definition: WizardDefinition = serde_json::from_str(&json).unwrap();

    let clock = FixedClock::at_date(2026, 10, 16).unwrap();
    let err = WizardSession::new(definition, clock).unwrap_err();
    match err {
        WizardError::Definition(msg) => assert!(msg.contains("unknown slot 'paint'")),
        other => panic!("Expected Definition error, got {other:?}"),
    }
}

#[test]
fn test_unknown_check_kind_rejected_at_parse() {
    let json = HAND_WRITTEN.replace("flag-set", "moon-phase");
    assert!(serde_json::from_str::<WizardDefinition>(&json).is_err());
}
