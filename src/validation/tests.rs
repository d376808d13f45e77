//! Cross-stage tests of the validation pipeline.

use super::*;
use crate::config::Config;
use crate::schema_builder::SchemaBuilder;
use crate::types::{
    ingest_events, parse_records, CapturedEvent, FieldValue, ValidationSchema, Validity,
};

fn schema_from_json(json: &str) -> ValidationSchema {
    SchemaBuilder::new(parse_records(json).expect("valid references json")).build()
}

fn events_from_json(json: &str) -> Vec<CapturedEvent> {
    ingest_events(parse_records(json).expect("valid capture json"))
}

#[test]
fn end_to_end_case_difference_is_valid_with_one_warning() {
    let schema = schema_from_json(
        r#"[{"event":"GAEvent","event_category":"Nav","event_label":"Menu","component_name":null}]"#,
    );
    let events = events_from_json(
        r#"[{"event":"GAEvent","event_category":"Nav","event_label":"menu","component_name":"top-nav"}]"#,
    );

    let report = validate_capture(&schema, events, &Config::default());

    assert!(report.valid, "report should be valid: {:?}", report.errors);
    assert_eq!(report.details.len(), 1);

    let detail = &report.details[0];
    assert_eq!(detail.validity, Validity::Valid);
    assert!(detail.errors.is_empty());
    assert_eq!(detail.warnings.len(), 1);
    assert!(
        detail.warnings[0].contains("event_label"),
        "warning should name the loosened field: {}",
        detail.warnings[0]
    );
    assert_eq!(detail.matched_section_id.as_deref(), Some("datalayer_0"));

    let comparison = report.comparison.as_ref().expect("comparison present");
    assert!((comparison.coverage_percent - 100.0).abs() < 1e-9);
    assert_eq!(comparison.missing_count, 0);

    let summary = report.summary.as_ref().expect("summary present");
    assert_eq!(summary.unique_valid, 1);
    assert_eq!(summary.unique_with_warnings, 1);
}

#[test]
fn zero_relevant_events_short_circuits_the_run() {
    let schema = schema_from_json(r#"[{"event":"GAEvent","event_label":"Menu"}]"#);
    let events = events_from_json(r#"[{"event":"gtm.load"},"gtm.js"]"#);

    let report = validate_capture(&schema, events, &Config::default());

    assert!(!report.valid);
    assert_eq!(report.errors, vec![NO_RELEVANT_EVENTS_MESSAGE.to_string()]);
    assert!(report.details.is_empty());
    assert!(report.summary.is_none());
    assert!(report.comparison.is_none());
    assert_eq!(report.counts.raw, 2);
    assert_eq!(report.counts.relevant, 0);
}

#[test]
fn invalid_match_fails_the_run() {
    let schema = schema_from_json(
        r#"[{"event":"GAEvent","event_category":"Nav","event_action":"Click","event_label":"Menu"}]"#,
    );
    // Same event shape but one wrong value and one extra field.
    let events = events_from_json(
        r#"[{"event":"GAEvent","event_category":"Nav","event_action":"Click","event_label":"Menu","debug_mode":"on"}]"#,
    );

    let report = validate_capture(&schema, events, &Config::default());

    let detail = &report.details[0];
    assert_eq!(detail.validity, Validity::Invalid);
    assert!(
        detail.errors.iter().any(|e| e.contains("Extra field(s)")),
        "extra-field error expected: {:?}",
        detail.errors
    );
    assert!(!report.valid);
    let summary = report.summary.as_ref().expect("summary present");
    assert_eq!(summary.unique_invalid, 1);
}

#[test]
fn missing_reference_fails_an_otherwise_clean_run() {
    let schema = schema_from_json(
        r#"[
            {"event":"GAEvent","event_category":"Nav","event_label":"Menu"},
            {"event":"GAEvent","event_category":"Footer","event_label":"Contact"}
        ]"#,
    );
    let events =
        events_from_json(r#"[{"event":"GAEvent","event_category":"Nav","event_label":"Menu"}]"#);

    let report = validate_capture(&schema, events, &Config::default());

    assert!(!report.valid);
    let summary = report.summary.as_ref().expect("summary present");
    assert_eq!(summary.unique_invalid, 0);
    let comparison = report.comparison.as_ref().expect("comparison present");
    assert_eq!(comparison.missing_count, 1);
    assert!((comparison.coverage_percent - 50.0).abs() < 1e-9);
}

#[test]
fn unmatched_events_do_not_fail_the_run() {
    let schema = schema_from_json(r#"[{"event":"GAEvent","event_category":"Nav","event_label":"Menu"}]"#);
    let events = events_from_json(
        r#"[
            {"event":"GAEvent","event_category":"Nav","event_label":"Menu"},
            {"event":"GAEvent","event_category":"Promo","event_label":"Spring Sale","creative":"x","slot":"y"}
        ]"#,
    );

    let report = validate_capture(&schema, events, &Config::default());

    let unmatched: Vec<&_> = report
        .details
        .iter()
        .filter(|d| d.validity == Validity::Unmatched)
        .collect();
    assert_eq!(unmatched.len(), 1);
    assert!(
        unmatched[0]
            .warnings
            .iter()
            .any(|w| w.contains("does not match any known reference")),
        "unmatched warning expected: {:?}",
        unmatched[0].warnings
    );
    // Unmatched events only warn; the single reference is covered.
    assert!(report.valid);
}

#[test]
fn duplicate_pushes_survive_as_one_detail() {
    let schema = schema_from_json(r#"[{"event":"GAEvent","event_label":"Menu"}]"#);
    let events = events_from_json(
        r#"[
            {"event":"GAEvent","event_label":"Menu","_captureTimestamp":1000},
            {"event":"GAEvent","event_label":"Menu","_captureTimestamp":5000}
        ]"#,
    );

    let report = validate_capture(&schema, events, &Config::default());

    assert_eq!(report.counts.raw, 2);
    assert_eq!(report.counts.unique, 1);
    assert_eq!(report.details.len(), 1);
}

#[test]
fn time_warnings_reach_the_right_detail() {
    let schema = schema_from_json(r#"[{"event":"GAEvent","event_label":"Menu"}]"#);
    let events = events_from_json(
        r#"[
            {"event":"GAEvent","event_label":"Menu","_captureTimestamp":0},
            {"event":"GAEvent","event_label":"Other","_captureTimestamp":100},
            {"event":"GAEvent","event_label":"Late","_captureTimestamp":800}
        ]"#,
    );

    let report = validate_capture(&schema, events, &Config::default());

    let rapid: Vec<&str> = report.details[1]
        .warnings
        .iter()
        .filter(|w| w.contains("Rapid event"))
        .map(String::as_str)
        .collect();
    assert_eq!(rapid.len(), 1);
    assert!(report.details[0]
        .warnings
        .iter()
        .all(|w| !w.contains("Rapid event")));
    assert!(report.details[2]
        .warnings
        .iter()
        .all(|w| !w.contains("Rapid event")));
}

#[test]
fn detail_scores_stay_in_unit_interval() {
    let schema = schema_from_json(
        r#"[
            {"event":"GAEvent","event_category":"Nav","event_label":"Menu"},
            {"event":"PageView","page_type":"home"}
        ]"#,
    );
    let events = events_from_json(
        r#"[
            {"event":"GAEvent","event_category":"Nav","event_label":"Menu"},
            {"event":"GAEvent","noise":"1","more_noise":"2"}
        ]"#,
    );

    let report = validate_capture(&schema, events, &Config::default());
    for detail in &report.details {
        if let Some(score) = detail.match_score {
            assert!((0.0..=1.0).contains(&score), "score {} out of range", score);
        }
    }
}

#[test]
fn identical_runs_produce_identical_reports() {
    let refs = r#"[
        {"event":"GAEvent","event_category":"Nav","event_label":"Menu","component_name":null},
        {"event":"GAEvent","event_category":"Footer","event_label":"Contact"}
    ]"#;
    let capture = r#"[
        {"event":"GAEvent","event_category":"Nav","event_label":"menu","component_name":"top","_captureTimestamp":100},
        {"event":"gtm.load"},
        {"event":"GAEvent","event_category":"Promo","event_label":"Sale","_captureTimestamp":220}
    ]"#;

    let run = || {
        let schema = schema_from_json(refs);
        let report = validate_capture(&schema, events_from_json(capture), &Config::default());
        serde_json::to_string(&report).expect("serialize report")
    };

    assert_eq!(run(), run());
}

#[test]
fn relevant_event_with_custom_marker() {
    let schema = schema_from_json(r#"[{"event":"analyticsEvent","event_label":"Menu"}]"#);
    let events = events_from_json(
        r#"[{"event":"analyticsEvent","event_label":"Menu"},{"event":"GAEvent","event_label":"Menu"}]"#,
    );
    let config = Config {
        event_marker: "analyticsEvent".to_string(),
        ..Config::default()
    };

    let report = validate_capture(&schema, events, &config);
    assert_eq!(report.counts.relevant, 1);
    assert_eq!(
        report.details[0].data.get("event").and_then(FieldValue::as_str),
        Some("analyticsEvent")
    );
    assert!(report.valid);
}
