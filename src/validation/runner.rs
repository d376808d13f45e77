//! Runs the full validation pipeline over one finalized capture snapshot.
//!
//! Every stage consumes the previous stage's output and returns a new
//! value; the whole run is synchronous and deterministic for a given
//! schema, event sequence, and config.

use crate::config::Config;
use crate::types::{
    CapturedEvent, EventMap, MatchOutcome, RunReport, SchemaSection, ValidationDetail,
    ValidationSchema, Validity,
};

use super::coverage::compare_with_references;
use super::dedup::prepare_events;
use super::scoring::score_match;
use super::summary::aggregate_unique;

pub const NO_RELEVANT_EVENTS_MESSAGE: &str =
    "No relevant events left to validate after filtering";

/// Validate a captured event sequence against the schema.
pub fn validate_capture(
    schema: &ValidationSchema,
    events: Vec<CapturedEvent>,
    config: &Config,
) -> RunReport {
    let prepared = prepare_events(events, config);

    if prepared.relevant.is_empty() {
        tracing::warn!("{}", NO_RELEVANT_EVENTS_MESSAGE);
        return RunReport::failed(NO_RELEVANT_EVENTS_MESSAGE, prepared.counts);
    }

    tracing::info!(
        relevant = prepared.relevant.len(),
        sections = schema.sections.len(),
        "validating relevant events"
    );

    let details: Vec<ValidationDetail> = prepared
        .relevant
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let time_warnings = prepared
                .time_warnings
                .get(&event.ordinal)
                .cloned()
                .unwrap_or_default();
            build_detail(index, event, time_warnings, schema, config.match_threshold)
        })
        .collect();

    let summary = aggregate_unique(&details);
    let comparison = compare_with_references(&prepared.relevant, schema, config.match_threshold);

    // The run passes only when every matched event was clean and every
    // reference was observed.
    let valid = summary.unique_invalid == 0 && comparison.missing_count == 0;

    tracing::info!(
        valid,
        unique_valid = summary.unique_valid,
        unique_invalid = summary.unique_invalid,
        unique_unmatched = summary.unique_unmatched,
        missing_references = comparison.missing_count,
        coverage = comparison.coverage_percent,
        "validation run complete"
    );

    RunReport {
        valid,
        errors: Vec::new(),
        warnings: Vec::new(),
        counts: prepared.counts,
        details,
        summary: Some(summary),
        comparison: Some(comparison),
    }
}

/// Score one event against every scoreable section and keep the best.
fn build_detail(
    index: usize,
    event: &CapturedEvent,
    mut warnings: Vec<String>,
    schema: &ValidationSchema,
    match_threshold: f64,
) -> ValidationDetail {
    let mut best: Option<(&SchemaSection, MatchOutcome)> = None;
    for section in &schema.sections {
        if section.expected_properties.is_empty() {
            continue;
        }
        let outcome = score_match(&event.fields, &section.expected_properties);
        let better = match &best {
            None => true,
            Some((_, current)) => outcome.score > current.score,
        };
        if better {
            best = Some((section, outcome));
        }
    }

    match best {
        Some((section, outcome)) if outcome.score >= match_threshold => {
            warnings.extend(outcome.warnings);
            let validity = if outcome.errors.is_empty() {
                Validity::Valid
            } else {
                Validity::Invalid
            };
            ValidationDetail {
                event_index: index,
                data: event.fields.clone(),
                validity,
                errors: if validity == Validity::Invalid {
                    outcome.errors
                } else {
                    Vec::new()
                },
                warnings,
                matched_section_id: Some(section.id.clone()),
                matched_section: Some(section.title.clone()),
                match_score: Some(outcome.score),
                reference_data: Some(reorder_reference_properties(
                    &event.fields,
                    &section.expected_properties,
                )),
                timestamp_ms: event.timestamp_ms,
            }
        }
        Some((_, outcome)) => {
            warnings.extend(outcome.warnings);
            warnings.push(format!(
                "Event does not match any known reference (best score: {:.1}%)",
                outcome.score * 100.0
            ));
            ValidationDetail {
                event_index: index,
                data: event.fields.clone(),
                validity: Validity::Unmatched,
                errors: Vec::new(),
                warnings,
                matched_section_id: None,
                matched_section: None,
                match_score: Some(outcome.score),
                reference_data: None,
                timestamp_ms: event.timestamp_ms,
            }
        }
        None => {
            warnings.push(
                "Event does not match any known reference (no scoreable sections)".to_string(),
            );
            ValidationDetail {
                event_index: index,
                data: event.fields.clone(),
                validity: Validity::Unmatched,
                errors: Vec::new(),
                warnings,
                matched_section_id: None,
                matched_section: None,
                match_score: None,
                reference_data: None,
                timestamp_ms: event.timestamp_ms,
            }
        }
    }
}

/// Reorder the reference's properties to the captured event's key order so
/// reports can show the two side by side; reference-only keys follow at
/// the end in their original order.
fn reorder_reference_properties(captured: &EventMap, reference: &EventMap) -> EventMap {
    let mut reordered = EventMap::new();
    for key in captured.keys() {
        if let Some(value) = reference.get(key) {
            reordered.insert(key, value.clone());
        }
    }
    for (key, value) in reference.iter() {
        if !reordered.contains_key(key) {
            reordered.insert(key, value.clone());
        }
    }
    reordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldValue;

    #[test]
    fn reference_properties_follow_captured_key_order() {
        let captured: EventMap =
            serde_json::from_str(r#"{"event_label":"Menu","event":"GAEvent"}"#).expect("json");
        let reference: EventMap = serde_json::from_str(
            r#"{"event":"GAEvent","event_category":"Nav","event_label":"Menu"}"#,
        )
        .expect("json");

        let reordered = reorder_reference_properties(&captured, &reference);
        let keys: Vec<&str> = reordered.keys().collect();
        assert_eq!(keys, vec!["event_label", "event", "event_category"]);
        assert_eq!(
            reordered.get("event_category").and_then(FieldValue::as_str),
            Some("Nav")
        );
    }
}
