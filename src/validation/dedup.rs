//! Collapses duplicate captured events, flags rapid-fire repeats, and
//! filters out records that are not relevant analytics events.

use std::collections::{HashMap, HashSet};

use crate::config::Config;
use crate::types::{CapturedEvent, EventCounts, FieldValue};

/// The capture snapshot after deduplication, timing analysis, and
/// relevance filtering. `relevant` may be empty; the runner turns that
/// into a run-level failure.
#[derive(Debug, Default)]
pub struct PreparedEvents {
    pub counts: EventCounts,
    pub relevant: Vec<CapturedEvent>,
    /// Rapid-fire warnings keyed by event ordinal.
    pub time_warnings: HashMap<usize, Vec<String>>,
}

/// Run the three capture-preparation passes in order: exact-duplicate
/// removal (first occurrence wins), time-proximity warnings over the
/// deduplicated sequence, then the relevance filter.
pub fn prepare_events(events: Vec<CapturedEvent>, config: &Config) -> PreparedEvents {
    let raw = events.len();

    let mut seen: HashSet<String> = HashSet::new();
    let mut unique: Vec<CapturedEvent> = Vec::with_capacity(events.len());
    for event in events {
        // Timestamp-stripped canonical form; two pushes of the same payload
        // at different times are still the same event.
        if seen.insert(event.fields.canonical_json()) {
            unique.push(event);
        }
    }
    tracing::info!(raw, unique = unique.len(), "deduplicated captured events");

    let time_warnings = collect_time_warnings(&unique, config.warning_time_threshold_ms);
    if !time_warnings.is_empty() {
        tracing::info!(
            events = time_warnings.len(),
            "rapid-fire warnings attached"
        );
    }

    let unique_count = unique.len();
    let relevant: Vec<CapturedEvent> = unique
        .into_iter()
        .filter(|event| is_relevant(event, &config.event_marker))
        .collect();
    tracing::info!(
        relevant = relevant.len(),
        excluded = unique_count - relevant.len(),
        marker = %config.event_marker,
        "relevance filter applied"
    );

    PreparedEvents {
        counts: EventCounts {
            raw,
            unique: unique_count,
            relevant: relevant.len(),
        },
        relevant,
        time_warnings,
    }
}

/// Warn on the *later* event whenever two consecutive kept events fired
/// closer together than the threshold. Events without timestamps break the
/// chain on both sides.
fn collect_time_warnings(
    events: &[CapturedEvent],
    threshold_ms: u64,
) -> HashMap<usize, Vec<String>> {
    let mut warnings: HashMap<usize, Vec<String>> = HashMap::new();
    let mut previous: Option<u64> = None;

    for (i, event) in events.iter().enumerate() {
        if i > 0 {
            if let (Some(prev), Some(cur)) = (previous, event.timestamp_ms) {
                let diff = cur.saturating_sub(prev);
                if diff < threshold_ms {
                    warnings.entry(event.ordinal).or_default().push(format!(
                        "Rapid event: fired {diff} ms after the previous event (threshold: {threshold_ms} ms)"
                    ));
                }
            }
        }
        previous = event.timestamp_ms;
    }

    warnings
}

fn is_relevant(event: &CapturedEvent, marker: &str) -> bool {
    matches!(event.fields.get("event"), Some(FieldValue::Str(s)) if s == marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ingest_events, parse_records};

    fn events_from_json(json: &str) -> Vec<CapturedEvent> {
        ingest_events(parse_records(json).expect("valid capture json"))
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence_preserving_order() {
        let events = events_from_json(
            r#"[
                {"event":"GAEvent","event_label":"A","_captureTimestamp":1000},
                {"event":"GAEvent","event_label":"B","_captureTimestamp":2000},
                {"event":"GAEvent","event_label":"A","_captureTimestamp":3000}
            ]"#,
        );
        let prepared = prepare_events(events, &Config::default());

        assert_eq!(prepared.counts.raw, 3);
        assert_eq!(prepared.counts.unique, 2);
        let labels: Vec<&str> = prepared
            .relevant
            .iter()
            .filter_map(|e| e.fields.get("event_label").and_then(FieldValue::as_str))
            .collect();
        assert_eq!(labels, vec!["A", "B"]);
        // The survivor is the earlier push.
        assert_eq!(prepared.relevant[0].timestamp_ms, Some(1000));
    }

    #[test]
    fn key_order_does_not_defeat_deduplication() {
        let events = events_from_json(
            r#"[
                {"event":"GAEvent","event_label":"A"},
                {"event_label":"A","event":"GAEvent"}
            ]"#,
        );
        let prepared = prepare_events(events, &Config::default());
        assert_eq!(prepared.counts.unique, 1);
    }

    #[test]
    fn rapid_fire_warning_goes_to_the_later_event() {
        let events = events_from_json(
            r#"[
                {"event":"GAEvent","event_label":"A","_captureTimestamp":0},
                {"event":"GAEvent","event_label":"B","_captureTimestamp":100},
                {"event":"GAEvent","event_label":"C","_captureTimestamp":800}
            ]"#,
        );
        let prepared = prepare_events(events, &Config::default());

        assert!(prepared.time_warnings.get(&0).is_none());
        let warnings = prepared.time_warnings.get(&1).expect("warning at 100ms");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("100 ms"));
        assert!(prepared.time_warnings.get(&2).is_none());
    }

    #[test]
    fn missing_timestamps_never_warn() {
        let events = events_from_json(
            r#"[
                {"event":"GAEvent","event_label":"A"},
                {"event":"GAEvent","event_label":"B","_captureTimestamp":100},
                {"event":"GAEvent","event_label":"C","_captureTimestamp":150}
            ]"#,
        );
        let prepared = prepare_events(events, &Config::default());

        // A->B has no baseline; B->C is 50ms apart.
        assert!(prepared.time_warnings.get(&1).is_none());
        assert!(prepared.time_warnings.contains_key(&2));
    }

    #[test]
    fn threshold_is_configurable() {
        let events = events_from_json(
            r#"[
                {"event":"GAEvent","event_label":"A","_captureTimestamp":0},
                {"event":"GAEvent","event_label":"B","_captureTimestamp":300}
            ]"#,
        );
        let config = Config {
            warning_time_threshold_ms: 200,
            ..Config::default()
        };
        let prepared = prepare_events(events, &config);
        assert!(prepared.time_warnings.is_empty());
    }

    #[test]
    fn relevance_filter_drops_other_events_and_non_objects() {
        let events = events_from_json(
            r#"[
                {"event":"GAEvent","event_label":"A"},
                {"event":"gtm.load"},
                "gtm.js",
                {"page":"home"}
            ]"#,
        );
        let prepared = prepare_events(events, &Config::default());

        assert_eq!(prepared.counts.relevant, 1);
        assert_eq!(prepared.relevant.len(), 1);
        assert_eq!(
            prepared.relevant[0].fields.get("event").and_then(FieldValue::as_str),
            Some("GAEvent")
        );
    }

    #[test]
    fn marker_comparison_is_exact() {
        let events = events_from_json(r#"[{"event":"gaevent"}]"#);
        let prepared = prepare_events(events, &Config::default());
        assert!(prepared.relevant.is_empty());
    }

    #[test]
    fn empty_capture_yields_empty_prepared_set() {
        let prepared = prepare_events(Vec::new(), &Config::default());
        assert_eq!(prepared.counts, EventCounts::default());
        assert!(prepared.relevant.is_empty());
        assert!(prepared.time_warnings.is_empty());
    }
}
