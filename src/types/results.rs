use serde::Serialize;

use super::event::EventMap;

/// Outcome of scoring one captured event against one schema section.
/// Transient; only the best match per event survives into a
/// [`ValidationDetail`].
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    pub score: f64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Tri-state classification of a captured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    Valid,
    Invalid,
    Unmatched,
}

/// Per-event validation result: the best-scoring reference match plus the
/// errors and warnings that apply to this event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationDetail {
    pub event_index: usize,
    pub data: EventMap,
    pub validity: Validity,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<f64>,
    /// The matched reference's properties, reordered to the captured
    /// event's key order for side-by-side reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_data: Option<EventMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

/// Which references were observed at least once during the run.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CoverageSummary {
    pub reference_count: usize,
    pub captured_count: usize,
    pub matched_count: usize,
    pub missing_count: usize,
    pub coverage_percent: f64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_details: Vec<MissingReference>,
}

/// A reference definition never observed during the run.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MissingReference {
    pub reference_id: String,
    pub reference_title: String,
    pub properties: EventMap,
}

/// De-duplicated event counts per classification.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UniqueSummary {
    pub unique_valid: usize,
    pub unique_invalid: usize,
    pub unique_unmatched: usize,
    pub unique_with_warnings: usize,
    pub total_unique: usize,
}

/// Raw/unique/relevant counts through the dedup stage.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventCounts {
    pub raw: usize,
    pub unique: usize,
    pub relevant: usize,
}

/// Complete result of one validation run.
///
/// `valid` is false when any unique invalid match exists, when any
/// reference went unobserved, or when the run failed fatally (in which case
/// `errors` explains why and the downstream sections are absent).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub valid: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub counts: EventCounts,
    pub details: Vec<ValidationDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<UniqueSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<CoverageSummary>,
}

impl RunReport {
    /// The fatal short-circuit: no relevant events survived filtering.
    pub fn failed(message: impl Into<String>, counts: EventCounts) -> Self {
        let message = message.into();
        Self {
            valid: false,
            errors: vec![message.clone()],
            warnings: vec![message],
            counts,
            details: Vec::new(),
            summary: None,
            comparison: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_report_carries_message_in_errors_and_warnings() {
        let report = RunReport::failed(
            "No relevant events left to validate after filtering",
            EventCounts {
                raw: 3,
                unique: 2,
                relevant: 0,
            },
        );
        assert!(!report.valid);
        assert_eq!(report.errors, report.warnings);
        assert!(report.details.is_empty());
        assert!(report.summary.is_none());
        assert!(report.comparison.is_none());
    }

    #[test]
    fn run_report_serializes_camel_case_and_skips_empty() {
        let report = RunReport::failed("boom", EventCounts::default());
        let json = serde_json::to_string(&report).expect("serialize report");
        assert!(json.contains("\"valid\":false"));
        assert!(json.contains("\"counts\""));
        assert!(!json.contains("\"summary\""));
        assert!(!json.contains("\"comparison\""));
    }
}
