//! Determines which reference sections were observed at least once.

use crate::types::{
    CapturedEvent, CoverageSummary, MissingReference, SchemaSection, ValidationSchema,
};

use super::scoring::score_match;

/// Score every relevant event against every reference section and mark the
/// references whose best match reaches the threshold. Coverage is about
/// references, not events: one event can only claim its single best
/// reference, and a reference stays found no matter how many events match
/// it.
pub fn compare_with_references(
    events: &[CapturedEvent],
    schema: &ValidationSchema,
    match_threshold: f64,
) -> CoverageSummary {
    struct Tracked<'a> {
        section: &'a SchemaSection,
        found: bool,
    }

    let mut references: Vec<Tracked<'_>> = schema
        .sections
        .iter()
        .filter(|section| !section.expected_properties.is_empty())
        .map(|section| Tracked {
            section,
            found: false,
        })
        .collect();

    for event in events {
        let mut best_score = -1.0;
        let mut best_idx: Option<usize> = None;
        for (idx, reference) in references.iter().enumerate() {
            let outcome = score_match(&event.fields, &reference.section.expected_properties);
            // Strictly greater: the first section seen wins ties.
            if outcome.score > best_score {
                best_score = outcome.score;
                best_idx = Some(idx);
            }
        }

        if let Some(idx) = best_idx {
            if best_score >= match_threshold {
                references[idx].found = true;
            }
        }
    }

    let matched_count = references.iter().filter(|r| r.found).count();
    let reference_count = references.len();
    let missing_details: Vec<MissingReference> = references
        .iter()
        .filter(|r| !r.found)
        .map(|r| MissingReference {
            reference_id: r.section.id.clone(),
            reference_title: r.section.title.clone(),
            properties: r.section.expected_properties.clone(),
        })
        .collect();

    let coverage_percent = if reference_count > 0 {
        (matched_count as f64 / reference_count as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    CoverageSummary {
        reference_count,
        captured_count: events.len(),
        matched_count,
        missing_count: reference_count - matched_count,
        coverage_percent,
        missing_details,
    }
}
