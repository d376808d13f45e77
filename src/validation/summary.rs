//! De-duplicated pass/fail/warning counts and the human-readable run
//! summary.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::types::{RunReport, UniqueSummary, ValidationDetail, Validity};

/// Reduce per-event details to unique counts.
///
/// Matched events (valid or invalid) are identified by the reference they
/// instantiate, so ten pushes of the same reference count once. Unmatched
/// events are identified by a content hash of their canonical form, so
/// identical unknown shapes collapse while distinct ones stay separate.
pub fn aggregate_unique(details: &[ValidationDetail]) -> UniqueSummary {
    let mut valid_set: HashSet<String> = HashSet::new();
    let mut invalid_set: HashSet<String> = HashSet::new();
    let mut unmatched_set: HashSet<String> = HashSet::new();
    let mut warning_set: HashSet<String> = HashSet::new();

    for detail in details {
        let identifier = unique_identifier(detail);

        match detail.validity {
            Validity::Valid => {
                valid_set.insert(identifier.clone());
            }
            Validity::Invalid => {
                invalid_set.insert(identifier.clone());
            }
            Validity::Unmatched => {
                unmatched_set.insert(identifier.clone());
            }
        }

        if !detail.warnings.is_empty() {
            warning_set.insert(identifier);
        }
    }

    let total_unique = valid_set
        .union(&invalid_set)
        .cloned()
        .collect::<HashSet<_>>()
        .union(&unmatched_set)
        .count();

    UniqueSummary {
        unique_valid: valid_set.len(),
        unique_invalid: invalid_set.len(),
        unique_unmatched: unmatched_set.len(),
        unique_with_warnings: warning_set.len(),
        total_unique,
    }
}

fn unique_identifier(detail: &ValidationDetail) -> String {
    match (&detail.matched_section_id, detail.validity) {
        (Some(section_id), Validity::Valid | Validity::Invalid) => format!("ref_{section_id}"),
        _ => format!("dl_{}", short_hash(&detail.data.canonical_json())),
    }
}

/// First 16 hex chars of the SHA-256 of the canonical event text.
fn short_hash(canonical: &str) -> String {
    let digest = Sha256::digest(canonical.as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Render the run outcome as a short ranked issue list for the pretty
/// output and CLI summary.
pub fn generate_top_issues(report: &RunReport) -> Vec<String> {
    let mut issues = Vec::new();

    let coverage = report.comparison.as_ref();
    let summary = report.summary.as_ref();

    if report.valid {
        issues.push(format!(
            "Datalayer validation passed ({:.1}% reference coverage)",
            coverage.map(|c| c.coverage_percent).unwrap_or(0.0)
        ));
    } else {
        issues.push(format!(
            "Datalayer validation failed ({:.1}% reference coverage)",
            coverage.map(|c| c.coverage_percent).unwrap_or(0.0)
        ));
    }

    for error in &report.errors {
        issues.push(error.clone());
    }

    if let Some(coverage) = coverage {
        if !coverage.missing_details.is_empty() {
            if coverage.missing_details.len() <= 3 {
                for missing in &coverage.missing_details {
                    issues.push(format!(
                        "Reference '{}' was never observed.",
                        missing.reference_title
                    ));
                }
            } else {
                issues.push(format!(
                    "{} references were never observed.",
                    coverage.missing_details.len()
                ));
            }
        }
    }

    if let Some(summary) = summary {
        if summary.unique_invalid > 0 {
            issues.push(format!(
                "{} unique event(s) matched a reference with errors.",
                summary.unique_invalid
            ));
        }
        if summary.unique_unmatched > 0 {
            issues.push(format!(
                "{} unique event(s) did not match any reference.",
                summary.unique_unmatched
            ));
        }
        if summary.unique_with_warnings > 0 {
            issues.push(format!(
                "{} unique event(s) carry warnings.",
                summary.unique_with_warnings
            ));
        }
    }

    issues
}
