//! Weighted fuzzy scoring of one captured event against one reference.
//!
//! The score is a weighted average over three field buckets. Primary GA
//! fields dominate; a mismatched static `event` value is punished hard so a
//! captured event can only ever instantiate a reference with the same event
//! name unless everything else lines up.

use crate::types::{EventMap, FieldValue, MatchOutcome};

const KEY_FIELDS_PRIMARY: [&str; 4] = ["event", "event_category", "event_action", "event_label"];
const KEY_FIELDS_SECONDARY: [&str; 1] = ["component_name"];

const PRIMARY_WEIGHT: f64 = 0.60;
const SECONDARY_WEIGHT: f64 = 0.20;
const OTHER_WEIGHT: f64 = 0.20;

/// Multiplier on the primary ratio when the static `event` value differs.
const EVENT_MISMATCH_PENALTY: f64 = 0.1;
/// Multiplier on the final score when primary errors exist and the primary
/// ratio ended up below this cutoff.
const LOW_PRIMARY_CUTOFF: f64 = 0.5;
const LOW_PRIMARY_PENALTY: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldBucket {
    Primary,
    Secondary,
    Other,
}

impl FieldBucket {
    fn of(field: &str) -> Self {
        if KEY_FIELDS_PRIMARY.contains(&field) {
            FieldBucket::Primary
        } else if KEY_FIELDS_SECONDARY.contains(&field) {
            FieldBucket::Secondary
        } else {
            FieldBucket::Other
        }
    }

    fn label(self) -> &'static str {
        match self {
            FieldBucket::Primary => "primary field",
            FieldBucket::Secondary => "secondary field",
            FieldBucket::Other => "field",
        }
    }
}

#[derive(Debug, Default)]
struct BucketTally {
    matched: usize,
    total: usize,
    errors: Vec<String>,
}

impl BucketTally {
    /// A bucket with nothing expected does not drag the score down.
    fn ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.matched as f64 / self.total as f64
        }
    }
}

/// Score `event` against the expected properties of one reference section.
///
/// Returns the weighted score in `[0, 1]` together with every comparison
/// error (value mismatches, missing fields, extra fields) and every
/// soft-quality warning (loosened-equality matches).
pub fn score_match(event: &EventMap, expected: &EventMap) -> MatchOutcome {
    if expected.is_empty() {
        return MatchOutcome {
            score: 0.0,
            errors: vec![
                "No expected properties defined in the reference section".to_string(),
            ],
            warnings: Vec::new(),
        };
    }

    let mut warnings = Vec::new();
    let mut primary = BucketTally::default();
    let mut secondary = BucketTally::default();
    let mut other = BucketTally::default();

    for (prop, expected_value) in expected.iter() {
        let bucket = FieldBucket::of(prop);
        let tally = match bucket {
            FieldBucket::Primary => &mut primary,
            FieldBucket::Secondary => &mut secondary,
            FieldBucket::Other => &mut other,
        };
        tally.total += 1;

        let Some(actual_value) = event.get(prop) else {
            continue;
        };

        if expected_value.is_dynamic() {
            // Presence is all a dynamic field asks for.
            tally.matched += 1;
            continue;
        }

        match compare_static(expected_value, actual_value) {
            StaticComparison::Exact => tally.matched += 1,
            StaticComparison::Loosened => {
                tally.matched += 1;
                warnings.push(format!(
                    "Case/accent-insensitive match for '{prop}': expected '{expected_value}', found '{actual_value}'"
                ));
            }
            StaticComparison::Mismatch => {
                tally.errors.push(format!(
                    "Value for {} '{prop}' does not match: expected '{expected_value}', found '{actual_value}'",
                    bucket.label()
                ));
            }
        }
    }

    let missing_field_errors: Vec<String> = expected
        .keys()
        .filter(|key| !event.contains_key(key))
        .map(|key| {
            format!("Field '{key}' present in the reference but absent from the captured event")
        })
        .collect();

    let mut extra_keys: Vec<&str> = event
        .keys()
        .filter(|key| !expected.contains_key(key))
        .collect();
    extra_keys.sort_unstable();
    let extra_field_errors: Vec<String> = if extra_keys.is_empty() {
        Vec::new()
    } else {
        vec![format!(
            "Extra field(s) in captured event not defined in the reference: [{}]",
            extra_keys.join(", ")
        )]
    };

    let mut primary_ratio = primary.ratio();
    if let Some(expected_event) = expected.get("event") {
        if !expected_event.is_dynamic() && !event_value_matches(expected_event, event.get("event"))
        {
            primary_ratio *= EVENT_MISMATCH_PENALTY;
        }
    }

    let mut score = primary_ratio * PRIMARY_WEIGHT
        + secondary.ratio() * SECONDARY_WEIGHT
        + other.ratio() * OTHER_WEIGHT;
    score = score.clamp(0.0, 1.0);
    if !primary.errors.is_empty() && primary_ratio < LOW_PRIMARY_CUTOFF {
        score *= LOW_PRIMARY_PENALTY;
    }

    let mut errors = primary.errors;
    errors.extend(secondary.errors);
    errors.extend(other.errors);
    errors.extend(missing_field_errors);
    errors.extend(extra_field_errors);

    MatchOutcome {
        score,
        errors,
        warnings,
    }
}

enum StaticComparison {
    Exact,
    Loosened,
    Mismatch,
}

fn compare_static(expected: &FieldValue, actual: &FieldValue) -> StaticComparison {
    match (expected, actual) {
        (FieldValue::Str(exp), FieldValue::Str(act)) => {
            if normalize_string(exp) == normalize_string(act) {
                StaticComparison::Exact
            } else if clean_string(exp) == clean_string(act) {
                StaticComparison::Loosened
            } else {
                StaticComparison::Mismatch
            }
        }
        _ => {
            if expected == actual {
                StaticComparison::Exact
            } else {
                StaticComparison::Mismatch
            }
        }
    }
}

/// The hard event-name gate: normalized equality only, no loosened tier.
fn event_value_matches(expected: &FieldValue, actual: Option<&FieldValue>) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match (expected, actual) {
        (FieldValue::Str(exp), FieldValue::Str(act)) => {
            normalize_string(exp) == normalize_string(act)
        }
        _ => expected == actual,
    }
}

/// Decode literal `\uXXXX` escape sequences so references authored with
/// escaped text compare equal to the live values.
pub fn normalize_string(text: &str) -> String {
    if !text.contains("\\u") {
        return text.to_string();
    }
    decode_unicode_escapes(text)
}

fn decode_unicode_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.char_indices().peekable();

    while let Some((idx, ch)) = chars.next() {
        if ch != '\\' || !text[idx..].starts_with("\\u") {
            out.push(ch);
            continue;
        }

        match parse_escape_at(text, idx) {
            Some((decoded, consumed)) => {
                out.push(decoded);
                // Skip past everything the escape consumed (minus the '\').
                for _ in 0..consumed - 1 {
                    chars.next();
                }
            }
            None => out.push(ch),
        }
    }

    out
}

/// Parse one `\uXXXX` escape starting at `start`, combining surrogate pairs.
/// Returns the decoded char and the number of chars consumed.
fn parse_escape_at(text: &str, start: usize) -> Option<(char, usize)> {
    let unit = parse_hex4(text, start + 2)?;

    if (0xD800..0xDC00).contains(&unit) {
        // High surrogate: needs a following \uXXXX low surrogate.
        let low_start = start + 6;
        if text.get(low_start..).is_some_and(|rest| rest.starts_with("\\u")) {
            if let Some(low) = parse_hex4(text, low_start + 2) {
                if (0xDC00..0xE000).contains(&low) {
                    let combined =
                        0x10000 + ((unit as u32 - 0xD800) << 10) + (low as u32 - 0xDC00);
                    return char::from_u32(combined).map(|c| (c, 12));
                }
            }
        }
        return None;
    }
    if (0xDC00..0xE000).contains(&unit) {
        // Lone low surrogate is undecodable.
        return None;
    }

    char::from_u32(unit as u32).map(|c| (c, 6))
}

fn parse_hex4(text: &str, at: usize) -> Option<u16> {
    let digits = text.get(at..at + 4)?;
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u16::from_str_radix(digits, 16).ok()
}

/// Loosened comparison form: lower-case, alphanumeric and spaces only,
/// whitespace collapsed.
pub fn clean_string(text: &str) -> String {
    let lower = normalize_string(text).to_lowercase();
    let mut cleaned = String::with_capacity(lower.len());

    for ch in lower.chars() {
        if ch.is_alphanumeric() {
            cleaned.push(ch);
        } else if ch.is_whitespace() {
            cleaned.push(' ');
        }
    }

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
