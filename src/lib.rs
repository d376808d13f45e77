//! DataLayer Validator (DLV) Library
//!
//! A library for validating datalayer events captured on a live webpage
//! against a hand-authored set of reference definitions. A browser
//! collaborator delivers the finalized, ordered capture; everything in here
//! is pure, synchronous, and re-computable from that snapshot.
//!
//! # Module Overview
//!
//! - [`schema_builder`] - Turn raw reference definitions into a queryable schema
//! - [`validation`] - Scoring, deduplication, coverage, and summary stages
//! - [`config`] - Thresholds and the relevant-event marker
//! - [`types`] - Core data types and structures
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```
//! use dlv_lib::{ingest_events, parse_records, validate_capture, Config, SchemaBuilder};
//!
//! let references = parse_records(r#"[{"event":"GAEvent","event_label":"Menu"}]"#)?;
//! let schema = SchemaBuilder::new(references).build();
//!
//! let capture = parse_records(r#"[{"event":"GAEvent","event_label":"Menu"}]"#)?;
//! let report = validate_capture(&schema, ingest_events(capture), &Config::default());
//! assert!(report.valid);
//! # Ok::<(), serde_json::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod schema_builder;
pub mod types;
pub mod validation;

pub use config::{
    Config, DEFAULT_EVENT_MARKER, DEFAULT_MATCH_THRESHOLD, DEFAULT_WARNING_TIME_THRESHOLD_MS,
};
pub use error::{DlvError, ErrorCategory, ErrorPayload, Result};
pub use output::{
    DlvOutput, ErrorOutput, SchemaOutput, Summary, ValidateOutput, DLV_OUTPUT_VERSION,
};
pub use schema_builder::SchemaBuilder;
pub use types::{
    ingest_events, parse_records, Activation, ActivationKind, CapturedEvent, CoverageSummary,
    EventCounts, EventMap, FieldValue, GlobalPatterns, MatchOutcome, MissingReference, RawRecord,
    RunReport, SchemaSection, UniqueSummary, ValidationDetail, ValidationSchema, Validity,
};
pub use validation::{
    aggregate_unique, compare_with_references, generate_top_issues, prepare_events, score_match,
    validate_capture, PreparedEvents, NO_RELEVANT_EVENTS_MESSAGE,
};
