//! Core types used throughout the DLV library.
//!
//! This module contains the fundamental data structures:
//! - [`FieldValue`] / [`EventMap`] - Typed, insertion-ordered event records
//! - [`CapturedEvent`] - One captured datalayer push with its timestamp
//! - [`ValidationSchema`] / [`SchemaSection`] - The reference schema
//! - [`RunReport`] and friends - Validation results

mod event;
mod results;
mod schema;

pub use event::{
    ingest_events, parse_records, CapturedEvent, EventMap, FieldValue, RawRecord,
    CAPTURE_TIMESTAMP_KEY, NON_OBJECT_DATA_KEY,
};
pub use results::{
    CoverageSummary, EventCounts, MatchOutcome, MissingReference, RunReport, UniqueSummary,
    ValidationDetail, Validity,
};
pub use schema::{
    Activation, ActivationKind, GlobalPatterns, SchemaSection, ValidationSchema, META_CONFIG_KEY,
};
