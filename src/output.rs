use serde::Serialize;

use crate::error::ErrorPayload;
use crate::types::{RunReport, ValidationSchema};

/// Schema version for output payloads.
pub const DLV_OUTPUT_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum DlvOutput {
    Validate(ValidateOutput),
    Schema(SchemaOutput),
    Error(ErrorOutput),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateOutput {
    pub version: String,
    pub references: String,
    pub events: String,
    pub match_threshold: f64,
    pub report: RunReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub top_issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaOutput {
    pub version: String,
    pub references: String,
    pub schema: ValidationSchema,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorOutput {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub error: ErrorPayload,
}
