use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DlvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Reference input error: {0}")]
    Reference(String),

    #[error("Capture input error: {0}")]
    Capture(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl DlvError {
    pub fn reference(message: impl Into<String>) -> Self {
        DlvError::Reference(message.into())
    }

    pub fn capture(message: impl Into<String>) -> Self {
        DlvError::Capture(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            DlvError::Io(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check file paths/permissions.",
            ),
            DlvError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Input,
                e.to_string(),
                "Check that the input file is valid JSON; run with --verbose for details.",
            ),
            DlvError::Reference(msg) => ErrorPayload::new(
                ErrorCategory::Input,
                msg.to_string(),
                "The references file must be a JSON array of event definitions, optionally prefixed by a _meta_config_ record.",
            ),
            DlvError::Capture(msg) => ErrorPayload::new(
                ErrorCategory::Input,
                msg.to_string(),
                "The events file must be a JSON array of captured datalayer records (with optional _captureTimestamp).",
            ),
            DlvError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("match_threshold") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Use a match threshold between 0.0 and 1.0 (e.g., --threshold 0.7).",
                    )
                } else if lower.contains("event_marker") {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Set a non-empty event marker (e.g., --event-marker GAEvent).",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Config,
                        msg.to_string(),
                        "Check flags/paths and the config file (TOML).",
                    )
                }
            }
            DlvError::Unknown(msg) => ErrorPayload::new(
                ErrorCategory::Unknown,
                msg.to_string(),
                "Re-run with --verbose; file an issue if persistent.",
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, DlvError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Config,
    Input,
    Io,
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
