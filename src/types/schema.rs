use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::event::EventMap;
use crate::error::DlvError;

/// Reserved key marking an optional leading meta-record in the references
/// file.
pub const META_CONFIG_KEY: &str = "_meta_config_";

/// Validation schema built from the reference definitions.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSchema {
    pub total_sections: usize,
    pub global_patterns: GlobalPatterns,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_gtm_id: Option<String>,
    pub sections: Vec<SchemaSection>,
}

/// Well-known placeholder patterns shared by all sections.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GlobalPatterns {
    pub component_name: String,
    pub element_text: String,
    pub user_type: String,
}

impl Default for GlobalPatterns {
    fn default() -> Self {
        Self {
            component_name: "{{component_name}}".to_string(),
            element_text: "{{element_name}}".to_string(),
            user_type: "null".to_string(),
        }
    }
}

/// One reference definition turned into a queryable schema section.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSection {
    pub id: String,
    pub title: String,
    pub expected_properties: EventMap,
    pub required_fields: Vec<String>,
    pub dynamic_fields: BTreeMap<String, String>,
    pub activation: Activation,
}

/// How the reference event is expected to fire on the page.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    pub condition: String,
    pub kind: ActivationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationKind {
    Click,
    View,
    Load,
    Scroll,
    Hover,
    Submit,
    Custom,
}

impl fmt::Display for ActivationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ActivationKind::Click => "click",
                ActivationKind::View => "view",
                ActivationKind::Load => "load",
                ActivationKind::Scroll => "scroll",
                ActivationKind::Hover => "hover",
                ActivationKind::Submit => "submit",
                ActivationKind::Custom => "custom",
            }
        )
    }
}

impl FromStr for ActivationKind {
    type Err = DlvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "click" => Ok(ActivationKind::Click),
            "view" => Ok(ActivationKind::View),
            "load" => Ok(ActivationKind::Load),
            "scroll" => Ok(ActivationKind::Scroll),
            "hover" => Ok(ActivationKind::Hover),
            "submit" => Ok(ActivationKind::Submit),
            "custom" => Ok(ActivationKind::Custom),
            _ => Err(DlvError::Config(format!("Unknown activation kind: {}", s))),
        }
    }
}
