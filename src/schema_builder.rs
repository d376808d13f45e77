//! Builds a [`ValidationSchema`] from the raw reference definitions.
//!
//! The references file is an ordered JSON array of event definitions,
//! optionally prefixed by a meta-record carrying the expected GTM container
//! id. A definition that cannot be turned into a section is logged and
//! skipped; the build itself never aborts.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::{
    Activation, ActivationKind, EventMap, FieldValue, GlobalPatterns, RawRecord, SchemaSection,
    ValidationSchema, META_CONFIG_KEY,
};

const TITLE_KEY_PRIORITY: [&str; 3] = ["event_name", "event_category", "component_name"];
const COMMON_REQUIRED_FIELDS: [&str; 3] = ["event_category", "event_action", "event_label"];
const FALLBACK_TITLE: &str = "Unknown_Reference_Title";

#[derive(Debug, Deserialize)]
struct MetaConfig {
    #[serde(default)]
    expected_gtm_id: Option<String>,
}

pub struct SchemaBuilder {
    definitions: Vec<RawRecord>,
    expected_gtm_id: Option<String>,
}

impl SchemaBuilder {
    /// Splits off the optional leading meta-record; the rest of the list
    /// becomes the section definitions.
    pub fn new(mut records: Vec<RawRecord>) -> Self {
        let expected_gtm_id = match records.first().and_then(RawRecord::as_map) {
            Some(first) => match parse_meta_config(first) {
                Some(meta) => {
                    records.remove(0);
                    if let Some(id) = &meta.expected_gtm_id {
                        tracing::info!(gtm_id = %id, "expected GTM id taken from references file");
                    }
                    meta.expected_gtm_id
                }
                None => None,
            },
            None => None,
        };

        Self {
            definitions: records,
            expected_gtm_id,
        }
    }

    pub fn build(&self) -> ValidationSchema {
        tracing::debug!(
            definitions = self.definitions.len(),
            "building validation schema"
        );

        let sections: Vec<SchemaSection> = self
            .definitions
            .iter()
            .enumerate()
            .filter_map(|(index, record)| build_section(index, record))
            .collect();

        tracing::info!(sections = sections.len(), "validation schema built");

        ValidationSchema {
            total_sections: self.definitions.len(),
            global_patterns: GlobalPatterns::default(),
            expected_gtm_id: self.expected_gtm_id.clone(),
            sections,
        }
    }
}

/// The meta value arrives as collapsed JSON text; it counts as a
/// meta-record only when that text parses back to an object.
fn parse_meta_config(first: &EventMap) -> Option<MetaConfig> {
    let raw = first.get(META_CONFIG_KEY)?.as_str()?;
    serde_json::from_str::<MetaConfig>(raw).ok()
}

fn build_section(index: usize, record: &RawRecord) -> Option<SchemaSection> {
    let Some(definition) = record.as_map() else {
        tracing::warn!(
            index,
            "reference definition is not an object; section skipped"
        );
        return None;
    };

    Some(SchemaSection {
        id: format!("datalayer_{index}"),
        title: section_title(definition),
        expected_properties: definition.clone(),
        required_fields: required_fields(definition),
        dynamic_fields: dynamic_fields(definition),
        activation: Activation {
            condition: activation_condition(definition),
            kind: activation_kind(definition),
        },
    })
}

/// First non-empty string among the priority keys wins.
fn section_title(definition: &EventMap) -> String {
    for key in TITLE_KEY_PRIORITY {
        if let Some(FieldValue::Str(value)) = definition.get(key) {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    FALLBACK_TITLE.to_string()
}

/// `event` is always required; the common GA trio joins whenever present.
fn required_fields(definition: &EventMap) -> Vec<String> {
    let mut required = vec!["event".to_string()];
    for field in COMMON_REQUIRED_FIELDS {
        if definition.contains_key(field) {
            required.push(field.to_string());
        }
    }
    required
}

fn dynamic_fields(definition: &EventMap) -> BTreeMap<String, String> {
    let mut dynamic = BTreeMap::new();
    for (key, value) in definition.iter() {
        match value {
            FieldValue::Null => {
                dynamic.insert(key.to_string(), "null".to_string());
            }
            FieldValue::Str(s) if s.contains('{') && s.contains('}') => {
                dynamic.insert(key.to_string(), s.clone());
            }
            _ => {}
        }
    }
    dynamic
}

fn str_field<'a>(definition: &'a EventMap, key: &str) -> &'a str {
    definition.get(key).and_then(FieldValue::as_str).unwrap_or("")
}

fn activation_condition(definition: &EventMap) -> String {
    let event_label = str_field(definition, "event_label");
    let event_category = str_field(definition, "event_category");
    let event_action = str_field(definition, "event_action");

    if matches!(event_action, "Interaction" | "Click" | "Submit") {
        format!("When the user interacts with {event_label} in the {event_category} section")
    } else if matches!(event_action, "View" | "Content" | "Load") {
        format!("When the user views {event_label} in the {event_category} section")
    } else {
        format!("When {event_label} fires in {event_category}")
    }
}

fn activation_kind(definition: &EventMap) -> ActivationKind {
    let event_action = str_field(definition, "event_action").to_lowercase();
    let interaction = definition
        .get("interaction")
        .map(|v| v.to_string().to_lowercase())
        .unwrap_or_default();

    if matches!(event_action.as_str(), "click" | "interaction") || interaction == "yes" {
        ActivationKind::Click
    } else if matches!(event_action.as_str(), "view" | "impression" | "content") {
        ActivationKind::View
    } else if matches!(event_action.as_str(), "load" | "pageview") {
        ActivationKind::Load
    } else if event_action == "scroll" {
        ActivationKind::Scroll
    } else if matches!(event_action.as_str(), "hover" | "mouse") {
        ActivationKind::Hover
    } else if matches!(event_action.as_str(), "submit" | "form_submit") {
        ActivationKind::Submit
    } else {
        ActivationKind::Custom
    }
}
