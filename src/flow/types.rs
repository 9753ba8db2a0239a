//! Flow document and record types

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Flow JSON version used for new blank flows
pub const FLOW_JSON_VERSION: &str = "7.3";

/// Which fields of a submitted flow response update contact attributes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMapping {
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactMapping>,

    /// Contact custom field key -> flow response field name
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_field: Option<String>,
}

/// One screen of a flow document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowScreen {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub terminal: bool,
    pub layout: Value,
}

/// A flow document.
///
/// `spec_json` is kept opaque; only its `screens` sequence is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSpec {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_flow_id: Option<String>,

    pub spec_json: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_mapping: Option<FlowMapping>,
}

impl FlowSpec {
    /// Empty flow with no screens
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meta_flow_id: None,
            spec_json: json!({ "version": FLOW_JSON_VERSION, "screens": [] }),
            default_mapping: None,
        }
    }

    /// Well-formed screens (objects with a string `id`), in document order
    pub fn screens(&self) -> Vec<FlowScreen> {
        let Some(screens) = self.spec_json.get("screens").and_then(Value::as_array) else {
            return Vec::new();
        };

        screens
            .iter()
            .filter_map(|screen| {
                let id = screen.get("id")?.as_str()?.to_string();
                Some(FlowScreen {
                    id,
                    title: screen.get("title").and_then(Value::as_str).map(str::to_string),
                    terminal: screen.get("terminal").and_then(Value::as_bool).unwrap_or(false),
                    layout: screen.get("layout").cloned().unwrap_or(Value::Null),
                })
            })
            .collect()
    }

    /// Names of every named layout component across all screens
    pub fn field_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for screen in self.screens() {
            collect_names(&screen.layout, &mut names);
        }
        names
    }
}

fn collect_names(node: &Value, names: &mut Vec<String>) {
    match node {
        Value::Object(fields) => {
            if let Some(name) = fields.get("name").and_then(Value::as_str) {
                if fields.contains_key("type") && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
            if let Some(children) = fields.get("children") {
                collect_names(children, names);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_names(item, names);
            }
        }
        _ => {}
    }
}

/// Check the only structural expectations placed on `specJson`
pub fn check_spec_json(spec_json: &Value) -> Result<(), String> {
    let Value::Object(fields) = spec_json else {
        return Err("specJson must be an object".to_string());
    };
    match fields.get("screens") {
        None | Some(Value::Array(_)) => Ok(()),
        Some(_) => Err("specJson.screens must be an array".to_string()),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowStatus {
    #[default]
    Draft,
    Published,
}

/// A persisted flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRecord {
    pub id: String,

    #[serde(default)]
    pub status: FlowStatus,

    /// Publication status reported by the messaging platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_status: Option<String>,

    pub spec: FlowSpec,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FlowRecord {
    pub fn new(id: String, spec: FlowSpec) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: FlowStatus::Draft,
            meta_status: None,
            spec,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> FlowSummary {
        FlowSummary {
            id: self.id.clone(),
            name: self.spec.name.clone(),
            meta_flow_id: self.spec.meta_flow_id.clone(),
            meta_status: self.meta_status.clone(),
        }
    }
}

/// Catalog listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSummary {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_flow_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_status: Option<String>,
}

/// Partial update of a flow; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPatch {
    pub name: Option<String>,
    pub meta_flow_id: Option<String>,
    pub meta_status: Option<String>,
    pub spec_json: Option<Value>,
    pub default_mapping: Option<FlowMapping>,
}

impl FlowPatch {
    /// Apply onto `record`. Fails without touching the record when
    /// `spec_json` is malformed.
    pub fn apply(self, record: &mut FlowRecord) -> Result<(), String> {
        if let Some(spec_json) = &self.spec_json {
            check_spec_json(spec_json)?;
        }

        if let Some(name) = self.name {
            record.spec.name = name;
        }
        if let Some(meta_flow_id) = self.meta_flow_id {
            record.spec.meta_flow_id = Some(meta_flow_id).filter(|id| !id.is_empty());
        }
        if let Some(meta_status) = self.meta_status {
            record.status = if meta_status.eq_ignore_ascii_case("PUBLISHED") {
                FlowStatus::Published
            } else {
                FlowStatus::Draft
            };
            record.meta_status = Some(meta_status).filter(|s| !s.is_empty());
        }
        if let Some(spec_json) = self.spec_json {
            record.spec.spec_json = spec_json;
        }
        if let Some(mapping) = self.default_mapping {
            record.spec.default_mapping = Some(mapping);
        }
        record.updated_at = Utc::now();
        Ok(())
    }
}
