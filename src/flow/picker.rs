//! Flow list search and the FLOW-button flow picker

use serde::Serialize;

use super::types::FlowSummary;

/// Label for picker entries whose publication status was never reported
pub const UNKNOWN_STATUS: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerEntry {
    pub meta_flow_id: String,
    pub name: String,
    pub status_label: String,
}

/// Case-insensitive substring match on name or platform flow id.
/// A blank query keeps everything.
pub fn filter_flows(flows: Vec<FlowSummary>, query: &str) -> Vec<FlowSummary> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return flows;
    }

    flows
        .into_iter()
        .filter(|flow| {
            flow.name.to_lowercase().contains(&needle)
                || flow
                    .meta_flow_id
                    .as_deref()
                    .is_some_and(|id| id.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Flows selectable on a FLOW button.
///
/// Only flows with a platform id qualify. Entries that report a status must be
/// PUBLISHED; entries without one are kept and labelled `unknown`. Sorted by
/// name.
pub fn published_flows(flows: &[FlowSummary]) -> Vec<PickerEntry> {
    let mut entries: Vec<PickerEntry> = flows
        .iter()
        .filter_map(|flow| {
            let meta_flow_id = flow.meta_flow_id.as_deref().filter(|id| !id.is_empty())?;
            let status_label = match flow.meta_status.as_deref() {
                None | Some("") => UNKNOWN_STATUS.to_string(),
                Some(status) if status.eq_ignore_ascii_case("PUBLISHED") => "PUBLISHED".to_string(),
                Some(_) => return None,
            };
            Some(PickerEntry {
                meta_flow_id: meta_flow_id.to_string(),
                name: flow.name.clone(),
                status_label,
            })
        })
        .collect();

    entries.sort_by_cached_key(|entry| (collation_key(&entry.name), entry.name.clone()));
    entries
}

/// Lower-cased name with Latin diacritics folded, so "Ávila" sorts with "a"
fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}
