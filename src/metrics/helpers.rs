//! Metrics helper structs for convenient metric recording

use prometheus::{Encoder, TextEncoder};

use super::{
    DRAFTS_SAVED_TOTAL, DRAFT_SAVE_FAILURES_TOTAL, FLOWS_CREATED_TOTAL, FLOWS_STORED,
    TEMPLATE_DRAFTS_STORED, TEMPLATE_MUTATIONS_APPLIED, TEMPLATE_MUTATIONS_REJECTED,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template mutation metrics
pub struct EditorMetrics;

impl EditorMetrics {
    pub fn record_applied() {
        TEMPLATE_MUTATIONS_APPLIED.inc();
    }

    /// Record a rejected mutation (`admission`, `index`, `button_type`, `variable_name`, `field_full`)
    pub fn record_rejected(reason: &str) {
        TEMPLATE_MUTATIONS_REJECTED.with_label_values(&[reason]).inc();
    }
}

/// Helper struct for recording draft persistence metrics
pub struct DraftMetrics;

impl DraftMetrics {
    pub fn record_saved() {
        DRAFTS_SAVED_TOTAL.inc();
    }

    pub fn record_failed() {
        DRAFT_SAVE_FAILURES_TOTAL.inc();
    }

    pub fn set_stored(count: usize) {
        TEMPLATE_DRAFTS_STORED.set(count as i64);
    }
}

/// Helper struct for recording flow metrics
pub struct FlowMetrics;

impl FlowMetrics {
    /// Record a created flow by origin (`blank` or `template`)
    pub fn record_created(origin: &str) {
        FLOWS_CREATED_TOTAL.with_label_values(&[origin]).inc();
    }

    pub fn set_stored(count: usize) {
        FLOWS_STORED.set(count as i64);
    }
}
