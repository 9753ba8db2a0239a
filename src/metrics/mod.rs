//! Prometheus metrics for the builder service.
//!
//! This module provides metrics for:
//! - Template mutations (applied, rejected by reason)
//! - Draft saves (saved, failed)
//! - Flow creation by origin
//! - Stored document counts, refreshed on scrape

mod helpers;

pub use helpers::{encode_metrics, DraftMetrics, EditorMetrics, FlowMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, IntCounter, IntCounterVec,
    IntGauge,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "smartzap";

lazy_static! {
    // ============================================================================
    // Template Editing Metrics
    // ============================================================================

    /// Accepted template mutations
    pub static ref TEMPLATE_MUTATIONS_APPLIED: IntCounter = register_int_counter!(
        format!("{}_template_mutations_applied_total", METRIC_PREFIX),
        "Total template mutations applied"
    ).unwrap();

    /// Rejected template mutations by reason
    pub static ref TEMPLATE_MUTATIONS_REJECTED: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_mutations_rejected_total", METRIC_PREFIX),
        "Total template mutations rejected",
        &["reason"]
    ).unwrap();

    // ============================================================================
    // Draft Persistence Metrics
    // ============================================================================

    pub static ref DRAFTS_SAVED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_drafts_saved_total", METRIC_PREFIX),
        "Total template drafts saved"
    ).unwrap();

    pub static ref DRAFT_SAVE_FAILURES_TOTAL: IntCounter = register_int_counter!(
        format!("{}_draft_save_failures_total", METRIC_PREFIX),
        "Total template draft saves that failed"
    ).unwrap();

    /// Number of stored template drafts
    pub static ref TEMPLATE_DRAFTS_STORED: IntGauge = register_int_gauge!(
        format!("{}_template_drafts_stored", METRIC_PREFIX),
        "Number of stored template drafts"
    ).unwrap();

    // ============================================================================
    // Flow Metrics
    // ============================================================================

    /// Flows created by origin (blank, template)
    pub static ref FLOWS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_flows_created_total", METRIC_PREFIX),
        "Total flows created",
        &["origin"]
    ).unwrap();

    /// Number of stored flows
    pub static ref FLOWS_STORED: IntGauge = register_int_gauge!(
        format!("{}_flows_stored", METRIC_PREFIX),
        "Number of stored flows"
    ).unwrap();
}
