//! WhatsApp message template builder.
//!
//! This module provides:
//! - The canonical template document with an opaque bag for unknown fields
//! - A normalizer that accepts any persisted or partial value
//! - Platform limit checks and the button-admission gate
//! - Placeholder detection and generation (`{{1}}` or `{{name}}`)
//! - `TemplateEditor`, the mutation layer used by every edit
//! - A read-only preview projection
//! - `TemplateSession`, which binds an editor to a persisted draft
//!
//! # Example
//!
//! ```ignore
//! let mut editor = TemplateEditor::new(&json!({ "content": "Olá {{1}}" }));
//!
//! editor.add_button(ButtonType::QuickReply)?;
//! editor.insert_variable(TextTarget::Body, None, None)?;
//!
//! let preview = project(editor.document());
//! let report = validate(editor.document());
//! ```

mod editor;
mod limits;
mod normalize;
mod placeholder;
mod preview;
mod session;
mod types;
mod validation;

pub use editor::{
    apply_patch, is_dynamic_url, join_phone, new_button_for_type, partition_buttons, split_phone,
    TemplateEditor, TextFormat, TextTarget, UrlMode,
};
pub use limits::{
    clamp_text, text_len, MAX_BODY_TEXT, MAX_BUTTONS, MAX_BUTTON_TEXT, MAX_COPY_CODE_BUTTONS,
    MAX_COPY_CODE_EXAMPLE, MAX_FOOTER_TEXT, MAX_HEADER_TEXT, MAX_OFFER_TEXT, MAX_PHONE_BUTTONS,
    MAX_URL_BUTTONS,
};
pub use normalize::{canonical_field_name, normalize};
pub use placeholder::{
    body_example_scaffold, detect_placeholder_count, next_placeholder, next_positional_index,
    placeholder_names,
};
pub use preview::{project, PreviewBody, PreviewButton, PreviewIcon, PreviewModel};
pub use session::TemplateSession;
pub use types::{
    AuthSettings, Body, BodyExample, Button, ButtonType, Category, FlowAction, Footer, Header,
    HeaderExample, HeaderFormat, LimitedTimeOffer, OtpType, ParameterFormat, TemplateError,
    TemplateResult, TemplateSpec, DEFAULT_LANGUAGE, DEFAULT_TEMPLATE_NAME,
};
pub use validation::{
    can_admit_button, validate, Admission, ButtonCounts, Severity, ValidationIssue,
    ValidationReport,
};
