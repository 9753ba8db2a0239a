//! Constraint validator and button-admission gate

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use super::limits::{
    text_len, MAX_BODY_TEXT, MAX_BUTTONS, MAX_BUTTON_TEXT, MAX_COPY_CODE_BUTTONS,
    MAX_COPY_CODE_EXAMPLE, MAX_FOOTER_TEXT, MAX_HEADER_TEXT, MAX_OFFER_TEXT, MAX_PHONE_BUTTONS,
    MAX_URL_BUTTONS,
};
use super::placeholder::{detect_placeholder_count, is_positional_name, placeholder_names};
use super::types::{Button, ButtonType, Category, HeaderFormat, ParameterFormat, TemplateSpec};

lazy_static! {
    static ref TEMPLATE_NAME: Regex = Regex::new(r"^[a-z0-9_]+$").expect("template name pattern");
}

/// Button counts relevant to the admission rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonCounts {
    pub total: usize,
    pub url: usize,
    pub phone: usize,
    pub copy_code: usize,
}

impl ButtonCounts {
    pub fn of(buttons: &[Button]) -> Self {
        buttons.iter().fold(Self::default(), |mut counts, button| {
            counts.total += 1;
            match button.button_type() {
                ButtonType::Url => counts.url += 1,
                ButtonType::PhoneNumber => counts.phone += 1,
                ButtonType::CopyCode => counts.copy_code += 1,
                _ => {}
            }
            counts
        })
    }
}

/// Outcome of the button-admission gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Admission {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Admission {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn rejected(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Decide whether one more button of `candidate` type fits on the template.
///
/// Rules are checked in order and the first failure wins: total cap, URL
/// cap, phone cap, copy-code cap.
pub fn can_admit_button(existing: &[Button], candidate: ButtonType) -> Admission {
    let counts = ButtonCounts::of(existing);

    if counts.total >= MAX_BUTTONS {
        return Admission::rejected(format!("button limit reached ({})", MAX_BUTTONS));
    }
    if candidate == ButtonType::Url && counts.url >= MAX_URL_BUTTONS {
        return Admission::rejected(format!("URL button limit reached ({})", MAX_URL_BUTTONS));
    }
    if candidate == ButtonType::PhoneNumber && counts.phone >= MAX_PHONE_BUTTONS {
        return Admission::rejected(format!(
            "phone number button limit reached ({})",
            MAX_PHONE_BUTTONS
        ));
    }
    if candidate == ButtonType::CopyCode && counts.copy_code >= MAX_COPY_CODE_BUTTONS {
        return Admission::rejected(format!(
            "copy code button limit reached ({})",
            MAX_COPY_CODE_BUTTONS
        ));
    }

    Admission::allowed()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Structural violation; a draft carrying it is not persisted
    Error,
    /// Draft is storable but not yet submittable
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: Severity::Error,
        });
    }

    fn warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
            severity: Severity::Warning,
        });
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    /// No issues of any severity
    pub fn is_submittable(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    /// Error messages joined for display
    pub fn error_summary(&self) -> String {
        self.errors()
            .map(|i| format!("{}: {}", i.field, i.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Check a whole document against the mirrored platform limits.
pub fn validate(doc: &TemplateSpec) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !TEMPLATE_NAME.is_match(&doc.name) {
        report.warning("name", "must contain only a-z, 0-9 and _");
    }

    check_length(&mut report, "body.text", &doc.body.text, MAX_BODY_TEXT);
    if doc.body.text.trim().is_empty() {
        report.warning("body.text", "body is required");
    }

    if let Some(header) = &doc.header {
        let text = header.text.as_deref().unwrap_or("");
        check_length(&mut report, "header.text", text, MAX_HEADER_TEXT);
        if header.format == HeaderFormat::Text && text.trim().is_empty() {
            report.warning("header.text", "text header is empty");
        }
        if header.format.is_media() && header.media_handle().map_or(true, str::is_empty) {
            report.warning("header.example", "media header has no sample handle");
        }
    }

    if let Some(footer) = &doc.footer {
        check_length(&mut report, "footer.text", &footer.text, MAX_FOOTER_TEXT);
    }

    check_placeholders(&mut report, doc);
    check_buttons(&mut report, &doc.buttons);

    if let Some(offer) = &doc.limited_time_offer {
        check_length(&mut report, "limited_time_offer.text", &offer.text, MAX_OFFER_TEXT);
        if doc.category != Category::Marketing {
            report.warning("limited_time_offer", "only used by MARKETING templates");
        }
    }

    if doc.auth_settings.is_some() && doc.category != Category::Authentication {
        report.warning("auth_settings", "only used by AUTHENTICATION templates");
    }

    report
}

fn check_length(report: &mut ValidationReport, field: &str, value: &str, max: usize) {
    let len = text_len(value);
    if len > max {
        report.error(field, format!("{} characters exceeds the limit of {}", len, max));
    }
}

fn check_placeholders(report: &mut ValidationReport, doc: &TemplateSpec) {
    let fields = [
        ("header.text", doc.header_text()),
        ("body.text", doc.body.text.as_str()),
        ("footer.text", doc.footer_text()),
    ];

    for (field, text) in fields {
        for name in placeholder_names(text) {
            let mismatch = match doc.parameter_format {
                ParameterFormat::Positional => !is_positional_name(&name),
                ParameterFormat::Named => is_positional_name(&name),
            };
            if mismatch {
                report.error(
                    field,
                    format!(
                        "placeholder {{{{{}}}}} does not match the {:?} parameter format",
                        name, doc.parameter_format
                    ),
                );
            }
        }
    }

    let expected = detect_placeholder_count(&doc.body.text);
    if expected > 0 {
        let provided = doc.body.example.as_ref().map_or(0, |e| e.values().len());
        if provided != expected {
            report.warning(
                "body.example",
                format!("expected {} example values, found {}", expected, provided),
            );
        }
    }
}

fn check_buttons(report: &mut ValidationReport, buttons: &[Button]) {
    let counts = ButtonCounts::of(buttons);
    if counts.total > MAX_BUTTONS {
        report.error("buttons", format!("at most {} buttons", MAX_BUTTONS));
    }
    if counts.url > MAX_URL_BUTTONS {
        report.error("buttons", format!("at most {} URL buttons", MAX_URL_BUTTONS));
    }
    if counts.phone > MAX_PHONE_BUTTONS {
        report.error("buttons", format!("at most {} phone number button", MAX_PHONE_BUTTONS));
    }
    if counts.copy_code > MAX_COPY_CODE_BUTTONS {
        report.error("buttons", format!("at most {} copy code button", MAX_COPY_CODE_BUTTONS));
    }

    for (idx, button) in buttons.iter().enumerate() {
        if let Some(text) = button.text() {
            check_length(report, &format!("buttons[{}].text", idx), text, MAX_BUTTON_TEXT);
        }
        if let Button::CopyCode { example } = button {
            check_length(report, &format!("buttons[{}].example", idx), example, MAX_COPY_CODE_EXAMPLE);
        }
    }
}
