//! Mutation layer for template drafts.
//!
//! Every successful mutation produces a new `Arc<TemplateSpec>`; the previous
//! document is never modified, so observers can detect changes with
//! `Arc::ptr_eq`. Rejected mutations leave the document untouched and return
//! the reason. Listeners registered with [`TemplateEditor::on_change`] are
//! called with the full new document after each accepted mutation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::metrics::EditorMetrics;

use super::limits::{
    clamp_text, text_len, MAX_BODY_TEXT, MAX_BUTTON_TEXT, MAX_COPY_CODE_EXAMPLE, MAX_FOOTER_TEXT,
    MAX_HEADER_TEXT, MAX_OFFER_TEXT,
};
use super::normalize::{canonical_field_name, normalize};
use super::placeholder::{
    body_example_scaffold, has_positional_placeholder, insert_at, next_placeholder,
    strip_positional_placeholders, wrap_selection,
};
use super::types::{
    AuthSettings, Button, ButtonType, Category, FlowAction, Footer, Header, HeaderExample,
    HeaderFormat, LimitedTimeOffer, OtpType, ParameterFormat, TemplateError, TemplateResult,
    TemplateSpec,
};
use super::validation::can_admit_button;

type ChangeListener = Box<dyn FnMut(&Arc<TemplateSpec>) + Send>;

/// Text field that can receive a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTarget {
    Header,
    Body,
    Footer,
}

/// Inline formatting markers supported by the body text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    Bold,
    Italic,
    Strike,
    Code,
}

impl TextFormat {
    fn marker(self) -> &'static str {
        match self {
            Self::Bold => "*",
            Self::Italic => "_",
            Self::Strike => "~",
            Self::Code => "`",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlMode {
    Static,
    Dynamic,
}

/// Fresh button of the given variant with its default fields
pub fn new_button_for_type(kind: ButtonType) -> Button {
    match kind {
        ButtonType::QuickReply => Button::QuickReply {
            text: String::new(),
        },
        ButtonType::Url => Button::Url {
            text: String::new(),
            url: "https://".to_string(),
            example: None,
        },
        ButtonType::PhoneNumber => Button::PhoneNumber {
            text: String::new(),
            phone_number: String::new(),
        },
        ButtonType::CopyCode => Button::CopyCode {
            example: "CODE123".to_string(),
        },
        ButtonType::Otp => Button::Otp {
            text: String::new(),
            otp_type: OtpType::CopyCode,
        },
        ButtonType::Flow => Button::Flow {
            text: String::new(),
            flow_id: String::new(),
            flow_action: FlowAction::Navigate,
        },
        ButtonType::Catalog => Button::Catalog {
            text: String::new(),
        },
        ButtonType::Mpm => Button::Mpm {
            text: String::new(),
        },
        ButtonType::VoiceCall => Button::VoiceCall {
            text: String::new(),
        },
    }
}

/// Stable partition: quick replies first, everything else after.
pub fn partition_buttons(buttons: Vec<Button>) -> Vec<Button> {
    let (mut quick_replies, others): (Vec<_>, Vec<_>) =
        buttons.into_iter().partition(Button::is_quick_reply);
    quick_replies.extend(others);
    quick_replies
}

/// Split a stored phone number into (country code, local number)
pub fn split_phone(phone: &str) -> (String, String) {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return ("55".to_string(), String::new());
    }
    if let Some(rest) = digits.strip_prefix("55") {
        return ("55".to_string(), rest.to_string());
    }
    if let Some(rest) = digits.strip_prefix('1') {
        return ("1".to_string(), rest.to_string());
    }
    ("55".to_string(), digits)
}

pub fn join_phone(country: &str, number: &str) -> String {
    country
        .chars()
        .chain(number.chars())
        .filter(char::is_ascii_digit)
        .collect()
}

/// Shallow-merge `patch` into `doc` and normalize the result.
pub fn apply_patch(doc: &TemplateSpec, patch: &Map<String, Value>) -> TemplateSpec {
    let mut fields = match serde_json::to_value(doc) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) | Err(_) => {
            tracing::error!("Template document did not serialize to an object");
            Map::new()
        }
    };
    for (key, value) in patch {
        fields.insert(canonical_field_name(key).to_string(), value.clone());
    }
    normalize(&Value::Object(fields))
}

fn reject(kind: &'static str, err: TemplateError) -> TemplateError {
    EditorMetrics::record_rejected(kind);
    tracing::debug!(reason = %err, "Template mutation rejected");
    err
}

/// Editing session state for one template draft
pub struct TemplateEditor {
    doc: Arc<TemplateSpec>,
    listeners: Vec<ChangeListener>,
}

impl std::fmt::Debug for TemplateEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEditor")
            .field("doc", &self.doc)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for TemplateEditor {
    fn default() -> Self {
        Self::from_spec(TemplateSpec::default())
    }
}

impl TemplateEditor {
    /// Start editing from any persisted or freshly loaded value
    pub fn new(initial: &Value) -> Self {
        Self::from_spec(normalize(initial))
    }

    pub fn from_spec(mut spec: TemplateSpec) -> Self {
        spec.buttons = partition_buttons(spec.buttons);
        Self {
            doc: Arc::new(spec),
            listeners: Vec::new(),
        }
    }

    pub fn document(&self) -> &Arc<TemplateSpec> {
        &self.doc
    }

    /// Register a listener for accepted mutations
    pub fn on_change<F>(&mut self, listener: F)
    where
        F: FnMut(&Arc<TemplateSpec>) + Send + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the document with a freshly loaded one without notifying listeners
    pub fn reload(&mut self, mut spec: TemplateSpec) {
        spec.buttons = partition_buttons(spec.buttons);
        self.doc = Arc::new(spec);
    }

    fn commit(&mut self, next: TemplateSpec) -> Arc<TemplateSpec> {
        let next = Arc::new(next);
        self.doc = next.clone();
        EditorMetrics::record_applied();
        for listener in &mut self.listeners {
            listener(&next);
        }
        next
    }

    fn draft(&self) -> TemplateSpec {
        (*self.doc).clone()
    }

    pub fn apply_patch(&mut self, patch: &Map<String, Value>) -> Arc<TemplateSpec> {
        let next = apply_patch(&self.doc, patch);
        self.commit(next)
    }

    pub fn set_name(&mut self, name: &str) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.name = name.to_string();
        self.commit(next)
    }

    pub fn set_language(&mut self, language: &str) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.language = language.to_string();
        self.commit(next)
    }

    pub fn set_category(&mut self, category: Category) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.category = category;
        self.commit(next)
    }

    pub fn set_parameter_format(&mut self, format: ParameterFormat) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.parameter_format = format;
        self.commit(next)
    }

    // ------------------------------------------------------------------
    // Header
    // ------------------------------------------------------------------

    /// Replace the whole header; stale format-specific fields are not merged
    pub fn set_header(&mut self, header: Option<Header>) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.header = header.map(|mut h| {
            h.text = h.text.map(|t| clamp_text(&t, MAX_HEADER_TEXT));
            h
        });
        self.commit(next)
    }

    /// Switch header type, resetting the header to that type's defaults
    pub fn select_header_format(&mut self, format: Option<HeaderFormat>) -> Arc<TemplateSpec> {
        let header = format.map(|format| match format {
            HeaderFormat::Text => Header::text(""),
            HeaderFormat::Location => Header {
                format,
                text: None,
                example: None,
            },
            media => Header {
                format: media,
                text: None,
                example: Some(HeaderExample {
                    header_handle: vec![String::new()],
                    header_text: Vec::new(),
                }),
            },
        });
        self.set_header(header)
    }

    /// Set header text; the header becomes a TEXT header
    pub fn set_header_text(&mut self, text: &str) -> Arc<TemplateSpec> {
        let example = self
            .doc
            .header
            .as_ref()
            .filter(|h| h.format == HeaderFormat::Text)
            .and_then(|h| h.example.clone());
        self.set_header(Some(Header {
            format: HeaderFormat::Text,
            text: Some(text.to_string()),
            example,
        }))
    }

    pub fn set_header_media_handle(&mut self, handle: &str) -> Arc<TemplateSpec> {
        let mut header = self.doc.header.clone().unwrap_or_default();
        let mut example = header.example.take().unwrap_or_default();
        example.header_handle = vec![handle.to_string()];
        header.example = Some(example);
        self.set_header(Some(header))
    }

    // ------------------------------------------------------------------
    // Body
    // ------------------------------------------------------------------

    /// Set body text and regenerate the example scaffold
    pub fn set_body_text(&mut self, text: &str) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.body.text = clamp_text(text, MAX_BODY_TEXT);
        next.body.example = body_example_scaffold(&next.body.text);
        self.commit(next)
    }

    /// Wrap the selected range of the body with a formatting marker.
    /// Returns the new selection.
    pub fn apply_body_format(&mut self, start: usize, end: usize, format: TextFormat) -> (usize, usize) {
        let marker = format.marker();
        let (text, start, end) = wrap_selection(&self.doc.body.text, start, end, marker, marker);
        self.set_body_text(&text);
        (start, end)
    }

    // ------------------------------------------------------------------
    // Footer
    // ------------------------------------------------------------------

    /// Replace the whole footer
    pub fn set_footer(&mut self, footer: Option<Footer>) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.footer = footer.map(|f| Footer {
            text: clamp_text(&f.text, MAX_FOOTER_TEXT),
        });
        self.commit(next)
    }

    pub fn toggle_footer(&mut self) -> Arc<TemplateSpec> {
        let footer = match self.doc.footer {
            Some(_) => None,
            None => Some(Footer::default()),
        };
        self.set_footer(footer)
    }

    pub fn set_footer_text(&mut self, text: &str) -> Arc<TemplateSpec> {
        self.set_footer(Some(Footer {
            text: text.to_string(),
        }))
    }

    // ------------------------------------------------------------------
    // Variables
    // ------------------------------------------------------------------

    /// Insert the next placeholder into a text field at `cursor` (end of text
    /// when `None`). Named mode requires `name`. Returns the cursor after the
    /// inserted token.
    pub fn insert_variable(
        &mut self,
        target: TextTarget,
        cursor: Option<usize>,
        name: Option<&str>,
    ) -> TemplateResult<usize> {
        let current = match target {
            TextTarget::Header => self.doc.header_text(),
            TextTarget::Body => self.doc.body.text.as_str(),
            TextTarget::Footer => self.doc.footer_text(),
        }
        .to_string();

        let token = next_placeholder(&current, self.doc.parameter_format, name).ok_or_else(|| {
            reject(
                "variable_name",
                TemplateError::InvalidVariableName(name.unwrap_or_default().to_string()),
            )
        })?;

        let (field, max) = match target {
            TextTarget::Header => ("header", MAX_HEADER_TEXT),
            TextTarget::Body => ("body", MAX_BODY_TEXT),
            TextTarget::Footer => ("footer", MAX_FOOTER_TEXT),
        };
        // The whole token must fit
        if text_len(&current) + text_len(&token) > max {
            return Err(reject("field_full", TemplateError::FieldFull { field, max }));
        }

        let pos = cursor.unwrap_or_else(|| current.chars().count());
        let (text, next_cursor) = insert_at(&current, pos, &token);

        match target {
            TextTarget::Header => self.set_header_text(&text),
            TextTarget::Body => self.set_body_text(&text),
            TextTarget::Footer => self.set_footer_text(&text),
        };

        Ok(next_cursor)
    }

    // ------------------------------------------------------------------
    // Buttons
    // ------------------------------------------------------------------

    /// Store a button list, quick replies first
    pub fn set_buttons(&mut self, buttons: Vec<Button>) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.buttons = partition_buttons(buttons);
        self.commit(next)
    }

    /// Add a default button of `kind` if the admission gate allows it
    pub fn add_button(&mut self, kind: ButtonType) -> TemplateResult<Arc<TemplateSpec>> {
        let admission = can_admit_button(&self.doc.buttons, kind);
        if !admission.allowed {
            let reason = admission.reason.unwrap_or_default();
            return Err(reject("admission", TemplateError::ButtonRejected(reason)));
        }

        let mut buttons = self.doc.buttons.clone();
        buttons.push(new_button_for_type(kind));
        Ok(self.set_buttons(buttons))
    }

    pub fn remove_button(&mut self, index: usize) -> TemplateResult<Arc<TemplateSpec>> {
        self.check_index(index)?;
        let mut buttons = self.doc.buttons.clone();
        buttons.remove(index);
        Ok(self.set_buttons(buttons))
    }

    /// Replace the button at `index` with a fresh button of another variant
    pub fn change_button_type(
        &mut self,
        index: usize,
        kind: ButtonType,
    ) -> TemplateResult<Arc<TemplateSpec>> {
        self.check_index(index)?;
        let mut others = self.doc.buttons.clone();
        others.remove(index);

        let admission = can_admit_button(&others, kind);
        if !admission.allowed {
            let reason = admission.reason.unwrap_or_default();
            return Err(reject("admission", TemplateError::ButtonRejected(reason)));
        }

        let mut buttons = self.doc.buttons.clone();
        buttons[index] = new_button_for_type(kind);
        Ok(self.set_buttons(buttons))
    }

    pub fn set_button_text(&mut self, index: usize, text: &str) -> TemplateResult<Arc<TemplateSpec>> {
        self.update_button(index, None, |button| match button.text_mut() {
            Some(label) => {
                *label = clamp_text(text, MAX_BUTTON_TEXT);
                true
            }
            None => false,
        })
    }

    pub fn set_button_url(&mut self, index: usize, url: &str) -> TemplateResult<Arc<TemplateSpec>> {
        self.update_button(index, Some(ButtonType::Url), |button| match button {
            Button::Url { url: current, .. } => {
                *current = url.to_string();
                true
            }
            _ => false,
        })
    }

    /// Toggle a URL button between a fixed URL and one ending in `{{1}}`
    pub fn set_url_mode(&mut self, index: usize, mode: UrlMode) -> TemplateResult<Arc<TemplateSpec>> {
        self.update_button(index, Some(ButtonType::Url), |button| match button {
            Button::Url { url, example, .. } => {
                match mode {
                    UrlMode::Dynamic => {
                        if !url.contains("{{") {
                            *url = format!("{}/{{{{1}}}}", url.trim_end_matches('/'));
                        }
                        if example.is_none() {
                            *example = Some(vec!["Exemplo 1".to_string()]);
                        }
                    }
                    UrlMode::Static => {
                        *url = strip_positional_placeholders(url)
                            .trim_end_matches('/')
                            .to_string();
                        *example = None;
                    }
                }
                true
            }
            _ => false,
        })
    }

    pub fn set_url_example(&mut self, index: usize, value: &str) -> TemplateResult<Arc<TemplateSpec>> {
        self.update_button(index, Some(ButtonType::Url), |button| match button {
            Button::Url { example, .. } => {
                *example = Some(vec![value.to_string()]);
                true
            }
            _ => false,
        })
    }

    pub fn set_button_phone(
        &mut self,
        index: usize,
        country: &str,
        number: &str,
    ) -> TemplateResult<Arc<TemplateSpec>> {
        let joined = join_phone(country, number);
        self.update_button(index, Some(ButtonType::PhoneNumber), |button| match button {
            Button::PhoneNumber { phone_number, .. } => {
                *phone_number = joined;
                true
            }
            _ => false,
        })
    }

    pub fn set_copy_code_example(&mut self, index: usize, code: &str) -> TemplateResult<Arc<TemplateSpec>> {
        self.update_button(index, Some(ButtonType::CopyCode), |button| match button {
            Button::CopyCode { example } => {
                *example = clamp_text(code, MAX_COPY_CODE_EXAMPLE);
                true
            }
            _ => false,
        })
    }

    pub fn set_flow_button(
        &mut self,
        index: usize,
        flow_id: &str,
        action: FlowAction,
    ) -> TemplateResult<Arc<TemplateSpec>> {
        self.update_button(index, Some(ButtonType::Flow), |button| match button {
            Button::Flow {
                flow_id: current,
                flow_action,
                ..
            } => {
                *current = flow_id.to_string();
                *flow_action = action;
                true
            }
            _ => false,
        })
    }

    fn check_index(&self, index: usize) -> TemplateResult<()> {
        if index >= self.doc.buttons.len() {
            return Err(reject("index", TemplateError::ButtonIndexOutOfRange(index)));
        }
        Ok(())
    }

    /// Apply `edit` to a copy of the button at `index`. `edit` returns false
    /// when the button is of the wrong variant.
    fn update_button<F>(
        &mut self,
        index: usize,
        expected: Option<ButtonType>,
        edit: F,
    ) -> TemplateResult<Arc<TemplateSpec>>
    where
        F: FnOnce(&mut Button) -> bool,
    {
        self.check_index(index)?;
        let mut buttons = self.doc.buttons.clone();
        let actual = buttons[index].button_type();
        if !edit(&mut buttons[index]) {
            let expected = expected.unwrap_or(actual);
            return Err(reject(
                "button_type",
                TemplateError::UnexpectedButtonType { index, expected },
            ));
        }
        Ok(self.set_buttons(buttons))
    }

    // ------------------------------------------------------------------
    // Category-specific blocks
    // ------------------------------------------------------------------

    pub fn set_limited_time_offer(&mut self, offer: Option<LimitedTimeOffer>) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.limited_time_offer = offer.map(|o| LimitedTimeOffer {
            text: clamp_text(&o.text, MAX_OFFER_TEXT),
            has_expiration: o.has_expiration,
        });
        self.commit(next)
    }

    pub fn set_auth_settings(&mut self, settings: Option<AuthSettings>) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.auth_settings = settings;
        self.commit(next)
    }

    pub fn set_carousel(&mut self, carousel: Option<Value>) -> Arc<TemplateSpec> {
        let mut next = self.draft();
        next.carousel = carousel.filter(|v| !v.is_null());
        self.commit(next)
    }
}

/// True when a URL button's url carries a dynamic `{{n}}` suffix
pub fn is_dynamic_url(url: &str) -> bool {
    has_positional_placeholder(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::limits::text_len;
    use serde_json::json;
    use std::sync::Mutex;

    fn kinds(doc: &TemplateSpec) -> Vec<ButtonType> {
        doc.buttons.iter().map(Button::button_type).collect()
    }

    #[test]
    fn test_mutation_yields_fresh_document() {
        let mut editor = TemplateEditor::default();
        let before = editor.document().clone();
        let after = editor.set_body_text("Olá");

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.body.text, "");
        assert_eq!(after.body.text, "Olá");
    }

    #[test]
    fn test_listeners_receive_full_document() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();

        let mut editor = TemplateEditor::default();
        editor.on_change(move |doc| sink.lock().unwrap().push(doc.body.text.clone()));
        editor.set_body_text("um");
        editor.set_body_text("dois");

        assert_eq!(*seen.lock().unwrap(), vec!["um".to_string(), "dois".to_string()]);
    }

    #[test]
    fn test_rejected_mutation_does_not_notify() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::PhoneNumber).unwrap();
        editor.on_change(move |_| *counter.lock().unwrap() += 1);

        let before = editor.document().clone();
        let err = editor.add_button(ButtonType::PhoneNumber).unwrap_err();

        assert!(matches!(err, TemplateError::ButtonRejected(_)));
        assert!(Arc::ptr_eq(&before, editor.document()));
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_set_buttons_partitions_stably() {
        let mut editor = TemplateEditor::default();
        let doc = editor.set_buttons(vec![
            Button::Url {
                text: "a".into(),
                url: "https://a".into(),
                example: None,
            },
            Button::QuickReply { text: "1".into() },
            Button::CopyCode {
                example: "X".into(),
            },
            Button::QuickReply { text: "2".into() },
        ]);

        assert_eq!(
            kinds(&doc),
            vec![
                ButtonType::QuickReply,
                ButtonType::QuickReply,
                ButtonType::Url,
                ButtonType::CopyCode
            ]
        );
        assert_eq!(doc.buttons[0].text(), Some("1"));
        assert_eq!(doc.buttons[1].text(), Some("2"));
    }

    #[test]
    fn test_add_button_defaults() {
        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::Url).unwrap();
        editor.add_button(ButtonType::CopyCode).unwrap();
        let doc = editor.add_button(ButtonType::QuickReply).unwrap();

        assert_eq!(
            kinds(&doc),
            vec![ButtonType::QuickReply, ButtonType::Url, ButtonType::CopyCode]
        );
        assert_eq!(
            doc.buttons[1],
            Button::Url {
                text: String::new(),
                url: "https://".into(),
                example: None
            }
        );
        assert_eq!(
            doc.buttons[2],
            Button::CopyCode {
                example: "CODE123".into()
            }
        );
    }

    #[test]
    fn test_change_type_respects_caps() {
        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::Url).unwrap();
        editor.add_button(ButtonType::Url).unwrap();
        editor.add_button(ButtonType::QuickReply).unwrap();

        // the quick reply sits at index 0 after partitioning
        assert!(editor.change_button_type(0, ButtonType::Url).is_err());

        // converting one URL into another URL is fine
        let doc = editor.change_button_type(1, ButtonType::Url).unwrap();
        assert_eq!(doc.count_buttons(ButtonType::Url), 2);

        let doc = editor.change_button_type(2, ButtonType::Flow).unwrap();
        assert_eq!(doc.count_buttons(ButtonType::Flow), 1);
    }

    #[test]
    fn test_button_text_is_clamped() {
        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::QuickReply).unwrap();
        let doc = editor.set_button_text(0, &"y".repeat(200)).unwrap();
        assert_eq!(text_len(doc.buttons[0].text().unwrap()), MAX_BUTTON_TEXT);
    }

    #[test]
    fn test_button_text_on_copy_code_is_rejected() {
        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::CopyCode).unwrap();
        assert!(matches!(
            editor.set_button_text(0, "Copiar"),
            Err(TemplateError::UnexpectedButtonType { index: 0, .. })
        ));
    }

    #[test]
    fn test_copy_code_example_is_clamped() {
        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::CopyCode).unwrap();
        let doc = editor
            .set_copy_code_example(0, "ABCDEFGHIJKLMNOPQRSTUVWXYZ")
            .unwrap();
        assert_eq!(
            doc.buttons[0],
            Button::CopyCode {
                example: "ABCDEFGHIJKLMNOPQRST".into()
            }
        );
    }

    #[test]
    fn test_text_fields_are_clamped() {
        let mut editor = TemplateEditor::default();
        let doc = editor.set_body_text(&"b".repeat(2000));
        assert_eq!(text_len(&doc.body.text), MAX_BODY_TEXT);

        let doc = editor.set_header_text(&"h".repeat(100));
        assert_eq!(text_len(doc.header_text()), MAX_HEADER_TEXT);

        let doc = editor.set_footer_text(&"f".repeat(100));
        assert_eq!(text_len(doc.footer_text()), MAX_FOOTER_TEXT);

        let doc = editor.set_limited_time_offer(Some(LimitedTimeOffer {
            text: "o".repeat(40),
            has_expiration: true,
        }));
        assert_eq!(text_len(&doc.limited_time_offer.as_ref().unwrap().text), MAX_OFFER_TEXT);
    }

    #[test]
    fn test_body_example_follows_placeholders() {
        let mut editor = TemplateEditor::default();
        let doc = editor.set_body_text("Oi {{1}}, pedido {{2}}");
        assert_eq!(
            doc.body.example.as_ref().unwrap().values(),
            ["Exemplo 1", "Exemplo 2"]
        );

        let doc = editor.set_body_text("Sem variáveis");
        assert!(doc.body.example.is_none());
    }

    #[test]
    fn test_insert_positional_variable_keeps_gaps() {
        let mut editor = TemplateEditor::default();
        editor.set_body_text("Oi {{1}} {{3}}");
        let cursor = editor.insert_variable(TextTarget::Body, None, None).unwrap();

        let doc = editor.document();
        assert_eq!(doc.body.text, "Oi {{1}} {{3}}{{4}}");
        assert_eq!(cursor, doc.body.text.chars().count());
        assert_eq!(doc.body.example.as_ref().unwrap().values().len(), 3);
    }

    #[test]
    fn test_insert_variable_at_cursor() {
        let mut editor = TemplateEditor::default();
        editor.set_footer_text("Até logo");
        let cursor = editor.insert_variable(TextTarget::Footer, Some(4), None).unwrap();
        assert_eq!(editor.document().footer_text(), "Até {{1}}logo");
        assert_eq!(cursor, 9);
    }

    #[test]
    fn test_insert_variable_rejected_when_field_full() {
        let mut editor = TemplateEditor::default();
        editor.set_body_text(&"a".repeat(1022));
        let before = editor.document().clone();

        let err = editor.insert_variable(TextTarget::Body, None, None).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::FieldFull { field: "body", max: MAX_BODY_TEXT }
        ));
        assert!(Arc::ptr_eq(&before, editor.document()));
        assert!(!editor.document().body.text.contains("{{"));

        // Exactly enough room is accepted
        editor.set_body_text(&"a".repeat(1019));
        let cursor = editor.insert_variable(TextTarget::Body, None, None).unwrap();
        assert_eq!(cursor, MAX_BODY_TEXT);
        assert!(editor.document().body.text.ends_with("a{{1}}"));
    }

    #[test]
    fn test_insert_named_variable_requires_name() {
        let mut editor = TemplateEditor::default();
        editor.set_parameter_format(ParameterFormat::Named);

        assert!(matches!(
            editor.insert_variable(TextTarget::Body, None, Some("  ")),
            Err(TemplateError::InvalidVariableName(_))
        ));

        editor
            .insert_variable(TextTarget::Body, None, Some(" first_name "))
            .unwrap();
        assert_eq!(editor.document().body.text, "{{first_name}}");
    }

    #[test]
    fn test_header_variable_forces_text_header() {
        let mut editor = TemplateEditor::default();
        editor.select_header_format(Some(HeaderFormat::Image));
        editor.insert_variable(TextTarget::Header, None, None).unwrap();

        let header = editor.document().header.clone().unwrap();
        assert_eq!(header.format, HeaderFormat::Text);
        assert_eq!(header.text.as_deref(), Some("{{1}}"));
    }

    #[test]
    fn test_header_format_switch_discards_stale_fields() {
        let mut editor = TemplateEditor::default();
        editor.select_header_format(Some(HeaderFormat::Image));
        editor.set_header_media_handle("4::aW1hZ2U=");
        assert_eq!(
            editor.document().header.as_ref().unwrap().media_handle(),
            Some("4::aW1hZ2U=")
        );

        let doc = editor.select_header_format(Some(HeaderFormat::Text));
        let header = doc.header.as_ref().unwrap();
        assert_eq!(header.format, HeaderFormat::Text);
        assert!(header.example.is_none());

        let doc = editor.select_header_format(Some(HeaderFormat::Location));
        assert_eq!(doc.header.as_ref().unwrap().text, None);

        let doc = editor.select_header_format(None);
        assert!(doc.header.is_none());
    }

    #[test]
    fn test_footer_toggle() {
        let mut editor = TemplateEditor::default();
        assert_eq!(editor.toggle_footer().footer, Some(Footer::default()));
        assert_eq!(editor.toggle_footer().footer, None);
    }

    #[test]
    fn test_url_mode_switching() {
        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::Url).unwrap();
        editor.set_button_url(0, "https://loja.com/").unwrap();

        let doc = editor.set_url_mode(0, UrlMode::Dynamic).unwrap();
        match &doc.buttons[0] {
            Button::Url { url, example, .. } => {
                assert_eq!(url, "https://loja.com/{{1}}");
                assert!(is_dynamic_url(url));
                assert_eq!(example.as_deref(), Some(&["Exemplo 1".to_string()][..]));
            }
            other => panic!("unexpected {:?}", other),
        }

        let doc = editor.set_url_mode(0, UrlMode::Static).unwrap();
        match &doc.buttons[0] {
            Button::Url { url, example, .. } => {
                assert_eq!(url, "https://loja.com");
                assert!(example.is_none());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_phone_split_and_join() {
        assert_eq!(split_phone("+55 11 99999-0000"), ("55".into(), "11999990000".into()));
        assert_eq!(split_phone("1 415 555 0100"), ("1".into(), "4155550100".into()));
        assert_eq!(split_phone("351912345678"), ("55".into(), "351912345678".into()));
        assert_eq!(split_phone(""), ("55".into(), String::new()));
        assert_eq!(join_phone("+55", "(11) 99999-0000"), "5511999990000");

        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::PhoneNumber).unwrap();
        let doc = editor.set_button_phone(0, "55", "11 4000-1234").unwrap();
        assert_eq!(
            doc.buttons[0],
            Button::PhoneNumber {
                text: String::new(),
                phone_number: "551140001234".into()
            }
        );
    }

    #[test]
    fn test_flow_button_fields() {
        let mut editor = TemplateEditor::default();
        editor.add_button(ButtonType::Flow).unwrap();
        let doc = editor
            .set_flow_button(0, "1234567890", FlowAction::DataExchange)
            .unwrap();
        assert_eq!(
            doc.buttons[0],
            Button::Flow {
                text: String::new(),
                flow_id: "1234567890".into(),
                flow_action: FlowAction::DataExchange
            }
        );
        assert!(editor.set_button_url(0, "https://x").is_err());
    }

    #[test]
    fn test_remove_button_out_of_range() {
        let mut editor = TemplateEditor::default();
        assert!(matches!(
            editor.remove_button(0),
            Err(TemplateError::ButtonIndexOutOfRange(0))
        ));
    }

    #[test]
    fn test_body_format_wraps_selection() {
        let mut editor = TemplateEditor::default();
        editor.set_body_text("Promoção hoje");
        let selection = editor.apply_body_format(0, 8, TextFormat::Bold);
        assert_eq!(editor.document().body.text, "*Promoção* hoje");
        assert_eq!(selection, (1, 9));
    }

    #[test]
    fn test_apply_patch_merges_and_normalizes() {
        let mut editor = TemplateEditor::new(&json!({"content": "Oi", "origin": "import"}));
        let mut patch = Map::new();
        patch.insert("parameterFormat".into(), json!("named"));
        patch.insert("category".into(), json!("UTILITY"));
        patch.insert(
            "buttons".into(),
            json!([{"type": "URL", "url": "https://a"}, {"type": "QUICK_REPLY", "text": "ok"}]),
        );

        let doc = editor.apply_patch(&patch);
        assert_eq!(doc.parameter_format, ParameterFormat::Named);
        assert_eq!(doc.category, Category::Utility);
        assert_eq!(doc.body.text, "Oi");
        assert_eq!(kinds(&doc), vec![ButtonType::QuickReply, ButtonType::Url]);
        assert_eq!(doc.extra.get("origin"), Some(&json!("import")));
    }
}
