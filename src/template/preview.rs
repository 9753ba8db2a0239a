//! Preview projector: read-only view of a template for rendering.

use serde::Serialize;

use super::types::{Button, ButtonType, HeaderFormat, TemplateSpec};

/// Shown in place of an empty body
pub const EMPTY_BODY_PROMPT: &str = "Digite o corpo para ver a prévia.";

pub const LOCATION_CAPTION: &str = "LOCALIZAÇÃO";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewBody {
    pub text: String,
    /// True when `text` is the empty-body prompt
    pub is_placeholder: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewIcon {
    ExternalLink,
    Reply,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewButton {
    pub kind: ButtonType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<PreviewIcon>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub body: PreviewBody,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    pub call_to_action: Vec<PreviewButton>,
    pub quick_replies: Vec<PreviewButton>,
}

impl PreviewModel {
    /// Buttons in display order: call-to-action group, then quick replies
    pub fn buttons(&self) -> impl Iterator<Item = &PreviewButton> {
        self.call_to_action.iter().chain(self.quick_replies.iter())
    }
}

pub fn header_label(format: HeaderFormat, text: Option<&str>) -> String {
    match format {
        HeaderFormat::Text => text.unwrap_or_default().to_string(),
        HeaderFormat::Location => LOCATION_CAPTION.to_string(),
        media => format!("MÍDIA ({})", media.as_str()),
    }
}

fn button_label(button: &Button) -> String {
    let text = button.text().unwrap_or_default();
    if !text.is_empty() {
        return text.to_string();
    }
    match button.button_type() {
        ButtonType::CopyCode => "Copiar código".to_string(),
        ButtonType::QuickReply => "Quick Reply".to_string(),
        other => other.as_str().to_string(),
    }
}

fn preview_button(button: &Button) -> PreviewButton {
    let icon = match button.button_type() {
        ButtonType::Url => Some(PreviewIcon::ExternalLink),
        ButtonType::QuickReply => Some(PreviewIcon::Reply),
        _ => None,
    };
    PreviewButton {
        kind: button.button_type(),
        label: button_label(button),
        icon,
    }
}

/// Project a document into its preview. Never fails, even on an empty document.
pub fn project(doc: &TemplateSpec) -> PreviewModel {
    let header = doc
        .header
        .as_ref()
        .map(|h| header_label(h.format, h.text.as_deref()));

    let body = if doc.body.text.is_empty() {
        PreviewBody {
            text: EMPTY_BODY_PROMPT.to_string(),
            is_placeholder: true,
        }
    } else {
        PreviewBody {
            text: doc.body.text.clone(),
            is_placeholder: false,
        }
    };

    let footer = doc
        .footer
        .as_ref()
        .map(|f| f.text.clone())
        .filter(|t| !t.is_empty());

    let (quick_replies, call_to_action): (Vec<_>, Vec<_>) =
        doc.buttons.iter().partition(|b| b.is_quick_reply());

    PreviewModel {
        header,
        body,
        footer,
        call_to_action: call_to_action.into_iter().map(preview_button).collect(),
        quick_replies: quick_replies.into_iter().map(preview_button).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::types::{Body, Footer, Header};

    #[test]
    fn test_empty_document_has_body_prompt() {
        let preview = project(&TemplateSpec::default());
        assert_eq!(preview.body.text, EMPTY_BODY_PROMPT);
        assert!(preview.body.is_placeholder);
        assert!(preview.header.is_none());
        assert!(preview.footer.is_none());
        assert_eq!(preview.buttons().count(), 0);
    }

    #[test]
    fn test_header_labels() {
        assert_eq!(header_label(HeaderFormat::Text, Some("Oi")), "Oi");
        assert_eq!(header_label(HeaderFormat::Image, None), "MÍDIA (IMAGE)");
        assert_eq!(header_label(HeaderFormat::Document, None), "MÍDIA (DOCUMENT)");
        assert_eq!(header_label(HeaderFormat::Location, None), "LOCALIZAÇÃO");
    }

    #[test]
    fn test_quick_replies_render_after_call_to_action() {
        let doc = TemplateSpec {
            header: Some(Header::text("Promo")),
            body: Body {
                text: "Confira".to_string(),
                example: None,
            },
            footer: Some(Footer {
                text: "Loja".to_string(),
            }),
            buttons: vec![
                Button::QuickReply {
                    text: "Sim".to_string(),
                },
                Button::QuickReply {
                    text: String::new(),
                },
                Button::Url {
                    text: "Site".to_string(),
                    url: "https://loja.com".to_string(),
                    example: None,
                },
                Button::CopyCode {
                    example: "X1".to_string(),
                },
            ],
            ..TemplateSpec::default()
        };

        let preview = project(&doc);
        let labels: Vec<_> = preview.buttons().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Site", "Copiar código", "Sim", "Quick Reply"]);
        assert_eq!(preview.call_to_action[0].icon, Some(PreviewIcon::ExternalLink));
        assert_eq!(preview.header.as_deref(), Some("Promo"));
        assert_eq!(preview.footer.as_deref(), Some("Loja"));

        // document order is untouched
        assert!(doc.buttons[0].is_quick_reply());
    }

    #[test]
    fn test_unlabelled_button_uses_type_name() {
        let doc = TemplateSpec {
            buttons: vec![Button::VoiceCall {
                text: String::new(),
            }],
            ..TemplateSpec::default()
        };
        assert_eq!(project(&doc).call_to_action[0].label, "VOICE_CALL");
    }
}
