//! Template document types and error definitions

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub const DEFAULT_TEMPLATE_NAME: &str = "novo_template";
pub const DEFAULT_LANGUAGE: &str = "pt_BR";

/// Template-editing error type
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Button rejected: {0}")]
    ButtonRejected(String),

    #[error("Invalid variable name: {0:?}")]
    InvalidVariableName(String),

    #[error("Button index out of range: {0}")]
    ButtonIndexOutOfRange(usize),

    #[error("Button {index} is not a {expected} button")]
    UnexpectedButtonType { index: usize, expected: ButtonType },

    #[error("No room for a variable in {field} ({max} characters max)")]
    FieldFull { field: &'static str, max: usize },
}

/// Result type for template operations
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Template category as accepted by the platform
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    #[default]
    Marketing,
    Utility,
    Authentication,
}

impl Category {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MARKETING" => Some(Self::Marketing),
            "UTILITY" => Some(Self::Utility),
            "AUTHENTICATION" => Some(Self::Authentication),
            _ => None,
        }
    }
}

/// Placeholder syntax used across header, body and footer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterFormat {
    /// `{{1}}`, `{{2}}`, ...
    #[default]
    Positional,
    /// `{{first_name}}`, ...
    Named,
}

impl ParameterFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "positional" => Some(Self::Positional),
            "named" => Some(Self::Named),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderFormat {
    #[default]
    Text,
    Image,
    Video,
    Document,
    Location,
}

impl HeaderFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TEXT" => Some(Self::Text),
            "IMAGE" => Some(Self::Image),
            "VIDEO" => Some(Self::Video),
            "DOCUMENT" => Some(Self::Document),
            "LOCATION" => Some(Self::Location),
            _ => None,
        }
    }

    pub fn is_media(self) -> bool {
        matches!(self, Self::Image | Self::Video | Self::Document)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
            Self::Document => "DOCUMENT",
            Self::Location => "LOCATION",
        }
    }
}

/// Sample values attached to a header (media handle or text example)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderExample {
    /// Uploaded media handle reference
    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Vec::is_empty")]
    pub header_handle: Vec<String>,

    #[serde(default, deserialize_with = "string_list", skip_serializing_if = "Vec::is_empty")]
    pub header_text: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub format: HeaderFormat,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<HeaderExample>,
}

impl Header {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            format: HeaderFormat::Text,
            text: Some(text.into()),
            example: None,
        }
    }

    /// Media handle, if one was provided
    pub fn media_handle(&self) -> Option<&str> {
        self.example
            .as_ref()
            .and_then(|e| e.header_handle.first())
            .map(String::as_str)
    }
}

/// Example values for body placeholders, one row in platform order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BodyExample {
    #[serde(default)]
    pub body_text: Vec<Vec<String>>,
}

impl BodyExample {
    pub fn from_values(values: Vec<String>) -> Self {
        Self {
            body_text: vec![values],
        }
    }

    /// Example values of the first (and only) row
    pub fn values(&self) -> &[String] {
        self.body_text.first().map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<BodyExample>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Footer {
    #[serde(default)]
    pub text: String,
}

/// Limited-time offer block (MARKETING only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LimitedTimeOffer {
    #[serde(default)]
    pub text: String,

    #[serde(default, alias = "hasExpiration")]
    pub has_expiration: bool,
}

/// Authentication template settings (AUTHENTICATION only)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthSettings {
    #[serde(default, alias = "messageSendTtlSeconds", skip_serializing_if = "Option::is_none")]
    pub message_send_ttl_seconds: Option<u32>,

    #[serde(default, alias = "addSecurityRecommendation", skip_serializing_if = "Option::is_none")]
    pub add_security_recommendation: Option<bool>,

    #[serde(default, alias = "codeExpirationMinutes", skip_serializing_if = "Option::is_none")]
    pub code_expiration_minutes: Option<u32>,
}

/// Button variant discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ButtonType {
    QuickReply,
    Url,
    PhoneNumber,
    CopyCode,
    Otp,
    Flow,
    Catalog,
    Mpm,
    VoiceCall,
}

impl ButtonType {
    pub const ALL: [ButtonType; 9] = [
        Self::QuickReply,
        Self::Url,
        Self::PhoneNumber,
        Self::CopyCode,
        Self::Otp,
        Self::Flow,
        Self::Catalog,
        Self::Mpm,
        Self::VoiceCall,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuickReply => "QUICK_REPLY",
            Self::Url => "URL",
            Self::PhoneNumber => "PHONE_NUMBER",
            Self::CopyCode => "COPY_CODE",
            Self::Otp => "OTP",
            Self::Flow => "FLOW",
            Self::Catalog => "CATALOG",
            Self::Mpm => "MPM",
            Self::VoiceCall => "VOICE_CALL",
        }
    }
}

impl std::fmt::Display for ButtonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpType {
    #[default]
    CopyCode,
    OneTap,
    ZeroTap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    #[default]
    Navigate,
    DataExchange,
}

/// A template button; the `type` tag selects the variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Button {
    QuickReply {
        #[serde(default)]
        text: String,
    },
    Url {
        #[serde(default)]
        text: String,
        #[serde(default)]
        url: String,
        /// Example value for a dynamic `{{1}}` suffix
        #[serde(default, deserialize_with = "optional_string_list", skip_serializing_if = "Option::is_none")]
        example: Option<Vec<String>>,
    },
    PhoneNumber {
        #[serde(default)]
        text: String,
        #[serde(default)]
        phone_number: String,
    },
    CopyCode {
        #[serde(default, deserialize_with = "first_string")]
        example: String,
    },
    Otp {
        #[serde(default)]
        text: String,
        #[serde(default)]
        otp_type: OtpType,
    },
    Flow {
        #[serde(default)]
        text: String,
        #[serde(default)]
        flow_id: String,
        #[serde(default)]
        flow_action: FlowAction,
    },
    Catalog {
        #[serde(default)]
        text: String,
    },
    Mpm {
        #[serde(default)]
        text: String,
    },
    VoiceCall {
        #[serde(default)]
        text: String,
    },
}

impl Button {
    pub fn button_type(&self) -> ButtonType {
        match self {
            Self::QuickReply { .. } => ButtonType::QuickReply,
            Self::Url { .. } => ButtonType::Url,
            Self::PhoneNumber { .. } => ButtonType::PhoneNumber,
            Self::CopyCode { .. } => ButtonType::CopyCode,
            Self::Otp { .. } => ButtonType::Otp,
            Self::Flow { .. } => ButtonType::Flow,
            Self::Catalog { .. } => ButtonType::Catalog,
            Self::Mpm { .. } => ButtonType::Mpm,
            Self::VoiceCall { .. } => ButtonType::VoiceCall,
        }
    }

    pub fn is_quick_reply(&self) -> bool {
        matches!(self, Self::QuickReply { .. })
    }

    /// Label text; COPY_CODE buttons carry no label
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::CopyCode { .. } => None,
            Self::QuickReply { text }
            | Self::Url { text, .. }
            | Self::PhoneNumber { text, .. }
            | Self::Otp { text, .. }
            | Self::Flow { text, .. }
            | Self::Catalog { text }
            | Self::Mpm { text }
            | Self::VoiceCall { text } => Some(text),
        }
    }

    pub(crate) fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Self::CopyCode { .. } => None,
            Self::QuickReply { text }
            | Self::Url { text, .. }
            | Self::PhoneNumber { text, .. }
            | Self::Otp { text, .. }
            | Self::Flow { text, .. }
            | Self::Catalog { text }
            | Self::Mpm { text }
            | Self::VoiceCall { text } => Some(text),
        }
    }
}

/// Canonical in-memory template draft.
///
/// Fields the builder does not understand are kept in `extra` and written
/// back unchanged on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSpec {
    pub name: String,

    pub language: String,

    pub category: Category,

    #[serde(alias = "parameterFormat")]
    pub parameter_format: ParameterFormat,

    pub header: Option<Header>,

    pub body: Body,

    pub footer: Option<Footer>,

    #[serde(default)]
    pub buttons: Vec<Button>,

    #[serde(default, alias = "limitedTimeOffer")]
    pub limited_time_offer: Option<LimitedTimeOffer>,

    #[serde(default, alias = "authSettings", skip_serializing_if = "Option::is_none")]
    pub auth_settings: Option<AuthSettings>,

    /// Carousel definition, round-tripped as-is
    #[serde(default)]
    pub carousel: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for TemplateSpec {
    fn default() -> Self {
        Self {
            name: DEFAULT_TEMPLATE_NAME.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            category: Category::default(),
            parameter_format: ParameterFormat::default(),
            header: None,
            body: Body::default(),
            footer: None,
            buttons: Vec::new(),
            limited_time_offer: None,
            auth_settings: None,
            carousel: None,
            extra: Map::new(),
        }
    }
}

impl TemplateSpec {
    pub fn header_text(&self) -> &str {
        self.header
            .as_ref()
            .and_then(|h| h.text.as_deref())
            .unwrap_or("")
    }

    pub fn footer_text(&self) -> &str {
        self.footer.as_ref().map(|f| f.text.as_str()).unwrap_or("")
    }

    pub fn count_buttons(&self, kind: ButtonType) -> usize {
        self.buttons.iter().filter(|b| b.button_type() == kind).count()
    }
}

/// Accepts a string, an array of strings, or null.
fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string_list(deserializer)?.unwrap_or_default())
}

fn optional_string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => Some(vec![s]),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}

/// Accepts a string or an array whose first string element is taken.
fn first_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string_list(deserializer)?
        .and_then(|values| values.into_iter().next())
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_button_tag_round_trip() {
        let button: Button = serde_json::from_value(json!({
            "type": "PHONE_NUMBER",
            "text": "Ligar",
            "phone_number": "5511999999999"
        }))
        .unwrap();

        assert_eq!(button.button_type(), ButtonType::PhoneNumber);
        assert_eq!(button.text(), Some("Ligar"));
        assert_eq!(serde_json::to_value(&button).unwrap()["type"], "PHONE_NUMBER");
    }

    #[test]
    fn test_copy_code_accepts_array_example() {
        let button: Button =
            serde_json::from_value(json!({"type": "COPY_CODE", "example": ["PROMO10"]})).unwrap();

        assert_eq!(
            button,
            Button::CopyCode {
                example: "PROMO10".to_string()
            }
        );
        assert_eq!(button.text(), None);
    }

    #[test]
    fn test_url_example_accepts_plain_string() {
        let button: Button = serde_json::from_value(json!({
            "type": "URL",
            "text": "Ver pedido",
            "url": "https://loja.com/{{1}}",
            "example": "abc"
        }))
        .unwrap();

        match button {
            Button::Url { example, .. } => assert_eq!(example, Some(vec!["abc".to_string()])),
            other => panic!("unexpected button {:?}", other),
        }
    }

    #[test]
    fn test_flow_button_defaults() {
        let button: Button = serde_json::from_value(json!({"type": "FLOW"})).unwrap();
        assert_eq!(
            button,
            Button::Flow {
                text: String::new(),
                flow_id: String::new(),
                flow_action: FlowAction::Navigate,
            }
        );
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(Category::parse("utility"), Some(Category::Utility));
        assert_eq!(Category::parse("promo"), None);
    }

    #[test]
    fn test_default_spec_serializes_nulls() {
        let value = serde_json::to_value(TemplateSpec::default()).unwrap();
        assert_eq!(value["header"], Value::Null);
        assert_eq!(value["footer"], Value::Null);
        assert_eq!(value["carousel"], Value::Null);
        assert_eq!(value["parameter_format"], "positional");
        assert!(value.get("auth_settings").is_none());
    }
}
