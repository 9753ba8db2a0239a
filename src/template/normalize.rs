//! Document normalizer: turns any persisted value into a canonical `TemplateSpec`.

use serde_json::{Map, Value};

use super::types::{
    AuthSettings, Body, BodyExample, Button, Category, Footer, Header, HeaderFormat,
    LimitedTimeOffer, ParameterFormat, TemplateSpec,
};

/// Map a camelCase field name to the canonical snake_case key.
pub fn canonical_field_name(key: &str) -> &str {
    match key {
        "parameterFormat" => "parameter_format",
        "limitedTimeOffer" => "limited_time_offer",
        "authSettings" => "auth_settings",
        other => other,
    }
}

/// Normalize an arbitrary value into a template document.
///
/// Never fails: missing or malformed known fields fall back to defaults,
/// buttons that cannot be read are dropped, and unknown fields are kept in
/// `extra`. A legacy flat `content` string becomes the body text when no
/// body is present.
pub fn normalize(input: &Value) -> TemplateSpec {
    let mut fields = match input {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let mut spec = TemplateSpec::default();

    if let Some(name) = take(&mut fields, &["name"]).and_then(non_empty_string) {
        spec.name = name;
    }

    if let Some(language) = take(&mut fields, &["language"]).and_then(non_empty_string) {
        spec.language = language;
    }

    if let Some(category) = take(&mut fields, &["category"])
        .as_ref()
        .and_then(Value::as_str)
        .and_then(Category::parse)
    {
        spec.category = category;
    }

    if let Some(format) = take(&mut fields, &["parameter_format", "parameterFormat"])
        .as_ref()
        .and_then(Value::as_str)
        .and_then(ParameterFormat::parse)
    {
        spec.parameter_format = format;
    }

    match take(&mut fields, &["body"]) {
        Some(Value::Object(body)) => spec.body = parse_body(&body),
        _ => {
            if let Some(Value::String(content)) = fields.get("content") {
                spec.body.text = content.clone();
                fields.remove("content");
            }
        }
    }

    spec.header = take(&mut fields, &["header"])
        .map(canonical_header_format)
        .and_then(|v| parse_lenient::<Header>("header", v));
    spec.footer = take(&mut fields, &["footer"]).and_then(|v| parse_lenient::<Footer>("footer", v));

    if let Some(Value::Array(items)) = take(&mut fields, &["buttons"]) {
        let buttons = items
            .into_iter()
            .filter_map(|item| parse_lenient::<Button>("button", item))
            .collect();
        spec.buttons = super::editor::partition_buttons(buttons);
    }

    spec.limited_time_offer = take(&mut fields, &["limited_time_offer", "limitedTimeOffer"])
        .and_then(|v| parse_lenient::<LimitedTimeOffer>("limited_time_offer", v));

    spec.auth_settings = take(&mut fields, &["auth_settings", "authSettings"])
        .and_then(|v| parse_lenient::<AuthSettings>("auth_settings", v));

    spec.carousel = take(&mut fields, &["carousel"]);

    spec.extra = fields;
    spec
}

/// Remove every key in `keys` and return the first non-null value found.
fn take(fields: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    let mut found = None;
    for key in keys {
        if let Some(value) = fields.remove(*key) {
            if found.is_none() && !value.is_null() {
                found = Some(value);
            }
        }
    }
    found
}

fn non_empty_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

fn parse_body(body: &Map<String, Value>) -> Body {
    let text = body
        .get("text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let example = body
        .get("example")
        .filter(|v| !v.is_null())
        .and_then(parse_body_example);
    Body { text, example }
}

/// Platform rows (`body_text`) first, then a flat `values` list
fn parse_body_example(value: &Value) -> Option<BodyExample> {
    if value.get("body_text").is_none() {
        if let Some(values) = value.get("values").and_then(Value::as_array) {
            let values = values
                .iter()
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            return Some(BodyExample::from_values(values));
        }
    }
    serde_json::from_value::<BodyExample>(value.clone()).ok()
}

/// Upper-case a recognised header `format` so any casing deserializes
fn canonical_header_format(mut value: Value) -> Value {
    if let Some(header) = value.as_object_mut() {
        let parsed = header
            .get("format")
            .and_then(Value::as_str)
            .and_then(HeaderFormat::parse);
        if let Some(format) = parsed {
            header.insert("format".to_string(), Value::String(format.as_str().to_string()));
        }
    }
    value
}

fn parse_lenient<T: serde::de::DeserializeOwned>(field: &str, value: Value) -> Option<T> {
    if value.is_null() {
        return None;
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(field = %field, error = %e, "Dropping unreadable template field");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::types::ButtonType;
    use serde_json::json;

    #[test]
    fn test_normalize_absent_input() {
        let spec = normalize(&Value::Null);
        assert_eq!(spec, TemplateSpec::default());
        assert_eq!(spec.name, "novo_template");
        assert_eq!(spec.language, "pt_BR");
    }

    #[test]
    fn test_normalize_legacy_content() {
        let spec = normalize(&json!({"content": "Hello {{1}}"}));

        assert_eq!(spec.body.text, "Hello {{1}}");
        assert_eq!(spec.category, Category::Marketing);
        assert_eq!(spec.language, "pt_BR");
        assert_eq!(spec.parameter_format, ParameterFormat::Positional);
        assert!(spec.buttons.is_empty());
        assert!(spec.header.is_none());
        assert!(spec.footer.is_none());
        assert!(!spec.extra.contains_key("content"));
    }

    #[test]
    fn test_body_example_values_list() {
        let spec = normalize(&json!({"body": {"text": "Oi {{1}}", "example": {"values": ["Ana"]}}}));
        let example = spec.body.example.as_ref().unwrap();
        assert_eq!(example.values(), ["Ana".to_string()]);
        assert!(!crate::template::validate(&spec)
            .issues
            .iter()
            .any(|i| i.field == "body.example"));

        // Platform rows win over a flat list
        let spec = normalize(&json!({
            "body": {"text": "Oi {{1}}", "example": {"body_text": [["Bia"]], "values": ["Ana"]}}
        }));
        assert_eq!(spec.body.example.unwrap().values(), ["Bia".to_string()]);
    }

    #[test]
    fn test_header_format_any_case() {
        let spec = normalize(&json!({
            "header": {"format": "image", "example": {"header_handle": ["4::abc"]}}
        }));
        let header = spec.header.unwrap();
        assert_eq!(header.format, HeaderFormat::Image);
        assert_eq!(header.media_handle(), Some("4::abc"));
    }

    #[test]
    fn test_content_kept_when_body_present() {
        let spec = normalize(&json!({"content": "legacy", "body": {"text": "atual"}}));
        assert_eq!(spec.body.text, "atual");
        assert_eq!(spec.extra.get("content"), Some(&json!("legacy")));
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let spec = normalize(&json!({"name": "promo", "meta_template_id": 42, "tags": ["a"]}));
        assert_eq!(spec.extra.get("meta_template_id"), Some(&json!(42)));
        assert_eq!(spec.extra.get("tags"), Some(&json!(["a"])));
    }

    #[test]
    fn test_camel_case_aliases() {
        let spec = normalize(&json!({
            "parameterFormat": "named",
            "limitedTimeOffer": {"text": "Oferta", "hasExpiration": true}
        }));
        assert_eq!(spec.parameter_format, ParameterFormat::Named);
        assert_eq!(
            spec.limited_time_offer,
            Some(LimitedTimeOffer {
                text: "Oferta".to_string(),
                has_expiration: true
            })
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let spec = normalize(&json!({
            "name": "",
            "category": "PROMO",
            "parameter_format": 3,
            "header": "not an object",
            "buttons": "nope"
        }));
        assert_eq!(spec.name, "novo_template");
        assert_eq!(spec.category, Category::Marketing);
        assert_eq!(spec.parameter_format, ParameterFormat::Positional);
        assert!(spec.header.is_none());
        assert!(spec.buttons.is_empty());
    }

    #[test]
    fn test_unreadable_buttons_dropped_and_rest_partitioned() {
        let spec = normalize(&json!({
            "buttons": [
                {"type": "URL", "text": "Site", "url": "https://a.com"},
                {"type": "TELEPORT"},
                {"type": "QUICK_REPLY", "text": "Sim"}
            ]
        }));
        let kinds: Vec<_> = spec.buttons.iter().map(Button::button_type).collect();
        assert_eq!(kinds, vec![ButtonType::QuickReply, ButtonType::Url]);
    }

    #[test]
    fn test_header_without_format_is_text() {
        let spec = normalize(&json!({"header": {"text": "Oi"}}));
        let header = spec.header.unwrap();
        assert_eq!(header.format, HeaderFormat::Text);
        assert_eq!(header.text.as_deref(), Some("Oi"));
    }

    #[test]
    fn test_carousel_round_trips() {
        let carousel = json!({"cards": [{"components": []}]});
        let spec = normalize(&json!({"carousel": carousel.clone()}));
        assert_eq!(spec.carousel, Some(carousel));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = vec![
            Value::Null,
            json!({"content": "Hello {{1}}"}),
            json!({
                "name": "boas_vindas",
                "category": "utility",
                "header": {"format": "IMAGE", "example": {"header_handle": "h:1"}},
                "body": {"text": "Oi {{1}}", "example": {"body_text": [["Ana"]]}},
                "footer": {"text": "Equipe"},
                "buttons": [
                    {"type": "COPY_CODE", "example": ["X1"]},
                    {"type": "QUICK_REPLY", "text": "Parar"}
                ],
                "authSettings": {"codeExpirationMinutes": 5},
                "extra_flag": true
            }),
        ];

        for input in inputs {
            let once = normalize(&input);
            let twice = normalize(&serde_json::to_value(&once).unwrap());
            assert_eq!(once, twice);
        }
    }
}
