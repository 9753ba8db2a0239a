//! Platform limits mirrored from the WhatsApp template documentation.

/// Maximum number of buttons on one template
pub const MAX_BUTTONS: usize = 10;

/// Maximum number of URL buttons
pub const MAX_URL_BUTTONS: usize = 2;

/// Maximum number of PHONE_NUMBER buttons
pub const MAX_PHONE_BUTTONS: usize = 1;

/// Maximum number of COPY_CODE buttons
pub const MAX_COPY_CODE_BUTTONS: usize = 1;

pub const MAX_BODY_TEXT: usize = 1024;
pub const MAX_HEADER_TEXT: usize = 60;
pub const MAX_FOOTER_TEXT: usize = 60;
pub const MAX_BUTTON_TEXT: usize = 25;
pub const MAX_COPY_CODE_EXAMPLE: usize = 20;
pub const MAX_OFFER_TEXT: usize = 16;

/// Length of a text field as counted by the limits above (characters, not bytes).
pub fn text_len(value: &str) -> usize {
    value.chars().count()
}

/// Truncate `value` to at most `max` characters.
pub fn clamp_text(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((byte_idx, _)) => value[..byte_idx].to_string(),
        None => value.to_string(),
    }
}
