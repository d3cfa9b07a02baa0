//! Character limits and filters shared by the text fields.

// ============================================================================
// Text field limits
// ============================================================================

/// Maximum length for email input.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a display name.
pub const MAX_NAME_LENGTH: usize = 100;

/// Header shown capitalized in front of an event title.
pub const MAX_HEADER_LENGTH: usize = 15;

/// Titles and custom type names.
pub const MAX_TITLE_LENGTH: usize = 200;

/// `YYYY-MM-DDTHH:MM`
pub const MAX_DATETIME_LENGTH: usize = 16;

/// `#RRGGBB`
pub const MAX_COLOR_LENGTH: usize = 7;

pub const MAX_NOTES_LENGTH: usize = 2000;

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character may be appended to a field holding `current_len` chars
pub fn can_add_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && is_valid_input_char(c)
}

/// Append `c` to `field` if the limit allows. Returns whether it was added.
pub fn push_char(field: &mut String, max_len: usize, c: char) -> bool {
    if can_add_char(field.chars().count(), max_len, c) {
        field.push(c);
        true
    } else {
        false
    }
}

/// Keep at most `max_len` characters.
pub fn clamp_chars(value: &str, max_len: usize) -> String {
    value.chars().take(max_len).collect()
}
