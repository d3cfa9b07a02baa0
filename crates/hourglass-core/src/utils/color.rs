//! Hex color helpers for drawing calendar events.
//!
//! Event colors are user-entered as `#RRGGBB` or `RRGGBB`. Text drawn on top
//! of an event picks light or dark by perceived luminance.

/// Text color used on dark backgrounds
pub const LIGHT_TEXT: &str = "#FAF0DC";

/// Text color used on light backgrounds
pub const DARK_TEXT: &str = "#633D00";

/// Background used when an event has no usable color
pub const DEFAULT_EVENT_COLOR: &str = "#FFD700";

/// Luminance below which text switches to the light color
const LUMINANCE_THRESHOLD: f64 = 140.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Perceived brightness on a 0-255 scale (ITU-R BT.601 weights).
    pub fn luminance(self) -> f64 {
        (299.0 * self.r as f64 + 587.0 * self.g as f64 + 114.0 * self.b as f64) / 1000.0
    }
}

/// Parse a 6-digit hex color, with or without a leading `#`.
pub fn parse_hex(input: &str) -> Option<Rgb> {
    let hex = input.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Canonical `#RRGGBB` form of a user-entered color, if it is one.
pub fn normalize_hex(input: &str) -> Option<String> {
    parse_hex(input).map(Rgb::to_hex)
}

/// Darken a color by `amount` (0.0 leaves it unchanged, 1.0 yields black).
pub fn darken(input: &str, amount: f64) -> Option<String> {
    let rgb = parse_hex(input)?;
    let factor = 1.0 - amount.clamp(0.0, 1.0);
    let scale = |c: u8| (c as f64 * factor).round() as u8;
    Some(
        Rgb {
            r: scale(rgb.r),
            g: scale(rgb.g),
            b: scale(rgb.b),
        }
        .to_hex(),
    )
}

/// Readable text color for a background: light when the background is dark.
///
/// Unparseable input is treated as the default event color.
pub fn contrast_text(background: &str) -> &'static str {
    let rgb = parse_hex(background)
        .or_else(|| parse_hex(DEFAULT_EVENT_COLOR))
        .unwrap_or(Rgb { r: 255, g: 255, b: 255 });
    if rgb.luminance() < LUMINANCE_THRESHOLD {
        LIGHT_TEXT
    } else {
        DARK_TEXT
    }
}

/// Background and border colors for an event, falling back to the default.
pub fn event_palette(color: Option<&str>) -> (String, String) {
    let background = color
        .and_then(normalize_hex)
        .unwrap_or_else(|| DEFAULT_EVENT_COLOR.to_string());
    let border = darken(&background, 0.2).unwrap_or_else(|| background.clone());
    (background, border)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_normalize() {
        assert_eq!(normalize_hex("ffd700").as_deref(), Some("#FFD700"));
        assert_eq!(normalize_hex("#a1B2c3").as_deref(), Some("#A1B2C3"));
        assert_eq!(normalize_hex("  #000000 ").as_deref(), Some("#000000"));
        assert!(normalize_hex("#fff").is_none());
        assert!(normalize_hex("gggggg").is_none());
        assert!(normalize_hex("").is_none());
        assert!(normalize_hex("#1234567").is_none());
    }

    #[test]
    fn test_darken() {
        assert_eq!(darken("#FFFFFF", 0.0).as_deref(), Some("#FFFFFF"));
        assert_eq!(darken("#FFFFFF", 1.0).as_deref(), Some("#000000"));
        assert_eq!(darken("#C86432", 0.5).as_deref(), Some("#643219"));
        assert_eq!(darken("#FFFFFF", 2.0).as_deref(), Some("#000000"));
        assert!(darken("nope", 0.5).is_none());
    }

    #[test]
    fn test_contrast_text() {
        assert_eq!(contrast_text("#000000"), LIGHT_TEXT);
        assert_eq!(contrast_text("#FFFFFF"), DARK_TEXT);
        assert_eq!(contrast_text("#633D00"), LIGHT_TEXT);
        assert_eq!(contrast_text("#FFD700"), DARK_TEXT);
    }

    #[test]
    fn test_contrast_threshold_boundary() {
        // Gray 140 has luminance exactly 140: not below, so dark text
        assert_eq!(parse_hex("#8C8C8C").unwrap().luminance(), 140.0);
        assert_eq!(contrast_text("#8C8C8C"), DARK_TEXT);
        // Gray 139 falls below
        assert_eq!(contrast_text("#8B8B8B"), LIGHT_TEXT);
    }

    #[test]
    fn test_event_palette_fallback() {
        let (bg, border) = event_palette(None);
        assert_eq!(bg, DEFAULT_EVENT_COLOR);
        assert_eq!(border, darken(DEFAULT_EVENT_COLOR, 0.2).unwrap());

        let (bg, _) = event_palette(Some("not a color"));
        assert_eq!(bg, DEFAULT_EVENT_COLOR);

        let (bg, _) = event_palette(Some("336699"));
        assert_eq!(bg, "#336699");
    }
}
