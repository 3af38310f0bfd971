//! Color string parsing

use tiny_skia::Color;

use crate::error::ConfigurationError;

/// Named colors accepted alongside hex notation.
const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("black", [0, 0, 0, 255]),
    ("white", [255, 255, 255, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
    ("transparent", [0, 0, 0, 0]),
];

/// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or a basic color name.
///
/// # Errors
///
/// Returns `ConfigurationError::InvalidColor` holding the original input.
pub fn parse_color(input: &str) -> Result<Color, ConfigurationError> {
    let [r, g, b, a] = parse_rgba(input)?;
    Ok(Color::from_rgba8(r, g, b, a))
}

/// Parses a color into straight (non-premultiplied) RGBA bytes.
pub fn parse_rgba(input: &str) -> Result<[u8; 4], ConfigurationError> {
    let invalid = || ConfigurationError::InvalidColor(input.to_string());
    let trimmed = input.trim();

    let Some(hex) = trimmed.strip_prefix('#') else {
        let lower = trimmed.to_ascii_lowercase();
        return NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, rgba)| *rgba)
            .ok_or_else(invalid);
    };

    // from_str_radix would also take a leading '+'
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).map_err(|_| invalid());
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());

    match hex.len() {
        3 => Ok([digit(0)? * 17, digit(1)? * 17, digit(2)? * 17, 255]),
        6 => Ok([byte(0)?, byte(2)?, byte(4)?, 255]),
        8 => Ok([byte(0)?, byte(2)?, byte(4)?, byte(6)?]),
        _ => Err(invalid()),
    }
}
