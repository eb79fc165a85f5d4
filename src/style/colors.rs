//! Color parsing for style values
//!
//! Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`, `rgba(r, g, b, a)`
//! and packed `0xRRGGBB` numbers. Channels are returned as `0.0..=1.0`.

use serde_json::Value;

/// Parse a style color value into RGBA
pub fn parse_color(value: &Value) -> Option<[f32; 4]> {
    match value {
        Value::Number(n) => {
            let Some(packed) = n.as_u64().and_then(|v| u32::try_from(v).ok()) else {
                tracing::warn!(color = %n, "numeric color is not a packed 0xRRGGBB value");
                return None;
            };
            Some([
                ((packed >> 16) & 0xff) as f32 / 255.0,
                ((packed >> 8) & 0xff) as f32 / 255.0,
                (packed & 0xff) as f32 / 255.0,
                1.0,
            ])
        }
        Value::String(s) => parse_color_str(s),
        _ => None,
    }
}

pub fn parse_color_str(text: &str) -> Option<[f32; 4]> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = text.to_ascii_lowercase();
    let (body, has_alpha) = if let Some(body) = lower.strip_prefix("rgba(") {
        (body, true)
    } else if let Some(body) = lower.strip_prefix("rgb(") {
        (body, false)
    } else {
        return None;
    };
    let body = body.strip_suffix(')')?;
    let parts: Vec<f32> = body
        .split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }
    let a = if has_alpha { parts[3].clamp(0.0, 1.0) } else { 1.0 };
    Some([
        (parts[0] / 255.0).clamp(0.0, 1.0),
        (parts[1] / 255.0).clamp(0.0, 1.0),
        (parts[2] / 255.0).clamp(0.0, 1.0),
        a,
    ])
}

fn parse_hex(hex: &str) -> Option<[f32; 4]> {
    // Byte slicing below needs one byte per digit
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        3 => {
            let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
            Some([expand(0)?, expand(1)?, expand(2)?, 1.0])
        }
        6 => Some([channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?, 1.0]),
        8 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        ]),
        _ => None,
    }
}

/// Inverse of `parse_color_str` for interpolated colors
pub fn format_color(color: [f32; 4]) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!(
        "rgba({}, {}, {}, {})",
        byte(color[0]),
        byte(color[1]),
        byte(color[2]),
        color[3].clamp(0.0, 1.0)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color(&json!("#ff0000")), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(parse_color(&json!("#0f0")), Some([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(parse_color(&json!("#00000000")), Some([0.0, 0.0, 0.0, 0.0]));
        assert_eq!(parse_color(&json!("#12345")), None);
    }

    #[test]
    fn test_parse_functional_colors() {
        assert_eq!(parse_color(&json!("rgb(255, 0, 255)")), Some([1.0, 0.0, 1.0, 1.0]));
        assert_eq!(parse_color(&json!("rgba(0, 0, 255, 0.5)")), Some([0.0, 0.0, 1.0, 0.5]));
        assert_eq!(parse_color(&json!("rgba(0, 0, 255)")), None);
    }

    #[test]
    fn test_parse_packed_number() {
        assert_eq!(parse_color(&json!(0x00ff00)), Some([0.0, 1.0, 0.0, 1.0]));
        assert_eq!(parse_color(&json!(0x1_0000_0000u64)), None);
        assert_eq!(parse_color(&json!(1.5)), None);
        assert_eq!(parse_color(&json!(-1)), None);
    }

    #[test]
    fn test_non_ascii_hex_is_rejected() {
        assert_eq!(parse_color(&json!("#\u{e9}a")), None);
        assert_eq!(parse_color(&json!("#\u{e9}\u{e9}\u{e9}")), None);
        assert_eq!(parse_color_str("#ff\u{e9}00"), None);
    }

    #[test]
    fn test_format_round_trip() {
        let color = [1.0, 0.0, 0.0, 0.25];
        assert_eq!(parse_color_str(&format_color(color)), Some(color));
    }
}
