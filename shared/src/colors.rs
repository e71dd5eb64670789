/// Color used for resource types the catalog does not know.
pub const FALLBACK_COLOR: (u8, u8, u8) = (0xFF, 0x00, 0xFF);

/// Parse `#RRGGBB` (the `#` is optional, case-insensitive).
pub fn parse_hex_color(raw: &str) -> Option<(u8, u8, u8)> {
    let hex = raw.trim().strip_prefix('#').unwrap_or(raw.trim());
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format RGB as uppercase `#RRGGBB`.
pub fn hex_color((r, g, b): (u8, u8, u8)) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Format RGBA as a CSS color string.
pub fn rgba_css((r, g, b): (u8, u8, u8), a: f64) -> String {
    format!("rgba({r},{g},{b},{a})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(parse_hex_color("#D84315"), Some((0xD8, 0x43, 0x15)));
        assert_eq!(parse_hex_color("b38759"), Some((0xB3, 0x87, 0x59)));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
        assert_eq!(parse_hex_color(""), None);
    }

    #[test]
    fn formats_hex_and_css() {
        assert_eq!(hex_color((0xB3, 0x87, 0x59)), "#B38759");
        assert_eq!(hex_color(FALLBACK_COLOR), "#FF00FF");
        assert_eq!(rgba_css((1, 2, 3), 0.5), "rgba(1,2,3,0.5)");
    }
}
