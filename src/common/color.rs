use std::fmt;

/// RGB color representation.
///
/// Represents a color using red, green, and blue components, each in the range 0-255.
/// WordprocessingML stores colours as bare upper-case hex (`FF0000`) or the keyword
/// `auto`; the editor tree stores `#rrggbb` in lower case.
///
/// # Examples
///
/// ```rust
/// use longan::common::color::RGBColor;
///
/// let blue = RGBColor::from_hex("0000FF").unwrap();
/// assert_eq!(blue.to_css(), "#0000ff");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RGBColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

/// The `auto` colour keyword.
pub const AUTO: &str = "auto";

impl RGBColor {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create an RGB color from a hex string (e.g., "FF0000" or "#ff0000").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }

    /// Convert to the upper-case hex form used in XML (without # prefix).
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Convert to the lower-case `#rrggbb` form used in the editor tree.
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RGBColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Normalise an XML colour value for the editor tree.
///
/// `auto` is kept as-is, hex values become `#rrggbb`, anything else is kept verbatim
/// so that it still round-trips.
pub fn xml_to_internal(value: &str) -> String {
    if value.eq_ignore_ascii_case(AUTO) {
        return AUTO.to_string();
    }
    match RGBColor::from_hex(value) {
        Some(color) => color.to_css(),
        None => value.to_string(),
    }
}

/// Inverse of [`xml_to_internal`].
pub fn internal_to_xml(value: &str) -> String {
    if value.eq_ignore_ascii_case(AUTO) {
        return AUTO.to_string();
    }
    match RGBColor::from_hex(value) {
        Some(color) => color.to_hex(),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(RGBColor::from_hex("FF8000"), Some(RGBColor::new(255, 128, 0)));
        assert_eq!(RGBColor::from_hex("#ff8000"), Some(RGBColor::new(255, 128, 0)));
        assert_eq!(RGBColor::from_hex("F80"), None);
        assert_eq!(RGBColor::from_hex("GG0000"), None);
    }

    #[test]
    fn test_case_folding() {
        assert_eq!(xml_to_internal("00aAfF"), "#00aaff");
        assert_eq!(internal_to_xml("#00aaff"), "00AAFF");
        assert_eq!(xml_to_internal("AUTO"), "auto");
        assert_eq!(internal_to_xml("auto"), "auto");
    }

    #[test]
    fn test_unrecognised_kept_verbatim() {
        assert_eq!(xml_to_internal("red"), "red");
        assert_eq!(internal_to_xml("red"), "red");
    }
}
