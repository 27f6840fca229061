//! Colors as written to the strip.

use serde::{Deserialize, Serialize};

/// An RGB triple. Channel values are bounded to 0..=255 by construction,
/// so an out-of-range triple in a config file fails to parse.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const OFF: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    /// Scale every channel by `level`, clamped to [0, 1].
    pub fn scaled(self, level: f32) -> Self {
        let level = level.clamp(0.0, 1.0);
        let [r, g, b] = [self.r, self.g, self.b].map(|c| (c as f32 * level).round() as u8);
        Color { r, g, b }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_is_clamped() {
        let c = Color::new(200, 100, 0);
        assert_eq!(c.scaled(1.0), c);
        assert_eq!(c.scaled(2.0), c);
        assert_eq!(c.scaled(0.5), Color::new(100, 50, 0));
        assert_eq!(c.scaled(-1.0), Color::OFF);
    }

    #[test]
    fn parses_triples() {
        let c: Color = serde_json::from_str(r#"{"r": 1, "g": 2, "b": 3}"#).unwrap();
        assert_eq!(c, Color::new(1, 2, 3));
        assert!(serde_json::from_str::<Color>(r#"{"r": 256, "g": 0, "b": 0}"#).is_err());
        assert!(serde_json::from_str::<Color>(r#"{"r": -1, "g": 0, "b": 0}"#).is_err());
    }

    #[test]
    fn displays_as_hex() {
        assert_eq!(Color::new(255, 0, 16).to_string(), "#ff0010");
    }
}
