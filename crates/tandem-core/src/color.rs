//! Color handling for Tandem diagrams
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. DSL color values are free text (`blue`, `#ff8800`,
//! `rgb(0, 0, 0)`); anything CSS understands resolves to a [`Color`].

use std::{
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::DynamicColor;

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a CSS color string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tandem_core::color::Color;
    ///
    /// let red = Color::new("#ff0000").unwrap();
    /// let blue = Color::new("blue").unwrap();
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Resolves an optional DSL color value, falling back when it is absent
    /// or not a CSS color.
    ///
    /// # Examples
    ///
    /// ```
    /// use tandem_core::color::Color;
    ///
    /// let fallback = Color::new("gray").unwrap();
    /// assert_eq!(Color::resolve(Some("red"), fallback), Color::new("red").unwrap());
    /// assert_eq!(Color::resolve(Some("sparkly"), fallback), fallback);
    /// assert_eq!(Color::resolve(None, fallback), fallback);
    /// ```
    pub fn resolve(value: Option<&str>, fallback: Color) -> Self {
        value
            .and_then(|value| Self::new(value.trim()).ok())
            .unwrap_or(fallback)
    }

    /// Returns a sanitized, ID-safe string representation of this color.
    ///
    /// The result is used for SVG marker ids and contains only alphanumeric
    /// characters and underscores, starting with a letter.
    ///
    /// # Examples
    ///
    /// ```
    /// use tandem_core::color::Color;
    ///
    /// let color = Color::new("#ff8000").unwrap();
    /// let id_str = color.to_id_safe_string();
    /// assert!(id_str.chars().all(|c| c.is_alphanumeric() || c == '_'));
    /// assert!(!id_str.contains('#'));
    /// ```
    pub fn to_id_safe_string(self) -> String {
        let color_str = self.to_string();
        let mut sanitized = color_str
            .replace('#', "hex")
            .replace(['(', ')', ',', ' ', ';', '.', '%', '/'], "_");

        if sanitized.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            sanitized = format!("c_{sanitized}");
        }

        sanitized
    }

    /// Creates a new color with the specified alpha (transparency) value.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Color {
            color: self.color.with_alpha(alpha),
        }
    }

    /// Returns the alpha (transparency) component of this color.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new("black").expect("'black' is a valid CSS color")
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.color)
    }
}
