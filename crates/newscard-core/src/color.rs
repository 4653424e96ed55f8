//! Card colors.
//!
//! [`Color`] parses any CSS color string through the `color` crate and hands
//! the compositor the straight (non-premultiplied) 8-bit sRGB bytes it blends
//! with.

use std::{fmt, str::FromStr};

use color::{DynamicColor, Srgb, palette::css};

/// A parsed CSS color.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parses a CSS color string such as `"#ff3c3c"`, `"rgb(255 60 60)"` or
    /// `"white"`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the rejected string.
    ///
    /// # Examples
    ///
    /// ```
    /// use newscard_core::color::Color;
    ///
    /// let accent = Color::new("#ff3c3c").unwrap();
    /// assert_eq!(accent.to_rgba8(), [0xff, 0x3c, 0x3c, 0xff]);
    /// ```
    pub fn new(css: &str) -> Result<Self, String> {
        DynamicColor::from_str(css)
            .map(|color| Self { color })
            .map_err(|err| format!("invalid color `{css}`: {err}"))
    }

    /// sRGB bytes in `[r, g, b, a]` order.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        [rgba.r, rgba.g, rgba.b, rgba.a]
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Opaque black, the scrim and outline default.
impl Default for Color {
    fn default() -> Self {
        Self {
            color: DynamicColor::from_alpha_color(css::BLACK),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}
