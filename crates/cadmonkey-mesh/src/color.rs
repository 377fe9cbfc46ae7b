//! Face colors and the deduplicated palette they are stored in.

use serde::{Deserialize, Serialize};

/// Linear RGBA color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel. Anything below 1 is rendered blended.
    pub a: f32,
}

/// Color given to faces that carry none: the OpenSCAD preview yellow (`#f9d72c`).
pub const DEFAULT_FACE_COLOR: Color = Color {
    r: 249.0 / 255.0,
    g: 215.0 / 255.0,
    b: 44.0 / 255.0,
    a: 1.0,
};

impl Color {
    /// Create a color from RGBA channels.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from 8-bit channels.
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
            f32::from(a) / 255.0,
        )
    }

    /// The channels as an `[r, g, b, a]` array.
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// True if every channel lies in `[0, 1]`. NaN channels fail.
    pub fn is_normalized(&self) -> bool {
        self.to_array().iter().all(|c| (0.0..=1.0).contains(c))
    }

    /// True if the color needs alpha blending.
    pub fn is_translucent(&self) -> bool {
        self.a < 1.0
    }
}

impl Default for Color {
    fn default() -> Self {
        DEFAULT_FACE_COLOR
    }
}

impl From<[f32; 4]> for Color {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

/// Ordered list of distinct colors, referenced by index.
///
/// Colors are compared for exact equality; two colors that differ in the
/// last bit of a channel get separate entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Palette {
    colors: Vec<Color>,
}

#[allow(clippy::len_without_is_empty)]
impl Palette {
    /// Create an empty palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a palette seeded with existing colors. Duplicates in `colors`
    /// are kept so that indices into the original list stay valid.
    pub fn from_colors(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Index of `color`, appending it if it is not present yet.
    pub fn intern(&mut self, color: Color) -> u32 {
        match self.colors.iter().position(|c| *c == color) {
            Some(i) => i as u32,
            None => {
                self.colors.push(color);
                (self.colors.len() - 1) as u32
            }
        }
    }

    /// The color at `index`, if any.
    pub fn get(&self, index: u32) -> Option<Color> {
        self.colors.get(index as usize).copied()
    }

    /// Number of colors.
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Consume the palette, returning its colors in index order.
    pub fn into_colors(self) -> Vec<Color> {
        self.colors
    }
}
