//! # Lengths
//!
//! A length is a magnitude plus a unit. Resolution into user units happens
//! through [`LengthContext`], which carries the nearest viewport and the font
//! size in scope. Resolution never fails: an unspecified length is 0.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// CSS reference pixel density.
pub const DEFAULT_DPI: f64 = 96.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    /// Bare number: user units.
    Number,
    Px,
    Pt,
    Pc,
    In,
    Cm,
    Mm,
    Em,
    Ex,
    Percent,
    /// Unspecified. Distinct from a zero length.
    Auto,
}

/// Which viewport dimension a percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMode {
    Width,
    Height,
    Diagonal,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: LengthUnit,
}

impl Length {
    pub const ZERO: Length = Length::new(0.0, LengthUnit::Number);
    pub const AUTO: Length = Length::new(0.0, LengthUnit::Auto);
    pub const HUNDRED_PERCENT: Length = Length::new(100.0, LengthUnit::Percent);

    pub const fn new(value: f64, unit: LengthUnit) -> Self {
        Self { value, unit }
    }

    pub const fn number(value: f64) -> Self {
        Self::new(value, LengthUnit::Number)
    }

    /// False only for an unspecified (auto) length.
    pub fn is_valid(&self) -> bool {
        self.unit != LengthUnit::Auto
    }

    /// A specified length with a zero magnitude, whatever its unit.
    pub fn is_zero(&self) -> bool {
        self.is_valid() && self.value == 0.0
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::ZERO
    }
}

/// Everything a length needs to become a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthContext {
    /// The nearest viewport: percentages resolve against it.
    pub viewport: Size,
    /// Resolved font size for `em`/`ex`.
    pub font_size: f64,
    pub dpi: f64,
}

impl LengthContext {
    pub fn new(viewport: Size, font_size: f64) -> Self {
        Self {
            viewport,
            font_size,
            dpi: DEFAULT_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Resolve `length` into user units.
    pub fn value_for_length(&self, length: Length, mode: LengthMode) -> f64 {
        let v = length.value;
        match length.unit {
            LengthUnit::Number | LengthUnit::Px => v,
            LengthUnit::In => v * self.dpi,
            LengthUnit::Cm => v * self.dpi / 2.54,
            LengthUnit::Mm => v * self.dpi / 25.4,
            LengthUnit::Pt => v * self.dpi / 72.0,
            LengthUnit::Pc => v * self.dpi / 6.0,
            LengthUnit::Em => v * self.font_size,
            LengthUnit::Ex => v * self.font_size / 2.0,
            LengthUnit::Percent => {
                let base = match mode {
                    LengthMode::Width => self.viewport.width,
                    LengthMode::Height => self.viewport.height,
                    LengthMode::Diagonal => self.viewport.diagonal(),
                };
                v * base / 100.0
            }
            LengthUnit::Auto => 0.0,
        }
    }
}
