//! Configuration for a layout pass.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::length::DEFAULT_DPI;
use crate::style::DEFAULT_FONT_SIZE;

/// Viewport used for a root with percentage or missing dimensions when the
/// caller does not request an output size.
pub const DEFAULT_VIEWPORT: Size = Size::new(300.0, 150.0);

/// Knobs for one layout pass. Every field has a default, so an empty JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Requested output size. When set, the document's intrinsic size is
    /// scaled into it; when absent, the intrinsic size is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Size>,

    /// Pixels per inch for absolute units.
    #[serde(default = "default_dpi")]
    pub dpi: f64,

    /// Font size when no element in scope sets one.
    #[serde(default = "default_font_size")]
    pub default_font_size: f64,

    /// Elements nested deeper than this are not laid out.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_dpi() -> f64 {
    DEFAULT_DPI
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn default_max_depth() -> usize {
    256
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            viewport: None,
            dpi: default_dpi(),
            default_font_size: default_font_size(),
            max_depth: default_max_depth(),
        }
    }
}

impl LayoutOptions {
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Some(Size::new(width, height));
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
