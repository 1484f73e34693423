//! # Paint Resolution
//!
//! Turns the raw paint properties of an element and its ancestors into the
//! fill and stroke descriptors attached to layout primitives.
//!
//! The engine only talks to the [`StyleResolver`] trait. [`CascadeResolver`]
//! is the default implementation: SVG inheritance for paint properties, the
//! `inherit` keyword, `currentColor`, and paint-server references passed
//! through by id. Descriptors are opaque to the layout engine: it attaches
//! them to primitives unchanged.

use serde::{Deserialize, Serialize};

use crate::geometry::Size;
use crate::length::{Length, LengthContext, LengthMode, LengthUnit, DEFAULT_DPI};
use crate::model::{ElementRef, PropertyId};
use crate::parser::{self, NegativePolicy};

/// Font size used when nothing in the ancestor chain sets one.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
            a: a as f64 / 255.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// A `fill` or `stroke` value.
///
/// Descriptors produced by a resolver never contain `CurrentColor`: it is
/// replaced by the `color` in scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Paint {
    None,
    CurrentColor,
    Color(Color),
    /// Reference to a gradient or pattern by element id, resolved by the
    /// rasterizer. `fallback` is used when the reference is dangling.
    Server {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<Box<Paint>>,
    },
}

impl Paint {
    fn with_current_color(self, color: Color) -> Paint {
        match self {
            Paint::CurrentColor => Paint::Color(color),
            Paint::Server { id, fallback } => Paint::Server {
                id,
                fallback: fallback.map(|f| Box::new(f.with_current_color(color))),
            },
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Resolved fill descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillData {
    pub paint: Paint,
    pub opacity: f64,
    pub rule: FillRule,
}

impl FillData {
    /// A fill that paints nothing.
    pub fn none() -> Self {
        Self {
            paint: Paint::None,
            opacity: 1.0,
            rule: FillRule::NonZero,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.paint != Paint::None && self.opacity > 0.0
    }
}

/// Resolved stroke descriptor. Lengths are in user units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeData {
    pub paint: Paint,
    pub opacity: f64,
    pub width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dash_array: Vec<f64>,
    pub dash_offset: f64,
}

impl StrokeData {
    pub fn is_visible(&self) -> bool {
        self.paint != Paint::None && self.opacity > 0.0 && self.width > 0.0
    }
}

/// The style contract the layout engine consumes.
pub trait StyleResolver {
    /// Fill descriptor for `element`, inheritance applied.
    fn fill_data(&self, element: &ElementRef<'_>) -> FillData;

    /// Stroke descriptor for `element`. Stroke lengths resolve against
    /// `lengths` (diagonal percentages, font-relative units).
    fn stroke_data(&self, element: &ElementRef<'_>, lengths: &LengthContext) -> StrokeData;

    /// Computed font size for `element`, for `em`/`ex` lengths and text.
    fn font_size(&self, element: &ElementRef<'_>) -> f64;

    /// Computed font family for text primitives.
    fn font_family(&self, element: &ElementRef<'_>) -> String {
        element
            .inherited_value(PropertyId::FontFamily)
            .unwrap_or("sans-serif")
            .to_string()
    }
}

/// Default resolver: SVG presentation-attribute inheritance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeResolver {
    pub default_font_size: f64,
    pub dpi: f64,
}

impl Default for CascadeResolver {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            dpi: DEFAULT_DPI,
        }
    }
}

impl CascadeResolver {
    pub fn new(default_font_size: f64, dpi: f64) -> Self {
        Self {
            default_font_size,
            dpi,
        }
    }

    fn color(&self, element: &ElementRef<'_>) -> Color {
        element
            .inherited_parsed(PropertyId::Color, parser::parse_color)
            .unwrap_or(Color::BLACK)
    }

    fn paint(&self, element: &ElementRef<'_>, property: PropertyId, default: Paint) -> Paint {
        element
            .inherited_parsed(property, parser::parse_paint)
            .unwrap_or(default)
            .with_current_color(self.color(element))
    }
}

fn parse_opacity(value: &str) -> Option<f64> {
    let opacity = match value.strip_suffix('%') {
        Some(pct) => parser::parse_number(pct)? / 100.0,
        None => parser::parse_number(value)?,
    };
    Some(opacity.clamp(0.0, 1.0))
}

fn parse_fill_rule(value: &str) -> Option<FillRule> {
    match value {
        "nonzero" => Some(FillRule::NonZero),
        "evenodd" => Some(FillRule::EvenOdd),
        _ => None,
    }
}

fn parse_line_cap(value: &str) -> Option<LineCap> {
    match value {
        "butt" => Some(LineCap::Butt),
        "round" => Some(LineCap::Round),
        "square" => Some(LineCap::Square),
        _ => None,
    }
}

fn parse_line_join(value: &str) -> Option<LineJoin> {
    match value {
        "miter" => Some(LineJoin::Miter),
        "round" => Some(LineJoin::Round),
        "bevel" => Some(LineJoin::Bevel),
        _ => None,
    }
}

fn parse_stroke_length(value: &str, policy: NegativePolicy) -> Option<Length> {
    Some(parser::parse_length(value, policy, Length::AUTO)).filter(Length::is_valid)
}

/// `none`, or a list of non-negative lengths. An odd-length list is repeated
/// to make it even; an all-zero list disables dashing.
fn parse_dash_array(value: &str) -> Option<Vec<Length>> {
    if value == "none" {
        return Some(Vec::new());
    }
    let dashes = value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| parse_stroke_length(s, NegativePolicy::Forbid))
        .collect::<Option<Vec<_>>>()?;
    Some(dashes)
}

impl StyleResolver for CascadeResolver {
    fn fill_data(&self, element: &ElementRef<'_>) -> FillData {
        FillData {
            paint: self.paint(element, PropertyId::Fill, Paint::Color(Color::BLACK)),
            opacity: element
                .inherited_parsed(PropertyId::FillOpacity, parse_opacity)
                .unwrap_or(1.0),
            rule: element
                .inherited_parsed(PropertyId::FillRule, parse_fill_rule)
                .unwrap_or_default(),
        }
    }

    fn stroke_data(&self, element: &ElementRef<'_>, lengths: &LengthContext) -> StrokeData {
        let width = element
            .inherited_parsed(PropertyId::StrokeWidth, |v| {
                parse_stroke_length(v, NegativePolicy::Forbid)
            })
            .unwrap_or(Length::number(1.0));

        let mut dash_array: Vec<f64> = element
            .inherited_parsed(PropertyId::StrokeDasharray, parse_dash_array)
            .unwrap_or_default()
            .into_iter()
            .map(|l| lengths.value_for_length(l, LengthMode::Diagonal))
            .collect();
        if dash_array.iter().all(|d| *d == 0.0) {
            dash_array.clear();
        } else if dash_array.len() % 2 == 1 {
            dash_array.extend_from_within(..);
        }

        let dash_offset = element
            .inherited_parsed(PropertyId::StrokeDashoffset, |v| {
                parse_stroke_length(v, NegativePolicy::Allow)
            })
            .map(|l| lengths.value_for_length(l, LengthMode::Diagonal))
            .unwrap_or(0.0);

        StrokeData {
            paint: self.paint(element, PropertyId::Stroke, Paint::None),
            opacity: element
                .inherited_parsed(PropertyId::StrokeOpacity, parse_opacity)
                .unwrap_or(1.0),
            width: lengths.value_for_length(width, LengthMode::Diagonal),
            line_cap: element
                .inherited_parsed(PropertyId::StrokeLinecap, parse_line_cap)
                .unwrap_or_default(),
            line_join: element
                .inherited_parsed(PropertyId::StrokeLinejoin, parse_line_join)
                .unwrap_or_default(),
            miter_limit: element
                .inherited_parsed(PropertyId::StrokeMiterlimit, |v| {
                    parser::parse_number(v).filter(|m| *m >= 1.0)
                })
                .unwrap_or(4.0),
            dash_array,
            dash_offset,
        }
    }

    fn font_size(&self, element: &ElementRef<'_>) -> f64 {
        let parent_size = element
            .parent()
            .map(|p| self.font_size(p))
            .unwrap_or(self.default_font_size);

        let own = parser::parse_length(
            element.element().get(PropertyId::FontSize),
            NegativePolicy::Forbid,
            Length::AUTO,
        );
        match own.unit {
            LengthUnit::Auto => parent_size,
            LengthUnit::Percent => own.value * parent_size / 100.0,
            _ => LengthContext::new(Size::default(), parent_size)
                .with_dpi(self.dpi)
                .value_for_length(own, LengthMode::Width),
        }
    }
}

/// Element `opacity` (not inherited). Defaults to 1.
pub fn element_opacity(element: &ElementRef<'_>) -> f64 {
    parse_opacity(element.element().get(PropertyId::Opacity).trim()).unwrap_or(1.0)
}
