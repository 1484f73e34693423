use serde::de::value::{Error as ValueError, StrDeserializer};
use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};

/// Identifiers of the properties the engine reads. Raw values are stored as
/// strings and parsed on use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyId {
    Id,
    Display,
    Transform,
    // ── Geometry ───────────────────────────────────────────────
    X,
    Y,
    Width,
    Height,
    Rx,
    Ry,
    Cx,
    Cy,
    R,
    X1,
    Y1,
    X2,
    Y2,
    Points,
    D,
    #[serde(rename = "viewBox")]
    ViewBox,
    #[serde(rename = "preserveAspectRatio")]
    PreserveAspectRatio,
    #[serde(alias = "xlink:href")]
    Href,
    // ── Paint ──────────────────────────────────────────────────
    Color,
    Fill,
    FillOpacity,
    FillRule,
    Stroke,
    StrokeOpacity,
    StrokeWidth,
    StrokeLinecap,
    StrokeLinejoin,
    StrokeMiterlimit,
    StrokeDasharray,
    StrokeDashoffset,
    Opacity,
    // ── Text ───────────────────────────────────────────────────
    FontSize,
    FontFamily,
}

impl PropertyId {
    /// Look up a property by its markup attribute or CSS declaration name.
    /// These are the serde names, so JSON keys and markup agree.
    pub fn from_name(name: &str) -> Option<Self> {
        let de: StrDeserializer<'_, ValueError> = name.into_deserializer();
        PropertyId::deserialize(de).ok()
    }

    /// Whether the property may be set from an inline `style` declaration.
    /// Geometry and structural attributes are markup-only.
    pub fn is_presentation(self) -> bool {
        matches!(
            self,
            PropertyId::Display
                | PropertyId::Color
                | PropertyId::Fill
                | PropertyId::FillOpacity
                | PropertyId::FillRule
                | PropertyId::Stroke
                | PropertyId::StrokeOpacity
                | PropertyId::StrokeWidth
                | PropertyId::StrokeLinecap
                | PropertyId::StrokeLinejoin
                | PropertyId::StrokeMiterlimit
                | PropertyId::StrokeDasharray
                | PropertyId::StrokeDashoffset
                | PropertyId::Opacity
                | PropertyId::FontSize
                | PropertyId::FontFamily
        )
    }
}
