//! Per-kind geometry. Every shape builds its path purely from its own
//! attributes; no kind looks at sibling or parent geometry.

use crate::geometry::Path;
use crate::length::{Length, LengthContext, LengthMode};
use crate::parser::{self, NegativePolicy};

use super::{Element, ElementKind, PropertyId};

impl Element {
    fn length(&self, property: PropertyId, policy: NegativePolicy, default: Length) -> Length {
        parser::parse_length(self.get(property), policy, default)
    }

    pub fn x(&self) -> Length {
        self.length(PropertyId::X, NegativePolicy::Allow, Length::ZERO)
    }

    pub fn y(&self) -> Length {
        self.length(PropertyId::Y, NegativePolicy::Allow, Length::ZERO)
    }

    /// Box width. Viewport-establishing kinds default to `100%`.
    pub fn width(&self) -> Length {
        let default = self.viewport_size_default();
        self.length(PropertyId::Width, NegativePolicy::Forbid, default)
    }

    pub fn height(&self) -> Length {
        let default = self.viewport_size_default();
        self.length(PropertyId::Height, NegativePolicy::Forbid, default)
    }

    fn viewport_size_default(&self) -> Length {
        match self.kind {
            ElementKind::Svg | ElementKind::Use | ElementKind::Symbol => Length::HUNDRED_PERCENT,
            _ => Length::ZERO,
        }
    }

    /// Horizontal corner radius. Auto when unspecified or invalid.
    pub fn rx(&self) -> Length {
        self.length(PropertyId::Rx, NegativePolicy::Forbid, Length::AUTO)
    }

    /// Vertical corner radius. Auto when unspecified or invalid.
    pub fn ry(&self) -> Length {
        self.length(PropertyId::Ry, NegativePolicy::Forbid, Length::AUTO)
    }

    pub fn cx(&self) -> Length {
        self.length(PropertyId::Cx, NegativePolicy::Allow, Length::ZERO)
    }

    pub fn cy(&self) -> Length {
        self.length(PropertyId::Cy, NegativePolicy::Allow, Length::ZERO)
    }

    pub fn r(&self) -> Length {
        self.length(PropertyId::R, NegativePolicy::Forbid, Length::ZERO)
    }

    /// Local geometry in untransformed user units. Empty for kinds without
    /// geometry and for degenerate shapes.
    pub fn path(&self, lengths: &LengthContext) -> Path {
        match self.kind {
            ElementKind::Rect | ElementKind::Text => self.box_path(lengths),
            ElementKind::Circle => self.circle_path(lengths),
            ElementKind::Ellipse => self.ellipse_path(lengths),
            ElementKind::Line => self.line_path(lengths),
            ElementKind::Polyline => self.poly_path(false),
            ElementKind::Polygon => self.poly_path(true),
            ElementKind::Path => parser::parse_path_data(self.get(PropertyId::D)),
            ElementKind::Svg
            | ElementKind::G
            | ElementKind::Defs
            | ElementKind::Symbol
            | ElementKind::Use
            | ElementKind::Unknown => Path::new(),
        }
    }

    fn box_path(&self, lengths: &LengthContext) -> Path {
        let w = self.width();
        let h = self.height();
        if w.is_zero() || h.is_zero() {
            return Path::new();
        }

        let x = lengths.value_for_length(self.x(), LengthMode::Width);
        let y = lengths.value_for_length(self.y(), LengthMode::Height);
        let w = lengths.value_for_length(w, LengthMode::Width);
        let h = lengths.value_for_length(h, LengthMode::Height);
        if w <= 0.0 || h <= 0.0 {
            return Path::new();
        }

        let (rx, ry) = self.radii(lengths);
        let mut path = Path::new();
        path.add_rect(x, y, w, h, rx, ry);
        path
    }

    /// Resolved `rx`/`ry`. An unspecified radius copies the other one; both
    /// unspecified gives square corners.
    pub fn radii(&self, lengths: &LengthContext) -> (f64, f64) {
        let rx = self.rx();
        let ry = self.ry();
        let mut rx_value = lengths.value_for_length(rx, LengthMode::Width);
        let mut ry_value = lengths.value_for_length(ry, LengthMode::Height);
        if !rx.is_valid() {
            rx_value = ry_value;
        }
        if !ry.is_valid() {
            ry_value = rx_value;
        }
        (rx_value, ry_value)
    }

    fn circle_path(&self, lengths: &LengthContext) -> Path {
        let r = lengths.value_for_length(self.r(), LengthMode::Diagonal);
        if r <= 0.0 {
            return Path::new();
        }
        let cx = lengths.value_for_length(self.cx(), LengthMode::Width);
        let cy = lengths.value_for_length(self.cy(), LengthMode::Height);
        let mut path = Path::new();
        path.add_ellipse(cx, cy, r, r);
        path
    }

    fn ellipse_path(&self, lengths: &LengthContext) -> Path {
        let (rx, ry) = self.radii(lengths);
        if rx <= 0.0 || ry <= 0.0 {
            return Path::new();
        }
        let cx = lengths.value_for_length(self.cx(), LengthMode::Width);
        let cy = lengths.value_for_length(self.cy(), LengthMode::Height);
        let mut path = Path::new();
        path.add_ellipse(cx, cy, rx, ry);
        path
    }

    fn line_path(&self, lengths: &LengthContext) -> Path {
        let coord = |property, mode| {
            let length = self.length(property, NegativePolicy::Allow, Length::ZERO);
            lengths.value_for_length(length, mode)
        };
        let mut path = Path::new();
        path.move_to(
            coord(PropertyId::X1, LengthMode::Width),
            coord(PropertyId::Y1, LengthMode::Height),
        );
        path.line_to(
            coord(PropertyId::X2, LengthMode::Width),
            coord(PropertyId::Y2, LengthMode::Height),
        );
        path
    }

    fn poly_path(&self, close: bool) -> Path {
        let points = parser::parse_points(self.get(PropertyId::Points));
        let mut path = Path::new();
        if points.len() < 2 {
            return path;
        }
        path.move_to(points[0].x, points[0].y);
        for p in &points[1..] {
            path.line_to(p.x, p.y);
        }
        if close {
            path.close();
        }
        path
    }
}
