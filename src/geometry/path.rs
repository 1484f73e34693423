use serde::{Deserialize, Serialize};

use super::{Point, Rect};

/// Cubic bezier approximation constant for quarter circles.
const KAPPA: f64 = 0.5522847498;

/// A single path segment. Quadratic curves and arcs are converted to cubics
/// when they are added, so consumers only ever see these four.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    Close,
}

/// Local geometry of a shape, in untransformed user units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Path {
    commands: Vec<PathCommand>,
    #[serde(skip)]
    current: Point,
    #[serde(skip)]
    start: Point,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// The current point, i.e. the end of the last segment.
    pub fn current_point(&self) -> Point {
        self.current
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::MoveTo(x, y));
        self.current = Point::new(x, y);
        self.start = self.current;
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.commands.push(PathCommand::LineTo(x, y));
        self.current = Point::new(x, y);
    }

    pub fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.commands
            .push(PathCommand::CubicTo(x1, y1, x2, y2, x, y));
        self.current = Point::new(x, y);
    }

    /// Quadratic curve from the current point, stored as the equivalent cubic.
    pub fn quad_to(&mut self, qx: f64, qy: f64, x: f64, y: f64) {
        let Point { x: cx, y: cy } = self.current;
        let c1x = cx + (2.0 / 3.0) * (qx - cx);
        let c1y = cy + (2.0 / 3.0) * (qy - cy);
        let c2x = x + (2.0 / 3.0) * (qx - x);
        let c2y = y + (2.0 / 3.0) * (qy - y);
        self.cubic_to(c1x, c1y, c2x, c2y, x, y);
    }

    /// Elliptical arc from the current point to `(x, y)` using SVG endpoint
    /// parameterization. Out-of-range radii are scaled up; a zero radius
    /// degrades to a straight line.
    #[allow(clippy::too_many_arguments)]
    pub fn arc_to(
        &mut self,
        rx: f64,
        ry: f64,
        x_axis_rotation: f64,
        large_arc: bool,
        sweep: bool,
        x: f64,
        y: f64,
    ) {
        let p0 = self.current;
        if p0.x == x && p0.y == y {
            return;
        }
        let mut rx = rx.abs();
        let mut ry = ry.abs();
        if rx == 0.0 || ry == 0.0 {
            self.line_to(x, y);
            return;
        }

        let (sin_phi, cos_phi) = x_axis_rotation.to_radians().sin_cos();
        let dx2 = (p0.x - x) / 2.0;
        let dy2 = (p0.y - y) / 2.0;
        let x1p = cos_phi * dx2 + sin_phi * dy2;
        let y1p = -sin_phi * dx2 + cos_phi * dy2;

        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = rx2 * ry2 - rx2 * y1p * y1p - ry2 * x1p * x1p;
        let den = rx2 * y1p * y1p + ry2 * x1p * x1p;
        let mut coef = if den == 0.0 { 0.0 } else { (num / den).max(0.0).sqrt() };
        if large_arc == sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;
        let cx = cos_phi * cxp - sin_phi * cyp + (p0.x + x) / 2.0;
        let cy = sin_phi * cxp + cos_phi * cyp + (p0.y + y) / 2.0;

        let theta1 = vector_angle(1.0, 0.0, (x1p - cxp) / rx, (y1p - cyp) / ry);
        let mut delta_theta = vector_angle(
            (x1p - cxp) / rx,
            (y1p - cyp) / ry,
            (-x1p - cxp) / rx,
            (-y1p - cyp) / ry,
        );
        if !sweep && delta_theta > 0.0 {
            delta_theta -= std::f64::consts::TAU;
        } else if sweep && delta_theta < 0.0 {
            delta_theta += std::f64::consts::TAU;
        }

        let segments = (delta_theta.abs() / std::f64::consts::FRAC_PI_2).ceil().max(1.0) as usize;
        let delta = delta_theta / segments as f64;
        let t = 4.0 / 3.0 * (delta / 4.0).tan();

        let map = |px: f64, py: f64| {
            (
                cx + rx * px * cos_phi - ry * py * sin_phi,
                cy + rx * px * sin_phi + ry * py * cos_phi,
            )
        };

        for i in 0..segments {
            let a1 = theta1 + delta * i as f64;
            let a2 = a1 + delta;
            let (s1, c1) = a1.sin_cos();
            let (s2, c2) = a2.sin_cos();
            let (x1, y1) = map(c1 - t * s1, s1 + t * c1);
            let (x2, y2) = map(c2 + t * s2, s2 - t * c2);
            let (ex, ey) = if i + 1 == segments { (x, y) } else { map(c2, s2) };
            self.cubic_to(x1, y1, x2, y2, ex, ey);
        }
    }

    pub fn close(&mut self) {
        if !self.commands.is_empty() {
            self.commands.push(PathCommand::Close);
            self.current = self.start;
        }
    }

    /// Append a rectangle with elliptical corners. Radii are clamped to half
    /// the width and height; zero radii give square corners.
    pub fn add_rect(&mut self, x: f64, y: f64, w: f64, h: f64, rx: f64, ry: f64) {
        let rx = rx.max(0.0).min(w / 2.0);
        let ry = ry.max(0.0).min(h / 2.0);

        if rx == 0.0 || ry == 0.0 {
            self.move_to(x, y);
            self.line_to(x + w, y);
            self.line_to(x + w, y + h);
            self.line_to(x, y + h);
            self.close();
            return;
        }

        let kx = rx * KAPPA;
        let ky = ry * KAPPA;
        let right = x + w;
        let bottom = y + h;

        self.move_to(x + rx, y);
        self.line_to(right - rx, y);
        self.cubic_to(right - rx + kx, y, right, y + ry - ky, right, y + ry);
        self.line_to(right, bottom - ry);
        self.cubic_to(right, bottom - ry + ky, right - rx + kx, bottom, right - rx, bottom);
        self.line_to(x + rx, bottom);
        self.cubic_to(x + rx - kx, bottom, x, bottom - ry + ky, x, bottom - ry);
        self.line_to(x, y + ry);
        self.cubic_to(x, y + ry - ky, x + rx - kx, y, x + rx, y);
        self.close();
    }

    /// Append a full ellipse as four cubic segments.
    pub fn add_ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;

        self.move_to(cx + rx, cy);
        self.cubic_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
        self.cubic_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
        self.cubic_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
        self.cubic_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
        self.close();
    }

    /// Bounding box of all points and control points, or `None` if empty.
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut points = self.commands.iter().flat_map(|cmd| match *cmd {
            PathCommand::MoveTo(x, y) | PathCommand::LineTo(x, y) => vec![(x, y)],
            PathCommand::CubicTo(x1, y1, x2, y2, x, y) => vec![(x1, y1), (x2, y2), (x, y)],
            PathCommand::Close => vec![],
        });

        let (x0, y0) = points.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for (x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Rect::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }
}

fn vector_angle(ux: f64, uy: f64, vx: f64, vy: f64) -> f64 {
    (ux * vy - uy * vx).atan2(ux * vx + uy * vy)
}
