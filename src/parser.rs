//! # Attribute Value Parsers
//!
//! Turns raw property strings into typed values. Every parser here is total:
//! malformed input yields the caller's default (or identity, or an empty
//! path) instead of an error, so that a bad attribute degrades a single
//! element rather than the whole document.

use crate::geometry::{Align, AspectRatio, Path, Point, Rect, Transform};
use crate::length::{Length, LengthUnit};
use crate::style::{Color, Paint};

/// Whether a negative magnitude is acceptable for a given property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegativePolicy {
    Allow,
    Forbid,
}

/// Parse a length such as `10`, `-2.5px`, `50%` or `1.2em`.
///
/// Empty input, trailing garbage, an unknown unit or a forbidden negative all
/// return `default`.
pub fn parse_length(text: &str, policy: NegativePolicy, default: Length) -> Length {
    let text = text.trim();
    if text.is_empty() {
        return default;
    }

    let mut scanner = Scanner::new(text);
    let Some(value) = scanner.number() else {
        return default;
    };
    if policy == NegativePolicy::Forbid && value < 0.0 {
        return default;
    }

    let unit = match scanner.rest() {
        "" => LengthUnit::Number,
        "px" => LengthUnit::Px,
        "pt" => LengthUnit::Pt,
        "pc" => LengthUnit::Pc,
        "in" => LengthUnit::In,
        "cm" => LengthUnit::Cm,
        "mm" => LengthUnit::Mm,
        "em" => LengthUnit::Em,
        "ex" => LengthUnit::Ex,
        "%" => LengthUnit::Percent,
        _ => return default,
    };
    Length::new(value, unit)
}

/// Parse a plain number, e.g. an opacity or a miter limit.
pub fn parse_number(text: &str) -> Option<f64> {
    let mut scanner = Scanner::new(text.trim());
    let value = scanner.number()?;
    scanner.rest().is_empty().then_some(value)
}

/// Parse a `transform` attribute. Any syntax error yields identity for the
/// whole list.
pub fn parse_transform(text: &str) -> Transform {
    try_parse_transform(text).unwrap_or_default()
}

fn try_parse_transform(text: &str) -> Option<Transform> {
    let mut scanner = Scanner::new(text);
    let mut result = Transform::IDENTITY;

    loop {
        scanner.skip_separators();
        if scanner.at_end() {
            return Some(result);
        }

        let name = scanner.identifier();
        scanner.skip_whitespace();
        if !scanner.eat(b'(') {
            return None;
        }
        let args = scanner.number_list_until(b')')?;

        let local = match (name, args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Transform::new(a, b, c, d, e, f),
            ("translate", &[tx]) => Transform::translation(tx, 0.0),
            ("translate", &[tx, ty]) => Transform::translation(tx, ty),
            ("scale", &[s]) => Transform::scaling(s, s),
            ("scale", &[sx, sy]) => Transform::scaling(sx, sy),
            ("rotate", &[angle]) => Transform::rotation(angle),
            ("rotate", &[angle, cx, cy]) => Transform::translation(cx, cy)
                .multiply(&Transform::rotation(angle))
                .translate(-cx, -cy),
            ("skewX", &[angle]) => Transform::skewing_x(angle),
            ("skewY", &[angle]) => Transform::skewing_y(angle),
            _ => return None,
        };
        result = result.multiply(&local);
    }
}

/// Parse a whitespace/comma separated list of numbers. Stops at the first
/// token that is not a number.
pub fn parse_number_list(text: &str) -> Vec<f64> {
    let mut scanner = Scanner::new(text);
    let mut numbers = Vec::new();
    loop {
        scanner.skip_separators();
        match scanner.number() {
            Some(n) => numbers.push(n),
            None => return numbers,
        }
    }
}

/// Parse a `points` attribute. A dangling odd coordinate is dropped.
pub fn parse_points(text: &str) -> Vec<Point> {
    parse_number_list(text)
        .chunks_exact(2)
        .map(|c| Point::new(c[0], c[1]))
        .collect()
}

/// Parse a `viewBox`. Non-positive sizes disable the viewBox.
pub fn parse_view_box(text: &str) -> Option<Rect> {
    let parts = parse_number_list(text);
    match parts.as_slice() {
        &[x, y, w, h] if w > 0.0 && h > 0.0 => Some(Rect::new(x, y, w, h)),
        _ => None,
    }
}

/// Parse `preserveAspectRatio`, defaulting to `xMidYMid meet`.
pub fn parse_preserve_aspect_ratio(text: &str) -> AspectRatio {
    let mut words = text.split_whitespace();
    let align = match words.next() {
        Some("none") => Align::None,
        Some("xMinYMin") => Align::XMinYMin,
        Some("xMidYMin") => Align::XMidYMin,
        Some("xMaxYMin") => Align::XMaxYMin,
        Some("xMinYMid") => Align::XMinYMid,
        Some("xMidYMid") => Align::XMidYMid,
        Some("xMaxYMid") => Align::XMaxYMid,
        Some("xMinYMax") => Align::XMinYMax,
        Some("xMidYMax") => Align::XMidYMax,
        Some("xMaxYMax") => Align::XMaxYMax,
        _ => return AspectRatio::default(),
    };
    let slice = matches!(words.next(), Some("slice"));
    AspectRatio { align, slice }
}

/// Parse path data. Parsing stops at the first error; everything before it
/// is kept, as renderers are expected to draw the valid prefix.
pub fn parse_path_data(d: &str) -> Path {
    let mut path = Path::new();
    let mut scanner = Scanner::new(d);
    let mut smooth = SmoothControls::default();
    let mut command: Option<u8> = None;

    loop {
        scanner.skip_separators();
        if scanner.at_end() {
            break;
        }

        let cmd = match scanner.peek() {
            Some(c) if c.is_ascii_alphabetic() => {
                scanner.bump();
                c
            }
            // Implicit repetition of the previous command. After a moveto the
            // repeated command is a lineto.
            Some(_) => match command {
                Some(b'M') => b'L',
                Some(b'm') => b'l',
                Some(c) if !matches!(c, b'Z' | b'z') => c,
                _ => break,
            },
            None => break,
        };

        if path.is_empty() && !matches!(cmd, b'M' | b'm') {
            break;
        }
        if apply_segment(cmd, &mut scanner, &mut path, &mut smooth).is_none() {
            break;
        }
        command = Some(cmd);
    }

    path
}

/// Last control points, for the reflection done by `S` and `T`.
#[derive(Default)]
struct SmoothControls {
    cubic: Option<Point>,
    quad: Option<Point>,
}

fn apply_segment(
    cmd: u8,
    scanner: &mut Scanner<'_>,
    path: &mut Path,
    smooth: &mut SmoothControls,
) -> Option<()> {
    let current = path.current_point();
    let (ox, oy) = if cmd.is_ascii_lowercase() {
        (current.x, current.y)
    } else {
        (0.0, 0.0)
    };
    let upper = cmd.to_ascii_uppercase();

    let mut cubic = None;
    let mut quad = None;

    match upper {
        b'M' => {
            let [x, y] = scanner.coords::<2>()?;
            path.move_to(ox + x, oy + y);
        }
        b'L' => {
            let [x, y] = scanner.coords::<2>()?;
            path.line_to(ox + x, oy + y);
        }
        b'H' => {
            let [x] = scanner.coords::<1>()?;
            path.line_to(ox + x, current.y);
        }
        b'V' => {
            let [y] = scanner.coords::<1>()?;
            path.line_to(current.x, oy + y);
        }
        b'C' => {
            let [x1, y1, x2, y2, x, y] = scanner.coords::<6>()?;
            path.cubic_to(ox + x1, oy + y1, ox + x2, oy + y2, ox + x, oy + y);
            cubic = Some(Point::new(ox + x2, oy + y2));
        }
        b'S' => {
            let [x2, y2, x, y] = scanner.coords::<4>()?;
            let (x1, y1) = reflect(smooth.cubic, current);
            path.cubic_to(x1, y1, ox + x2, oy + y2, ox + x, oy + y);
            cubic = Some(Point::new(ox + x2, oy + y2));
        }
        b'Q' => {
            let [qx, qy, x, y] = scanner.coords::<4>()?;
            path.quad_to(ox + qx, oy + qy, ox + x, oy + y);
            quad = Some(Point::new(ox + qx, oy + qy));
        }
        b'T' => {
            let [x, y] = scanner.coords::<2>()?;
            let (qx, qy) = reflect(smooth.quad, current);
            path.quad_to(qx, qy, ox + x, oy + y);
            quad = Some(Point::new(qx, qy));
        }
        b'A' => {
            let (rx, ry, rotation, large, sweep, x, y) = scanner.arc_args()?;
            path.arc_to(rx, ry, rotation, large, sweep, ox + x, oy + y);
        }
        b'Z' => path.close(),
        _ => return None,
    }

    // Smooth curves only reflect a control point from the same curve family.
    smooth.cubic = cubic;
    smooth.quad = quad;
    Some(())
}

fn reflect(control: Option<Point>, current: Point) -> (f64, f64) {
    match control {
        Some(c) => (2.0 * current.x - c.x, 2.0 * current.y - c.y),
        None => (current.x, current.y),
    }
}

/// Parse a color: `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`
/// or a named color.
pub fn parse_color(text: &str) -> Option<Color> {
    let s = text.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex);
    }

    let lower = s.to_ascii_lowercase();
    if let Some(inner) = lower
        .strip_prefix("rgba(")
        .or_else(|| lower.strip_prefix("rgb("))
    {
        let inner = inner.strip_suffix(')')?;
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        let channel = |p: &str| -> Option<f64> {
            let value = match p.strip_suffix('%') {
                Some(pct) => parse_number(pct)? / 100.0,
                None => parse_number(p)? / 255.0,
            };
            Some(value.clamp(0.0, 1.0))
        };
        let (r, g, b) = match *parts.as_slice() {
            [r, g, b] | [r, g, b, _] => (channel(r)?, channel(g)?, channel(b)?),
            _ => return None,
        };
        let a = match parts.get(3) {
            Some(a) => parse_number(a)?.clamp(0.0, 1.0),
            None => 1.0,
        };
        return Some(Color { r, g, b, a });
    }

    named_color(&lower)
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1].repeat(2), 16).ok();
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b, a) = match hex.len() {
        3 => (nibble(0)?, nibble(1)?, nibble(2)?, 255),
        4 => (nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?),
        6 => (byte(0)?, byte(2)?, byte(4)?, 255),
        8 => (byte(0)?, byte(2)?, byte(4)?, byte(6)?),
        _ => return None,
    };
    Some(Color::rgba8(r, g, b, a))
}

fn named_color(name: &str) -> Option<Color> {
    let (r, g, b) = match name {
        "transparent" => return Some(Color::TRANSPARENT),
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "lime" => (0, 255, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "navy" => (0, 0, 128),
        "yellow" => (255, 255, 0),
        "gold" => (255, 215, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "fuchsia" | "magenta" => (255, 0, 255),
        "aqua" | "cyan" => (0, 255, 255),
        "teal" => (0, 128, 128),
        "maroon" => (128, 0, 0),
        "olive" => (128, 128, 0),
        "silver" => (192, 192, 192),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "lightgray" | "lightgrey" => (211, 211, 211),
        "brown" => (165, 42, 42),
        "pink" => (255, 192, 203),
        "coral" => (255, 127, 80),
        "crimson" => (220, 20, 60),
        "indigo" => (75, 0, 130),
        "violet" => (238, 130, 238),
        "salmon" => (250, 128, 114),
        "skyblue" => (135, 206, 235),
        "steelblue" => (70, 130, 180),
        "tomato" => (255, 99, 71),
        "turquoise" => (64, 224, 208),
        "khaki" => (240, 230, 140),
        "beige" => (245, 245, 220),
        "ivory" => (255, 255, 240),
        "tan" => (210, 180, 140),
        "chocolate" => (210, 105, 30),
        "darkblue" => (0, 0, 139),
        "darkgreen" => (0, 100, 0),
        "darkred" => (139, 0, 0),
        "lightblue" => (173, 216, 230),
        "lightgreen" => (144, 238, 144),
        "whitesmoke" => (245, 245, 245),
        _ => return None,
    };
    Some(Color::rgba8(r, g, b, 255))
}

/// Parse a `fill`/`stroke` value. `inherit` is not handled here: the
/// resolver deals with it before asking for a paint.
pub fn parse_paint(text: &str) -> Option<Paint> {
    let s = text.trim();
    match s {
        "none" => return Some(Paint::None),
        "currentColor" => return Some(Paint::CurrentColor),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("url(") {
        let close = rest.find(')')?;
        let reference = rest[..close].trim().trim_matches(|c| c == '"' || c == '\'');
        let id = reference.strip_prefix('#').unwrap_or(reference).to_string();
        let fallback = match rest[close + 1..].trim() {
            "" => None,
            other => Some(Box::new(parse_paint(other)?)),
        };
        return Some(Paint::Server { id, fallback });
    }

    parse_color(s).map(Paint::Color)
}

/// A byte cursor over attribute text.
struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.text.as_bytes()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace() || b == b',') {
            self.pos += 1;
        }
    }

    fn identifier(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        &self.text[start..self.pos]
    }

    /// Read one number: optional sign, digits, fraction, exponent. Leaves the
    /// cursor untouched on failure.
    fn number(&mut self) -> Option<f64> {
        let bytes = self.bytes();
        let start = self.pos;
        let mut i = start;

        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let int_start = i;
        while matches!(bytes.get(i), Some(b) if b.is_ascii_digit()) {
            i += 1;
        }
        let mut digits = i - int_start;
        if bytes.get(i) == Some(&b'.') {
            let frac_start = i + 1;
            let mut j = frac_start;
            while matches!(bytes.get(j), Some(b) if b.is_ascii_digit()) {
                j += 1;
            }
            if j > frac_start || digits > 0 {
                digits += j - frac_start;
                i = j;
            }
        }
        if digits == 0 {
            return None;
        }
        // Exponent, but not the start of a unit like `em` or `ex`.
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            let mut j = i + 1;
            if matches!(bytes.get(j), Some(b'+' | b'-')) {
                j += 1;
            }
            let exp_start = j;
            while matches!(bytes.get(j), Some(b) if b.is_ascii_digit()) {
                j += 1;
            }
            if j > exp_start {
                i = j;
            }
        }

        let value: f64 = self.text[start..i].parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        self.pos = i;
        Some(value)
    }

    fn coords<const N: usize>(&mut self) -> Option<[f64; N]> {
        let mut out = [0.0; N];
        for slot in out.iter_mut() {
            self.skip_separators();
            *slot = self.number()?;
        }
        Some(out)
    }

    fn flag(&mut self) -> Option<bool> {
        self.skip_separators();
        match self.peek() {
            Some(b'0') => {
                self.bump();
                Some(false)
            }
            Some(b'1') => {
                self.bump();
                Some(true)
            }
            _ => None,
        }
    }

    #[allow(clippy::type_complexity)]
    fn arc_args(&mut self) -> Option<(f64, f64, f64, bool, bool, f64, f64)> {
        let [rx, ry, rotation] = self.coords::<3>()?;
        let large = self.flag()?;
        let sweep = self.flag()?;
        let [x, y] = self.coords::<2>()?;
        Some((rx, ry, rotation, large, sweep, x, y))
    }

    fn number_list_until(&mut self, close: u8) -> Option<Vec<f64>> {
        let mut numbers = Vec::new();
        loop {
            self.skip_separators();
            if self.eat(close) {
                return Some(numbers);
            }
            numbers.push(self.number()?);
        }
    }
}
