use serde::{Deserialize, Serialize};

use super::{Rect, Transform};

/// Alignment half of `preserveAspectRatio`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    /// Stretch non-uniformly to fill the viewport.
    None,
    XMinYMin,
    XMidYMin,
    XMaxYMin,
    XMinYMid,
    #[default]
    XMidYMid,
    XMaxYMid,
    XMinYMax,
    XMidYMax,
    XMaxYMax,
}

impl Align {
    /// Horizontal and vertical factors: 0 = min, 0.5 = mid, 1 = max.
    fn factors(self) -> (f64, f64) {
        match self {
            Align::None | Align::XMinYMin => (0.0, 0.0),
            Align::XMidYMin => (0.5, 0.0),
            Align::XMaxYMin => (1.0, 0.0),
            Align::XMinYMid => (0.0, 0.5),
            Align::XMidYMid => (0.5, 0.5),
            Align::XMaxYMid => (1.0, 0.5),
            Align::XMinYMax => (0.0, 1.0),
            Align::XMidYMax => (0.5, 1.0),
            Align::XMaxYMax => (1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub align: Align,
    /// `slice` instead of `meet`.
    pub slice: bool,
}

impl AspectRatio {
    /// Transform mapping `view_box` into `viewport`.
    pub fn view_box_transform(&self, view_box: Rect, viewport: Rect) -> Transform {
        if view_box.width <= 0.0 || view_box.height <= 0.0 {
            return Transform::translation(viewport.x, viewport.y);
        }

        let sx = viewport.width / view_box.width;
        let sy = viewport.height / view_box.height;

        if self.align == Align::None {
            return Transform::translation(viewport.x, viewport.y)
                .scale(sx, sy)
                .translate(-view_box.x, -view_box.y);
        }

        let scale = if self.slice { sx.max(sy) } else { sx.min(sy) };
        let (fx, fy) = self.align.factors();
        let tx = viewport.x + (viewport.width - view_box.width * scale) * fx;
        let ty = viewport.y + (viewport.height - view_box.height * scale) * fy;

        Transform::translation(tx, ty)
            .scale(scale, scale)
            .translate(-view_box.x, -view_box.y)
    }
}
