use serde::{Deserialize, Serialize};

/// Map view in image space: the pixel at the center of the screen and the
/// widget's zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 6144.0,
            y: 6144.0,
            scale: 0.1,
        }
    }
}

impl Viewport {
    pub const fn new(x: f64, y: f64, scale: f64) -> Self {
        Self { x, y, scale }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.scale.is_finite()
    }

    /// Round every field to `decimals` places (used when sharing a view).
    pub fn rounded(&self, decimals: u32) -> Self {
        let factor = 10f64.powi(decimals as i32);
        let round = |v: f64| (v * factor).round() / factor;
        Self {
            x: round(self.x),
            y: round(self.y),
            scale: round(self.scale),
        }
    }
}
