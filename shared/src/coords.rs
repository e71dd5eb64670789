use serde::{Deserialize, Serialize};

/// Edge length of the square tile pyramid in pixels (8x8 tiles of 4096px).
pub const MAP_SIZE: i32 = 16384;

/// Raw world rectangle covered by the map image, shared by every region.
/// Center (422.5, 614), size 1732 on both axes.
pub const WORLD_BOUNDS: WorldBounds = WorldBounds {
    x_min: -443.5,
    x_max: 1288.5,
    z_min: -252.0,
    z_max: 1480.0,
};

/// Axis-aligned rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl WorldBounds {
    /// Bounds window for a transform: every edge divided by `scaling`.
    pub fn scaled(&self, scaling: f64) -> Self {
        Self {
            x_min: self.x_min / scaling,
            x_max: self.x_max / scaling,
            z_min: self.z_min / scaling,
            z_max: self.z_max / scaling,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.z_max - self.z_min
    }

    pub fn contains(&self, x: f64, z: f64) -> bool {
        x >= self.x_min && x <= self.x_max && z >= self.z_min && z <= self.z_max
    }
}

/// Pixel position on the map image. May lie outside the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageCoord {
    pub x: i32,
    pub y: i32,
}

impl ImageCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the pixel falls on the image, i.e. `[0, MAP_SIZE)` on both axes.
    pub const fn in_bounds(&self) -> bool {
        self.x >= 0 && self.x < MAP_SIZE && self.y >= 0 && self.y < MAP_SIZE
    }
}

/// Planar world position (the `x`/`z` ground plane).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldCoord {
    pub x: f64,
    pub z: f64,
}

impl WorldCoord {
    pub const fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

/// Full world position. `y` is altitude and never takes part in projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl WorldPos {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn planar(&self) -> WorldCoord {
        WorldCoord::new(self.x, self.z)
    }
}
