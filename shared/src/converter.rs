use serde::Serialize;

use crate::coords::{ImageCoord, MAP_SIZE, WORLD_BOUNDS, WorldCoord};
use crate::transform::{
    Transform, TransformError, TransformRegistry, TransformRowError, parse_transform_row,
};

/// Scaled positions this close below an integer count as that integer.
/// Absorbs float noise so `image_to_world` output maps back to its pixel.
const PIXEL_SNAP_EPSILON: f64 = 1e-6;

/// Outcome of a region CSV load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvLoadReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Bidirectional world <-> image mapping, parameterized per region.
#[derive(Debug, Clone, Default)]
pub struct CoordinateConverter {
    registry: TransformRegistry,
}

impl CoordinateConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: TransformRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TransformRegistry {
        &self.registry
    }

    pub fn set_region_transform(
        &mut self,
        region: &str,
        transform: Transform,
    ) -> Result<(), TransformError> {
        self.registry.set(region, transform)
    }

    /// Project a ground-plane world position onto the map image.
    ///
    /// Unknown regions use the default transform. The result is not clamped
    /// to the image.
    pub fn world_to_image(&self, world_x: f64, world_z: f64, region: &str) -> ImageCoord {
        let transform = self.registry.resolve(region);
        let bounds = WORLD_BOUNDS.scaled(transform.scaling);

        let mut norm_x = (world_x - bounds.x_min) / bounds.width();
        let mut norm_z = (world_z - bounds.z_min) / bounds.height();
        if transform.invert_x {
            norm_x = 1.0 - norm_x;
        }
        if transform.invert_z {
            norm_z = 1.0 - norm_z;
        }

        ImageCoord {
            x: to_pixel(norm_x, transform.offset_x),
            y: to_pixel(norm_z, transform.offset_y),
        }
    }

    /// Inverse of [`world_to_image`](Self::world_to_image). Takes fractional
    /// pixels so pointer positions convert without rounding.
    pub fn image_to_world(&self, image_x: f64, image_y: f64, region: &str) -> WorldCoord {
        let transform = self.registry.resolve(region);
        let size = f64::from(MAP_SIZE);

        let mut norm_x = (image_x - f64::from(transform.offset_x)) / size;
        let mut norm_z = (image_y - f64::from(transform.offset_y)) / size;
        if transform.invert_x {
            norm_x = 1.0 - norm_x;
        }
        if transform.invert_z {
            norm_z = 1.0 - norm_z;
        }

        let bounds = WORLD_BOUNDS.scaled(transform.scaling);
        WorldCoord {
            x: norm_x * bounds.width() + bounds.x_min,
            z: norm_z * bounds.height() + bounds.z_min,
        }
    }

    /// Register every valid row of a `region,scaling,offset_x,offset_y,invert_x,invert_z`
    /// table. The first line is the header. Later rows overwrite earlier ones
    /// for the same region. Bad rows are skipped and never abort the load.
    pub fn load_transforms_from_csv(&mut self, text: &str) -> CsvLoadReport {
        let mut report = CsvLoadReport::default();

        for (index, line) in text.trim().lines().enumerate().skip(1) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_transform_row(line) {
                Ok((region, transform)) => match self.registry.set(&region, transform) {
                    Ok(()) => report.applied += 1,
                    Err(e) => {
                        tracing::warn!(line = index + 1, %region, "dropping region transform: {e}");
                        report.skipped += 1;
                    }
                },
                Err(TransformRowError::TooFewFields(_)) => report.skipped += 1,
                Err(e) => {
                    tracing::warn!(line = index + 1, "dropping region transform row: {e}");
                    report.skipped += 1;
                }
            }
        }

        tracing::debug!(
            applied = report.applied,
            skipped = report.skipped,
            "loaded region transforms"
        );
        report
    }
}

/// Offset is added in `f64` and the result saturates into `i32`. NaN lands
/// on `i32::MIN`, well off the image.
fn to_pixel(norm: f64, offset: i32) -> i32 {
    if norm.is_nan() {
        return i32::MIN;
    }
    let pixel = (norm * f64::from(MAP_SIZE) + PIXEL_SNAP_EPSILON).floor() + f64::from(offset);
    pixel as i32
}
