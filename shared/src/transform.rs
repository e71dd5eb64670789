use std::collections::HashMap;
use std::fmt;

/// Region key that always resolves.
pub const DEFAULT_REGION: &str = "default";

const ASSET_WORLD_PREFIX: &str = "worlds/isolaSacra/";

/// Per-region affine calibration between world and image space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub scaling: f64,
    pub offset_x: i32,
    pub offset_y: i32,
    pub invert_x: bool,
    pub invert_z: bool,
}

impl Transform {
    /// Image rows grow downward while world Z grows north, so only Z is flipped.
    pub const DEFAULT: Self = Self {
        scaling: 30.0,
        offset_x: 0,
        offset_y: 0,
        invert_x: false,
        invert_z: true,
    };

    /// `scaling` is a divisor; it must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), TransformError> {
        if !self.scaling.is_finite() || self.scaling <= 0.0 {
            return Err(TransformError::InvalidScaling(self.scaling));
        }
        Ok(())
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformError {
    InvalidScaling(f64),
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidScaling(value) => {
                write!(f, "scaling must be finite and positive, got {value}")
            }
        }
    }
}

impl std::error::Error for TransformError {}

/// Why a region CSV row was not registered.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformRowError {
    TooFewFields(usize),
    EmptyRegion,
    InvalidNumber { column: &'static str, value: String },
    Invalid(TransformError),
}

impl fmt::Display for TransformRowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewFields(count) => write!(f, "expected at least 5 fields, got {count}"),
            Self::EmptyRegion => f.write_str("region name is empty"),
            Self::InvalidNumber { column, value } => {
                write!(f, "column {column}: {value:?} is not a number")
            }
            Self::Invalid(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for TransformRowError {}

impl From<TransformError> for TransformRowError {
    fn from(err: TransformError) -> Self {
        Self::Invalid(err)
    }
}

/// Default transform plus region overrides. Lookups never fail: a region
/// without an entry resolves to the default.
#[derive(Debug, Clone)]
pub struct TransformRegistry {
    default: Transform,
    regions: HashMap<String, Transform>,
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            default: Transform::DEFAULT,
            regions: HashMap::new(),
        }
    }

    /// Exact lookup. `"default"` is always present.
    pub fn lookup(&self, region: &str) -> Option<&Transform> {
        if region == DEFAULT_REGION {
            return Some(&self.default);
        }
        self.regions.get(region)
    }

    /// Lookup with the default-transform fallback for unregistered regions.
    pub fn resolve(&self, region: &str) -> &Transform {
        match self.lookup(region) {
            Some(transform) => transform,
            None => &self.default,
        }
    }

    /// Replace the transform for `region` wholesale. An invalid transform
    /// leaves the registry untouched.
    pub fn set(&mut self, region: &str, transform: Transform) -> Result<(), TransformError> {
        transform.validate()?;
        if region == DEFAULT_REGION {
            self.default = transform;
        } else {
            self.regions.insert(region.to_string(), transform);
        }
        Ok(())
    }

    /// Number of region overrides, not counting the default.
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Registered region names, excluding the default.
    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.keys().map(String::as_str)
    }
}

/// Parse one `region,scaling,offset_x,offset_y,invert_x,invert_z` row.
///
/// The sixth column may be missing, in which case `invert_z` is false.
/// Boolean columns are `true` case-insensitively and false otherwise.
pub fn parse_transform_row(line: &str) -> Result<(String, Transform), TransformRowError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < 5 {
        return Err(TransformRowError::TooFewFields(fields.len()));
    }

    let region = fields[0];
    if region.is_empty() {
        return Err(TransformRowError::EmptyRegion);
    }

    let scaling = fields[1]
        .parse::<f64>()
        .map_err(|_| TransformRowError::InvalidNumber {
            column: "scaling",
            value: fields[1].to_string(),
        })?;
    let offset_x = parse_offset(fields[2]).ok_or_else(|| TransformRowError::InvalidNumber {
        column: "offset_x",
        value: fields[2].to_string(),
    })?;
    let offset_y = parse_offset(fields[3]).ok_or_else(|| TransformRowError::InvalidNumber {
        column: "offset_y",
        value: fields[3].to_string(),
    })?;

    let transform = Transform {
        scaling,
        offset_x,
        offset_y,
        invert_x: parse_flag(fields[4]),
        invert_z: fields.get(5).copied().is_some_and(parse_flag),
    };
    transform.validate()?;

    Ok((region.to_string(), transform))
}

/// Offsets are integral pixels; a fractional value is truncated toward zero.
fn parse_offset(raw: &str) -> Option<i32> {
    if let Ok(value) = raw.parse::<i32>() {
        return Some(value);
    }
    let value = raw.parse::<f64>().ok()?;
    if !value.is_finite() || value < i32::MIN as f64 || value > i32::MAX as f64 {
        return None;
    }
    Some(value.trunc() as i32)
}

fn parse_flag(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// Region key for an exported scene path such as
/// `Assets/worlds/isolaSacra/coast/coastA/loot/loot.unity` (yields `coastA`).
/// Paths outside the overworld layout map to the default region.
pub fn region_from_asset_path(path: &str) -> &str {
    let Some(start) = path.find(ASSET_WORLD_PREFIX) else {
        return DEFAULT_REGION;
    };
    let mut segments = path[start + ASSET_WORLD_PREFIX.len()..].split('/');
    match (segments.next(), segments.next()) {
        (Some(area), Some(region)) if !area.is_empty() && !region.is_empty() => region,
        _ => DEFAULT_REGION,
    }
}
