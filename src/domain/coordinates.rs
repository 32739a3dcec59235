//! Free-text coordinate parsing and user-facing validation.
//!
//! Accepted layouts:
//! - comma separated: `100, 64, -200`
//! - labeled (any case): `X: 100 Y: 64 Z: -200`
//! - whitespace separated: `100 64 -200`

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown whenever a coordinate string cannot be read.
pub const FORMAT_HINT: &str = "Use X, Y, Z (e.g. 100, 64, -200)";

/// Horizontal world border, applied to both x and z.
pub const WORLD_BORDER: i64 = 30_000_000;
pub const MIN_BUILD_HEIGHT: i64 = -64;
pub const MAX_BUILD_HEIGHT: i64 = 320;

/// A block position in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Coordinates {
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}, {}", self.x, self.y, self.z)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("coordinates required")]
    Required,
    #[error("invalid format. {}", FORMAT_HINT)]
    Format,
    #[error("coordinates outside the world border (|x| and |z| must be at most {})", WORLD_BORDER)]
    WorldBorder { x: i64, z: i64 },
    #[error("Y must be between {} and {}, got {y}", MIN_BUILD_HEIGHT, MAX_BUILD_HEIGHT)]
    HeightRange { y: i64 },
}

fn layouts() -> &'static [Regex; 3] {
    static LAYOUTS: OnceLock<[Regex; 3]> = OnceLock::new();
    LAYOUTS.get_or_init(|| {
        [
            Regex::new(r"^(-?[0-9]+)\s*,\s*(-?[0-9]+)\s*,\s*(-?[0-9]+)$"),
            Regex::new(r"(?i)^x\s*:\s*(-?[0-9]+)\s*,?\s*y\s*:\s*(-?[0-9]+)\s*,?\s*z\s*:\s*(-?[0-9]+)$"),
            Regex::new(r"^(-?[0-9]+)\s+(-?[0-9]+)\s+(-?[0-9]+)$"),
        ]
        // patterns are literals
        .map(|pattern| pattern.expect("coordinate pattern compiles"))
    })
}

/// The three integer tokens of the first layout that matches.
fn layout_tokens(text: &str) -> Option<[&str; 3]> {
    let captures = layouts().iter().find_map(|layout| layout.captures(text))?;
    let token = |index: usize| captures.get(index).map_or("", |m| m.as_str());
    Some([token(1), token(2), token(3)])
}

/// Parse a coordinate string in any accepted layout.
///
/// Returns `None` for anything that is not exactly three integers in one of
/// the layouts, including tokens that overflow an `i64`.
pub fn parse_coordinates(text: &str) -> Option<Coordinates> {
    let [x, y, z] = layout_tokens(text.trim())?;
    Some(Coordinates::new(x.parse().ok()?, y.parse().ok()?, z.parse().ok()?))
}

/// A matched token is all digits, so the only parse failure is overflow.
fn parse_saturating(token: &str) -> i64 {
    token.parse().unwrap_or(if token.starts_with('-') {
        i64::MIN
    } else {
        i64::MAX
    })
}

/// Stricter gate for input feedback: the string must parse and lie inside
/// the playable world. Integers too large for an `i64` are reported as out
/// of range, not as a format error.
pub fn validate_coordinates(text: &str) -> Result<Coordinates, CoordinateError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(CoordinateError::Required);
    }

    let [x, y, z] = layout_tokens(text).ok_or(CoordinateError::Format)?;
    let coords = Coordinates::new(parse_saturating(x), parse_saturating(y), parse_saturating(z));

    if coords.x.unsigned_abs() > WORLD_BORDER.unsigned_abs()
        || coords.z.unsigned_abs() > WORLD_BORDER.unsigned_abs()
    {
        return Err(CoordinateError::WorldBorder {
            x: coords.x,
            z: coords.z,
        });
    }
    if !(MIN_BUILD_HEIGHT..=MAX_BUILD_HEIGHT).contains(&coords.y) {
        return Err(CoordinateError::HeightRange { y: coords.y });
    }

    Ok(coords)
}
