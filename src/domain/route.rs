//! Route analysis between two block positions.

use serde::{Deserialize, Serialize};

use super::coordinates::Coordinates;

/// Average Y below which a route counts as deep underground.
pub const DEEP_Y_LEVEL: f64 = 16.0;
/// Travel speed in blocks per minute near the surface.
pub const SURFACE_SPEED: u64 = 120;
/// Travel speed in blocks per minute through caves.
pub const UNDERGROUND_SPEED: u64 = 60;
/// Distance beyond which exposure alone makes a route risky.
pub const LONG_DISTANCE: u64 = 1500;
/// Height difference that earns an elevation note.
pub const ELEVATION_NOTE_THRESHOLD: u64 = 50;
/// Routes shorter than this are billed at the minimum.
pub const SHORT_DISTANCE: u64 = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
    Extreme,
}

impl Difficulty {
    pub fn from_distance(distance: u64) -> Self {
        match distance {
            0..=500 => Self::Easy,
            501..=1000 => Self::Moderate,
            1001..=2000 => Self::Hard,
            _ => Self::Extreme,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Moderate => "Moderate",
            Self::Hard => "Hard",
            Self::Extreme => "Extreme",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DangerLevel {
    Safe,
    Risky,
    Dangerous,
    Suicidal,
}

impl DangerLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Safe => "Safe",
            Self::Risky => "Risky",
            Self::Dangerous => "Dangerous",
            Self::Suicidal => "Suicidal",
        }
    }

    /// Price multiplier in whole percent (`130` means 1.3x).
    pub fn multiplier_percent(&self) -> i64 {
        match self {
            Self::Safe => 100,
            Self::Risky => 130,
            Self::Dangerous => 180,
            Self::Suicidal => 250,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier_percent() as f64 / 100.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteAnalysis {
    /// Planar (x/z) distance in blocks, rounded.
    pub distance: u64,
    pub difficulty: Difficulty,
    pub danger_level: DangerLevel,
    /// Travel time in whole minutes, rounded up.
    pub estimated_time: u64,
    /// Notable conditions, in the order they were detected.
    pub special_notes: Vec<String>,
}

/// Rounded horizontal distance; height does not change travel time.
///
/// Deltas are taken in `f64` so any pair of `i64` positions works; the
/// result saturates at `u64::MAX`.
pub fn planar_distance(from: &Coordinates, to: &Coordinates) -> u64 {
    let dx = to.x as f64 - from.x as f64;
    let dz = to.z as f64 - from.z as f64;
    dx.hypot(dz).round() as u64
}

pub fn analyze_route(pickup: &Coordinates, delivery: &Coordinates) -> RouteAnalysis {
    let distance = planar_distance(pickup, delivery);
    let difficulty = Difficulty::from_distance(distance);
    let average_y = (i128::from(pickup.y) + i128::from(delivery.y)) as f64 / 2.0;
    let mut special_notes = Vec::new();

    let danger_level = if average_y < 0.0 {
        special_notes.push("Nether-depth route: below Y 0, expect lava and hostile mobs".to_string());
        DangerLevel::Dangerous
    } else if average_y < DEEP_Y_LEVEL {
        special_notes.push("Deep underground delivery: cave hazards expected".to_string());
        DangerLevel::Risky
    } else if distance > LONG_DISTANCE {
        special_notes.push("Long distance exposure: more time in the open".to_string());
        DangerLevel::Risky
    } else {
        DangerLevel::Safe
    };

    let speed = if average_y < DEEP_Y_LEVEL {
        UNDERGROUND_SPEED
    } else {
        SURFACE_SPEED
    };
    let estimated_time = distance.div_ceil(speed);

    let elevation_change = pickup.y.abs_diff(delivery.y);
    if elevation_change > ELEVATION_NOTE_THRESHOLD {
        special_notes.push(format!(
            "Significant elevation change: {elevation_change} blocks"
        ));
    }
    if distance < SHORT_DISTANCE {
        special_notes.push("Short distance: minimum pricing applies".to_string());
    }

    RouteAnalysis {
        distance,
        difficulty,
        danger_level,
        estimated_time,
        special_notes,
    }
}
