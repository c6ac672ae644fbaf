//! Continuous world coordinates and discrete grid cells.
//!
//! World space uses screen conventions: `x` grows to the right and `y`
//! grows downward. Angles are measured in degrees clockwise from the
//! positive `x` axis, so 0 faces east, 90 faces south, 180 faces west and
//! 270 faces north.

use core::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Distances below this are treated as "same point".
pub const POSITION_EPSILON: f32 = 1e-4;

/// A point or displacement in continuous world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Vec2 {
    /// Horizontal coordinate (grows to the right).
    pub x: f32,
    /// Vertical coordinate (grows downward).
    pub y: f32,
}

impl Vec2 {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or `None` for a zero-length vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len < POSITION_EPSILON {
            None
        } else {
            Some(Self::new(self.x / len, self.y / len))
        }
    }

    /// Bearing from `self` towards `target` in degrees, within `[0, 360)`.
    ///
    /// Coincident points have a bearing of 0.
    pub fn bearing_to(self, target: Self) -> f32 {
        let delta = target - self;
        normalize_degrees(delta.y.atan2(delta.x).to_degrees())
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest-arc difference between two headings, within `[0, 180]`.
pub fn angular_difference(a: f32, b: f32) -> f32 {
    let diff = normalize_degrees(a - b);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// A cell in the navigation grid, addressed by column and row.
///
/// Coordinates are signed so that off-grid queries (negative or past the
/// edge) are representable; the grid treats them as blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// Column index (x axis).
    pub col: i32,
    /// Row index (y axis).
    pub row: i32,
}

impl Cell {
    /// Create a new cell coordinate.
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Manhattan distance to `other`.
    pub const fn manhattan(self, other: Self) -> u32 {
        self.col
            .abs_diff(other.col)
            .saturating_add(self.row.abs_diff(other.row))
    }

    /// The four orthogonal neighbours in expansion order: left, right, up, down.
    ///
    /// Saturating arithmetic keeps the function total at the `i32` limits;
    /// such cells are always off-grid anyway.
    pub const fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.col.saturating_sub(1), self.row),
            Self::new(self.col.saturating_add(1), self.row),
            Self::new(self.col, self.row.saturating_sub(1)),
            Self::new(self.col, self.row.saturating_add(1)),
        ]
    }

    /// Whether `other` is exactly one orthogonal step away.
    pub const fn is_adjacent(self, other: Self) -> bool {
        self.manhattan(other) == 1
    }
}

impl core::fmt::Display for Cell {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}
