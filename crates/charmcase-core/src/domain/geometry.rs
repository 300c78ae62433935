//! Preview-space geometry.
//!
//! Pointer events arrive in *preview pixel space*: the coordinate system of the
//! surface the case is rendered on, with the origin at its top-left corner and
//! Y growing downwards.  Placements are stored in *normalized space*: a
//! percentage of the case's bounding box, so a charm keeps its relative spot
//! when the preview is resized.
//!
//! [`Rect::normalize`] and [`Rect::to_pixels`] convert between the two.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point (or offset) in preview pixel space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A position expressed as a percentage of the case bounding box.
///
/// `(0, 0)` is the top-left corner of the case, `(100, 100)` the bottom-right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPosition {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The centre of the case.
    pub const CENTER: NormalizedPosition = NormalizedPosition { x: 50.0, y: 50.0 };

    /// Returns this position with both axes clamped to `min..=max`.
    ///
    /// NaN components collapse to `min`.
    pub fn clamped(self, min: f64, max: f64) -> Self {
        Self {
            x: clamp_axis(self.x, min, max),
            y: clamp_axis(self.y, min, max),
        }
    }
}

fn clamp_axis(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    }
}

/// An axis-aligned rectangle in preview pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the top-left corner.
    pub left: f64,
    /// Y coordinate of the top-left corner.
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Returns the rightmost X coordinate (exclusive).
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Returns the bottommost Y coordinate (exclusive).
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Returns the centre point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Returns `true` if `point` lies inside the rectangle.
    ///
    /// The left and top edges are inclusive, the right and bottom edges
    /// exclusive, so two rectangles sharing an edge never both claim a point.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left
            && point.x < self.right()
            && point.y >= self.top
            && point.y < self.bottom()
    }

    /// Converts a pixel-space point into a percentage of this rectangle.
    ///
    /// The result is *not* clamped; points outside the rectangle map outside
    /// `0..=100`.  A degenerate axis (zero or negative extent) maps to 50%.
    pub fn normalize(&self, point: Point) -> NormalizedPosition {
        NormalizedPosition {
            x: to_percent(point.x - self.left, self.width),
            y: to_percent(point.y - self.top, self.height),
        }
    }

    /// Converts a normalized position back into a pixel-space point.
    pub fn to_pixels(&self, position: NormalizedPosition) -> Point {
        Point::new(
            self.left + position.x / 100.0 * self.width,
            self.top + position.y / 100.0 * self.height,
        )
    }
}

fn to_percent(offset: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        offset / extent * 100.0
    } else {
        50.0
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
