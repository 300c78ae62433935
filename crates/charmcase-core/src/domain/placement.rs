//! Charm placement model.
//!
//! The placement model is the single source of truth for which charms sit on
//! the case, where, and at what angle.  Views render from it; gestures commit
//! into it.
//!
//! # Coordinate convention
//!
//! Positions are stored as [`NormalizedPosition`] (percent of the case
//! bounding box) and clamped to [`PlacementBounds`] on every write, so charms
//! stay anchored inside the case artwork instead of hanging off its edge.
//!
//! # Ordering
//!
//! Placements are kept in insertion order, which is also the z-order: a charm
//! placed later renders above earlier ones.  Moving or rotating a placement
//! never changes its slot.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

use super::catalog::{Charm, Price};
use super::geometry::{NormalizedPosition, Point, Rect};

/// Default lower bound for both normalized axes.
pub const DEFAULT_MIN_PERCENT: f64 = 10.0;

/// Default upper bound for both normalized axes.
pub const DEFAULT_MAX_PERCENT: f64 = 90.0;

/// Errors that can occur when configuring the placement model.
#[derive(Debug, Error, PartialEq)]
pub enum PlacementError {
    /// A bound lies outside `0..=100` or is not a number.
    #[error("placement bound {0} is outside 0..=100")]
    BoundOutOfRange(f64),

    /// The lower bound exceeds the upper bound.
    #[error("placement bounds inverted: min {min} > max {max}")]
    InvertedBounds { min: f64, max: f64 },
}

/// The normalized sub-range every placement is clamped into.
///
/// Deserialization goes through [`PlacementBounds::new`], so invalid bounds
/// are rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacementBounds {
    min_percent: f64,
    max_percent: f64,
}

impl PlacementBounds {
    /// Creates bounds covering `min_percent..=max_percent` on both axes.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::BoundOutOfRange`] if either bound is outside
    /// `0..=100`, or [`PlacementError::InvertedBounds`] if `min > max`.
    pub fn new(min_percent: f64, max_percent: f64) -> Result<Self, PlacementError> {
        for bound in [min_percent, max_percent] {
            if !(0.0..=100.0).contains(&bound) {
                return Err(PlacementError::BoundOutOfRange(bound));
            }
        }
        if min_percent > max_percent {
            return Err(PlacementError::InvertedBounds {
                min: min_percent,
                max: max_percent,
            });
        }
        Ok(Self {
            min_percent,
            max_percent,
        })
    }

    pub fn min_percent(&self) -> f64 {
        self.min_percent
    }

    pub fn max_percent(&self) -> f64 {
        self.max_percent
    }

    /// Clamps `position` into these bounds.
    pub fn clamp(&self, position: NormalizedPosition) -> NormalizedPosition {
        position.clamped(self.min_percent, self.max_percent)
    }
}

impl<'de> Deserialize<'de> for PlacementBounds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            min_percent: f64,
            max_percent: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        PlacementBounds::new(raw.min_percent, raw.max_percent).map_err(serde::de::Error::custom)
    }
}

impl Default for PlacementBounds {
    fn default() -> Self {
        Self {
            min_percent: DEFAULT_MIN_PERCENT,
            max_percent: DEFAULT_MAX_PERCENT,
        }
    }
}

/// Identifier of one placement, distinct from the catalog charm id.
///
/// Formatted as `"{charm_id}-{seq}"` where `seq` comes from the owning
/// model's counter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlacementId(pub String);

impl PlacementId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlacementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlacementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// One charm placed on the case.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCharm {
    /// Unique within the owning model for its whole lifetime.
    pub id: PlacementId,
    /// The catalog entry this placement was created from.
    pub charm: Arc<Charm>,
    /// Clamped normalized position of the charm's centre.
    pub position: NormalizedPosition,
    /// Rotation in degrees, stored exactly as last committed.
    pub rotation: f64,
}

impl PlacedCharm {
    /// Returns the rotation folded into `0.0..360.0` for rendering.
    ///
    /// `370°` and `10°` render identically even though the stored values
    /// differ.
    pub fn rendered_rotation(&self) -> f64 {
        let folded = self.rotation.rem_euclid(360.0);
        // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
        if folded >= 360.0 {
            0.0
        } else {
            folded
        }
    }

    /// Returns the charm centre in preview pixel space for the given case rect.
    pub fn pixel_center(&self, surface: &Rect) -> Point {
        surface.to_pixels(self.position)
    }
}

/// The ordered set of charms placed on one case.
#[derive(Debug, Default)]
pub struct PlacementModel {
    placements: Vec<PlacedCharm>,
    bounds: PlacementBounds,
    /// Next sequence number for id generation.  Never reset, not even by
    /// [`PlacementModel::clear`], so ids are never reused within a session.
    next_seq: u64,
    /// Bumped once per effective mutation.
    revision: u64,
}

impl PlacementModel {
    /// Creates an empty model with the default 10–90% bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty model with custom bounds.
    pub fn with_bounds(bounds: PlacementBounds) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Returns the clamping bounds.
    pub fn bounds(&self) -> PlacementBounds {
        self.bounds
    }

    /// Places `charm` where it was dropped.
    ///
    /// `drop_point` is in preview pixel space; `surface` is the case bounding
    /// box in the same space.  The point is normalized against `surface` and
    /// clamped.  The new placement starts at rotation 0 and renders above all
    /// existing ones.
    ///
    /// This operation is total: every charm and coordinate yields a placement.
    pub fn place(&mut self, charm: Arc<Charm>, drop_point: Point, surface: &Rect) -> &PlacedCharm {
        let position = self.bounds.clamp(surface.normalize(drop_point));
        let id = self.next_id(&charm);
        debug!(
            placement = %id,
            charm = %charm.id,
            x = position.x,
            y = position.y,
            "charm placed"
        );
        self.placements.push(PlacedCharm {
            id,
            charm,
            position,
            rotation: 0.0,
        });
        self.revision += 1;
        // The vector is non-empty because an element was just pushed.
        &self.placements[self.placements.len() - 1]
    }

    /// Moves a placement to `position` (clamped).
    ///
    /// Returns `false` without touching anything when `id` is unknown; drag
    /// commits can legitimately race with a removal.
    pub fn move_to(&mut self, id: &PlacementId, position: NormalizedPosition) -> bool {
        let clamped = self.bounds.clamp(position);
        match self.get_mut(id) {
            Some(placement) => {
                placement.position = clamped;
                self.revision += 1;
                true
            }
            None => {
                debug!(placement = %id, "move ignored: placement not found");
                false
            }
        }
    }

    /// Sets the absolute rotation of a placement in degrees.
    ///
    /// The value is stored as given (no wrapping); see
    /// [`PlacedCharm::rendered_rotation`].  Returns `false` for an unknown id.
    pub fn rotate(&mut self, id: &PlacementId, degrees: f64) -> bool {
        match self.get_mut(id) {
            Some(placement) => {
                placement.rotation = degrees;
                self.revision += 1;
                true
            }
            None => {
                debug!(placement = %id, "rotate ignored: placement not found");
                false
            }
        }
    }

    /// Removes a placement, returning it.  Idempotent: a second call with the
    /// same id returns `None` and changes nothing.
    pub fn remove(&mut self, id: &PlacementId) -> Option<PlacedCharm> {
        let index = self.placements.iter().position(|p| &p.id == id)?;
        let removed = self.placements.remove(index);
        self.revision += 1;
        debug!(placement = %id, "charm removed");
        Some(removed)
    }

    /// Removes every placement in one step and returns how many were removed.
    ///
    /// The revision advances once, so observers see the full set or the empty
    /// set and nothing in between.
    pub fn clear(&mut self) -> usize {
        let removed = std::mem::take(&mut self.placements).len();
        if removed > 0 {
            self.revision += 1;
            debug!(removed, "placements cleared");
        }
        removed
    }

    /// Returns the sum of the unit prices of all placed charms.
    pub fn charms_price(&self) -> Price {
        self.placements.iter().map(|p| p.charm.price).sum()
    }

    /// Returns `base + Σ charm price`, recomputed on every call.
    pub fn total_price(&self, base: Price) -> Price {
        base + self.charms_price()
    }

    /// Looks up a placement by id.
    pub fn get(&self, id: &PlacementId) -> Option<&PlacedCharm> {
        self.placements.iter().find(|p| &p.id == id)
    }

    /// Returns `true` if a placement with `id` exists.
    pub fn contains(&self, id: &PlacementId) -> bool {
        self.get(id).is_some()
    }

    /// Iterates placements bottom-to-top (insertion order).
    pub fn iter(&self) -> impl Iterator<Item = &PlacedCharm> {
        self.placements.iter()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Returns the mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn get_mut(&mut self, id: &PlacementId) -> Option<&mut PlacedCharm> {
        self.placements.iter_mut().find(|p| &p.id == id)
    }

    fn next_id(&mut self, charm: &Charm) -> PlacementId {
        let seq = self.next_seq;
        self.next_seq += 1;
        PlacementId(format!("{}-{}", charm.id, seq))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
