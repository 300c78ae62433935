//! Pointer gesture recognition for placed charms.
//!
//! A gesture is one continuous pointer interaction from press to release.  The
//! recognizer decides at press time what the gesture *is* and keeps that
//! decision until release, even if modifier keys change in between:
//!
//! ```text
//!             ┌─ modifier held ─► Rotate ──────────────── up ──► Commit::Rotate
//! pointer ────┤
//! down        └─ otherwise ────► Move ─┬─ up over trash ──────► Commit::Remove
//!                                      └─ up elsewhere ───────► Commit::Move
//!
//! cancel / focus loss (any state) ─────────────────────────────► nothing
//! ```
//!
//! The recognizer never mutates the [`PlacementModel`] itself.  It only reads
//! the model to find where a placement currently is and returns a
//! [`GestureCommit`] that the caller applies.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::geometry::{NormalizedPosition, Point, Rect};
use super::placement::{PlacementId, PlacementModel};

/// Degrees added to the raw `atan2` angle so that a pointer directly above the
/// charm centre maps to 0° (upright).
pub const ROTATION_OFFSET_DEGREES: f64 = 90.0;

/// Identifies one pointer (mouse, pen, or a single touch contact).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointerId(pub i32);

impl fmt::Display for PointerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Keyboard modifier state sampled with a pointer event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
}

/// Which modifier turns a press into a rotate gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotateModifier {
    #[default]
    Shift,
    Alt,
    Ctrl,
    Meta,
}

impl RotateModifier {
    fn is_held(self, modifiers: Modifiers) -> bool {
        match self {
            RotateModifier::Shift => modifiers.shift,
            RotateModifier::Alt => modifiers.alt,
            RotateModifier::Ctrl => modifiers.ctrl,
            RotateModifier::Meta => modifiers.meta,
        }
    }
}

/// The kind of a gesture, fixed at press time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureKind {
    Move,
    Rotate,
}

/// Errors that can occur when starting a gesture.
#[derive(Debug, Error, PartialEq)]
pub enum GestureError {
    /// The pressed placement does not exist in the model.
    #[error("placement not found: {0}")]
    UnknownPlacement(PlacementId),

    /// Another pointer is already dragging this placement.
    #[error("placement {0} is already the target of a gesture")]
    PlacementBusy(PlacementId),

    /// This pointer already has a gesture in progress.
    #[error("pointer {0} already has an active gesture")]
    PointerBusy(PointerId),
}

/// Live feedback while a gesture is in progress.  Not committed to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum GesturePreview {
    Move {
        placement: PlacementId,
        position: NormalizedPosition,
    },
    Rotate {
        placement: PlacementId,
        degrees: f64,
    },
}

/// The resolved result of a finished gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureCommit {
    /// Move the placement to its final position, already clamped to the bounds.
    Move {
        placement: PlacementId,
        position: NormalizedPosition,
    },
    /// Set the placement's absolute rotation.
    Rotate {
        placement: PlacementId,
        degrees: f64,
    },
    /// The placement was released over the removal target.
    Remove { placement: PlacementId },
}

impl GestureCommit {
    /// Returns the placement this commit targets.
    pub fn placement(&self) -> &PlacementId {
        match self {
            GestureCommit::Move { placement, .. }
            | GestureCommit::Rotate { placement, .. }
            | GestureCommit::Remove { placement } => placement,
        }
    }

    /// Applies the commit through the model's own operations.
    ///
    /// Returns `false` when the placement no longer exists (for example after
    /// a concurrent clear), in which case the model is unchanged.
    pub fn apply(&self, model: &mut PlacementModel) -> bool {
        match self {
            GestureCommit::Move {
                placement,
                position,
            } => model.move_to(placement, *position),
            GestureCommit::Rotate { placement, degrees } => model.rotate(placement, *degrees),
            GestureCommit::Remove { placement } => model.remove(placement).is_some(),
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    placement: PlacementId,
    kind: GestureKind,
    /// Pointer position minus element centre at press time (Move only).
    grab_offset: Point,
}

/// Tracks in-progress gestures, at most one per pointer and one per placement.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    rotate_modifier: RotateModifier,
    active: HashMap<PointerId, ActiveGesture>,
}

impl GestureRecognizer {
    /// Creates a recognizer that rotates while `rotate_modifier` is held at
    /// press time.
    pub fn new(rotate_modifier: RotateModifier) -> Self {
        Self {
            rotate_modifier,
            active: HashMap::new(),
        }
    }

    /// Begins a gesture for `pointer` on `placement`.
    ///
    /// `pointer_pos` and `surface` are in preview pixel space.
    ///
    /// # Errors
    ///
    /// - [`GestureError::PointerBusy`] if `pointer` already has a gesture.
    /// - [`GestureError::UnknownPlacement`] if `placement` is not in `model`.
    /// - [`GestureError::PlacementBusy`] if another pointer is dragging it.
    pub fn on_gesture_start(
        &mut self,
        pointer: PointerId,
        placement: &PlacementId,
        pointer_pos: Point,
        modifiers: Modifiers,
        model: &PlacementModel,
        surface: &Rect,
    ) -> Result<GestureKind, GestureError> {
        if self.active.contains_key(&pointer) {
            return Err(GestureError::PointerBusy(pointer));
        }
        let target = model
            .get(placement)
            .ok_or_else(|| GestureError::UnknownPlacement(placement.clone()))?;
        if self.is_active(placement) {
            return Err(GestureError::PlacementBusy(placement.clone()));
        }

        let kind = if self.rotate_modifier.is_held(modifiers) {
            GestureKind::Rotate
        } else {
            GestureKind::Move
        };
        let grab_offset = pointer_pos - target.pixel_center(surface);

        debug!(pointer = %pointer, placement = %placement, ?kind, "gesture started");
        self.active.insert(
            pointer,
            ActiveGesture {
                placement: placement.clone(),
                kind,
                grab_offset,
            },
        );
        Ok(kind)
    }

    /// Updates a gesture with a new pointer position and returns the preview.
    ///
    /// Returns `None` if `pointer` has no active gesture, or if a rotate
    /// target has vanished from the model.
    pub fn on_gesture_move(
        &self,
        pointer: PointerId,
        pointer_pos: Point,
        model: &PlacementModel,
        surface: &Rect,
    ) -> Option<GesturePreview> {
        let gesture = self.active.get(&pointer)?;
        match gesture.kind {
            GestureKind::Move => Some(GesturePreview::Move {
                placement: gesture.placement.clone(),
                position: Self::move_position(gesture, pointer_pos, model, surface),
            }),
            GestureKind::Rotate => Some(GesturePreview::Rotate {
                placement: gesture.placement.clone(),
                degrees: Self::rotate_degrees(gesture, pointer_pos, model, surface)?,
            }),
        }
    }

    /// Ends the gesture for `pointer` and resolves its commit.
    ///
    /// A move released inside `removal_target` resolves to
    /// [`GestureCommit::Remove`]; its position is discarded.  Rotations ignore
    /// the removal target.  Returns `None` if `pointer` had no gesture or a
    /// rotate target has vanished.
    pub fn on_gesture_end(
        &mut self,
        pointer: PointerId,
        pointer_pos: Point,
        model: &PlacementModel,
        surface: &Rect,
        removal_target: Option<&Rect>,
    ) -> Option<GestureCommit> {
        let gesture = self.active.remove(&pointer)?;
        let commit = match gesture.kind {
            GestureKind::Move => {
                if removal_target.is_some_and(|trash| trash.contains(pointer_pos)) {
                    GestureCommit::Remove {
                        placement: gesture.placement,
                    }
                } else {
                    GestureCommit::Move {
                        position: Self::move_position(&gesture, pointer_pos, model, surface),
                        placement: gesture.placement,
                    }
                }
            }
            GestureKind::Rotate => GestureCommit::Rotate {
                degrees: Self::rotate_degrees(&gesture, pointer_pos, model, surface)?,
                placement: gesture.placement,
            },
        };
        debug!(pointer = %pointer, ?commit, "gesture ended");
        Some(commit)
    }

    /// Abandons the gesture for `pointer` without committing anything.
    ///
    /// Returns the placement that was being manipulated, if any.
    pub fn on_gesture_cancel(&mut self, pointer: PointerId) -> Option<PlacementId> {
        let gesture = self.active.remove(&pointer)?;
        debug!(pointer = %pointer, placement = %gesture.placement, "gesture cancelled");
        Some(gesture.placement)
    }

    /// Abandons every in-progress gesture and returns how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.active.len();
        self.active.clear();
        cancelled
    }

    /// Returns the kind of the gesture held by `pointer`, if any.
    pub fn active_kind(&self, pointer: PointerId) -> Option<GestureKind> {
        self.active.get(&pointer).map(|g| g.kind)
    }

    /// Returns `true` if any pointer is manipulating `placement`.
    pub fn is_active(&self, placement: &PlacementId) -> bool {
        self.active.values().any(|g| &g.placement == placement)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    /// Clamped to the model's bounds so the preview shows where the commit lands.
    fn move_position(
        gesture: &ActiveGesture,
        pointer_pos: Point,
        model: &PlacementModel,
        surface: &Rect,
    ) -> NormalizedPosition {
        model.bounds().clamp(surface.normalize(pointer_pos - gesture.grab_offset))
    }

    /// Angle from the placement's *current* centre to the pointer.
    ///
    /// The centre is read from the model on every call because the charm may
    /// have moved since the gesture began.
    fn rotate_degrees(
        gesture: &ActiveGesture,
        pointer_pos: Point,
        model: &PlacementModel,
        surface: &Rect,
    ) -> Option<f64> {
        let center = model.get(&gesture.placement)?.pixel_center(surface);
        Some(rotation_angle(center, pointer_pos))
    }
}

/// Returns the rotation, in degrees, that points a charm centred at `center`
/// towards `pointer`.
pub fn rotation_angle(center: Point, pointer: Point) -> f64 {
    let delta = pointer - center;
    delta.y.atan2(delta.x).to_degrees() + ROTATION_OFFSET_DEGREES
}

// ── Tests ─────────────────────────────────────────────────────────────────────
