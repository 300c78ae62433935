//! # charmcase-core
//!
//! Shared library for the charmcase customizer containing the catalog
//! entities, the charm placement model, and the pointer gesture recognizer.
//!
//! This crate has zero dependencies on async runtimes, file systems, or UI
//! frameworks.  Everything here is plain data and synchronous operations so
//! it can be driven from any presentation layer and tested in isolation.
//!
//! # Architecture overview (for beginners)
//!
//! A user customizes a phone case by picking a phone model and color, then
//! dragging decorative charms onto the case preview.  Each dropped charm can
//! be moved, rotated, or dragged onto a trash zone to delete it, and the
//! order total updates as charms come and go.
//!
//! The crate is organised as a single `domain` module with four parts:
//!
//! - **`catalog`** – Immutable catalog entries (charms, phone models, colors)
//!   and the fixed-point [`Price`] type used for all money arithmetic.
//!
//! - **`geometry`** – Points and rectangles in preview pixel space, plus the
//!   conversion to and from normalized (percentage) coordinates.
//!
//! - **`placement`** – The [`PlacementModel`]: the ordered set of charms placed
//!   on the case and the operations that mutate it.
//!
//! - **`gesture`** – The [`GestureRecognizer`]: turns pointer down/move/up
//!   sequences into move, rotate, or remove commits against the model.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `charmcase_core::PlacementModel` instead of the full module path.
pub use domain::catalog::{Charm, CharmId, PhoneColor, PhoneModel, Price, PriceError};
pub use domain::geometry::{NormalizedPosition, Point, Rect};
pub use domain::gesture::{
    GestureCommit, GestureError, GestureKind, GesturePreview, GestureRecognizer, Modifiers,
    PointerId, RotateModifier,
};
pub use domain::placement::{
    PlacedCharm, PlacementBounds, PlacementError, PlacementId, PlacementModel,
};
