//! Domain entities for the charmcase customizer.
//!
//! This module contains pure business logic with no infrastructure dependencies.
//!
//! # What is "domain" in Clean Architecture? (for beginners)
//!
//! Clean Architecture organises code into concentric layers.  The innermost
//! layer is called the **domain**.  Domain code:
//!
//! - Contains the core business rules of the application.
//! - Has **no** imports from async runtimes, file systems, or UI frameworks.
//! - Can be compiled and tested on any platform without any external setup.
//!
//! Here the business rules are: where a charm may sit on the case, how ids
//! stay unique, how the price is derived, and how a pointer drag resolves
//! into a move, a rotation, or a removal.

/// Catalog entities and prices.
pub mod catalog;

/// Preview-space geometry and normalized coordinates.
pub mod geometry;

/// Pointer gesture recognition (move / rotate / remove / cancel).
pub mod gesture;

/// The placement model: the core domain concept.
///
/// See [`placement::PlacementModel`] for the main type.
pub mod placement;
