//! Infrastructure layer for the customizer.
//!
//! Contains the outward-facing adapters: catalog providers and their
//! loading feeds, file-system configuration storage, and the command bridge
//! used by the presentation layer and the headless runner.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `charmcase_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod catalog;
pub mod storage;
pub mod ui_bridge;
