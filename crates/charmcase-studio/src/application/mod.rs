//! Application layer use cases for the customizer.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure business rules in `charmcase-core`) and the infrastructure
//! (catalog sources, config files, the command bridge).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "drop the
//!   Star Charm on the case, then drag it onto the trash").
//! - **Contain no file system access and no I/O**.  Catalog data arrives
//!   already fetched, as shared `Arc` entries.
//!
//! # Sub-modules
//!
//! - **`customize_case`** – One editing session: the selected phone and
//!   color, the placement model, live pointer gestures, and the order total.
//!
//! - **`price_format`** – Renders prices for display according to the
//!   configured currency symbol and decimal separator.

pub mod customize_case;
pub mod price_format;
