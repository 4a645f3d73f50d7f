//! Developer tooling: read-only session inspection for the CLI and the desktop panel.
//!
//! # Invariants
//! - Tools never mutate session state.

mod inspector;

pub use inspector::{PlantInfo, SessionInspector, SessionSummary};
