//! Shared types for the meadow sandbox.

mod types;

pub use types::Vector3;
