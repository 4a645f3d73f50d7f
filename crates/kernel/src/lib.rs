//! Session kernel: authoritative session state and procedural world generation.
//!
//! # Invariants
//! - `SessionState` is the only source of truth for the avatar position.
//! - The plant sequence is fixed once generated or loaded; it is never re-ordered.
//! - Generation is pure with respect to its random source.

pub mod random;
pub mod session;
pub mod worldgen;

pub use random::{RandomSource, RngSource, ScriptedSource, SeededSource};
pub use session::{PLAYER_SPAWN, PlacedObject, PlantKind, SessionState};
pub use worldgen::{Bounds, ConfigError, Generate, GeneratorConfig, WorldGenerator, generate};
