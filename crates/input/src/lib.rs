//! Input: held directional keys and the actions the frame loop consumes.
//!
//! # Invariants
//! - The session store never sees raw key events, only movement deltas.
//! - Movement is per frame, not scaled by elapsed time.

pub mod action;
pub mod keys;

pub use action::Action;
pub use keys::{Direction, HeldKeys, KeyQuery, PLAYER_SPEED, movement_delta};
