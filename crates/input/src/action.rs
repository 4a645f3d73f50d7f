use meadow_common::Vector3;

/// A high-level request produced by the window layer.
///
/// The app loop consumes actions, never raw input events.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Move the avatar by a delta.
    Move(Vector3),
    /// Scroll the camera distance by a wheel delta (positive zooms out).
    Zoom(f32),
    /// Show or hide the ground grid.
    ToggleGrid,
    /// Enter or leave fullscreen.
    ToggleFullscreen,
}

impl Action {
    /// Movement for this frame, if any direction is held.
    pub fn from_held(keys: &impl crate::KeyQuery) -> Option<Self> {
        let delta = crate::movement_delta(keys, crate::PLAYER_SPEED);
        (delta != Vector3::ZERO).then_some(Action::Move(delta))
    }
}
