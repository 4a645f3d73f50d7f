use meadow_common::Vector3;
use serde::{Deserialize, Serialize};

/// Where a fresh session places the avatar.
pub const PLAYER_SPAWN: Vector3 = Vector3::new(0.0, 1.0, 0.0);

/// Kind of decorative object scattered over the ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantKind {
    Tree,
    Bush,
    Flower,
}

impl PlantKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PlantKind::Tree => "tree",
            PlantKind::Bush => "bush",
            PlantKind::Flower => "flower",
        }
    }
}

impl std::fmt::Display for PlantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decorative object at a fixed ground position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedObject {
    #[serde(rename = "type")]
    pub kind: PlantKind,
    pub position: Vector3,
}

impl PlacedObject {
    /// Place an object on the ground plane at `(x, 0, z)`.
    pub fn on_ground(kind: PlantKind, x: f64, z: f64) -> Self {
        Self {
            kind,
            position: Vector3::new(x, 0.0, z),
        }
    }
}

/// The authoritative record of one running session.
///
/// Plants are exposed read-only; the only mutation is moving the player.
/// Renderers derive avatar and plant transforms from this value and never
/// write back into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    player_position: Vector3,
    plants: Vec<PlacedObject>,
}

impl SessionState {
    pub fn new(player_position: Vector3, plants: Vec<PlacedObject>) -> Self {
        Self {
            player_position,
            plants,
        }
    }

    /// A new session with the avatar at [`PLAYER_SPAWN`].
    pub fn fresh(plants: Vec<PlacedObject>) -> Self {
        Self::new(PLAYER_SPAWN, plants)
    }

    pub fn player_position(&self) -> Vector3 {
        self.player_position
    }

    pub fn plants(&self) -> &[PlacedObject] {
        &self.plants
    }

    /// Translate the avatar by `delta`.
    pub fn move_player(&mut self, delta: Vector3) {
        self.player_position += delta;
    }

    /// Number of plants of the given kind.
    pub fn count_of(&self, kind: PlantKind) -> usize {
        self.plants.iter().filter(|p| p.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> SessionState {
        SessionState::fresh(vec![
            PlacedObject::on_ground(PlantKind::Tree, 10.0, -4.5),
            PlacedObject::on_ground(PlantKind::Flower, -80.25, 33.0),
        ])
    }

    #[test]
    fn fresh_session_spawns_player_above_origin() {
        let state = SessionState::fresh(Vec::new());
        assert_eq!(state.player_position(), Vector3::new(0.0, 1.0, 0.0));
        assert!(state.plants().is_empty());
    }

    #[test]
    fn movement_accumulates_over_ticks() {
        let mut state = SessionState::fresh(Vec::new());
        for _ in 0..4 {
            state.move_player(Vector3::new(-0.05, 0.0, -0.05));
        }
        assert!(
            state
                .player_position()
                .abs_diff_eq(Vector3::new(-0.2, 1.0, -0.2), 1e-12)
        );
    }

    #[test]
    fn moving_player_leaves_plants_untouched() {
        let mut state = sample_state();
        let before = state.plants().to_vec();
        state.move_player(Vector3::new(5.0, 0.0, 5.0));
        assert_eq!(state.plants(), before.as_slice());
    }

    #[test]
    fn serialized_field_names_match_snapshot_format() {
        let json = serde_json::to_value(sample_state()).unwrap();
        assert_eq!(json["playerPosition"]["y"], 1.0);
        assert_eq!(json["plants"][0]["type"], "tree");
        assert_eq!(json["plants"][1]["type"], "flower");
        assert_eq!(json["plants"][1]["position"]["x"], -80.25);
    }

    #[test]
    fn unknown_plant_type_is_rejected() {
        let raw = r#"{"playerPosition":{"x":0,"y":1,"z":0},
            "plants":[{"type":"cactus","position":{"x":1,"y":0,"z":2}}]}"#;
        assert!(serde_json::from_str::<SessionState>(raw).is_err());
    }

    #[test]
    fn count_by_kind() {
        let state = sample_state();
        assert_eq!(state.count_of(PlantKind::Tree), 1);
        assert_eq!(state.count_of(PlantKind::Bush), 0);
        assert_eq!(state.count_of(PlantKind::Flower), 1);
    }
}
