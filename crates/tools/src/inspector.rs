use meadow_common::Vector3;
use meadow_kernel::{PlantKind, SessionState};

/// Read-only queries against a session for debugging and development UI.
pub struct SessionInspector;

impl SessionInspector {
    /// Produce a summary of the session.
    pub fn summary(state: &SessionState) -> SessionSummary {
        SessionSummary {
            player_position: state.player_position(),
            plant_count: state.plants().len(),
            trees: state.count_of(PlantKind::Tree),
            bushes: state.count_of(PlantKind::Bush),
            flowers: state.count_of(PlantKind::Flower),
        }
    }

    /// Details of the plant at `index` in generation order.
    pub fn inspect_plant(state: &SessionState, index: usize) -> Option<PlantInfo> {
        state.plants().get(index).map(|plant| PlantInfo {
            index,
            kind: plant.kind,
            position: plant.position,
            ground_distance: ground_distance(state.player_position(), plant.position),
        })
    }

    /// The plant closest to the player on the ground plane.
    pub fn nearest_plant(state: &SessionState) -> Option<PlantInfo> {
        (0..state.plants().len())
            .filter_map(|i| Self::inspect_plant(state, i))
            .min_by(|a, b| a.ground_distance.total_cmp(&b.ground_distance))
    }

    /// All plants, in generation order.
    pub fn list_plants(state: &SessionState) -> Vec<PlantInfo> {
        (0..state.plants().len())
            .filter_map(|i| Self::inspect_plant(state, i))
            .collect()
    }
}

fn ground_distance(a: Vector3, b: Vector3) -> f64 {
    let d = a.on_ground() - b.on_ground();
    (d.x * d.x + d.z * d.z).sqrt()
}

/// Summary of session state for the inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub player_position: Vector3,
    pub plant_count: usize,
    pub trees: usize,
    pub bushes: usize,
    pub flowers: usize,
}

impl std::fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let p = self.player_position;
        write!(
            f,
            "Session: player=({:.2}, {:.2}, {:.2}) plants={} (trees={} bushes={} flowers={})",
            p.x, p.y, p.z, self.plant_count, self.trees, self.bushes, self.flowers
        )
    }
}

/// Detailed info about a single plant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantInfo {
    pub index: usize,
    pub kind: PlantKind,
    pub position: Vector3,
    /// Horizontal distance from the player.
    pub ground_distance: f64,
}

impl std::fmt::Display for PlantInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{:<3} {:<6} pos=({:.2}, {:.2}, {:.2}) dist={:.1}",
            self.index,
            self.kind,
            self.position.x,
            self.position.y,
            self.position.z,
            self.ground_distance
        )
    }
}
