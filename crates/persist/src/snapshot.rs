use meadow_kernel::SessionState;

/// Key under which the session snapshot is stored.
pub const STATE_KEY: &str = "gameState";

/// Errors from encoding or decoding a session snapshot.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("snapshot contains non-finite coordinates")]
    NonFinite,
}

/// Serialize a session into its JSON snapshot form.
///
/// JSON has no encoding for NaN or infinity, so such states are refused
/// instead of being written as `null`.
pub fn encode(state: &SessionState) -> Result<String, SnapshotError> {
    let finite = state.player_position().is_finite()
        && state.plants().iter().all(|p| p.position.is_finite());
    if !finite {
        return Err(SnapshotError::NonFinite);
    }
    Ok(serde_json::to_string(state)?)
}

/// Parse a JSON snapshot. Unknown plant types and missing fields are errors.
pub fn decode(blob: &str) -> Result<SessionState, SnapshotError> {
    Ok(serde_json::from_str(blob)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meadow_common::Vector3;
    use meadow_kernel::{Generate, GeneratorConfig, PlacedObject, PlantKind, RngSource, WorldGenerator};

    #[test]
    fn fresh_session_roundtrip() {
        let plants = WorldGenerator::new(RngSource::seeded(3)).generate(&GeneratorConfig::default());
        let state = SessionState::fresh(plants);
        let decoded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn generated_worlds_roundtrip_exactly() {
        let config = GeneratorConfig::default();
        let mismatched: Vec<u64> = (0..500)
            .filter(|&seed| {
                let state =
                    SessionState::fresh(WorldGenerator::new(RngSource::seeded(seed)).generate(&config));
                decode(&encode(&state).unwrap()).unwrap() != state
            })
            .collect();
        assert!(mismatched.is_empty(), "seeds with lossy coordinates: {mismatched:?}");
    }

    #[test]
    fn moved_session_roundtrip() {
        let mut state = SessionState::fresh(vec![PlacedObject::on_ground(PlantKind::Bush, 1.0, 2.0)]);
        for _ in 0..7 {
            state.move_player(Vector3::new(0.05, 0.0, -0.05));
        }
        let decoded = decode(&encode(&state).unwrap()).unwrap();
        assert_eq!(decoded, state);
        assert_eq!(decoded.player_position(), state.player_position());
    }

    #[test]
    fn decodes_foreign_snapshot_with_integer_coordinates() {
        let raw = r#"{"playerPosition":{"x":3,"y":1,"z":-4},
            "plants":[{"type":"bush","position":{"x":10,"y":0,"z":-20}}]}"#;
        let state = decode(raw).unwrap();
        assert_eq!(state.player_position(), Vector3::new(3.0, 1.0, -4.0));
        assert_eq!(state.plants()[0].kind, PlantKind::Bush);
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(decode("{not json"), Err(SnapshotError::Malformed(_))));
        assert!(matches!(decode(r#"{"plants":[]}"#), Err(SnapshotError::Malformed(_))));
    }

    #[test]
    fn non_finite_state_refused() {
        let state = SessionState::new(Vector3::new(f64::NAN, 1.0, 0.0), Vec::new());
        assert!(matches!(encode(&state), Err(SnapshotError::NonFinite)));
    }
}
