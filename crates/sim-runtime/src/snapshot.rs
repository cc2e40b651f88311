//! Whole-simulation snapshots: a human-readable JSON form and a compact
//! binary form. Persistence beyond these serialized blobs is an external
//! concern.

use crate::Simulation;
use thiserror::Error;

/// Snapshot encode/decode failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("json snapshot error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("binary snapshot error: {0}")]
    Binary(#[from] bincode::Error),
}

/// Serialize the full simulation state, including the random source, so a
/// restored run continues bit-for-bit identically.
pub fn to_json(sim: &Simulation) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(sim)?)
}

/// Restore a simulation from its JSON snapshot.
pub fn from_json(text: &str) -> Result<Simulation, SnapshotError> {
    Ok(serde_json::from_str(text)?)
}

/// Compact binary snapshot.
pub fn to_bytes(sim: &Simulation) -> Result<Vec<u8>, SnapshotError> {
    Ok(bincode::serialize(sim)?)
}

/// Restore a simulation from its binary snapshot.
pub fn from_bytes(bytes: &[u8]) -> Result<Simulation, SnapshotError> {
    Ok(bincode::deserialize(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_preserves_state() {
        let mut sim = Simulation::new(2, 21);
        sim.step(vec![None, None]).unwrap();
        let text = to_json(&sim).unwrap();
        let restored = from_json(&text).unwrap();
        assert_eq!(restored, sim);
    }

    #[test]
    fn binary_roundtrip_preserves_state() {
        let mut sim = Simulation::new(3, 8);
        sim.step(vec![None, None, None]).unwrap();
        let bytes = to_bytes(&sim).unwrap();
        let restored = from_bytes(&bytes).unwrap();
        assert_eq!(restored, sim);
    }

    #[test]
    fn restored_simulation_continues_identically() {
        let mut original = Simulation::new(2, 13);
        original.step(vec![None, None]).unwrap();
        let mut restored = from_bytes(&to_bytes(&original).unwrap()).unwrap();

        let next_original = original.step(vec![None, None]).unwrap();
        let next_restored = restored.step(vec![None, None]).unwrap();
        assert_eq!(next_original, next_restored);
        assert_eq!(original, restored);
    }
}
