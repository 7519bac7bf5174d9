//! Configuration options for the solvers.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tuning parameters for the interactive segmentation solvers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverOptions {
    /// Terminal capacity magnitude applied per painted seed voxel.
    ///
    /// Must dominate the sum of a node's neighbor-edge capacities so a seed
    /// can never end up on the wrong side of the cut.
    pub seed_weight: f32,

    /// Narrow-band dilation radius in grid steps for incremental re-runs.
    ///
    /// `0` disables the band and every update re-optimizes the full grid.
    pub band_radius: u32,

    /// Slab count for the parallel solver.
    ///
    /// `1` solves sequentially; `0` uses one slab per worker thread.
    pub blocks: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            seed_weight: 1.0e6,
            band_radius: 8,
            blocks: 1,
        }
    }
}

impl SolverOptions {
    /// Serializes the options to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserializes options from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let options = SolverOptions {
            band_radius: 3,
            blocks: 4,
            ..SolverOptions::default()
        };

        let json = options.to_json().unwrap();
        let restored = SolverOptions::from_json(&json).unwrap();
        assert_eq!(restored.band_radius, 3);
        assert_eq!(restored.blocks, 4);
        assert!((restored.seed_weight - options.seed_weight).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(SolverOptions::from_json("not json").is_err());
    }
}
