//! Contrast-based edge capacities for intensity volumes.
//!
//! Neighboring voxels with similar intensity get a high-capacity edge
//! (expensive to cut); edges across strong intensity steps are cheap, so the
//! minimum cut prefers to follow image contours.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoxelcutError};
use crate::grid::NodeGrid;
use crate::shape::GridShape;

/// Gaussian contrast weighting for neighbor edges:
/// `cap = lambda * exp(-(I_p - I_q)^2 / (2 * sigma^2))`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapacityModel {
    /// Contrast decay; larger values keep capacity high across intensity steps.
    pub sigma: f32,
    /// Scale applied to every neighbor-edge capacity.
    pub lambda: f32,
}

impl Default for CapacityModel {
    fn default() -> Self {
        Self {
            sigma: 0.1,
            lambda: 1.0,
        }
    }
}

impl CapacityModel {
    /// Creates a model with the given contrast decay and scale.
    pub fn new(sigma: f32, lambda: f32) -> Result<Self> {
        if sigma <= 0.0 || !sigma.is_finite() {
            return Err(VoxelcutError::InvalidParameter("sigma must be positive"));
        }
        if lambda < 0.0 || !lambda.is_finite() {
            return Err(VoxelcutError::InvalidParameter(
                "lambda must be non-negative",
            ));
        }
        Ok(Self { sigma, lambda })
    }

    /// Fills the grid's neighbor-edge capacities from an intensity volume and
    /// resets the working residuals to match.
    ///
    /// `intensities` must hold one value per node in the grid's row-major
    /// order. Terminal capacities are left untouched; seeds provide them.
    pub fn build<S: GridShape>(&self, intensities: &[f32], grid: &mut NodeGrid<S>) -> Result<()> {
        if intensities.len() != grid.len() {
            return Err(VoxelcutError::SizeMismatch {
                expected: grid.len(),
                actual: intensities.len(),
            });
        }
        if self.sigma <= 0.0 {
            return Err(VoxelcutError::InvalidParameter("sigma must be positive"));
        }

        let inv_two_sigma_sq = 1.0 / (2.0 * self.sigma * self.sigma);
        let ndirs = u8::try_from(grid.num_dirs()).expect("checked at grid construction");
        for node in 0..grid.len() {
            for dir in 0..ndirs {
                let Some(neighbor) = grid.neighbor(node, dir) else {
                    continue;
                };
                let diff = intensities[node] - intensities[neighbor];
                let weight = self.lambda * (-diff * diff * inv_two_sigma_sq).exp();
                grid.set_cap(node, dir, weight);
            }
        }
        grid.reset_residuals();
        Ok(())
    }

    /// Fills every neighbor edge with a uniform capacity, for callers that
    /// supply their own contrast term (and for tests).
    pub fn build_uniform<S: GridShape>(weight: f32, grid: &mut NodeGrid<S>) -> Result<()> {
        if weight < 0.0 || !weight.is_finite() {
            return Err(VoxelcutError::InvalidParameter(
                "weight must be non-negative",
            ));
        }
        let ndirs = u8::try_from(grid.num_dirs()).expect("checked at grid construction");
        for node in 0..grid.len() {
            for dir in 0..ndirs {
                if grid.neighbor(node, dir).is_some() {
                    grid.set_cap(node, dir, weight);
                }
            }
        }
        grid.reset_residuals();
        Ok(())
    }
}
