//! voxelcut: interactive N-dimensional graph-cut segmentation for volumetric
//! images.
//!
//! voxelcut separates an image volume into "inside" and "outside" regions by
//! computing a minimum s-t cut over the voxel grid: neighboring voxels with
//! similar intensity are expensive to separate, painted seed voxels are
//! anchored to their terminal, and the cut settles along image contours. The
//! solver re-optimizes incrementally as seeds are painted, so it is suited to
//! interactive brushing over large volumes.
//!
//! # Quick Start
//!
//! ```
//! use voxelcut::{CapacityModel, FixedShape, Segmenter};
//!
//! fn main() -> voxelcut::Result<()> {
//!     // A tiny 4x4 image with a bright left half.
//!     let intensities = [
//!         1.0, 1.0, 0.0, 0.0_f32,
//!         1.0, 1.0, 0.0, 0.0,
//!         1.0, 1.0, 0.0, 0.0,
//!         1.0, 1.0, 0.0, 0.0,
//!     ];
//!     let mut segmenter = Segmenter::new(FixedShape::new([4, 4])?);
//!     segmenter.build_capacities(&CapacityModel::default(), &intensities)?;
//!
//!     // Paint one seed per region and solve.
//!     segmenter.set_inside([[0u32, 0]])?;
//!     segmenter.set_outside([[3u32, 3]])?;
//!     segmenter.update_gc();
//!
//!     assert_eq!(segmenter.label_at(&[2, 0])?, 1);
//!     assert_eq!(segmenter.label_at(&[2, 3])?, 0);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`NodeGrid`] holds all per-node state (edge residuals, terminal
//!   residuals, search-tree bookkeeping, labels) in flat arrays addressed
//!   through a [`GridShape`]
//! - [`GraphCut`] is the sequential Boykov-Kolmogorov two-tree solver
//! - [`GraphCutParallel`] fans slabs of the grid out to the rayon pool and
//!   repairs the slab boundaries sequentially
//! - [`Segmenter`] is the interactive surface: seed strokes in, labels out,
//!   with narrow-band incremental re-runs between edits

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessor-style getters don't need must_use
#![allow(clippy::must_use_candidate)]

pub mod band;
pub mod parallel;
pub mod segment;
pub mod solver;

// Re-export core types
pub use voxelcut_core::{
    capacity::CapacityModel,
    error::{Result, VoxelcutError},
    grid::{Flag, NodeGrid},
    options::SolverOptions,
    shape::{DynShape, FixedShape, GridShape},
    UVec3,
};

pub use parallel::GraphCutParallel;
pub use segment::Segmenter;
pub use solver::{cut_value, GraphCut};

/// One-shot segmentation for non-interactive callers.
///
/// Builds contrast capacities from `intensities`, applies the given seed
/// strokes, runs a full solve, and returns the label volume (one byte per
/// node, 1 = inside).
pub fn apply<S: GridShape + Sync>(
    shape: S,
    intensities: &[f32],
    model: &CapacityModel,
    inside: &[&[u32]],
    outside: &[&[u32]],
) -> Result<Vec<u8>> {
    let mut segmenter = Segmenter::new(shape);
    segmenter.build_capacities(model, intensities)?;
    segmenter.set_inside(inside.iter().copied())?;
    segmenter.set_outside(outside.iter().copied())?;
    segmenter.update_gc();
    Ok(segmenter.labels().to_vec())
}
