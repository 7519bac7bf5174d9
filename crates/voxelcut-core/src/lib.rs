//! Core storage for voxelcut.
//!
//! This crate provides the data layer of the voxelcut segmentation engine:
//! - [`GridShape`] and its fixed/dynamic implementations mapping N-dimensional
//!   coordinates to flat storage offsets
//! - [`NodeGrid`], the per-node state arena (edge capacities and residuals,
//!   terminal residuals, search-tree bookkeeping, narrow-band membership,
//!   persistent labels)
//! - [`CapacityModel`], contrast-based edge weights from an intensity volume
//! - [`SolverOptions`] and the shared error type
//!
//! The solvers themselves live in the `voxelcut` crate.

// Documentation lints - internal accessors don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]

pub mod capacity;
pub mod error;
pub mod grid;
pub mod options;
pub mod shape;

pub use capacity::CapacityModel;
pub use error::{Result, VoxelcutError};
pub use grid::{opposite, Flag, NodeGrid, PARENT_NONE, PARENT_TERMINAL};
pub use options::SolverOptions;
pub use shape::{DynShape, FixedShape, GridShape};

// Re-export glam types used by the 3-D convenience surface
pub use glam::UVec3;
