//! Interactive seed painting and label readback.
//!
//! [`Segmenter`] is the caller-facing surface of the engine: collaborators
//! paint "inside"/"outside" strokes as coordinate sets, call
//! [`Segmenter::update_gc`] to re-optimize, and read the classification back
//! as a flat label volume. All per-node state is owned here; callers never
//! touch residuals or flags directly.

use voxelcut_core::capacity::CapacityModel;
use voxelcut_core::error::{Result, VoxelcutError};
use voxelcut_core::grid::NodeGrid;
use voxelcut_core::options::SolverOptions;
use voxelcut_core::shape::GridShape;

use crate::band;
use crate::parallel::GraphCutParallel;

/// Seed mark painted onto a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
enum SeedMark {
    Outside = -1,
    None = 0,
    Inside = 1,
}

/// Interactive graph-cut segmenter over one grid.
pub struct Segmenter<S: GridShape> {
    grid: NodeGrid<S>,
    seeds: Vec<i8>,
    touched: Vec<usize>,
    touched_mask: Vec<bool>,
    options: SolverOptions,
    solver: GraphCutParallel,
    ran_once: bool,
    pending_full: bool,
}

impl<S: GridShape + Sync> Segmenter<S> {
    /// Creates a segmenter with default options and zero capacities.
    #[must_use]
    pub fn new(shape: S) -> Self {
        Self::with_options(shape, SolverOptions::default())
            .expect("default options are always valid")
    }

    /// Creates a segmenter with the given options.
    ///
    /// Fails fast on configuration errors: a non-positive seed weight, or a
    /// block count no slab partition of this grid can satisfy.
    pub fn with_options(shape: S, options: SolverOptions) -> Result<Self> {
        if options.seed_weight <= 0.0 || !options.seed_weight.is_finite() {
            return Err(VoxelcutError::InvalidParameter(
                "seed_weight must be positive",
            ));
        }
        let extent = shape.size_of_dim(0);
        if options.blocks > 1 && options.blocks > extent as usize {
            return Err(VoxelcutError::InvalidBlockCount {
                blocks: options.blocks,
                extent,
            });
        }
        let n = shape.len();
        let solver = GraphCutParallel::new(options.blocks);
        Ok(Self {
            grid: NodeGrid::new(shape),
            seeds: vec![0; n],
            touched: Vec::new(),
            touched_mask: vec![false; n],
            options,
            solver,
            ran_once: false,
            pending_full: false,
        })
    }

    /// Returns the active options.
    #[must_use]
    pub fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Returns the underlying grid (read-only).
    #[must_use]
    pub fn grid(&self) -> &NodeGrid<S> {
        &self.grid
    }

    /// Returns the total flow pushed so far.
    #[must_use]
    pub fn flow(&self) -> f64 {
        self.solver.flow()
    }

    /// Builds neighbor-edge capacities from an intensity volume.
    ///
    /// Painted seeds survive; the next [`Segmenter::update_gc`] re-solves the
    /// full grid against the new capacities.
    pub fn build_capacities(&mut self, model: &CapacityModel, intensities: &[f32]) -> Result<()> {
        model.build(intensities, &mut self.grid)?;
        self.pending_full = true;
        Ok(())
    }

    /// Fills every neighbor edge with one uniform capacity.
    pub fn uniform_capacities(&mut self, weight: f32) -> Result<()> {
        CapacityModel::build_uniform(weight, &mut self.grid)?;
        self.pending_full = true;
        Ok(())
    }

    /// Marks the given coordinates as "inside" seeds.
    pub fn set_inside<I>(&mut self, coords: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u32]>,
    {
        self.paint(coords, SeedMark::Inside)
    }

    /// Marks the given coordinates as "outside" seeds.
    pub fn set_outside<I>(&mut self, coords: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u32]>,
    {
        self.paint(coords, SeedMark::Outside)
    }

    /// Erases any seed at the given coordinates.
    ///
    /// Erased nodes revert to the unseeded state and are re-classified by the
    /// next [`Segmenter::update_gc`]; they do not defect to the opposite seed.
    pub fn erase<I>(&mut self, coords: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u32]>,
    {
        self.paint(coords, SeedMark::None)
    }

    /// Applies one seed mark to a stroke of coordinates.
    ///
    /// Every coordinate is validated before any node is mutated, so a bad
    /// stroke leaves the segmenter untouched.
    fn paint<I>(&mut self, coords: I, mark: SeedMark) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u32]>,
    {
        let nodes = coords
            .into_iter()
            .map(|c| self.grid.node_at(c.as_ref()))
            .collect::<Result<Vec<usize>>>()?;

        for node in nodes {
            let old = self.seeds[node];
            let new = mark as i8;
            if old == new {
                continue;
            }
            // Shifting the signed net terminal keeps previously pushed flow
            // feasible, which is what makes the re-run incremental.
            let delta = f32::from(new - old) * self.options.seed_weight;
            self.grid.adjust_terminal(node, delta);
            self.seeds[node] = new;
            if !self.touched_mask[node] {
                self.touched_mask[node] = true;
                self.touched.push(node);
            }
        }
        Ok(())
    }

    /// Re-optimizes the cut over the current seeds and capacities.
    ///
    /// A no-op when nothing changed since the last call. Incremental calls
    /// restrict growth to the narrow band around the edited seeds and the
    /// current boundary (unless `band_radius` is 0). Returns the number of
    /// nodes whose label changed.
    pub fn update_gc(&mut self) -> usize {
        if !self.pending_full && self.touched.is_empty() {
            log::debug!("update_gc: nothing dirty, skipping");
            return 0;
        }

        let restricted =
            self.ran_once && !self.pending_full && self.options.band_radius > 0;
        if restricted {
            band::recompute(
                &mut self.grid,
                &self.touched,
                &self.seeds,
                self.options.band_radius,
            );
        } else {
            self.grid.set_all_band(true);
        }

        let before = self.grid.labels().to_vec();
        let pushed = self.solver.solve(&mut self.grid, restricted);
        let relabeled = before
            .iter()
            .zip(self.grid.labels())
            .filter(|(a, b)| a != b)
            .count();

        for &node in &self.touched {
            self.touched_mask[node] = false;
        }
        self.touched.clear();
        self.pending_full = false;
        self.ran_once = true;
        log::info!("update_gc: pushed {pushed:.3}, relabeled {relabeled} nodes");
        relabeled
    }

    /// Returns the current labels, one byte per node (1 = inside).
    #[must_use]
    pub fn labels(&self) -> &[u8] {
        self.grid.labels()
    }

    /// Returns the label at one coordinate.
    pub fn label_at(&self, coord: &[u32]) -> Result<u8> {
        Ok(self.grid.label(self.grid.node_at(coord)?))
    }

    /// Copies the labels into a caller-owned segmentation buffer.
    pub fn fill_segmentation(&self, out: &mut [u8]) -> Result<()> {
        self.grid.fill_segmentation(out)
    }

    /// Discards all pushed flow and forces a from-scratch solve on the next
    /// [`Segmenter::update_gc`].
    pub fn reset_flow(&mut self) {
        self.grid.reset_residuals();
        self.pending_full = true;
    }
}
