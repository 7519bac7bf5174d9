//! Sequential two-tree augmenting-path max-flow solver.
//!
//! Implements the Boykov-Kolmogorov algorithm over a regular voxel grid:
//! a source tree and a sink tree grow from their terminal-linked roots, an
//! augmenting path is pushed whenever the trees touch through an unsaturated
//! edge, and nodes cut off by saturation are re-adopted or evicted instead of
//! rebuilding the trees from scratch. Search trees survive only within one
//! [`GraphCut::solve`] call; residuals persist across calls, which is what
//! makes incremental re-runs after seed edits cheap.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::float_cmp
)]

use std::collections::VecDeque;

use voxelcut_core::grid::{opposite, Flag, NodeGrid, PARENT_NONE, PARENT_TERMINAL};
use voxelcut_core::shape::GridShape;

/// Sequential max-flow/min-cut solver state.
///
/// The queues and counters are scratch state reused across runs; all per-node
/// state lives in the [`NodeGrid`].
#[derive(Default)]
pub struct GraphCut {
    active: VecDeque<usize>,
    orphans: VecDeque<usize>,
    time: u32,
    flow: f64,
    augmentations: u64,
}

impl GraphCut {
    /// Creates a solver with empty scratch state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total flow pushed by this solver instance.
    #[must_use]
    pub fn flow(&self) -> f64 {
        self.flow
    }

    /// Runs the solver to completion on the grid's current residuals.
    ///
    /// With `restricted` set, tree growth is limited to nodes inside the
    /// narrow band and only tree-claimed nodes are relabeled; everything else
    /// keeps its previous label. Returns the flow pushed by this run.
    pub fn solve<S: GridShape>(&mut self, grid: &mut NodeGrid<S>, restricted: bool) -> f64 {
        let flow_before = self.flow;
        self.init(grid, restricted);

        while let Some((src, snk, dir)) = self.grow(grid, restricted) {
            self.time += 1;
            self.augment(grid, src, snk, dir);
            self.adopt(grid);
        }

        let relabeled = self.relabel(grid, restricted);
        let pushed = self.flow - flow_before;
        log::debug!(
            "graph cut: pushed {pushed:.3} over {} augmentations, relabeled {relabeled} nodes",
            self.augmentations
        );
        pushed
    }

    /// Seeds the search trees from the terminal residuals.
    fn init<S: GridShape>(&mut self, grid: &mut NodeGrid<S>, restricted: bool) {
        self.active.clear();
        self.orphans.clear();
        self.time = 0;
        self.augmentations = 0;

        for node in 0..grid.len() {
            grid.set_dist(node, 0);
            grid.set_timestamp(node, 0);
            if restricted && !grid.band(node) {
                grid.set_flag(node, Flag::Free);
                grid.set_parent(node, PARENT_NONE);
                continue;
            }
            let terminal = grid.terminal(node);
            if terminal > 0.0 {
                grid.set_flag(node, Flag::Source);
                grid.set_parent(node, PARENT_TERMINAL);
                self.active.push_back(node);
            } else if terminal < 0.0 {
                grid.set_flag(node, Flag::Sink);
                grid.set_parent(node, PARENT_TERMINAL);
                self.active.push_back(node);
            } else {
                grid.set_flag(node, Flag::Free);
                grid.set_parent(node, PARENT_NONE);
            }
        }
    }

    /// Grows both trees until they touch through an unsaturated edge.
    ///
    /// Returns `(source_node, sink_node, dir)` for the meeting edge, oriented
    /// from the source side, or `None` once the active queue drains.
    fn grow<S: GridShape>(
        &mut self,
        grid: &mut NodeGrid<S>,
        restricted: bool,
    ) -> Option<(usize, usize, u8)> {
        let ndirs = grid.num_dirs() as u8;
        while let Some(&p) = self.active.front() {
            let tree = grid.flag(p);
            if tree == Flag::Free {
                // Evicted while queued.
                self.active.pop_front();
                continue;
            }
            for dir in 0..ndirs {
                let Some(q) = grid.neighbor(p, dir) else {
                    continue;
                };
                // Growth follows the flow direction of the tree: away from
                // the source, toward the sink.
                let residual = if tree == Flag::Source {
                    grid.residual(p, dir)
                } else {
                    grid.residual(q, opposite(dir))
                };
                if residual <= 0.0 {
                    continue;
                }
                match grid.flag(q) {
                    Flag::Free => {
                        if restricted && !grid.band(q) {
                            continue;
                        }
                        grid.set_flag(q, tree);
                        grid.set_parent(q, opposite(dir));
                        grid.set_dist(q, grid.dist(p) + 1);
                        grid.set_timestamp(q, grid.timestamp(p));
                        self.active.push_back(q);
                    }
                    f if f == tree => {}
                    _ => {
                        // Opposite tree reached: augmenting path found.
                        return Some(if tree == Flag::Source {
                            (p, q, dir)
                        } else {
                            (q, p, opposite(dir))
                        });
                    }
                }
            }
            self.active.pop_front();
        }
        None
    }

    /// Pushes the bottleneck of the path source-root -> `src` -> `snk` ->
    /// sink-root and orphans every node whose tree edge saturates.
    fn augment<S: GridShape>(&mut self, grid: &mut NodeGrid<S>, src: usize, snk: usize, dir: u8) {
        // Bottleneck over the meeting edge, both parent chains, and both
        // terminal links.
        let mut bottleneck = grid.residual(src, dir);
        let mut node = src;
        loop {
            let parent = grid.parent(node);
            if parent == PARENT_TERMINAL {
                bottleneck = bottleneck.min(grid.terminal(node));
                break;
            }
            let up = grid.neighbor(node, parent).expect("tree edges stay in grid");
            bottleneck = bottleneck.min(grid.residual(up, opposite(parent)));
            node = up;
        }
        let mut node = snk;
        loop {
            let parent = grid.parent(node);
            if parent == PARENT_TERMINAL {
                bottleneck = bottleneck.min(-grid.terminal(node));
                break;
            }
            bottleneck = bottleneck.min(grid.residual(node, parent));
            node = grid.neighbor(node, parent).expect("tree edges stay in grid");
        }
        debug_assert!(bottleneck > 0.0);

        // Push through the meeting edge.
        *grid.residual_mut(src, dir) -= bottleneck;
        *grid.residual_mut(snk, opposite(dir)) += bottleneck;

        // Source side: flow runs parent -> child; a saturated tree edge
        // orphans the child.
        let mut node = src;
        loop {
            let parent = grid.parent(node);
            if parent == PARENT_TERMINAL {
                *grid.terminal_mut(node) -= bottleneck;
                if grid.terminal(node) <= 0.0 {
                    self.make_orphan(grid, node);
                }
                break;
            }
            let up = grid.neighbor(node, parent).expect("tree edges stay in grid");
            *grid.residual_mut(node, parent) += bottleneck;
            *grid.residual_mut(up, opposite(parent)) -= bottleneck;
            if grid.residual(up, opposite(parent)) <= 0.0 {
                self.make_orphan(grid, node);
            }
            node = up;
        }

        // Sink side: flow runs child -> parent.
        let mut node = snk;
        loop {
            let parent = grid.parent(node);
            if parent == PARENT_TERMINAL {
                *grid.terminal_mut(node) += bottleneck;
                if grid.terminal(node) >= 0.0 {
                    self.make_orphan(grid, node);
                }
                break;
            }
            let up = grid.neighbor(node, parent).expect("tree edges stay in grid");
            *grid.residual_mut(up, opposite(parent)) += bottleneck;
            *grid.residual_mut(node, parent) -= bottleneck;
            if grid.residual(node, parent) <= 0.0 {
                self.make_orphan(grid, node);
            }
            node = up;
        }

        self.flow += f64::from(bottleneck);
        self.augmentations += 1;
    }

    fn make_orphan<S: GridShape>(&mut self, grid: &mut NodeGrid<S>, node: usize) {
        grid.set_parent(node, PARENT_NONE);
        self.orphans.push_back(node);
    }

    /// Re-attaches or evicts every orphan produced by the last augmentation.
    fn adopt<S: GridShape>(&mut self, grid: &mut NodeGrid<S>) {
        while let Some(orphan) = self.orphans.pop_front() {
            self.process_orphan(grid, orphan);
        }
    }

    /// Seeks a new valid parent for `orphan` among same-tree neighbors with an
    /// unsaturated edge of the correct orientation, preferring the smallest
    /// validated distance to the terminal. Failing that, the orphan is evicted
    /// to `Free`, its former children are orphaned in turn, and neighbors that
    /// could re-grow over it are re-activated.
    fn process_orphan<S: GridShape>(&mut self, grid: &mut NodeGrid<S>, orphan: usize) {
        let tree = grid.flag(orphan);
        debug_assert_ne!(tree, Flag::Free);
        let ndirs = grid.num_dirs() as u8;

        let mut best: Option<(u8, u32)> = None;
        for dir in 0..ndirs {
            let Some(n) = grid.neighbor(orphan, dir) else {
                continue;
            };
            if grid.flag(n) != tree {
                continue;
            }
            if self.link_residual(grid, orphan, n, dir, tree) <= 0.0 {
                continue;
            }
            if let Some(d) = self.origin_distance(grid, n) {
                if best.map_or(true, |(_, best_d)| d < best_d) {
                    best = Some((dir, d));
                }
            }
        }

        if let Some((dir, d)) = best {
            grid.set_parent(orphan, dir);
            grid.set_dist(orphan, d + 1);
            grid.set_timestamp(orphan, self.time);
            return;
        }

        // No valid parent: evict. Former children become orphans; same-tree
        // neighbors that could reach the evicted node become active again.
        for dir in 0..ndirs {
            let Some(n) = grid.neighbor(orphan, dir) else {
                continue;
            };
            if grid.flag(n) != tree {
                continue;
            }
            if self.link_residual(grid, orphan, n, dir, tree) > 0.0 {
                self.active.push_back(n);
            }
            let parent = grid.parent(n);
            if parent < PARENT_TERMINAL && grid.neighbor(n, parent) == Some(orphan) {
                self.make_orphan(grid, n);
            }
        }
        grid.set_flag(orphan, Flag::Free);
    }

    /// Residual of the tree edge that would make `n` the parent of `node`:
    /// `n -> node` in the source tree, `node -> n` in the sink tree.
    /// `dir` is the direction from `node` to `n`.
    fn link_residual<S: GridShape>(
        &self,
        grid: &NodeGrid<S>,
        node: usize,
        n: usize,
        dir: u8,
        tree: Flag,
    ) -> f32 {
        if tree == Flag::Source {
            grid.residual(n, opposite(dir))
        } else {
            grid.residual(node, dir)
        }
    }

    /// Walks the parent chain of `node` to its terminal, returning the
    /// distance if the chain is intact. Distances validated this generation
    /// are trusted and the chain is re-stamped on success.
    fn origin_distance<S: GridShape>(&self, grid: &mut NodeGrid<S>, node: usize) -> Option<u32> {
        let mut steps = 0u32;
        let mut i = node;
        let total = loop {
            if grid.timestamp(i) == self.time {
                break steps + grid.dist(i);
            }
            let parent = grid.parent(i);
            if parent == PARENT_NONE {
                return None;
            }
            if parent == PARENT_TERMINAL {
                break steps;
            }
            steps += 1;
            i = grid.neighbor(i, parent).expect("tree edges stay in grid");
        };

        // Re-stamp the walked prefix so later traces stop early.
        let mut i = node;
        let mut d = total;
        while grid.timestamp(i) != self.time {
            grid.set_timestamp(i, self.time);
            grid.set_dist(i, d);
            let parent = grid.parent(i);
            if parent == PARENT_TERMINAL {
                break;
            }
            d -= 1;
            i = grid.neighbor(i, parent).expect("tree edges stay in grid");
        }
        Some(total)
    }

    /// Writes tree membership back into the persistent labels.
    ///
    /// Unrestricted runs label every node (`Free` counts as outside); band
    /// runs only relabel tree-claimed in-band nodes so stranded nodes keep
    /// their previous classification. Returns the number of changed labels.
    fn relabel<S: GridShape>(&self, grid: &mut NodeGrid<S>, restricted: bool) -> u64 {
        let mut changed = 0u64;
        for node in 0..grid.len() {
            let new = match grid.flag(node) {
                Flag::Source => 1,
                Flag::Sink => 0,
                Flag::Free => {
                    if restricted {
                        continue;
                    }
                    0
                }
            };
            if restricted && !grid.band(node) {
                continue;
            }
            if grid.label(node) != new {
                grid.set_label(node, new);
                changed += 1;
            }
        }
        changed
    }
}

/// Capacity of the cut induced by the grid's current labels.
///
/// Sums the set capacities of every neighbor edge from an inside to an
/// outside node plus the terminal links severed on each side. After a full
/// (unbanded) solve from fresh residuals this equals the flow pushed.
#[must_use]
pub fn cut_value<S: GridShape>(grid: &NodeGrid<S>) -> f64 {
    let ndirs = grid.num_dirs() as u8;
    let mut total = 0.0f64;
    for node in 0..grid.len() {
        if grid.label(node) == 1 {
            for dir in 0..ndirs {
                if let Some(n) = grid.neighbor(node, dir) {
                    if grid.label(n) == 0 {
                        total += f64::from(grid.cap(node, dir));
                    }
                }
            }
            if grid.terminal_cap(node) < 0.0 {
                total += f64::from(-grid.terminal_cap(node));
            }
        } else if grid.terminal_cap(node) > 0.0 {
            total += f64::from(grid.terminal_cap(node));
        }
    }
    total
}
