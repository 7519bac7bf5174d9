//! Narrow-band computation for incremental re-segmentation.
//!
//! After the first full solve, seed edits only need to re-optimize a
//! neighborhood of the nodes they touched and of the current cut boundary.
//! The band is that neighborhood: a multi-source BFS dilation, Manhattan
//! metric, out to a configurable radius. Growth outside the band is skipped
//! and out-of-band nodes keep their previous label - a deliberate
//! approximation trading global optimality for interactive latency.

use std::collections::VecDeque;

use voxelcut_core::grid::NodeGrid;
use voxelcut_core::shape::GridShape;

/// Recomputes the grid's narrow band.
///
/// Sources are the `touched` nodes (seeds edited since the last run), every
/// seeded node (`seeded` marks), and every label-boundary node; the band is
/// their dilation by `radius` grid steps. Returns the band population.
pub fn recompute<S: GridShape>(
    grid: &mut NodeGrid<S>,
    touched: &[usize],
    seeded: &[i8],
    radius: u32,
) -> usize {
    debug_assert_eq!(seeded.len(), grid.len());
    grid.set_all_band(false);

    let ndirs = u8::try_from(grid.num_dirs()).expect("checked at grid construction");
    let mut queue: VecDeque<(usize, u32)> = VecDeque::new();

    let push_source = |grid: &mut NodeGrid<S>, queue: &mut VecDeque<(usize, u32)>, node| {
        if !grid.band(node) {
            grid.set_band(node, true);
            queue.push_back((node, 0));
        }
    };

    for &node in touched {
        push_source(grid, &mut queue, node);
    }
    for (node, &mark) in seeded.iter().enumerate() {
        if mark != 0 {
            push_source(grid, &mut queue, node);
        }
    }
    // Label-boundary nodes: any node with a differently-labeled neighbor.
    for node in 0..grid.len() {
        if grid.band(node) {
            continue;
        }
        let label = grid.label(node);
        for dir in 0..ndirs {
            if let Some(n) = grid.neighbor(node, dir) {
                if grid.label(n) != label {
                    push_source(grid, &mut queue, node);
                    break;
                }
            }
        }
    }

    let mut population = queue.len();
    while let Some((node, depth)) = queue.pop_front() {
        if depth == radius {
            continue;
        }
        for dir in 0..ndirs {
            if let Some(n) = grid.neighbor(node, dir) {
                if !grid.band(n) {
                    grid.set_band(n, true);
                    population += 1;
                    queue.push_back((n, depth + 1));
                }
            }
        }
    }
    log::debug!(
        "narrow band: {population} of {} nodes at radius {radius}",
        grid.len()
    );
    population
}
