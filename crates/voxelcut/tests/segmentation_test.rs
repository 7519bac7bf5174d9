//! End-to-end segmentation tests over small synthetic volumes.

use voxelcut::{
    apply, cut_value, CapacityModel, DynShape, FixedShape, GraphCut, GridShape, NodeGrid,
    Segmenter, SolverOptions,
};

const N: u32 = 6;

/// 6x6x6 volume with a bright 4x4x4 cube; the blob boundary is the unique
/// minimum cut once one seed lands on each side.
fn blob_volume() -> Vec<f32> {
    let mut intensities = Vec::with_capacity((N * N * N) as usize);
    for x in 0..N {
        for y in 0..N {
            for z in 0..N {
                let inside = (1..5).contains(&x) && (1..5).contains(&y) && (1..5).contains(&z);
                intensities.push(if inside { 1.0 } else { 0.1 });
            }
        }
    }
    intensities
}

fn blob_label(shape: &FixedShape<3>, node: usize) -> u8 {
    let mut coord = [0u32; 3];
    shape.coord_of(node, &mut coord);
    u8::from(coord.iter().all(|c| (1..5).contains(c)))
}

#[test]
fn test_blob_segmentation_follows_contrast() {
    let shape = FixedShape::new([N, N, N]).unwrap();
    let labels = apply(
        shape,
        &blob_volume(),
        &CapacityModel::new(0.2, 1.0).unwrap(),
        &[&[3, 3, 3]],
        &[&[0, 0, 0]],
    )
    .unwrap();

    for (node, &label) in labels.iter().enumerate() {
        assert_eq!(label, blob_label(&shape, node), "node {node}");
    }
}

#[test]
fn test_parallel_blocks_agree_on_blob() {
    let intensities = blob_volume();
    let model = CapacityModel::new(0.2, 1.0).unwrap();

    let mut reference: Option<Vec<u8>> = None;
    for blocks in [1usize, 2, 3, 6] {
        let shape = FixedShape::new([N, N, N]).unwrap();
        let options = SolverOptions {
            blocks,
            ..SolverOptions::default()
        };
        let mut segmenter = Segmenter::with_options(shape, options).unwrap();
        segmenter.build_capacities(&model, &intensities).unwrap();
        segmenter.set_inside([[3u32, 3, 3]]).unwrap();
        segmenter.set_outside([[0u32, 0, 0]]).unwrap();
        segmenter.update_gc();

        let flow = segmenter.flow();
        let cut = cut_value(segmenter.grid());
        assert!((flow - cut).abs() < 1e-4, "blocks = {blocks}");

        if let Some(labels) = &reference {
            assert_eq!(segmenter.labels(), &labels[..], "blocks = {blocks}");
        } else {
            reference = Some(segmenter.labels().to_vec());
        }
    }
}

#[test]
fn test_adding_inside_seed_is_monotone() {
    // Labels may only grow when an extra inside seed is added under the same
    // edge capacities.
    let solve = |extra_seed: Option<[u32; 2]>| {
        let mut grid = NodeGrid::new(FixedShape::new([4, 4]).unwrap());
        CapacityModel::build_uniform(1.0, &mut grid).unwrap();
        let weight = 1.0e6;
        grid.adjust_terminal(grid.shape().offset_of(&[0, 0]), weight);
        grid.adjust_terminal(grid.shape().offset_of(&[3, 3]), -weight);
        if let Some(coord) = extra_seed {
            grid.adjust_terminal(grid.shape().offset_of(&coord), weight);
        }
        let mut solver = GraphCut::new();
        solver.solve(&mut grid, false);
        grid.labels().to_vec()
    };

    let base = solve(None);
    for extra in [[1, 1], [0, 2], [2, 2]] {
        let extended = solve(Some(extra));
        for (node, (&a, &b)) in base.iter().zip(&extended).enumerate() {
            assert!(b >= a, "node {node} flipped outside after adding a seed");
        }
    }
}

#[test]
fn test_incremental_session_matches_fresh_solve() {
    // With the band disabled, a sequence of edits must land on the same
    // labels as one fresh solve of the final seed configuration.
    let intensities = blob_volume();
    let model = CapacityModel::new(0.2, 1.0).unwrap();
    let options = SolverOptions {
        band_radius: 0,
        ..SolverOptions::default()
    };

    let mut interactive =
        Segmenter::with_options(FixedShape::new([N, N, N]).unwrap(), options.clone()).unwrap();
    interactive.build_capacities(&model, &intensities).unwrap();
    interactive.set_inside([[3u32, 3, 3]]).unwrap();
    interactive.update_gc();
    interactive.set_outside([[0u32, 0, 0]]).unwrap();
    interactive.update_gc();
    // A mistaken stroke, corrected by erasing it again.
    interactive.set_outside([[2u32, 2, 2]]).unwrap();
    interactive.update_gc();
    interactive.erase([[2u32, 2, 2]]).unwrap();
    interactive.update_gc();

    let mut fresh =
        Segmenter::with_options(FixedShape::new([N, N, N]).unwrap(), options).unwrap();
    fresh.build_capacities(&model, &intensities).unwrap();
    fresh.set_inside([[3u32, 3, 3]]).unwrap();
    fresh.set_outside([[0u32, 0, 0]]).unwrap();
    fresh.update_gc();

    assert_eq!(interactive.labels(), fresh.labels());
}

#[test]
fn test_banded_session_keeps_seeds_consistent() {
    // Narrow-band runs are approximate, but every painted seed must always
    // land on its own side and repeated updates must be stable.
    let intensities = blob_volume();
    let options = SolverOptions {
        band_radius: 2,
        ..SolverOptions::default()
    };
    let mut segmenter =
        Segmenter::with_options(FixedShape::new([N, N, N]).unwrap(), options).unwrap();
    segmenter
        .build_capacities(&CapacityModel::new(0.2, 1.0).unwrap(), &intensities)
        .unwrap();

    segmenter.set_inside([[3u32, 3, 3]]).unwrap();
    segmenter.set_outside([[0u32, 0, 0]]).unwrap();
    segmenter.update_gc();

    segmenter.set_inside([[1u32, 1, 1]]).unwrap();
    segmenter.set_outside([[5u32, 5, 5]]).unwrap();
    segmenter.update_gc();

    assert_eq!(segmenter.label_at(&[3, 3, 3]).unwrap(), 1);
    assert_eq!(segmenter.label_at(&[1, 1, 1]).unwrap(), 1);
    assert_eq!(segmenter.label_at(&[0, 0, 0]).unwrap(), 0);
    assert_eq!(segmenter.label_at(&[5, 5, 5]).unwrap(), 0);

    let labels = segmenter.labels().to_vec();
    assert_eq!(segmenter.update_gc(), 0);
    assert_eq!(segmenter.labels(), labels);
}

#[test]
fn test_one_dimensional_chain_scenario() {
    // Five-node chain, seeds at the ends. With a weakened middle edge the cut
    // lands exactly there; with a zero edge no flow crosses at all.
    let mut grid = NodeGrid::new(DynShape::new(&[5]).unwrap());
    for (i, cap) in [1.0, 1.0, 0.5, 1.0].into_iter().enumerate() {
        grid.set_cap(i, 1, cap);
        grid.set_cap(i + 1, 0, cap);
    }
    grid.reset_residuals();
    grid.adjust_terminal(0, 1.0e6);
    grid.adjust_terminal(4, -1.0e6);

    let mut solver = GraphCut::new();
    let pushed = solver.solve(&mut grid, false);
    assert!((pushed - 0.5).abs() < 1e-6);
    assert_eq!(grid.labels(), &[1, 1, 1, 0, 0]);
    assert!((solver.flow() - cut_value(&grid)).abs() < 1e-6);
}
