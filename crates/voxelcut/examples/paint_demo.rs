//! Interactive-style painting session on a synthetic 2-D image.
//!
//! Builds a noisy two-region image, paints a few seed strokes, and prints the
//! evolving segmentation after each edit. Run with `RUST_LOG=debug` to watch
//! the solver's flow and band statistics.

#![allow(clippy::cast_precision_loss)]

use voxelcut::{CapacityModel, FixedShape, Result, Segmenter};

const W: u32 = 24;
const H: u32 = 16;

fn synthetic_image() -> Vec<f32> {
    // A bright disc on a dark background, with a deterministic ripple so the
    // contrast edges are not perfectly clean.
    let mut image = Vec::with_capacity((W * H) as usize);
    for row in 0..H {
        for col in 0..W {
            let dy = row as f32 - 8.0;
            let dx = col as f32 - 12.0;
            let inside_disc = (dx * dx + dy * dy).sqrt() < 6.0;
            let ripple = 0.05 * ((row * 7 + col * 3) % 5) as f32;
            image.push(if inside_disc { 0.9 - ripple } else { 0.1 + ripple });
        }
    }
    image
}

fn print_labels(segmenter: &Segmenter<FixedShape<2>>) {
    for row in 0..H {
        let line: String = (0..W)
            .map(|col| {
                if segmenter.label_at(&[row, col]).unwrap() == 1 {
                    '#'
                } else {
                    '.'
                }
            })
            .collect();
        println!("{line}");
    }
    println!();
}

fn main() -> Result<()> {
    env_logger::init();

    let mut segmenter = Segmenter::new(FixedShape::new([H, W])?);
    segmenter.build_capacities(&CapacityModel::new(0.15, 1.0)?, &synthetic_image())?;

    println!("first strokes: one dab inside the disc, one in the background");
    segmenter.set_inside([[8u32, 12]])?;
    segmenter.set_outside([[0u32, 0]])?;
    segmenter.update_gc();
    print_labels(&segmenter);

    println!("corrective stroke: mark the lower-right corner as background");
    segmenter.set_outside((13..16).map(|row| [row, W - 1]))?;
    segmenter.update_gc();
    print_labels(&segmenter);

    println!("erase part of the corrective stroke and re-run");
    segmenter.erase([[14u32, W - 1]])?;
    segmenter.update_gc();
    print_labels(&segmenter);

    println!(
        "total flow pushed: {:.4} (cut value {:.4})",
        segmenter.flow(),
        voxelcut::cut_value(segmenter.grid())
    );
    Ok(())
}
