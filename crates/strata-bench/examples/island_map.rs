//! End-to-end map generation example.
//!
//! Demonstrates: profile → deferred pipeline → finalize → inspect →
//! export a greyscale PNG.

use std::env;
use std::time::Instant;

use strata_bench::{generate, reference_profile};
use strata_graph::PipelineConfig;
use strata_grid::RasterScale;

fn main() {
    println!("=== Strata Island Map Example ===\n");

    let seed = env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42u64);
    let profile = reference_profile(seed);
    println!(
        "Profile: {0}x{0}, {1:?} symmetry, seed {2}",
        profile.size, profile.symmetry, profile.seed
    );

    for workers in [1usize, 4] {
        let started = Instant::now();
        let map = generate(&profile, PipelineConfig::with_workers(workers))
            .expect("map generation failed");
        let bounds = map.component_bounds();
        println!(
            "  workers={workers}: {:?}, heights [{:.2}, {:.2}], mean {:.3}, digest {}",
            started.elapsed(),
            bounds[0].0,
            bounds[0].1,
            map.mean().unwrap_or(0.0),
            &map.digest()[..16],
        );
        assert!(map.is_symmetric(), "map lost its symmetry");

        if workers == 1 {
            let path = env::temp_dir().join(format!("strata_island_{seed}.png"));
            match map
                .to_luma8(RasterScale::Auto)
                .map(|img| img.save(&path))
            {
                Ok(Ok(())) => println!("  wrote {}", path.display()),
                Ok(Err(e)) => println!("  could not write {}: {e}", path.display()),
                Err(e) => println!("  could not rasterize: {e}"),
            }
        }
    }

    println!("\n=== Example complete ===");
}
