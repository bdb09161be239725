//! Randomized algorithm sequences keep a perfect spawn symmetry intact.

use proptest::prelude::*;
use strata_grid::Grid;
use strata_ops::prelude::*;
use strata_ops::PathParams;
use strata_symmetry::{Symmetry, SymmetryRole, SymmetrySettings};

const PERFECT: [Symmetry; 8] = [
    Symmetry::Point2,
    Symmetry::Point4,
    Symmetry::X,
    Symmetry::Z,
    Symmetry::Xz,
    Symmetry::Zx,
    Symmetry::Quad,
    Symmetry::Diag,
];

#[derive(Clone, Debug)]
enum Op {
    Walk(usize, usize),
    Progressive(usize, usize),
    Inflate(u8),
    Deflate(u8),
    Erode,
    Dilute,
    Blur(usize),
    RemoveSmall(usize),
    FillSmall(usize),
    FillGaps(u8),
    Path,
    Space,
    Outline,
    CutCorners,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1usize..3, 1usize..30).prop_map(|(w, s)| Op::Walk(w, s)),
        (1usize..3, 1usize..30).prop_map(|(w, s)| Op::Progressive(w, s)),
        (0u8..3).prop_map(Op::Inflate),
        (0u8..3).prop_map(Op::Deflate),
        Just(Op::Erode),
        Just(Op::Dilute),
        (0usize..3).prop_map(Op::Blur),
        (0usize..8).prop_map(Op::RemoveSmall),
        (0usize..8).prop_map(Op::FillSmall),
        (1u8..6).prop_map(Op::FillGaps),
        Just(Op::Path),
        Just(Op::Space),
        Just(Op::Outline),
        Just(Op::CutCorners),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn algorithms_preserve_symmetry(
        sym_idx in 0usize..8,
        size in 4usize..20,
        seed in any::<u64>(),
        ops in prop::collection::vec(op(), 1..8),
    ) {
        let mut g = Grid::<bool>::builder(size)
            .seed(seed)
            .symmetry(SymmetrySettings::uniform(PERFECT[sym_idx]))
            .name("mask")
            .build()
            .unwrap();
        let params = PathParams::builder()
            .max_step_size(2.0)
            .max_angle_error(0.5)
            .build()
            .unwrap();
        for op in ops {
            match &op {
                Op::Walk(w, s) => g.random_walk(*w, *s).unwrap(),
                Op::Progressive(w, s) => g.progressive_walk(*w, *s).unwrap(),
                Op::Inflate(r) => g.inflate(f32::from(*r)),
                Op::Deflate(r) => g.deflate(f32::from(*r)),
                Op::Erode => g.erode(0.5, 1).unwrap(),
                Op::Dilute => g.dilute(0.5, 1).unwrap(),
                Op::Blur(r) => g.blur(*r),
                Op::RemoveSmall(k) => g.remove_areas_smaller_than(*k),
                Op::FillSmall(k) => g.fill_areas_smaller_than(*k),
                Op::FillGaps(w) => g.fill_gaps(f32::from(*w)).unwrap(),
                Op::Path => {
                    let start = g.random_point(SymmetryRole::Spawn).unwrap();
                    let end = g.random_point(SymmetryRole::Spawn).unwrap();
                    g.path(start, end, &params).unwrap();
                }
                Op::Space => g.space(1.0, 3.0).unwrap(),
                Op::Outline => g.outline(),
                Op::CutCorners => g.cut_corners(),
            }
            prop_assert!(g.is_symmetric(), "{:?} broke {:?} symmetry", op, g.symmetry().spawn());
        }
    }
}
