#![allow(dead_code)]

use cets_model::model::{
    Annotation, Axis, AxisNameMapping, AxisType, AxisUnit, CoordinateSystem, Dataset, Matrix,
    PointSet3D, Region, Tomogram, Transformation, Vector3D,
};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Frame and transformation names.
pub fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,11}"
}

/// Floats that print and parse back exactly (multiples of 1/64).
pub fn arb_float() -> impl Strategy<Value = f64> {
    (-64_000i32..64_000).prop_map(|n| f64::from(n) / 64.0)
}

pub fn arb_floats(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(arb_float(), len)
}

pub fn arb_matrix<const N: usize>() -> impl Strategy<Value = Matrix<N>> {
    prop::collection::vec(arb_floats(N), N).prop_map(|rows| {
        Matrix::from_rows(&rows).expect("generated rows have the right shape")
    })
}

fn arb_axis(name: &'static str) -> impl Strategy<Value = Axis> {
    (
        prop::option::of(prop_oneof![Just(AxisUnit::PixelVoxel), Just(AxisUnit::Angstrom)]),
        prop::option::of(prop_oneof![Just(AxisType::Space), Just(AxisType::Array)]),
    )
        .prop_map(move |(unit, axis_type)| Axis {
            name: name.to_string(),
            axis_unit: unit,
            axis_type,
        })
}

/// A coordinate system with one to three distinct axes.
pub fn arb_frame() -> impl Strategy<Value = CoordinateSystem> {
    (arb_name(), 1usize..=3)
        .prop_flat_map(|(name, ndim)| {
            let axes: Vec<_> = ["x", "y", "z"][..ndim].iter().map(|a| arb_axis(*a)).collect();
            (Just(name), axes)
        })
        .prop_map(|(name, axes)| CoordinateSystem::new(name, axes).expect("distinct axes"))
}

fn arb_mapping() -> impl Strategy<Value = AxisNameMapping> {
    (prop::option::of(arb_name()), prop::option::of(arb_name())).prop_map(|(a, b)| {
        AxisNameMapping {
            axis1_name: a,
            axis2_name: b,
        }
    })
}

fn arb_leaf_transformation() -> BoxedStrategy<Transformation> {
    prop_oneof![
        Just(Transformation::identity()),
        prop::collection::vec(arb_mapping(), 0..4).prop_map(Transformation::map_axis),
        (1usize..=3)
            .prop_flat_map(arb_floats)
            .prop_map(Transformation::translation),
        (1usize..=3).prop_flat_map(arb_floats).prop_map(Transformation::scale),
        arb_matrix::<3>().prop_map(Transformation::affine),
        arb_matrix::<2>().prop_map(Transformation::rotation2d),
        arb_matrix::<2>().prop_map(Transformation::flip2d),
    ]
    .boxed()
}

fn with_labels(
    tf: impl Strategy<Value = Transformation>,
) -> impl Strategy<Value = Transformation> {
    (
        tf,
        prop::option::of(arb_name()),
        prop::option::of(arb_name()),
        prop::option::of(arb_name()),
    )
        .prop_map(|(mut tf, name, input, output)| {
            tf.name = name;
            tf.input = input;
            tf.output = output;
            tf
        })
}

/// Any transformation, including nested sequences.
pub fn arb_transformation() -> BoxedStrategy<Transformation> {
    with_labels(arb_leaf_transformation())
        .prop_recursive(4, 32, 4, |inner| {
            with_labels(prop::collection::vec(inner, 0..4).prop_map(Transformation::sequence))
        })
        .boxed()
}

fn arb_points(max: usize) -> impl Strategy<Value = Vec<Vector3D>> {
    prop::collection::vec(arb_floats(3), 1..=max).prop_map(|points| {
        points
            .iter()
            .map(|p| Vector3D::from_slice(p).expect("three coordinates"))
            .collect()
    })
}

pub fn arb_tomogram() -> impl Strategy<Value = Tomogram> {
    (
        prop::option::of("[a-z]{1,8}\\.mrc"),
        prop::option::of((1u64..4096, 1u64..4096, 1u64..1024)),
        prop::option::of(arb_float()),
        prop::option::of(prop::collection::vec(arb_frame(), 1..3)),
        prop::option::of(prop::collection::vec(arb_transformation(), 1..3)),
    )
        .prop_map(|(path, dims, voxel_size, frames, transformations)| Tomogram {
            path,
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            depth: dims.map(|d| d.2),
            voxel_size,
            coordinate_systems: frames,
            coordinate_transformations: transformations,
            ..Default::default()
        })
}

pub fn arb_point_annotation() -> impl Strategy<Value = Annotation> {
    (
        prop::option::of("[a-z]{1,8}\\.star"),
        prop::option::of(arb_points(6)),
        prop::option::of(prop::collection::vec(arb_frame(), 1..2)),
    )
        .prop_map(|(path, origin3d, frames)| {
            Annotation::PointSet3D(PointSet3D {
                path,
                origin3d,
                coordinate_systems: frames,
                coordinate_transformations: None,
            })
        })
}

/// Datasets with tomograms and point annotations in a few regions.
pub fn arb_dataset() -> impl Strategy<Value = Dataset> {
    let region = (
        prop::option::of(prop::collection::vec(arb_tomogram(), 0..3)),
        prop::option::of(prop::collection::vec(arb_point_annotation(), 0..3)),
    )
        .prop_map(|(tomograms, annotations)| Region {
            tomograms,
            annotations,
            ..Default::default()
        });

    (
        prop::option::of(arb_name()),
        prop::option::of(prop::collection::vec(region, 0..3)),
    )
        .prop_map(|(name, regions)| Dataset {
            name,
            regions,
            averages: None,
        })
}
