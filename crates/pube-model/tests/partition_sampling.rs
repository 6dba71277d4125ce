use pube_core::config::ExperimentConfig;
use pube_model::{
    build_geometry, sample_partition, validate_partition, Axis, GeometryBuilder,
    MaterialCatalog, Region, SurfaceKind,
};
use proptest::prelude::*;

fn reference_geometry() -> pube_model::Geometry {
    build_geometry(&ExperimentConfig::default(), &MaterialCatalog::reference()).expect("geometry")
}

#[test]
fn reference_geometry_partitions_the_domain() {
    let geometry = reference_geometry();
    let report = validate_partition(&geometry, 5_000, 11).expect("clean partition");
    assert!(report.is_clean());
    // sphere draws plus four probe boxes plus six face points
    assert!(report.samples > 5 * 5_000);
}

#[test]
fn point_queries_find_expected_cells() {
    let geometry = reference_geometry();
    let name_at = |point: [f64; 3]| geometry.find_cell(&point).map(|cell| cell.name.clone());

    assert_eq!(name_at([0.0, 0.0, 0.0]).as_deref(), Some("source"));
    assert_eq!(name_at([0.0, 0.4, 1.1]).as_deref(), Some("source"));
    assert_eq!(name_at([5.502, 0.0, 0.0]).as_deref(), Some("PP_Shield"));
    assert_eq!(name_at([5.5, 0.0, 0.0]).as_deref(), Some("PP_Shield"));
    assert_eq!(name_at([5.505, 0.05, -0.05]).as_deref(), Some("PE_Shield"));
    assert_eq!(name_at([5.6, 0.0, 0.0]).as_deref(), Some("CR39_Detector"));
    assert_eq!(name_at([5.6, 0.2, 0.0]).as_deref(), Some("medium"));
    assert_eq!(name_at([0.0, 0.0, 1.3]).as_deref(), Some("medium"));
    assert_eq!(name_at([60.0, 0.0, 0.0]), None);

    let back = geometry.layers().last().expect("detector layer").outer;
    assert_eq!(name_at([back, 0.0, 0.0]).as_deref(), Some("medium"));
}

#[test]
fn detector_cell_is_the_last_stack_layer() {
    let geometry = reference_geometry();
    let detector = geometry.detector_cell();
    let cell = geometry
        .cells()
        .iter()
        .find(|cell| cell.id == detector)
        .expect("detector cell");
    assert_eq!(cell.name, "CR39_Detector");
    assert_eq!(cell.fill.as_deref(), Some("cr39"));
    assert_eq!(
        geometry.boundary().boundary(),
        pube_model::BoundaryCondition::Vacuum
    );
}

#[test]
fn every_sampled_point_has_exactly_one_cell() {
    let geometry = reference_geometry();
    for probe in geometry.probes() {
        let steps = 7;
        for i in 0..=steps {
            for j in 0..=steps {
                let x = probe.min[0] + (probe.max[0] - probe.min[0]) * i as f64 / steps as f64;
                let y = probe.min[1] + (probe.max[1] - probe.min[1]) * j as f64 / steps as f64;
                let point = [x, y, 0.0];
                assert_eq!(geometry.cells_containing(&point).len(), 1, "point {point:?}");
            }
        }
    }
}

fn slab_geometry(a_back: f64, b_front: f64) -> pube_model::Geometry {
    let mut builder = GeometryBuilder::new();
    let a_plane = builder.add_surface(
        "a_back",
        SurfaceKind::Plane {
            axis: Axis::X,
            offset: a_back,
        },
    );
    let b_plane = builder.add_surface(
        "b_front",
        SurfaceKind::Plane {
            axis: Axis::X,
            offset: b_front,
        },
    );
    let world = builder.add_vacuum_surface(
        "world",
        SurfaceKind::Sphere {
            center: [0.0; 3],
            radius: 10.0,
        },
    );
    builder.add_cell("a", None, Region::neg(a_plane) & Region::neg(world));
    let b = builder.add_cell("b", None, Region::pos(b_plane) & Region::neg(world));
    builder.finish(world, Vec::new(), b).expect("geometry")
}

#[test]
fn overlapping_cells_are_reported() {
    let geometry = slab_geometry(1.0, 0.0);
    let report = sample_partition(&geometry, 2_000, 3);
    assert!(report.overlaps > 0);
    assert_eq!(report.gaps, 0);
    let violation = report.first_violation.expect("violation");
    assert_eq!(violation.cells, vec!["a".to_string(), "b".to_string()]);

    let err = validate_partition(&geometry, 2_000, 3).unwrap_err();
    assert_eq!(err.code(), "partition-violation");
    assert_eq!(err.info().context.get("gaps"), Some(&"0".to_string()));
}

#[test]
fn gaps_between_cells_are_reported() {
    let geometry = slab_geometry(0.0, 1.0);
    let report = sample_partition(&geometry, 2_000, 3);
    assert!(report.gaps > 0);
    assert_eq!(report.overlaps, 0);
    assert!(report.first_violation.expect("violation").cells.is_empty());
}

#[test]
fn sampling_is_deterministic_per_seed() {
    let geometry = slab_geometry(1.0, 0.0);
    assert_eq!(
        sample_partition(&geometry, 500, 9),
        sample_partition(&geometry, 500, 9)
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]
    #[test]
    fn random_stacks_partition_the_domain(
        gap in 0.0f64..10.0,
        interlayer in prop_oneof![Just(0.0f64), 1e-4f64..0.5],
        pp in 1e-4f64..0.5,
        pe in 1e-4f64..0.5,
        det in 1e-3f64..1.0,
        area in 1e-3f64..4.0,
        seed in any::<u64>(),
    ) {
        let mut config = ExperimentConfig::default();
        config.shielding.gap_cm = gap;
        config.shielding.interlayer_gap_cm = interlayer;
        config.shielding.layers[0].thickness_cm = pp;
        config.shielding.layers[1].thickness_cm = pe;
        config.detector.thickness_cm = det;
        config.detector.area_cm2 = area;
        let geometry = build_geometry(&config, &MaterialCatalog::reference()).unwrap();
        let report = sample_partition(&geometry, 300, seed);
        prop_assert!(report.is_clean(), "violation: {:?}", report.first_violation);
    }
}
