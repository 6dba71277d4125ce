use pube_core::config::{ExperimentConfig, LayerConfig};
use pube_model::{build_geometry, stack_layout, MaterialCatalog, SurfaceKind};

const TOLERANCE: f64 = 1e-12;

#[test]
fn reference_stack_accumulates_offsets() {
    let config = ExperimentConfig::default();
    let layers = stack_layout(&config);

    let names: Vec<_> = layers.iter().map(|layer| layer.name.as_str()).collect();
    assert_eq!(names, ["PP_Shield", "PE_Shield", "CR39_Detector"]);

    assert!((layers[0].inner - 5.5).abs() < TOLERANCE);
    assert!((layers[0].outer - 5.5042).abs() < TOLERANCE);
    assert!((layers[1].outer - 5.5062).abs() < TOLERANCE);
    assert!((layers[2].outer - 5.6562).abs() < TOLERANCE);

    for pair in layers.windows(2) {
        assert_eq!(pair[1].inner, pair[0].outer, "contiguous stack shares faces");
    }
    for layer in &layers {
        assert!((layer.outer - layer.inner - layer.thickness).abs() < TOLERANCE);
    }
}

#[test]
fn interlayer_gap_is_inserted_between_layers_only() {
    let mut config = ExperimentConfig::default();
    config.shielding.interlayer_gap_cm = 0.01;
    let layers = stack_layout(&config);

    assert!((layers[0].inner - 5.5).abs() < TOLERANCE);
    for pair in layers.windows(2) {
        assert!((pair[1].inner - pair[0].outer - 0.01).abs() < TOLERANCE);
    }
}

#[test]
fn many_thin_layers_do_not_drift() {
    let mut config = ExperimentConfig::default();
    config.shielding.layers = (0..200)
        .map(|idx| LayerConfig {
            name: format!("foil_{idx}"),
            material: "polyethylene".into(),
            thickness_cm: 1.0e-4,
        })
        .collect();
    let layers = stack_layout(&config);

    let mut previous = config.source.radius_cm;
    for layer in &layers {
        assert!(layer.inner >= previous);
        assert!(layer.outer > layer.inner);
        assert!((layer.outer - layer.inner - layer.thickness).abs() < 1e-9);
        previous = layer.outer;
    }
    let expected_back = 5.5 + 200.0 * 1.0e-4 + 0.15;
    assert!((previous - expected_back).abs() < 1e-9);
}

#[test]
fn contiguous_layers_reuse_planes() {
    let config = ExperimentConfig::default();
    let geometry = build_geometry(&config, &MaterialCatalog::reference()).expect("geometry");

    let x_planes: Vec<f64> = geometry
        .surfaces()
        .iter()
        .filter_map(|surface| match surface.kind() {
            SurfaceKind::Plane { axis, offset } if axis.index() == 0 => Some(*offset),
            _ => None,
        })
        .collect();
    assert_eq!(x_planes.len(), 4);
    assert!(x_planes.windows(2).all(|pair| pair[1] > pair[0]));

    // cylinder, two source caps, four transverse planes, four x planes, sphere
    assert_eq!(geometry.surfaces().len(), 12);
}

#[test]
fn gapped_layers_get_their_own_front_planes() {
    let mut config = ExperimentConfig::default();
    config.shielding.interlayer_gap_cm = 0.5;
    let geometry = build_geometry(&config, &MaterialCatalog::reference()).expect("geometry");
    assert_eq!(geometry.surfaces().len(), 14);
}
