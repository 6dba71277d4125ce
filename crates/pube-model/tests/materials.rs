use pube_core::config::{
    ConstituentConfig, ConstituentKind, ExperimentConfig, FractionBasis, MaterialConfig,
};
use pube_model::{Constituent, Material, MaterialCatalog};

#[test]
fn reference_catalog_holds_experiment_materials() {
    let catalog = MaterialCatalog::reference();
    assert_eq!(catalog.len(), 5);
    let cr39 = catalog.get("cr39").expect("cr39");
    assert_eq!(cr39.name, "CR39_Detector");
    assert_eq!(cr39.density_g_cm3, 1.32);

    let fractions = cr39.normalized_fractions();
    let total: f64 = fractions.iter().map(|(_, f)| f).sum();
    assert!((total - 1.0).abs() < 1e-12);
    assert_eq!(fractions[0].0, "C");
    assert!((fractions[0].1 - 12.0 / 37.0).abs() < 1e-12);
}

#[test]
fn unknown_material_is_a_config_error() {
    let err = MaterialCatalog::reference().get("lead").unwrap_err();
    assert_eq!(err.code(), "unknown-material");
    assert!(err.info().hint.as_deref().unwrap_or("").contains("cr39"));
}

#[test]
fn config_materials_replace_and_extend() {
    let mut config = ExperimentConfig::default();
    config.materials = vec![
        MaterialConfig {
            id: "air".into(),
            name: "Dry_Air".into(),
            density_g_cm3: 0.001205,
            basis: FractionBasis::Weight,
            constituents: vec![
                ConstituentConfig {
                    kind: ConstituentKind::Element,
                    symbol: "N".into(),
                    fraction: 0.755,
                },
                ConstituentConfig {
                    kind: ConstituentKind::Element,
                    symbol: "O".into(),
                    fraction: 0.232,
                },
            ],
        },
        MaterialConfig {
            id: "borated_pe".into(),
            name: "BPE".into(),
            density_g_cm3: 1.0,
            basis: FractionBasis::Atom,
            constituents: vec![ConstituentConfig {
                kind: ConstituentKind::Nuclide,
                symbol: "B10".into(),
                fraction: 1.0,
            }],
        },
    ];
    let catalog = MaterialCatalog::from_config(&config).expect("catalog");
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.get("air").expect("air").name, "Dry_Air");
    assert!(catalog.get("borated_pe").is_ok());
}

#[test]
fn invalid_density_is_rejected() {
    let mut config = ExperimentConfig::default();
    config.materials = vec![MaterialConfig {
        id: "ghost".into(),
        name: "Ghost".into(),
        density_g_cm3: 0.0,
        basis: FractionBasis::Atom,
        constituents: vec![ConstituentConfig {
            kind: ConstituentKind::Element,
            symbol: "H".into(),
            fraction: 1.0,
        }],
    }];
    let err = MaterialCatalog::from_config(&config).unwrap_err();
    assert_eq!(err.code(), "material-density");
}

#[test]
fn layer_with_unknown_material_fails_geometry_build() {
    let mut config = ExperimentConfig::default();
    config.shielding.layers[0].material = "unobtainium".into();
    let err = pube_model::build_geometry(&config, &MaterialCatalog::reference()).unwrap_err();
    assert_eq!(err.code(), "unknown-material");
}

#[test]
fn huge_fractions_normalize_without_overflow() {
    let material = Material::new(
        "dense",
        "Dense",
        1.0,
        FractionBasis::Atom,
        vec![
            Constituent {
                kind: ConstituentKind::Element,
                symbol: "C".into(),
                fraction: 1.5e308,
            },
            Constituent {
                kind: ConstituentKind::Element,
                symbol: "H".into(),
                fraction: 1.5e308,
            },
        ],
    )
    .expect("material");
    let fractions = material.normalized_fractions();
    assert_eq!(fractions, vec![("C", 0.5), ("H", 0.5)]);
}
