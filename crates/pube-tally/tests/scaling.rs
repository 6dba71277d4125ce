use pube_core::config::ExperimentConfig;
use pube_tally::{aggregate, EnergyGroup, Measurement, ScalingInputs, TallyBin};
use proptest::prelude::*;

fn unit_inputs() -> ScalingInputs {
    ScalingInputs {
        source_rate: 1.0,
        detector_volume: 1.0,
        detector_area: 1.0,
        exposure_seconds: 1.0,
    }
}

fn bins(values: &[(f64, f64)]) -> Vec<TallyBin> {
    values
        .iter()
        .enumerate()
        .map(|(idx, (mean, std))| TallyBin::new(idx, *mean, *std))
        .collect()
}

#[test]
fn unit_inputs_sum_two_bins() {
    let result = aggregate(&unit_inputs(), &bins(&[(1.0, 0.1), (2.0, 0.2)])).expect("aggregate");
    let expected_unc = (0.1f64 * 0.1 + 0.2 * 0.2).sqrt();

    assert!((result.total.flux.mean - 3.0).abs() < 1e-12);
    assert!((result.total.flux.uncertainty - expected_unc).abs() < 1e-12);
    assert!((result.total.count.mean - 3.0).abs() < 1e-12);
    assert!((result.total.count.uncertainty - expected_unc).abs() < 1e-12);
    assert!((expected_unc - 0.2236).abs() < 1e-4);
}

#[test]
fn unit_scale_is_identity() {
    let inputs = ScalingInputs {
        source_rate: 7.5,
        detector_volume: 7.5,
        detector_area: 2.0,
        exposure_seconds: 10.0,
    };
    let raw = bins(&[(0.3, 0.01), (4.0, 0.5), (1.0e-7, 1.0e-9)]);
    let result = aggregate(&inputs, &raw).expect("aggregate");
    assert_eq!(result.flux_scale, 1.0);
    for (bin, scaled) in raw.iter().zip(&result.bins) {
        assert_eq!(scaled.flux.mean, bin.mean);
        assert_eq!(scaled.flux.uncertainty, bin.std_dev);
        assert!((scaled.count.mean - bin.mean * 20.0).abs() <= 1e-12 * bin.mean.abs().max(1.0));
    }
}

#[test]
fn reference_experiment_scales() {
    let inputs = ScalingInputs::from_config(&ExperimentConfig::default());
    assert!((inputs.source_rate - 8.75e5).abs() < 1e-6);
    assert!((inputs.exposure_seconds - 86_400.0).abs() < 1e-9);

    let result = aggregate(&inputs, &bins(&[(0.0072, 0.00072)])).expect("aggregate");
    // raw 0.0072 cm over V = 0.0072 cm^3 gives one unit of S.
    assert!((result.bins[0].flux.mean - 8.75e5).abs() < 1e-3);
    let count = 8.75e5 * 86_400.0 * 0.048;
    assert!((result.bins[0].count.mean - count).abs() / count < 1e-12);
}

#[test]
fn positional_labels() {
    let raw = bins(&[(1.0, 0.0); 6]);
    let result = aggregate(&unit_inputs(), &raw).expect("aggregate");
    let groups: Vec<EnergyGroup> = result.bins.iter().map(|bin| bin.group).collect();
    assert_eq!(
        groups,
        vec![
            EnergyGroup::Thermal,
            EnergyGroup::Epithermal,
            EnergyGroup::Intermediate,
            EnergyGroup::Fast,
            EnergyGroup::Other,
            EnergyGroup::Other,
        ]
    );
    assert_eq!(raw[4].label(), "Other");
    assert_eq!(raw[4].range(), "--");
    assert_eq!(raw[1].range(), "0.025-0.5 eV");
}

#[test]
fn zero_volume_is_config_error() {
    let mut inputs = unit_inputs();
    inputs.detector_volume = 0.0;
    let err = aggregate(&inputs, &bins(&[(1.0, 0.1)])).expect_err("zero volume");
    assert_eq!(err.code(), "zero-volume");
    assert!(matches!(err, pube_core::PubeError::Config(_)));
}

#[test]
fn non_finite_inputs_rejected() {
    let mut inputs = unit_inputs();
    inputs.source_rate = f64::NAN;
    let err = aggregate(&inputs, &[]).expect_err("nan rate");
    assert_eq!(err.code(), "invalid-scaling");
    assert_eq!(err.info().context.get("field").map(String::as_str), Some("source_rate"));

    let mut inputs = unit_inputs();
    inputs.exposure_seconds = -1.0;
    assert_eq!(
        aggregate(&inputs, &[]).expect_err("negative time").code(),
        "invalid-scaling"
    );
}

#[test]
fn empty_bins_give_zero_total() {
    let result = aggregate(&unit_inputs(), &[]).expect("aggregate");
    assert!(result.bins.is_empty());
    assert_eq!(result.total.flux.mean, 0.0);
    assert_eq!(result.total.count.uncertainty, 0.0);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn total_uncertainty_ignores_bin_order(
        values in prop::collection::vec((0.0f64..1.0e3, 0.0f64..1.0e2), 1..12),
        rotate in 0usize..12,
    ) {
        let forward: Vec<Measurement> = values
            .iter()
            .map(|(mean, unc)| Measurement { mean: *mean, uncertainty: *unc })
            .collect();
        let mut shuffled = forward.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left(rotate % len);

        let a = Measurement::sum_independent(forward.iter().copied());
        let b = Measurement::sum_independent(shuffled.iter().copied());
        let rss = values.iter().map(|(_, unc)| unc * unc).sum::<f64>().sqrt();

        prop_assert!((a.uncertainty - b.uncertainty).abs() <= 1e-9 * rss.max(1.0));
        prop_assert!((a.uncertainty - rss).abs() <= 1e-9 * rss.max(1.0));
        prop_assert!((a.mean - b.mean).abs() <= 1e-9 * a.mean.abs().max(1.0));
    }
}
