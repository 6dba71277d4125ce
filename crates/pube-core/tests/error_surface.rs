use pube_core::errors::{ErrorInfo, PubeError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("surface", "px_2")
        .with_context("offset", 5.5042)
}

#[test]
fn config_error_surface() {
    let err = PubeError::Config(sample_info("zero-volume", "detector volume is zero"));
    assert_eq!(err.code(), "zero-volume");
    assert_eq!(err.info().context.get("surface"), Some(&"px_2".to_string()));
}

#[test]
fn artifact_error_surface() {
    let err = PubeError::Artifact(sample_info("artifact-missing", "statepoint not found"));
    assert_eq!(err.info().code, "artifact-missing");
    assert!(err.info().context.contains_key("offset"));
}

#[test]
fn display_includes_context_and_hint() {
    let err = PubeError::Tally(
        ErrorInfo::new("missing-tally", "tally not present")
            .with_context("tally", "cr39_flux")
            .with_hint("check the tally name"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("tally error: tally not present (code: missing-tally)"));
    assert!(rendered.contains("tally=cr39_flux"));
    assert!(rendered.ends_with("hint: check the tally name"));
}

#[test]
fn errors_round_trip_json() {
    let err = PubeError::Geometry(sample_info("partition-overlap", "two cells overlap"));
    let json = serde_json::to_string(&err).expect("serialize");
    assert!(json.contains("\"family\":\"Geometry\""));
    let decoded: PubeError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}
