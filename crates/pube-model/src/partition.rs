//! Sampled check that the cells partition the bounded domain.

use pube_core::errors::{ErrorInfo, PubeError};
use pube_core::rng::RngHandle;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::geometry::{CellId, Geometry, ProbeBox};
use crate::surface::{Point, SurfaceKind};

/// Fraction by which probe boxes are grown so that the faces and the medium
/// immediately around each component are sampled too.
const PROBE_MARGIN: f64 = 0.25;

/// A point claimed by zero or several cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionViolation {
    /// Offending point.
    pub point: Point,
    /// Names of the cells containing it.
    pub cells: Vec<String>,
}

/// Outcome of a partition sampling pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionReport {
    /// Points classified inside the bounding surface.
    pub samples: usize,
    /// Points contained by no cell.
    pub gaps: usize,
    /// Points contained by more than one cell.
    pub overlaps: usize,
    /// First violation encountered, if any.
    pub first_violation: Option<PartitionViolation>,
}

impl PartitionReport {
    /// Whether every sampled point fell in exactly one cell.
    pub fn is_clean(&self) -> bool {
        self.gaps == 0 && self.overlaps == 0
    }
}

struct Classifier<'a> {
    geometry: &'a Geometry,
    report: PartitionReport,
}

impl Classifier<'_> {
    fn classify(&mut self, point: Point) {
        if !self.geometry.in_domain(&point) {
            return;
        }
        self.report.samples += 1;
        let cells: Vec<CellId> = self.geometry.cells_containing(&point);
        match cells.len() {
            1 => return,
            0 => self.report.gaps += 1,
            _ => self.report.overlaps += 1,
        }
        if self.report.first_violation.is_none() {
            self.report.first_violation = Some(PartitionViolation {
                point,
                cells: cells
                    .iter()
                    .map(|id| self.geometry.cell_name(*id).to_string())
                    .collect(),
            });
        }
    }
}

fn sample_in_box(rng: &mut RngHandle, probe: &ProbeBox) -> Point {
    let mut point = [0.0; 3];
    for (axis, coord) in point.iter_mut().enumerate() {
        let (low, high) = (probe.min[axis], probe.max[axis]);
        *coord = if high > low {
            rng.gen_range(low..high)
        } else {
            low
        };
    }
    point
}

/// Classifies sampled points against every cell without failing.
///
/// Draws `samples` points uniformly inside the bounding sphere, `samples`
/// points in each grown probe box, and one point on every stack layer face.
/// Substream 0 drives the sphere, substream `i + 1` drives probe `i`.
pub fn sample_partition(geometry: &Geometry, samples: usize, seed: u64) -> PartitionReport {
    let mut classifier = Classifier {
        geometry,
        report: PartitionReport {
            samples: 0,
            gaps: 0,
            overlaps: 0,
            first_violation: None,
        },
    };

    let (center, radius) = match geometry.boundary().kind() {
        SurfaceKind::Sphere { center, radius } => (*center, *radius),
        _ => ([0.0; 3], 0.0),
    };
    let world = ProbeBox {
        min: [center[0] - radius, center[1] - radius, center[2] - radius],
        max: [center[0] + radius, center[1] + radius, center[2] + radius],
    };
    let mut rng = RngHandle::substream(seed, 0);
    let mut accepted = 0;
    // Rejection sampling keeps roughly 52% of the cube draws.
    let max_draws = samples.saturating_mul(4);
    let mut draws = 0;
    while accepted < samples && draws < max_draws {
        draws += 1;
        let point = sample_in_box(&mut rng, &world);
        if geometry.in_domain(&point) {
            accepted += 1;
            classifier.classify(point);
        }
    }

    for (idx, probe) in geometry.probes().iter().enumerate() {
        let grown = probe.expanded(PROBE_MARGIN);
        let mut rng = RngHandle::substream(seed, idx as u64 + 1);
        for _ in 0..samples {
            classifier.classify(sample_in_box(&mut rng, &grown));
        }
    }

    for layer in geometry.layers() {
        classifier.classify([layer.inner, 0.0, 0.0]);
        classifier.classify([layer.outer, 0.0, 0.0]);
    }

    debug!(
        samples = classifier.report.samples,
        gaps = classifier.report.gaps,
        overlaps = classifier.report.overlaps,
        "partition sampling finished"
    );
    classifier.report
}

/// Samples the partition and fails on any gap or overlap.
pub fn validate_partition(
    geometry: &Geometry,
    samples: usize,
    seed: u64,
) -> Result<PartitionReport, PubeError> {
    let report = sample_partition(geometry, samples, seed);
    if report.is_clean() {
        info!(samples = report.samples, "geometry partition verified");
        return Ok(report);
    }
    warn!(
        gaps = report.gaps,
        overlaps = report.overlaps,
        "geometry partition violated"
    );
    let mut info = ErrorInfo::new(
        "partition-violation",
        "cells do not partition the bounded domain",
    )
    .with_context("samples", report.samples)
    .with_context("gaps", report.gaps)
    .with_context("overlaps", report.overlaps);
    if let Some(violation) = &report.first_violation {
        info = info
            .with_context(
                "point",
                format!(
                    "({}, {}, {})",
                    violation.point[0], violation.point[1], violation.point[2]
                ),
            )
            .with_context("cells", violation.cells.join("+"));
    }
    Err(PubeError::Geometry(
        info.with_hint("check layer thicknesses, gaps and the bounding radius"),
    ))
}
