use std::collections::BTreeSet;

use pube_core::errors::{ErrorInfo, PubeError};
use serde::{Deserialize, Serialize};

use crate::region::Region;
use crate::surface::{Point, Surface, SurfaceId};

/// Identifier of a cell within a [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellId(u32);

impl CellId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u32 {
        self.0
    }
}

/// A region filled with one material (or void when `fill` is `None`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell identifier; cells are evaluated in id order.
    pub id: CellId,
    /// Cell name.
    pub name: String,
    /// Material id from the catalog.
    pub fill: Option<String>,
    /// Region occupied by the cell.
    pub region: Region,
}

/// Axis-aligned box used to concentrate partition samples on small cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeBox {
    /// Lower corner.
    pub min: Point,
    /// Upper corner.
    pub max: Point,
}

impl ProbeBox {
    /// Box grown by `fraction` of its extent on every side.
    pub fn expanded(&self, fraction: f64) -> Self {
        let mut min = self.min;
        let mut max = self.max;
        for axis in 0..3 {
            let pad = (self.max[axis] - self.min[axis]) * fraction;
            min[axis] -= pad;
            max[axis] += pad;
        }
        Self { min, max }
    }
}

/// Placement of one stack layer along the thickness axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerPlacement {
    /// Cell name.
    pub name: String,
    /// Material id.
    pub material: String,
    /// Front face position.
    pub inner: f64,
    /// Back face position.
    pub outer: f64,
    /// Configured thickness.
    pub thickness: f64,
}

/// Surfaces plus an ordered cell list partitioning the bounded domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    surfaces: Vec<Surface>,
    cells: Vec<Cell>,
    boundary: SurfaceId,
    layers: Vec<LayerPlacement>,
    probes: Vec<ProbeBox>,
    detector: CellId,
}

impl Geometry {
    pub(crate) fn new(
        surfaces: Vec<Surface>,
        cells: Vec<Cell>,
        boundary: SurfaceId,
        layers: Vec<LayerPlacement>,
        probes: Vec<ProbeBox>,
        detector: CellId,
    ) -> Result<Self, PubeError> {
        if let Some(pos) = surfaces
            .iter()
            .enumerate()
            .position(|(idx, surface)| surface.id().index() != idx)
        {
            return Err(PubeError::Geometry(
                ErrorInfo::new("surface-order", "surfaces must be stored in id order")
                    .with_context("position", pos),
            ));
        }
        let known: BTreeSet<SurfaceId> = surfaces.iter().map(Surface::id).collect();
        for cell in &cells {
            if let Some(missing) = cell.region.surfaces().difference(&known).next() {
                return Err(PubeError::Geometry(
                    ErrorInfo::new("unknown-surface", "cell region references a missing surface")
                        .with_context("cell", &cell.name)
                        .with_context("surface", missing.as_raw()),
                ));
            }
        }
        if !known.contains(&boundary) {
            return Err(PubeError::Geometry(
                ErrorInfo::new("unknown-surface", "bounding surface is missing")
                    .with_context("surface", boundary.as_raw()),
            ));
        }
        Ok(Self {
            surfaces,
            cells,
            boundary,
            layers,
            probes,
            detector,
        })
    }

    /// All surfaces, indexed by [`SurfaceId`].
    pub fn surfaces(&self) -> &[Surface] {
        &self.surfaces
    }

    /// Cells in evaluation order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Looks up a cell by name.
    pub fn cell_by_name(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.name == name)
    }

    /// Looks up a surface by name.
    pub fn surface_by_name(&self, name: &str) -> Option<&Surface> {
        self.surfaces.iter().find(|surface| surface.name() == name)
    }

    /// The vacuum bounding surface.
    pub fn boundary(&self) -> &Surface {
        &self.surfaces[self.boundary.index()]
    }

    /// Stack layers front to back; the detector is last.
    pub fn layers(&self) -> &[LayerPlacement] {
        &self.layers
    }

    /// Sampling envelopes of the non-medium components.
    pub fn probes(&self) -> &[ProbeBox] {
        &self.probes
    }

    /// The tallied detector cell.
    pub fn detector_cell(&self) -> CellId {
        self.detector
    }

    /// Whether `point` is strictly inside the bounding surface.
    pub fn in_domain(&self, point: &Point) -> bool {
        self.boundary().evaluate(point) < 0.0
    }

    /// First cell, in evaluation order, whose region contains `point`.
    pub fn find_cell(&self, point: &Point) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|cell| cell.region.contains(&self.surfaces, point))
    }

    /// Every cell whose region contains `point`.
    pub fn cells_containing(&self, point: &Point) -> Vec<CellId> {
        self.cells
            .iter()
            .filter(|cell| cell.region.contains(&self.surfaces, point))
            .map(|cell| cell.id)
            .collect()
    }

    pub(crate) fn cell_name(&self, id: CellId) -> &str {
        self.cells
            .iter()
            .find(|cell| cell.id == id)
            .map_or("?", |cell| cell.name.as_str())
    }
}
