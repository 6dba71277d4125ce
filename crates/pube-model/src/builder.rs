//! Construction of the source/shield/detector geometry.

use pube_core::config::ExperimentConfig;
use pube_core::errors::{ErrorInfo, PubeError};
use tracing::{debug, info};

use crate::geometry::{Cell, CellId, Geometry, LayerPlacement, ProbeBox};
use crate::material::MaterialCatalog;
use crate::region::Region;
use crate::surface::{Axis, BoundaryCondition, Surface, SurfaceId, SurfaceKind};

/// Incremental surface and cell registry.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    surfaces: Vec<Surface>,
    cells: Vec<Cell>,
    probes: Vec<ProbeBox>,
}

impl GeometryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a transmissive surface.
    pub fn add_surface(&mut self, name: &str, kind: SurfaceKind) -> SurfaceId {
        self.push_surface(name, kind, BoundaryCondition::Transmission)
    }

    /// Registers a vacuum boundary surface.
    pub fn add_vacuum_surface(&mut self, name: &str, kind: SurfaceKind) -> SurfaceId {
        self.push_surface(name, kind, BoundaryCondition::Vacuum)
    }

    fn push_surface(
        &mut self,
        name: &str,
        kind: SurfaceKind,
        boundary: BoundaryCondition,
    ) -> SurfaceId {
        let id = SurfaceId::from_raw(self.surfaces.len() as u32);
        self.surfaces
            .push(Surface::new(id, name.to_string(), kind, boundary));
        id
    }

    /// Appends a cell; cells are evaluated in insertion order.
    pub fn add_cell(&mut self, name: &str, fill: Option<&str>, region: Region) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        self.cells.push(Cell {
            id,
            name: name.to_string(),
            fill: fill.map(str::to_string),
            region,
        });
        id
    }

    /// Records a sampling envelope for partition validation.
    pub fn add_probe(&mut self, probe: ProbeBox) {
        self.probes.push(probe);
    }

    /// Finalises the geometry.
    pub fn finish(
        self,
        boundary: SurfaceId,
        layers: Vec<LayerPlacement>,
        detector: CellId,
    ) -> Result<Geometry, PubeError> {
        Geometry::new(
            self.surfaces,
            self.cells,
            boundary,
            layers,
            self.probes,
            detector,
        )
    }
}

/// Computes the stack layer faces by accumulation.
///
/// The first front face sits `shielding.gap_cm` beyond the source surface;
/// every later front face sits `shielding.interlayer_gap_cm` beyond the
/// previous back face. The detector layer closes the stack.
pub fn stack_layout(config: &ExperimentConfig) -> Vec<LayerPlacement> {
    let shield_layers = config
        .shielding
        .layers
        .iter()
        .map(|layer| (&layer.name, &layer.material, layer.thickness_cm));
    let detector = std::iter::once((
        &config.detector.name,
        &config.detector.material,
        config.detector.thickness_cm,
    ));

    let mut cursor = config.source.radius_cm;
    let mut gap = config.shielding.gap_cm;
    let mut placements = Vec::with_capacity(config.shielding.layers.len() + 1);
    for (name, material, thickness) in shield_layers.chain(detector) {
        let inner = cursor + gap;
        let outer = inner + thickness;
        placements.push(LayerPlacement {
            name: name.clone(),
            material: material.clone(),
            inner,
            outer,
            thickness,
        });
        cursor = outer;
        gap = config.shielding.interlayer_gap_cm;
    }
    placements
}

fn check_layout(config: &ExperimentConfig, layers: &[LayerPlacement]) -> Result<(), PubeError> {
    let mut previous = config.source.radius_cm;
    for layer in layers {
        if !(layer.inner >= previous && layer.outer > layer.inner) {
            return Err(PubeError::Geometry(
                ErrorInfo::new("layer-order", "stack layers overlap or are inverted")
                    .with_context("layer", &layer.name)
                    .with_context("inner", layer.inner)
                    .with_context("outer", layer.outer)
                    .with_context("previous_outer", previous),
            ));
        }
        previous = layer.outer;
    }
    Ok(())
}

/// Builds the experiment geometry: source cylinder, shield layers, detector
/// and the surrounding medium bounded by a vacuum sphere.
pub fn build_geometry(
    config: &ExperimentConfig,
    catalog: &MaterialCatalog,
) -> Result<Geometry, PubeError> {
    config.validate()?;
    let layers = stack_layout(config);
    check_layout(config, &layers)?;

    catalog.get(&config.source.material)?;
    catalog.get(&config.world.medium)?;
    for layer in &layers {
        catalog.get(&layer.material)?;
    }

    let mut builder = GeometryBuilder::new();

    let radius = config.source.radius_cm;
    let half_height = config.source.height_cm / 2.0;
    let cyl_src = builder.add_surface(
        "source_cylinder",
        SurfaceKind::Cylinder {
            axis: Axis::Z,
            center: [0.0, 0.0],
            radius,
        },
    );
    let src_bottom = builder.add_surface(
        "source_bottom",
        SurfaceKind::Plane {
            axis: Axis::Z,
            offset: -half_height,
        },
    );
    let src_top = builder.add_surface(
        "source_top",
        SurfaceKind::Plane {
            axis: Axis::Z,
            offset: half_height,
        },
    );
    let source_region = Region::neg(cyl_src) & Region::pos(src_bottom) & Region::neg(src_top);

    let half_side = config.detector_side() / 2.0;
    let y_min = builder.add_surface(
        "stack_y_min",
        SurfaceKind::Plane {
            axis: Axis::Y,
            offset: -half_side,
        },
    );
    let y_max = builder.add_surface(
        "stack_y_max",
        SurfaceKind::Plane {
            axis: Axis::Y,
            offset: half_side,
        },
    );
    let z_min = builder.add_surface(
        "stack_z_min",
        SurfaceKind::Plane {
            axis: Axis::Z,
            offset: -half_side,
        },
    );
    let z_max = builder.add_surface(
        "stack_z_max",
        SurfaceKind::Plane {
            axis: Axis::Z,
            offset: half_side,
        },
    );
    let transverse_box =
        Region::pos(y_min) & Region::neg(y_max) & Region::pos(z_min) & Region::neg(z_max);

    let mut layer_regions = Vec::with_capacity(layers.len());
    let mut previous_back: Option<(SurfaceId, f64)> = None;
    for layer in &layers {
        let front = match previous_back {
            Some((id, offset)) if offset == layer.inner => id,
            _ => builder.add_surface(
                &format!("{}_front", layer.name),
                SurfaceKind::Plane {
                    axis: Axis::X,
                    offset: layer.inner,
                },
            ),
        };
        let back = builder.add_surface(
            &format!("{}_back", layer.name),
            SurfaceKind::Plane {
                axis: Axis::X,
                offset: layer.outer,
            },
        );
        previous_back = Some((back, layer.outer));
        layer_regions.push(Region::pos(front) & Region::neg(back) & transverse_box.clone());
        debug!(
            layer = %layer.name,
            inner = layer.inner,
            outer = layer.outer,
            "placed stack layer"
        );
    }

    let boundary = builder.add_vacuum_surface(
        "world_boundary",
        SurfaceKind::Sphere {
            center: [0.0, 0.0, 0.0],
            radius: config.world.boundary_radius_cm,
        },
    );

    let components =
        std::iter::once(source_region.clone()).chain(layer_regions.iter().cloned());
    let medium_region = !Region::union_of(components) & Region::neg(boundary);

    builder.add_cell("source", Some(&config.source.material), source_region);
    builder.add_probe(ProbeBox {
        min: [-radius, -radius, -half_height],
        max: [radius, radius, half_height],
    });
    let mut detector = None;
    for (layer, region) in layers.iter().zip(layer_regions) {
        let id = builder.add_cell(&layer.name, Some(&layer.material), region);
        builder.add_probe(ProbeBox {
            min: [layer.inner, -half_side, -half_side],
            max: [layer.outer, half_side, half_side],
        });
        detector = Some(id);
    }
    builder.add_cell("medium", Some(&config.world.medium), medium_region);

    let detector = detector.ok_or_else(|| {
        PubeError::Geometry(ErrorInfo::new("no-detector", "stack has no detector layer"))
    })?;
    let geometry = builder.finish(boundary, layers, detector)?;
    info!(
        surfaces = geometry.surfaces().len(),
        cells = geometry.cells().len(),
        "built experiment geometry"
    );
    Ok(geometry)
}
