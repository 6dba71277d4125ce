#![deny(missing_docs)]
#![doc = "Materials, constructive solid geometry and source description of the PuBe shield experiment."]

pub mod builder;
/// Surfaces, cells and point queries.
pub mod geometry;
pub mod material;
pub mod model;
pub mod partition;
pub mod region;
/// Surface primitives.
pub mod surface;
pub mod source;

pub use builder::{build_geometry, stack_layout, GeometryBuilder};
pub use geometry::{Cell, CellId, Geometry, LayerPlacement, ProbeBox};
pub use material::{Constituent, Material, MaterialCatalog};
pub use model::{EngineModel, TallyDefinition};
pub use partition::{sample_partition, validate_partition, PartitionReport, PartitionViolation};
pub use region::{Region, Sense};
pub use source::{
    AngularDistribution, Interpolation, SourceSpecification, SpatialDistribution, TabularEnergy,
    Uniform,
};
pub use surface::{Axis, BoundaryCondition, Point, Surface, SurfaceId, SurfaceKind};
