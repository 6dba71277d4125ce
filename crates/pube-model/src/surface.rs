use serde::{Deserialize, Serialize};

/// Cartesian point in cm.
pub type Point = [f64; 3];

/// Identifier of a surface within a [`crate::Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurfaceId(u32);

impl SurfaceId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u32 {
        self.0
    }

    pub(crate) fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// The `x` axis (stack thickness axis).
    X,
    /// The `y` axis.
    Y,
    /// The `z` axis (source cylinder axis).
    Z,
}

impl Axis {
    /// Component index of the axis in a [`Point`].
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes perpendicular to `self`, in cyclic order.
    pub fn transverse(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::Z, Axis::X),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }
}

/// Geometric primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceKind {
    /// Infinite plane normal to `axis` at `offset`.
    Plane {
        /// Plane normal.
        axis: Axis,
        /// Position along the normal.
        offset: f64,
    },
    /// Infinite cylinder parallel to `axis`.
    Cylinder {
        /// Cylinder axis direction.
        axis: Axis,
        /// Centre in the two transverse coordinates (see [`Axis::transverse`]).
        center: [f64; 2],
        /// Radius.
        radius: f64,
    },
    /// Sphere.
    Sphere {
        /// Centre.
        center: Point,
        /// Radius.
        radius: f64,
    },
}

impl SurfaceKind {
    /// Implicit function: negative inside a cylinder or sphere and below a
    /// plane, zero on the surface.
    pub fn evaluate(&self, point: &Point) -> f64 {
        match self {
            SurfaceKind::Plane { axis, offset } => point[axis.index()] - offset,
            SurfaceKind::Cylinder {
                axis,
                center,
                radius,
            } => {
                let (u, v) = axis.transverse();
                let du = point[u.index()] - center[0];
                let dv = point[v.index()] - center[1];
                du * du + dv * dv - radius * radius
            }
            SurfaceKind::Sphere { center, radius } => {
                let dx = point[0] - center[0];
                let dy = point[1] - center[1];
                let dz = point[2] - center[2];
                dx * dx + dy * dy + dz * dz - radius * radius
            }
        }
    }
}

/// What happens to particles crossing the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryCondition {
    /// Particles pass through.
    #[default]
    Transmission,
    /// Particles leaving through the surface are killed and never return.
    Vacuum,
}

/// Named, immutable surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    id: SurfaceId,
    name: String,
    kind: SurfaceKind,
    boundary: BoundaryCondition,
}

impl Surface {
    pub(crate) fn new(
        id: SurfaceId,
        name: String,
        kind: SurfaceKind,
        boundary: BoundaryCondition,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            boundary,
        }
    }

    /// Surface identifier.
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Surface name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Primitive and parameters.
    pub fn kind(&self) -> &SurfaceKind {
        &self.kind
    }

    /// Boundary condition.
    pub fn boundary(&self) -> BoundaryCondition {
        self.boundary
    }

    /// Evaluates the implicit function at `point`.
    pub fn evaluate(&self, point: &Point) -> f64 {
        self.kind.evaluate(point)
    }
}
