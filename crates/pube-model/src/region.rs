//! Boolean region algebra over surface half-spaces.
//!
//! Regions compose with `&` (intersection), `|` (union) and `!`
//! (complement). The positive half-space of a surface is `f(p) >= 0` and
//! the negative one is `f(p) < 0`, so the two halves of a surface are exact
//! complements and `pos(inner) & neg(outer)` is the half-open slab
//! `[inner, outer)`.

use std::collections::BTreeSet;
use std::ops::{BitAnd, BitOr, Not};

use serde::{Deserialize, Serialize};

use crate::surface::{Point, Surface, SurfaceId};

/// Side of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    /// `f(p) >= 0`.
    Positive,
    /// `f(p) < 0`.
    Negative,
}

impl Sense {
    fn admits(self, value: f64) -> bool {
        match self {
            Sense::Positive => value >= 0.0,
            Sense::Negative => value < 0.0,
        }
    }
}

/// Boolean expression tree over surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Region {
    /// One side of a surface.
    HalfSpace {
        /// Bounding surface.
        surface: SurfaceId,
        /// Selected side.
        sense: Sense,
    },
    /// Points inside every operand.
    Intersection(Vec<Region>),
    /// Points inside at least one operand.
    Union(Vec<Region>),
    /// Points outside the operand.
    Complement(Box<Region>),
}

impl Region {
    /// Positive half-space of `surface`.
    pub fn pos(surface: SurfaceId) -> Self {
        Region::HalfSpace {
            surface,
            sense: Sense::Positive,
        }
    }

    /// Negative half-space of `surface`.
    pub fn neg(surface: SurfaceId) -> Self {
        Region::HalfSpace {
            surface,
            sense: Sense::Negative,
        }
    }

    /// Union of all `regions`; an empty union contains nothing.
    pub fn union_of(regions: impl IntoIterator<Item = Region>) -> Self {
        Region::Union(regions.into_iter().collect())
    }

    /// Whether `point` lies inside the region.
    ///
    /// `surfaces` is indexed by [`SurfaceId`]; a half-space on a surface
    /// missing from the slice contains nothing.
    pub fn contains(&self, surfaces: &[Surface], point: &Point) -> bool {
        match self {
            Region::HalfSpace { surface, sense } => surfaces
                .get(surface.index())
                .map_or(false, |s| sense.admits(s.evaluate(point))),
            Region::Intersection(parts) => parts.iter().all(|part| part.contains(surfaces, point)),
            Region::Union(parts) => parts.iter().any(|part| part.contains(surfaces, point)),
            Region::Complement(inner) => !inner.contains(surfaces, point),
        }
    }

    /// Every surface referenced by the expression.
    pub fn surfaces(&self) -> BTreeSet<SurfaceId> {
        let mut out = BTreeSet::new();
        self.collect_surfaces(&mut out);
        out
    }

    fn collect_surfaces(&self, out: &mut BTreeSet<SurfaceId>) {
        match self {
            Region::HalfSpace { surface, .. } => {
                out.insert(*surface);
            }
            Region::Intersection(parts) | Region::Union(parts) => {
                for part in parts {
                    part.collect_surfaces(out);
                }
            }
            Region::Complement(inner) => inner.collect_surfaces(out),
        }
    }
}

impl BitAnd for Region {
    type Output = Region;

    fn bitand(self, rhs: Region) -> Region {
        match (self, rhs) {
            (Region::Intersection(mut lhs), Region::Intersection(rhs)) => {
                lhs.extend(rhs);
                Region::Intersection(lhs)
            }
            (Region::Intersection(mut lhs), rhs) => {
                lhs.push(rhs);
                Region::Intersection(lhs)
            }
            (lhs, Region::Intersection(mut rhs)) => {
                rhs.insert(0, lhs);
                Region::Intersection(rhs)
            }
            (lhs, rhs) => Region::Intersection(vec![lhs, rhs]),
        }
    }
}

impl BitOr for Region {
    type Output = Region;

    fn bitor(self, rhs: Region) -> Region {
        match (self, rhs) {
            (Region::Union(mut lhs), Region::Union(rhs)) => {
                lhs.extend(rhs);
                Region::Union(lhs)
            }
            (Region::Union(mut lhs), rhs) => {
                lhs.push(rhs);
                Region::Union(lhs)
            }
            (lhs, Region::Union(mut rhs)) => {
                rhs.insert(0, lhs);
                Region::Union(rhs)
            }
            (lhs, rhs) => Region::Union(vec![lhs, rhs]),
        }
    }
}

impl Not for Region {
    type Output = Region;

    fn not(self) -> Region {
        match self {
            Region::Complement(inner) => *inner,
            Region::HalfSpace { surface, sense } => Region::HalfSpace {
                surface,
                sense: match sense {
                    Sense::Positive => Sense::Negative,
                    Sense::Negative => Sense::Positive,
                },
            },
            other => Region::Complement(Box::new(other)),
        }
    }
}
