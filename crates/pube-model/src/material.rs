//! Material compositions and the catalog the geometry draws fills from.

use std::collections::BTreeMap;

use pube_core::config::{ConstituentKind, ExperimentConfig, FractionBasis, MaterialConfig};
use pube_core::errors::{ErrorInfo, PubeError};
use serde::{Deserialize, Serialize};

use crate::source::normalize_weights;

/// One element or nuclide entry of a material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    /// Element or nuclide.
    pub kind: ConstituentKind,
    /// Chemical symbol or nuclide name.
    pub symbol: String,
    /// Relative fraction; not required to be normalized.
    pub fraction: f64,
}

/// Named composition with a density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Catalog key.
    pub id: String,
    /// Name handed to the transport engine.
    pub name: String,
    /// Density in g/cm^3.
    pub density_g_cm3: f64,
    /// How `fraction` values are interpreted.
    pub basis: FractionBasis,
    /// Constituents in declaration order.
    pub constituents: Vec<Constituent>,
}

impl Material {
    /// Builds a validated material.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        density_g_cm3: f64,
        basis: FractionBasis,
        constituents: Vec<Constituent>,
    ) -> Result<Self, PubeError> {
        let material = Self {
            id: id.into(),
            name: name.into(),
            density_g_cm3,
            basis,
            constituents,
        };
        material.validate()?;
        Ok(material)
    }

    /// Builds a material from its configuration entry.
    pub fn from_config(config: &MaterialConfig) -> Result<Self, PubeError> {
        let constituents = config
            .constituents
            .iter()
            .map(|entry| Constituent {
                kind: entry.kind,
                symbol: entry.symbol.clone(),
                fraction: entry.fraction,
            })
            .collect();
        Self::new(
            config.id.clone(),
            config.name.clone(),
            config.density_g_cm3,
            config.basis,
            constituents,
        )
    }

    fn validate(&self) -> Result<(), PubeError> {
        if !(self.density_g_cm3.is_finite() && self.density_g_cm3 > 0.0) {
            return Err(material_error(
                "material-density",
                "material density must be positive",
                &self.id,
            ));
        }
        if self.constituents.is_empty() {
            return Err(material_error(
                "material-empty",
                "material has no constituents",
                &self.id,
            ));
        }
        if self
            .constituents
            .iter()
            .any(|entry| !entry.fraction.is_finite() || entry.fraction < 0.0)
        {
            return Err(material_error(
                "material-fraction",
                "constituent fractions must be finite and non-negative",
                &self.id,
            ));
        }
        if self.constituents.iter().all(|entry| entry.fraction == 0.0) {
            return Err(material_error(
                "material-fraction",
                "constituent fractions sum to zero",
                &self.id,
            ));
        }
        Ok(())
    }

    /// Constituent fractions rescaled to sum to one.
    pub fn normalized_fractions(&self) -> Vec<(&str, f64)> {
        let fractions: Vec<f64> = self.constituents.iter().map(|entry| entry.fraction).collect();
        let normalized = normalize_weights(&fractions).unwrap_or(fractions);
        self.constituents
            .iter()
            .zip(normalized)
            .map(|(entry, fraction)| (entry.symbol.as_str(), fraction))
            .collect()
    }
}

fn material_error(code: &str, message: &str, id: &str) -> PubeError {
    PubeError::Config(ErrorInfo::new(code, message).with_context("material", id))
}

fn element(symbol: &str, fraction: f64) -> Constituent {
    Constituent {
        kind: ConstituentKind::Element,
        symbol: symbol.to_string(),
        fraction,
    }
}

fn nuclide(symbol: &str, fraction: f64) -> Constituent {
    Constituent {
        kind: ConstituentKind::Nuclide,
        symbol: symbol.to_string(),
        fraction,
    }
}

/// Materials keyed by id.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialCatalog {
    materials: BTreeMap<String, Material>,
}

impl MaterialCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The five materials of the reference experiment: PuBe source,
    /// polypropylene, polyethylene, CR-39 and air.
    pub fn reference() -> Self {
        let atom = FractionBasis::Atom;
        let entries = [
            (
                "pube",
                "PuBe_Source",
                1.85,
                vec![nuclide("Be9", 1.0), nuclide("Pu239", 1.0e-3)],
            ),
            (
                "polypropylene",
                "PP_Shield",
                0.90,
                vec![element("C", 3.0), element("H", 6.0)],
            ),
            (
                "polyethylene",
                "PE_Shield",
                0.94,
                vec![element("C", 2.0), element("H", 4.0)],
            ),
            (
                "cr39",
                "CR39_Detector",
                1.32,
                vec![element("C", 12.0), element("H", 18.0), element("O", 7.0)],
            ),
            (
                "air",
                "Air",
                0.0012,
                vec![element("N", 0.78), element("O", 0.21)],
            ),
        ];
        let materials = entries
            .into_iter()
            .map(|(id, name, density, constituents)| {
                (
                    id.to_string(),
                    Material {
                        id: id.to_string(),
                        name: name.to_string(),
                        density_g_cm3: density,
                        basis: atom,
                        constituents,
                    },
                )
            })
            .collect();
        Self { materials }
    }

    /// Reference catalog with the configuration's material entries applied
    /// on top (same id replaces, new id adds).
    pub fn from_config(config: &ExperimentConfig) -> Result<Self, PubeError> {
        let mut catalog = Self::reference();
        for entry in &config.materials {
            catalog.insert(Material::from_config(entry)?);
        }
        Ok(catalog)
    }

    /// Inserts or replaces a material, returning the previous entry.
    pub fn insert(&mut self, material: Material) -> Option<Material> {
        self.materials.insert(material.id.clone(), material)
    }

    /// Looks up a material by id.
    pub fn get(&self, id: &str) -> Result<&Material, PubeError> {
        self.materials.get(id).ok_or_else(|| {
            PubeError::Config(
                ErrorInfo::new("unknown-material", "material is not in the catalog")
                    .with_context("material", id)
                    .with_hint(format!(
                        "known materials: {}",
                        self.materials.keys().cloned().collect::<Vec<_>>().join(", ")
                    )),
            )
        })
    }

    /// Iterates materials in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.values()
    }

    /// Number of materials.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
