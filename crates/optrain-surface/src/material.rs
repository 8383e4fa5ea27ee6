//! Material references and refractive-index catalogs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A material on one side of a surface: either a literal index or a name
/// resolved through a [`MaterialCatalog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MaterialRef {
    /// Literal refractive index, independent of wavelength.
    Index(f64),
    /// Catalog name, e.g. `"N-BK7"`.
    Named(String),
}

impl MaterialRef {
    /// Literal index reference.
    pub fn index(n: f64) -> Self {
        MaterialRef::Index(n)
    }

    /// Named reference.
    pub fn named(name: impl Into<String>) -> Self {
        MaterialRef::Named(name.into())
    }

    /// Resolve against a catalog. Literal indices pass through untouched.
    pub fn resolve(&self, catalog: &dyn MaterialCatalog, wavelength_nm: f64) -> Option<f64> {
        match self {
            MaterialRef::Index(n) if n.is_finite() && *n > 0.0 => Some(*n),
            MaterialRef::Index(_) => None,
            MaterialRef::Named(name) => catalog.lookup(name, wavelength_nm),
        }
    }
}

impl Default for MaterialRef {
    fn default() -> Self {
        MaterialRef::Index(1.0)
    }
}

impl std::fmt::Display for MaterialRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MaterialRef::Index(n) => write!(f, "{n}"),
            MaterialRef::Named(name) => f.write_str(name),
        }
    }
}

/// Source of refractive indices by material name and wavelength.
pub trait MaterialCatalog: Send + Sync {
    /// Refractive index of `name` at `wavelength_nm`, or `None` if unknown.
    fn lookup(&self, name: &str, wavelength_nm: f64) -> Option<f64>;
}

/// Dispersion model of a single glass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Glass {
    /// Wavelength-independent index.
    Constant {
        /// Refractive index.
        index: f64,
    },
    /// Three-term Sellmeier formula with `c` in square micrometres.
    Sellmeier {
        /// B coefficients.
        b: [f64; 3],
        /// C coefficients (µm²).
        c: [f64; 3],
    },
}

impl Glass {
    /// Refractive index at `wavelength_nm`.
    pub fn index_at(&self, wavelength_nm: f64) -> Option<f64> {
        match *self {
            Glass::Constant { index } => Some(index),
            Glass::Sellmeier { b, c } => {
                let l2 = (wavelength_nm * 1e-3).powi(2);
                let n2 = 1.0
                    + b.iter()
                        .zip(c.iter())
                        .map(|(bi, ci)| bi * l2 / (l2 - ci))
                        .sum::<f64>();
                (n2 > 0.0 && n2.is_finite()).then(|| n2.sqrt())
            }
        }
    }
}

/// In-memory catalog of named glasses. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct GlassCatalog {
    glasses: HashMap<String, Glass>,
}

impl GlassCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with air, vacuum, N-BK7, F2 and fused silica.
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        catalog.insert("vacuum", Glass::Constant { index: 1.0 });
        catalog.insert("air", Glass::Constant { index: 1.0 });
        catalog.insert(
            "N-BK7",
            Glass::Sellmeier {
                b: [1.039_612_12, 0.231_792_344, 1.010_469_45],
                c: [0.006_000_698_67, 0.020_017_914_4, 103.560_653],
            },
        );
        catalog.insert(
            "F2",
            Glass::Sellmeier {
                b: [1.345_333_59, 0.209_073_176, 0.937_357_162],
                c: [0.009_977_438_71, 0.047_045_076_7, 111.886_764],
            },
        );
        catalog.insert(
            "fused_silica",
            Glass::Sellmeier {
                b: [0.696_166_3, 0.407_942_6, 0.897_479_4],
                c: [0.004_679_148_26, 0.013_512_063_1, 97.934_002_5],
            },
        );
        catalog
    }

    /// Add or replace a glass.
    pub fn insert(&mut self, name: &str, glass: Glass) {
        self.glasses.insert(name.to_ascii_lowercase(), glass);
    }

    /// Look up a glass definition.
    pub fn get(&self, name: &str) -> Option<&Glass> {
        self.glasses.get(&name.to_ascii_lowercase())
    }

    /// Number of glasses.
    pub fn len(&self) -> usize {
        self.glasses.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.glasses.is_empty()
    }
}

impl MaterialCatalog for GlassCatalog {
    fn lookup(&self, name: &str, wavelength_nm: f64) -> Option<f64> {
        self.get(name)?.index_at(wavelength_nm)
    }
}
