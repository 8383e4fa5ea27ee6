//! Precomputed refractive-index side table.
//!
//! Material lookup happens exactly once, here, before any ray is traced. The
//! table is keyed by surface numeric id and quantized wavelength and has no
//! mutating API once built.

use std::collections::HashMap;

use crate::error::{BuildError, Result};
use crate::material::{MaterialCatalog, MaterialRef};
use crate::surface::{Surface, SurfaceId};

/// Wavelength quantized to whole picometres, usable as a hash key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WavelengthKey(u64);

impl WavelengthKey {
    /// Quantize a wavelength in nanometres.
    pub fn from_nm(wavelength_nm: f64) -> Self {
        Self((wavelength_nm * 1000.0).round().max(0.0) as u64)
    }

    /// Wavelength in nanometres.
    pub fn nm(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// Refractive indices on both sides of a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideIndices {
    /// Index on the incoming side.
    pub before: f64,
    /// Index on the outgoing side.
    pub after: f64,
}

/// Read-only table of `(surface, wavelength) -> indices`.
#[derive(Debug, Clone, Default)]
pub struct WavelengthTable {
    entries: HashMap<(SurfaceId, WavelengthKey), SideIndices>,
    wavelengths: Vec<WavelengthKey>,
}

impl WavelengthTable {
    /// Resolve every surface's materials at every wavelength.
    ///
    /// Fails on the first material the catalog cannot resolve, so a bad name
    /// anywhere fails the whole build.
    pub fn build(
        surfaces: &[Surface],
        wavelengths_nm: &[f64],
        catalog: &dyn MaterialCatalog,
    ) -> Result<Self> {
        let mut keys: Vec<WavelengthKey> =
            wavelengths_nm.iter().map(|&w| WavelengthKey::from_nm(w)).collect();
        keys.sort_unstable();
        keys.dedup();

        let mut entries = HashMap::with_capacity(surfaces.len() * keys.len());
        for surface in surfaces {
            for &key in &keys {
                let before = resolve(surface, surface.material_before(), key, catalog)?;
                let after = resolve(surface, surface.material_after(), key, catalog)?;
                entries.insert((surface.numeric_id(), key), SideIndices { before, after });
            }
        }

        tracing::debug!(
            surfaces = surfaces.len(),
            wavelengths = keys.len(),
            "built wavelength table"
        );

        Ok(Self {
            entries,
            wavelengths: keys,
        })
    }

    /// Indices for a surface at a wavelength.
    #[inline]
    pub fn get(&self, surface: SurfaceId, wavelength_nm: f64) -> Option<SideIndices> {
        self.entries
            .get(&(surface, WavelengthKey::from_nm(wavelength_nm)))
            .copied()
    }

    /// Distinct wavelengths in the table, ascending, in nanometres.
    pub fn wavelengths(&self) -> impl Iterator<Item = f64> + '_ {
        self.wavelengths.iter().map(|k| k.nm())
    }

    /// Whether a wavelength was included when the table was built.
    pub fn contains_wavelength(&self, wavelength_nm: f64) -> bool {
        self.wavelengths
            .binary_search(&WavelengthKey::from_nm(wavelength_nm))
            .is_ok()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn resolve(
    surface: &Surface,
    material: &MaterialRef,
    key: WavelengthKey,
    catalog: &dyn MaterialCatalog,
) -> Result<f64> {
    material
        .resolve(catalog, key.nm())
        .ok_or_else(|| BuildError::MissingWavelengthEntry {
            surface: surface.id().to_string(),
            material: material.to_string(),
            wavelength_nm: key.nm(),
        })
}
