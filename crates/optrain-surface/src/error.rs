//! Error types for surface construction.

use optrain_math::MathError;
use thiserror::Error;

/// Errors that abort construction of an optical system.
///
/// Every variant names the offending surface so a failed build can be traced
/// back to the request that caused it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    /// Shape name is not one of planar, spherical, cylindrical.
    #[error("surface '{surface}': unknown shape '{shape}'")]
    UnknownSurfaceShape {
        /// Surface id.
        surface: String,
        /// Shape name as requested.
        shape: String,
    },

    /// No aperture was given and none was inherited from a template.
    #[error("surface '{surface}': missing aperture")]
    MissingAperture {
        /// Surface id.
        surface: String,
    },

    /// A curved shape was requested without a usable radius.
    #[error("surface '{surface}': {shape} shape needs a non-zero radius")]
    MissingRadius {
        /// Surface id.
        surface: String,
        /// Shape name.
        shape: String,
    },

    /// A template name could not be resolved.
    #[error("surface '{surface}': unresolved template reference '{template}'")]
    UnresolvedTemplateReference {
        /// Surface id.
        surface: String,
        /// Template name that failed to resolve.
        template: String,
    },

    /// A relative position names a surface that has not been built.
    #[error("surface '{surface}': position refers to unknown surface '{reference}'")]
    UnknownSurfaceReference {
        /// Surface id.
        surface: String,
        /// The referenced surface id.
        reference: String,
    },

    /// Two surfaces share the same string id.
    #[error("duplicate surface id '{surface}'")]
    DuplicateSurfaceId {
        /// Surface id.
        surface: String,
    },

    /// An explicit normal had zero length.
    #[error("surface '{surface}': normal vector has zero length")]
    DegenerateNormal {
        /// Surface id.
        surface: String,
    },

    /// The placement transform could not be inverted.
    #[error("surface '{surface}': {source}")]
    SingularMatrix {
        /// Surface id.
        surface: String,
        /// Underlying math error.
        source: MathError,
    },

    /// A material could not be resolved at one of the system wavelengths.
    #[error("surface '{surface}': no refractive index for material '{material}' at {wavelength_nm} nm")]
    MissingWavelengthEntry {
        /// Surface id.
        surface: String,
        /// Material name or literal index.
        material: String,
        /// Wavelength in nanometres.
        wavelength_nm: f64,
    },
}

/// Result type for surface construction.
pub type Result<T> = std::result::Result<T, BuildError>;
