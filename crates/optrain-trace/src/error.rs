//! Error types for tracing.

use thiserror::Error;

/// Errors that abort a trace.
///
/// Per-ray outcomes such as misses, aperture clips and absorption are not
/// errors; they are terminal [`RayState`](crate::RayState)s.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraceError {
    /// A ray's wavelength was not resolved when the table was built.
    #[error("wavelength {wavelength_nm} nm is not in the wavelength table")]
    UnsupportedWavelength {
        /// Requested wavelength.
        wavelength_nm: f64,
    },
    /// The wavelength table has no entry for a surface the ray reached.
    #[error("no refractive index for surface '{surface}' at {wavelength_nm} nm")]
    MissingWavelengthEntry {
        /// String id of the surface.
        surface: String,
        /// Requested wavelength.
        wavelength_nm: f64,
    },
}

/// Result type for trace operations.
pub type Result<T> = std::result::Result<T, TraceError>;
