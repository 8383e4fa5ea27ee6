#![warn(missing_docs)]

//! Optical surface model for optrain.
//!
//! Turns declarative surface and assembly requests into immutable
//! [`Surface`] records carrying an exact world/local transform pair, and
//! resolves materials into a read-only [`WavelengthTable`].
//!
//! # Local frame
//!
//! Each surface has its vertex at the local origin and faces local -x
//! (the canonical normal, which is also what azimuth = elevation = 0
//! produces). Light travels along local +x and transverse coordinates are
//! local `(y, z)`. The dial rotates the surface about local x.
//!
//! # Example
//!
//! ```ignore
//! use optrain_surface::{Aperture, PlacedSurface, Placement, SurfaceFactory, SurfaceSpec};
//!
//! let mut factory = SurfaceFactory::new();
//! let spec = SurfaceSpec::new("stop")
//!     .shape("planar")
//!     .aperture(Aperture::Circular { semi_diameter: 5.0 });
//! let surface = factory.build_surface(&PlacedSurface::new(
//!     spec,
//!     Placement::at(20.0, -3.0, -5.0).angles(5.0, -10.0).dial(50.0),
//! ))?;
//! ```

pub mod error;
pub mod factory;
pub mod material;
pub mod spec;
mod surface;
pub mod table;

pub use error::{BuildError, Result};
pub use factory::{dial_rotation, normal_from_angles, SurfaceFactory};
pub use material::{Glass, GlassCatalog, MaterialCatalog, MaterialRef};
pub use spec::{
    AssemblySpec, MemberSpec, Orientation, PlacedSurface, Placement, Position, SurfaceSpec,
};
pub use surface::{canonical_normal, Aperture, AssemblyMembership, Mode, Shape, Surface, SurfaceId};
pub use table::{SideIndices, WavelengthKey, WavelengthTable};
