#![warn(missing_docs)]

//! Optical surface placement and sequential ray tracing.
//!
//! This crate ties the surface model and the tracer together: a
//! [`SystemSpec`] describes surfaces and assemblies in train order,
//! [`OpticalSystem::build`] places them and resolves every material, and the
//! resulting system traces rays from [`CollimatedBeam`]s, [`PointSource`]s or
//! any other source of [`Ray`]s.
//!
//! # Example
//!
//! ```ignore
//! use optrain::{CollimatedBeam, GlassCatalog, OpticalSystem, SystemSpec};
//!
//! let spec = SystemSpec::from_json(&std::fs::read_to_string("doublet.json")?)?;
//! let wavelengths = [486.1, 587.6, 656.3];
//! let system = OpticalSystem::build(&spec, &GlassCatalog::with_defaults(), &wavelengths)?;
//!
//! let beam = CollimatedBeam { /* ... */ };
//! let batch = system.trace_all(&beam.rays())?;
//! println!("exited: {}", batch.ledger.total().exited);
//! ```

pub mod error;
pub mod settings;
pub mod sources;
pub mod system;

pub use error::{Error, Result};
pub use settings::TraceSettings;
pub use sources::{CollimatedBeam, PointSource};
pub use system::{Element, OpticalSystem, SystemSpec, TargetHits};

pub use optrain_math::{Dir3, Point2, Point3, Transform, Vec3};
pub use optrain_surface::{
    Aperture, AssemblySpec, BuildError, Glass, GlassCatalog, MaterialCatalog, MaterialRef,
    MemberSpec, Mode, Orientation, PlacedSurface, Placement, Position, Shape, Surface, SurfaceId,
    SurfaceSpec,
};
pub use optrain_trace::{
    spot_on, HitCollector, HitRecord, RayLedger, Ray, RayState, SpotFilter, SpotStats, TraceBatch,
    TraceError, TracePath,
};
