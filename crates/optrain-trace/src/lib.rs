#![warn(missing_docs)]

//! Sequential ray tracing for optrain.
//!
//! Rays visit an ordered train of [`Surface`](optrain_surface::Surface)s one
//! at a time. Each surface is intersected in its own local frame, using the
//! transform pair stored on the surface, and the resulting direction is
//! mapped back to world space for the next segment.
//!
//! # Architecture
//!
//! - [`Ray`] - World-space ray with wavelength, light id and lineage
//! - [`intersect`] - Local-frame intersectors for each surface shape
//! - [`SequentialTracer`] - Train-order tracing with refraction, reflection
//!   and absorption
//! - [`HitCollector`] - Explicitly owned per-surface hit records
//! - [`RayLedger`] - Per-light outcome counters
//! - [`boundary`] - World-space aperture outlines
//! - [`spot`] - Spot size statistics
//!
//! # Example
//!
//! ```ignore
//! use optrain_trace::{HitCollector, Ray, RayLedger, SequentialTracer};
//!
//! let tracer = SequentialTracer::new(&surfaces, &table);
//! let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.3), 488.0, 0);
//!
//! let mut hits = HitCollector::new();
//! let mut ledger = RayLedger::new();
//! let path = tracer.trace(&ray, &mut hits, &mut ledger)?;
//! ```

mod batch;
pub mod boundary;
mod collector;
pub mod error;
pub mod intersect;
mod ledger;
pub mod physics;
mod ray;
pub mod spot;
mod tracer;

pub use batch::TraceBatch;
pub use boundary::{boundary_corners, boundary_polygon, sag_outline, DEFAULT_CIRCLE_SEGMENTS};
pub use collector::{HitCollector, HitRecord};
pub use error::{Result, TraceError};
pub use ledger::{LightTally, RayLedger};
pub use ray::{Lineage, LocalRay, Ray};
pub use spot::{spot_on, spot_stats, SpotFilter, SpotStats};
pub use tracer::{RayState, SequentialTracer, TracePath};
