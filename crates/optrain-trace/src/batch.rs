//! Tracing many rays, optionally in parallel.

use rayon::prelude::*;

use crate::collector::HitCollector;
use crate::error::Result;
use crate::ledger::RayLedger;
use crate::ray::Ray;
use crate::tracer::{SequentialTracer, TracePath};

/// Combined output of a batch of traces.
#[derive(Debug, Clone, Default)]
pub struct TraceBatch {
    /// One path per input ray, in input order.
    pub paths: Vec<TracePath>,
    /// Every hit of every ray, in input order.
    pub collector: HitCollector,
    /// Outcome counters.
    pub ledger: RayLedger,
}

impl TraceBatch {
    fn merge(mut self, other: TraceBatch) -> TraceBatch {
        self.paths.extend(other.paths);
        self.collector.merge(other.collector);
        self.ledger.merge(&other.ledger);
        self
    }
}

impl SequentialTracer<'_> {
    /// Trace every ray, returning results in input order.
    ///
    /// With `parallel` set, rays are split across the rayon pool; each worker
    /// owns its collector and ledger and results are merged in order, so the
    /// output is identical to a serial run. Every wavelength is checked
    /// before any ray is traced.
    pub fn trace_all(&self, rays: &[Ray], parallel: bool) -> Result<TraceBatch> {
        self.check_wavelengths(rays)?;
        let batch = if parallel {
            rays.par_iter()
                .try_fold(TraceBatch::default, |mut batch, ray| {
                    let path = self.trace(ray, &mut batch.collector, &mut batch.ledger)?;
                    batch.paths.push(path);
                    Ok(batch)
                })
                .try_reduce(TraceBatch::default, |a, b| Ok(a.merge(b)))?
        } else {
            let mut batch = TraceBatch::default();
            for ray in rays {
                let path = self.trace(ray, &mut batch.collector, &mut batch.ledger)?;
                batch.paths.push(path);
            }
            batch
        };

        tracing::debug!(
            rays = rays.len(),
            hits = batch.collector.len(),
            parallel,
            "traced batch"
        );
        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TraceError;
    use optrain_math::{Point3, Vec3};
    use optrain_surface::{
        Aperture, GlassCatalog, MaterialRef, Mode, PlacedSurface, Placement, Surface,
        SurfaceFactory, SurfaceSpec, WavelengthTable,
    };

    fn train() -> Vec<Surface> {
        let mut factory = SurfaceFactory::new();
        let front = SurfaceSpec::new("front")
            .shape("spherical")
            .radius(30.0)
            .aperture(Aperture::Circular { semi_diameter: 8.0 })
            .materials(MaterialRef::named("air"), MaterialRef::named("N-BK7"));
        let back = SurfaceSpec::new("back")
            .shape("planar")
            .aperture(Aperture::Circular { semi_diameter: 8.0 })
            .materials(MaterialRef::named("N-BK7"), MaterialRef::named("air"));
        let detector = SurfaceSpec::new("detector")
            .shape("planar")
            .aperture(Aperture::Rectangular { half_y: 20.0, half_z: 20.0 })
            .mode(Mode::Absorption);
        [(front, 10.0), (back, 14.0), (detector, 60.0)]
            .into_iter()
            .map(|(spec, x)| {
                factory
                    .build_surface(&PlacedSurface::new(spec, Placement::at(x, 0.0, 0.0)))
                    .unwrap()
            })
            .collect()
    }

    fn rays() -> Vec<Ray> {
        (0..64)
            .map(|i| {
                let y = -10.0 + 20.0 * i as f64 / 63.0;
                let wavelength = if i % 2 == 0 { 532.0 } else { 633.0 };
                Ray::new(Point3::new(0.0, y, 0.5), Vec3::x(), wavelength, i % 2)
                    .with_emission(i as u64)
            })
            .collect()
    }

    #[test]
    fn test_parallel_matches_serial() {
        let surfaces = train();
        let table =
            WavelengthTable::build(&surfaces, &[532.0, 633.0], &GlassCatalog::with_defaults())
                .unwrap();
        let tracer = SequentialTracer::new(&surfaces, &table);
        let rays = rays();

        let serial = tracer.trace_all(&rays, false).unwrap();
        let parallel = tracer.trace_all(&rays, true).unwrap();

        assert_eq!(serial.paths, parallel.paths);
        assert_eq!(serial.collector.records(), parallel.collector.records());
        assert_eq!(serial.ledger, parallel.ledger);
        assert!(parallel.ledger.reconciles());
        assert_eq!(parallel.ledger.total().emitted, 64);
        // Rays beyond the 8 mm aperture are blocked at the front face
        assert!(parallel.ledger.total().blocked > 0);
        assert!(parallel.ledger.total().absorbed > 0);
    }

    #[test]
    fn test_error_propagates() {
        let surfaces = train();
        let table =
            WavelengthTable::build(&surfaces, &[532.0], &GlassCatalog::with_defaults()).unwrap();
        let tracer = SequentialTracer::new(&surfaces, &table);
        let missing: Result<usize> =
            Err(TraceError::UnsupportedWavelength { wavelength_nm: 633.0 });
        assert_eq!(tracer.trace_all(&rays(), true).map(|b| b.paths.len()), missing);
        assert_eq!(tracer.trace_all(&rays(), false).map(|b| b.paths.len()), missing);
    }
}
