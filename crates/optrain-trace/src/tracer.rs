//! Sequential tracing through an ordered surface train.
//!
//! A ray visits surfaces strictly in train order: it is intersected with
//! surface *k* only, never with whichever surface happens to be nearest.
//! Each visit ends the ray (miss, clip, absorption) or spawns a child
//! segment leaving the hit point.

use optrain_math::{Dir3, Vec3};
use optrain_surface::{Mode, SideIndices, Surface, SurfaceId, WavelengthTable};

use crate::collector::{HitCollector, HitRecord};
use crate::error::{Result, TraceError};
use crate::intersect::{intersect_local, to_local, Intersection, LocalHit};
use crate::ledger::RayLedger;
use crate::physics::{reflect, refract, Refraction};
use crate::ray::Ray;

/// State of a ray at a point in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RayState {
    /// Propagating toward the next surface.
    Traveling,
    /// Passed through an aperture stop unchanged.
    Hit,
    /// Transmitted through a refracting surface.
    Refracted,
    /// Reflected by a mirror, or by total internal reflection.
    Reflected,
    /// Stopped by an absorbing surface.
    Absorbed,
    /// Missed a surface or fell outside its aperture.
    Blocked,
    /// Left the last surface of the train.
    Exited,
}

impl RayState {
    /// Whether no further segment follows.
    pub fn is_terminal(self) -> bool {
        matches!(self, RayState::Absorbed | RayState::Blocked | RayState::Exited)
    }
}

/// The segments and surface events of one emitted ray.
#[derive(Debug, Clone, PartialEq)]
pub struct TracePath {
    /// Segments in order, starting with the emitted ray.
    pub segments: Vec<Ray>,
    /// Surface visits in order with the resulting state.
    pub events: Vec<(SurfaceId, RayState)>,
    /// How the ray ended.
    pub terminal: RayState,
}

impl TracePath {
    /// Last segment traced.
    pub fn last_segment(&self) -> Option<&Ray> {
        self.segments.last()
    }
}

/// Traces rays through a fixed, ordered set of surfaces.
///
/// Holds only shared references, so one tracer can be used from many
/// threads at once.
#[derive(Debug, Clone, Copy)]
pub struct SequentialTracer<'a> {
    surfaces: &'a [Surface],
    table: &'a WavelengthTable,
}

impl<'a> SequentialTracer<'a> {
    /// Create a tracer over `surfaces` in train order.
    pub fn new(surfaces: &'a [Surface], table: &'a WavelengthTable) -> Self {
        Self { surfaces, table }
    }

    /// The surface train.
    pub fn surfaces(&self) -> &'a [Surface] {
        self.surfaces
    }

    /// Fail on the first ray whose wavelength the table was not built for.
    pub fn check_wavelengths(&self, rays: &[Ray]) -> Result<()> {
        match rays
            .iter()
            .find(|r| !self.table.contains_wavelength(r.wavelength_nm))
        {
            Some(ray) => Err(TraceError::UnsupportedWavelength {
                wavelength_nm: ray.wavelength_nm,
            }),
            None => Ok(()),
        }
    }

    /// Indices of every surface in the train at one wavelength.
    fn resolve_indices(&self, wavelength_nm: f64) -> Result<Vec<SideIndices>> {
        self.surfaces
            .iter()
            .map(|surface| {
                self.table
                    .get(surface.numeric_id(), wavelength_nm)
                    .ok_or_else(|| TraceError::MissingWavelengthEntry {
                        surface: surface.id().to_string(),
                        wavelength_nm,
                    })
            })
            .collect()
    }

    /// Trace one emitted ray to termination.
    ///
    /// Hits are appended to `collector` and outcomes counted in `ledger`.
    /// Fails only when the wavelength table lacks an entry the ray needs;
    /// indices are resolved up front, so a failed trace leaves `collector`
    /// and `ledger` untouched.
    pub fn trace(
        &self,
        ray: &Ray,
        collector: &mut HitCollector,
        ledger: &mut RayLedger,
    ) -> Result<TracePath> {
        let resolved = self.resolve_indices(ray.wavelength_nm)?;
        ledger.record_emission(ray.light_id);
        let mut current = *ray;
        let mut path = TracePath {
            segments: vec![current],
            events: Vec::with_capacity(self.surfaces.len()),
            terminal: RayState::Traveling,
        };

        for (surface, indices) in self.surfaces.iter().zip(&resolved) {
            let local = to_local(surface, &current);
            let hit = match intersect_local(&local, surface.shape(), &surface.aperture()) {
                Intersection::Miss => {
                    tracing::trace!(surface = surface.id(), "ray missed surface");
                    path.events.push((surface.numeric_id(), RayState::Blocked));
                    return Ok(finish(path, RayState::Blocked, &current, ledger));
                }
                Intersection::Clipped(hit) => {
                    tracing::trace!(surface = surface.id(), "ray clipped by aperture");
                    collector.push(record(surface, &current, &hit, None, RayState::Blocked, false));
                    path.events.push((surface.numeric_id(), RayState::Blocked));
                    return Ok(finish(path, RayState::Blocked, &current, ledger));
                }
                Intersection::Hit(hit) => hit,
            };

            let normal: Vec3 = hit.normal.into_inner();
            let mut tir = false;
            let (state, exit_local) = match surface.mode() {
                Mode::Refraction => {
                    match refract(&local.direction, &normal, indices.before, indices.after) {
                        Refraction::Transmitted(d) => (RayState::Refracted, Some(d)),
                        Refraction::TotalInternalReflection(d) => {
                            tir = true;
                            ledger.record_total_internal_reflection(current.light_id);
                            tracing::trace!(surface = surface.id(), "total internal reflection");
                            (RayState::Reflected, Some(d))
                        }
                    }
                }
                Mode::Reflection => (RayState::Reflected, Some(reflect(&local.direction, &normal))),
                Mode::Absorption => (RayState::Absorbed, None),
                Mode::ApertureStop => (RayState::Hit, Some(local.direction)),
            };

            let exit = exit_local.map(|d| Dir3::new_normalize(surface.inverse().apply_vec(&d)));
            let rec = record(surface, &current, &hit, exit, state, tir);
            let world_point = rec.world_point;
            collector.push(rec);
            path.events.push((surface.numeric_id(), state));

            match exit {
                Some(direction) => {
                    current = current.child(world_point, direction);
                    ledger.record_child(current.light_id);
                    path.segments.push(current);
                }
                None => return Ok(finish(path, RayState::Absorbed, &current, ledger)),
            }
        }

        Ok(finish(path, RayState::Exited, &current, ledger))
    }
}

fn finish(mut path: TracePath, terminal: RayState, ray: &Ray, ledger: &mut RayLedger) -> TracePath {
    ledger.record_terminal(ray.light_id, terminal);
    path.terminal = terminal;
    path
}

fn record(
    surface: &Surface,
    ray: &Ray,
    hit: &LocalHit,
    exit: Option<Dir3>,
    event: RayState,
    total_internal_reflection: bool,
) -> HitRecord {
    HitRecord {
        surface: surface.numeric_id(),
        surface_label: surface.id().to_string(),
        world_point: surface.local_to_world(&hit.point),
        world_normal: surface.inverse().apply_dir(&hit.normal),
        local_point: hit.transverse(),
        incident: ray.direction,
        exit,
        wavelength_nm: ray.wavelength_nm,
        light_id: ray.light_id,
        lineage: ray.lineage,
        intensity: ray.intensity,
        event,
        total_internal_reflection,
        blocked: event == RayState::Blocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use optrain_math::Point3;
    use optrain_surface::{
        Aperture, GlassCatalog, MaterialRef, PlacedSurface, Placement, SurfaceFactory, SurfaceSpec,
    };

    fn plane(factory: &mut SurfaceFactory, id: &str, x: f64, mode: Mode, n: (f64, f64)) -> Surface {
        let spec = SurfaceSpec::new(id)
            .shape("planar")
            .aperture(Aperture::Circular { semi_diameter: 10.0 })
            .mode(mode)
            .materials(MaterialRef::index(n.0), MaterialRef::index(n.1));
        factory
            .build_surface(&PlacedSurface::new(spec, Placement::at(x, 0.0, 0.0)))
            .unwrap()
    }

    fn table(surfaces: &[Surface]) -> WavelengthTable {
        WavelengthTable::build(surfaces, &[550.0], &GlassCatalog::new()).unwrap()
    }

    #[test]
    fn test_train_order_not_nearest() {
        let mut f = SurfaceFactory::new();
        // The window at x=5 is nearer the source but comes second in the train
        let surfaces = vec![
            plane(&mut f, "mirror", 10.0, Mode::Reflection, (1.0, 1.0)),
            plane(&mut f, "window", 5.0, Mode::Refraction, (1.0, 1.0)),
            plane(&mut f, "detector", -5.0, Mode::Absorption, (1.0, 1.0)),
        ];
        let table = table(&surfaces);
        let tracer = SequentialTracer::new(&surfaces, &table);

        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.02, -0.01), 550.0, 0);
        let mut collector = HitCollector::new();
        let mut ledger = RayLedger::new();
        let path = tracer.trace(&ray, &mut collector, &mut ledger).unwrap();

        let order: Vec<usize> = collector.records().iter().map(|r| r.surface.index()).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert_eq!(
            path.events.iter().map(|e| e.1).collect::<Vec<_>>(),
            vec![RayState::Reflected, RayState::Refracted, RayState::Absorbed]
        );
        assert_eq!(path.terminal, RayState::Absorbed);
        assert_relative_eq!(collector.records()[0].world_point.x, 10.0, epsilon = 1e-12);
        assert_relative_eq!(collector.records()[1].world_point.x, 5.0, epsilon = 1e-12);
        assert_eq!(path.segments.len(), 3);
        assert_eq!(path.segments[2].lineage.generation, 2);
        assert!(ledger.reconciles());
    }

    #[test]
    fn test_blocked_and_missed() {
        let mut f = SurfaceFactory::new();
        let surfaces = vec![
            plane(&mut f, "a", 10.0, Mode::Refraction, (1.0, 1.0)),
            plane(&mut f, "b", 20.0, Mode::Refraction, (1.0, 1.0)),
        ];
        let table = table(&surfaces);
        let tracer = SequentialTracer::new(&surfaces, &table);
        let mut collector = HitCollector::new();
        let mut ledger = RayLedger::new();

        // Outside the 10 mm aperture: recorded as blocked
        let wide = Ray::new(Point3::new(0.0, 15.0, 0.0), Vec3::x(), 550.0, 3);
        let path = tracer.trace(&wide, &mut collector, &mut ledger).unwrap();
        assert_eq!(path.terminal, RayState::Blocked);
        assert_eq!(collector.blocked_count(SurfaceId(0)), 1);

        // Travelling away: never reaches the plane, nothing recorded
        let away = Ray::new(Point3::origin(), -Vec3::x(), 550.0, 3);
        let path = tracer.trace(&away, &mut collector, &mut ledger).unwrap();
        assert_eq!(path.terminal, RayState::Blocked);
        assert_eq!(collector.len(), 1);

        let straight = Ray::new(Point3::origin(), Vec3::x(), 550.0, 3);
        let path = tracer.trace(&straight, &mut collector, &mut ledger).unwrap();
        assert_eq!(path.terminal, RayState::Exited);

        let tally = ledger.tally(3);
        assert_eq!((tally.emitted, tally.blocked, tally.exited), (3, 2, 1));
        assert_eq!(tally.children, 2);
        assert!(tally.reconciles());
    }

    #[test]
    fn test_total_internal_reflection_counted() {
        let mut f = SurfaceFactory::new();
        let surfaces = vec![plane(&mut f, "glass-air", 10.0, Mode::Refraction, (1.5, 1.0))];
        let table = table(&surfaces);
        let tracer = SequentialTracer::new(&surfaces, &table);
        let mut collector = HitCollector::new();
        let mut ledger = RayLedger::new();

        let ray = Ray::new(Point3::new(0.0, -5.0, 0.0), Vec3::new(1.0, 1.0, 0.0), 550.0, 0);
        let path = tracer.trace(&ray, &mut collector, &mut ledger).unwrap();
        assert_eq!(path.events[0].1, RayState::Reflected);
        assert!(collector.records()[0].total_internal_reflection);
        assert_eq!(ledger.tally(0).total_internal_reflections, 1);
        let exit = collector.records()[0].exit.unwrap();
        assert_relative_eq!(exit.x, -(0.5_f64.sqrt()), epsilon = 1e-12);
    }

    #[test]
    fn test_aperture_stop_passes_unchanged() {
        let mut f = SurfaceFactory::new();
        let surfaces = vec![plane(&mut f, "stop", 10.0, Mode::ApertureStop, (1.0, 1.5))];
        let table = table(&surfaces);
        let tracer = SequentialTracer::new(&surfaces, &table);
        let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.2, 0.1), 550.0, 0);
        let path = tracer
            .trace(&ray, &mut HitCollector::new(), &mut RayLedger::new())
            .unwrap();
        assert_eq!(path.events[0].1, RayState::Hit);
        assert_relative_eq!(
            path.segments[1].direction.into_inner(),
            ray.direction.into_inner(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_missing_wavelength_is_fatal() {
        let mut f = SurfaceFactory::new();
        let surfaces = vec![plane(&mut f, "only", 10.0, Mode::Refraction, (1.0, 1.5))];
        let table = table(&surfaces);
        let tracer = SequentialTracer::new(&surfaces, &table);
        let ray = Ray::new(Point3::origin(), Vec3::x(), 488.0, 0);
        let err = tracer
            .trace(&ray, &mut HitCollector::new(), &mut RayLedger::new())
            .unwrap_err();
        assert_eq!(
            err,
            TraceError::MissingWavelengthEntry {
                surface: "only".into(),
                wavelength_nm: 488.0,
            }
        );
        assert_eq!(
            tracer.check_wavelengths(&[ray]),
            Err(TraceError::UnsupportedWavelength { wavelength_nm: 488.0 })
        );
    }

    #[test]
    fn test_failed_trace_leaves_state_untouched() {
        let mut f = SurfaceFactory::new();
        let surfaces = vec![
            plane(&mut f, "window", 10.0, Mode::Refraction, (1.0, 1.5)),
            plane(&mut f, "detector", 20.0, Mode::Absorption, (1.5, 1.5)),
        ];
        let table = table(&surfaces);
        let tracer = SequentialTracer::new(&surfaces, &table);
        let mut collector = HitCollector::new();
        let mut ledger = RayLedger::new();

        let good = Ray::new(Point3::origin(), Vec3::x(), 550.0, 0);
        tracer.trace(&good, &mut collector, &mut ledger).unwrap();
        let before = (collector.len(), ledger.clone());

        let bad = Ray::new(Point3::origin(), Vec3::x(), 488.0, 0);
        assert!(tracer.trace(&bad, &mut collector, &mut ledger).is_err());
        assert_eq!(collector.len(), before.0);
        assert_eq!(ledger, before.1);
        assert!(ledger.reconciles());
        assert_eq!(ledger.tally(0).emitted, 1);
    }
}
