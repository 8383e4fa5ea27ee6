//! End-to-end placement and tracing scenarios.

use approx::assert_relative_eq;
use optrain::{
    Aperture, CollimatedBeam, GlassCatalog, HitCollector, MaterialCatalog, MaterialRef, Mode,
    OpticalSystem, PlacedSurface, Placement, Point3, Ray, RayLedger, RayState, SpotFilter,
    SurfaceSpec, SystemSpec, Vec3,
};
use optrain_surface::normal_from_angles;
use optrain_trace::intersect::to_local;
use optrain_trace::sag_outline;

fn wide_plane(id: &str) -> SurfaceSpec {
    SurfaceSpec::new(id)
        .shape("planar")
        .aperture(Aperture::Circular { semi_diameter: 50.0 })
}

fn single(spec: SurfaceSpec, placement: Placement, wavelengths: &[f64]) -> OpticalSystem {
    let system = SystemSpec::new().surface(PlacedSurface::new(spec, placement));
    OpticalSystem::build(&system, &GlassCatalog::with_defaults(), wavelengths).unwrap()
}

#[test]
fn forward_inverts_inverse() {
    let placements = [
        Placement::at(0.0, 0.0, 0.0),
        Placement::at(20.0, -3.0, -5.0).angles(5.0, -10.0).dial(50.0),
        Placement::at(-7.5, 12.0, 3.25).angles(-140.0, 35.0).dial(-20.0),
        Placement::at(1.0, 2.0, 3.0).normal(0.3, -0.2, 0.9),
    ];
    let samples = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, -2.0, 3.0),
        Point3::new(-40.0, 25.0, 13.0),
    ];
    for placement in placements {
        let system = single(wide_plane("s"), placement, &[550.0]);
        let surface = &system.surfaces()[0];
        for p in &samples {
            let round = surface.forward().apply_point(&surface.inverse().apply_point(p));
            assert_relative_eq!(round, *p, epsilon = 1e-9);
            let back = surface.inverse().apply_point(&surface.forward().apply_point(p));
            assert_relative_eq!(back, *p, epsilon = 1e-9);
        }
    }
}

#[test]
fn dial_keeps_normal_and_turns_outline() {
    let rect = SurfaceSpec::new("rect")
        .shape("planar")
        .aperture(Aperture::Rectangular { half_y: 4.0, half_z: 1.5 });
    let base = Placement::at(20.0, -3.0, -5.0).angles(5.0, -10.0);

    let reference = single(rect.clone(), base.clone().dial(0.0), &[550.0]);
    let reference_normal = reference.surfaces()[0].normal();
    let reference_corners = reference.boundary("rect").unwrap();

    for dial in [25.0, 50.0, 75.0] {
        let system = single(rect.clone(), base.clone().dial(dial), &[550.0]);
        let surface = &system.surfaces()[0];
        assert_relative_eq!(
            surface.normal().into_inner(),
            reference_normal.into_inner(),
            epsilon = 1e-12
        );
        assert_relative_eq!(surface.position(), Point3::new(20.0, -3.0, -5.0), epsilon = 1e-12);

        let corners = system.boundary("rect").unwrap();
        let moved = corners
            .iter()
            .zip(&reference_corners)
            .map(|(a, b)| (*a - *b).norm())
            .fold(0.0, f64::max);
        assert!(moved > 1e-6, "dial {dial} left every corner in place");
    }
}

#[test]
fn curved_boundary_corners_sit_at_vertex_plane() {
    let spec = SurfaceSpec::new("dome")
        .shape("spherical")
        .radius(25.0)
        .aperture(Aperture::Rectangular { half_y: 6.0, half_z: 4.0 });
    let placement = Placement::at(0.0, 0.0, 0.0).angles(20.0, 10.0).dial(30.0);
    let system = single(spec, placement, &[550.0]);
    let surface = &system.surfaces()[0];

    let corners = system.boundary("dome").unwrap();
    let expected = [(6.0, 4.0), (-6.0, 4.0), (-6.0, -4.0), (6.0, -4.0)];
    assert_eq!(corners.len(), expected.len());
    for (corner, (y, z)) in corners.iter().zip(expected) {
        let from_transform = surface.local_to_world(&Point3::new(0.0, y, z));
        assert_relative_eq!(*corner, from_transform, epsilon = 1e-9);
    }
}

#[test]
fn outline_corners_agree_with_tracer() {
    let cases = [
        (
            SurfaceSpec::new("flat")
                .shape("planar")
                .aperture(Aperture::Rectangular { half_y: 3.0, half_z: 2.0 }),
            Placement::at(12.0, 4.0, -2.0).angles(20.0, 15.0).dial(33.0),
        ),
        (
            SurfaceSpec::new("dome")
                .shape("spherical")
                .radius(25.0)
                .aperture(Aperture::Circular { semi_diameter: 6.0 }),
            Placement::at(-3.0, 8.0, 1.0).angles(-35.0, 5.0).dial(10.0),
        ),
    ];

    for (spec, placement) in cases {
        let id = spec.id.clone();
        let system = single(spec.mode(Mode::Absorption), placement, &[550.0]);
        let surface = system.surface_by_id(&id).unwrap();
        let normal = surface.normal().into_inner();
        let corners = system.boundary(&id).unwrap();
        let on_surface = sag_outline(surface, system.settings().circle_segments).unwrap();

        for (corner, expected) in corners.iter().zip(&on_surface) {
            // Approach along the surface axis, from the incoming side
            let ray = Ray::new(*corner + normal * 30.0, -normal, 550.0, 0);
            let mut collector = HitCollector::new();
            system.trace(&ray, &mut collector, &mut RayLedger::new()).unwrap();
            let record = &collector.records()[0];
            let local = surface.world_to_local(corner);
            assert_relative_eq!(record.local_point.x, local.y, epsilon = 1e-6);
            assert_relative_eq!(record.local_point.y, local.z, epsilon = 1e-6);
            assert_relative_eq!(record.world_point, *expected, epsilon = 1e-6);
        }
    }
}

#[test]
fn snell_round_trip_through_parallel_faces() {
    let normal = normal_from_angles(12.0, -7.0).into_inner();
    let first_at = Point3::new(10.0, 2.0, 1.0);
    let second_at = first_at - normal * 5.0;

    let spec = SystemSpec::new()
        .surface(PlacedSurface::new(
            wide_plane("in").materials(MaterialRef::index(1.0), MaterialRef::index(1.5)),
            Placement::at(first_at.x, first_at.y, first_at.z).angles(12.0, -7.0),
        ))
        .surface(PlacedSurface::new(
            wide_plane("out").materials(MaterialRef::index(1.5), MaterialRef::index(1.0)),
            Placement::at(second_at.x, second_at.y, second_at.z).angles(12.0, -7.0),
        ));
    let system = OpticalSystem::build(&spec, &GlassCatalog::new(), &[550.0]).unwrap();

    let ray = Ray::new(Point3::origin(), Vec3::new(1.0, 0.1, -0.05), 550.0, 0);
    let path = system
        .trace(&ray, &mut HitCollector::new(), &mut RayLedger::new())
        .unwrap();

    assert_eq!(path.terminal, RayState::Exited);
    assert_eq!(path.segments.len(), 3);
    // Bent inside the slab, restored after it
    assert!((path.segments[1].direction.into_inner() - ray.direction.into_inner()).norm() > 1e-3);
    assert_relative_eq!(
        path.segments[2].direction.into_inner(),
        ray.direction.into_inner(),
        epsilon = 1e-9
    );
}

#[test]
fn dial_changes_local_frame_only() {
    let placement = Placement::at(20.0, -3.0, -5.0).angles(5.0, -10.0);
    let undialed = single(wide_plane("s"), placement.clone().dial(0.0), &[488.0]);
    let dialed = single(wide_plane("s"), placement.dial(50.0), &[488.0]);
    let a = &undialed.surfaces()[0];
    let b = &dialed.surfaces()[0];

    let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vec3::new(1.0, 0.5, 0.3), 488.0, 0);
    let local_a = to_local(a, &ray);
    let local_b = to_local(b, &ray);

    assert!((local_a.origin - local_b.origin).norm() > 1e-6);
    assert!((local_a.direction - local_b.direction).norm() > 1e-6);
    // Rotation about the normal keeps the depth components
    assert_relative_eq!(local_a.origin.x, local_b.origin.x, epsilon = 1e-9);
    assert_relative_eq!(local_a.direction.x, local_b.direction.x, epsilon = 1e-9);
    assert!(!a.forward().approx_eq(b.forward(), 1e-6));
    assert!(!a.inverse().approx_eq(b.inverse(), 1e-6));

    let mut hits_a = HitCollector::new();
    let mut hits_b = HitCollector::new();
    undialed.trace(&ray, &mut hits_a, &mut RayLedger::new()).unwrap();
    dialed.trace(&ray, &mut hits_b, &mut RayLedger::new()).unwrap();
    let (ha, hb) = (&hits_a.records()[0], &hits_b.records()[0]);
    assert_relative_eq!(ha.world_point, hb.world_point, epsilon = 1e-9);
    assert!((ha.local_point - hb.local_point).norm() > 1e-6);
}

/// Back focal distance of a plano-convex lens, curved side first.
fn back_focal_length(radius: f64, thickness: f64, n: f64) -> f64 {
    radius / (n - 1.0) - thickness / n
}

#[test]
fn spot_shrinks_toward_focus() {
    let catalog = GlassCatalog::with_defaults();
    let wavelengths = [633.0, 532.0];
    let (radius, thickness, back_x) = (50.0, 5.0, 15.0);

    let min_bfl = wavelengths
        .iter()
        .map(|&w| back_focal_length(radius, thickness, catalog.lookup("N-BK7", w).unwrap()))
        .fold(f64::INFINITY, f64::min);

    let air_gap =
        |id: &str| wide_plane(id).materials(MaterialRef::index(1.0), MaterialRef::index(1.0));
    let train = SystemSpec::new()
        .surface(PlacedSurface::new(air_gap("window-a"), Placement::at(5.0, 0.0, 0.0)))
        .surface(PlacedSurface::new(
            SurfaceSpec::new("front")
                .shape("spherical")
                .radius(radius)
                .aperture(Aperture::Circular { semi_diameter: 10.0 })
                .materials(MaterialRef::named("air"), MaterialRef::named("N-BK7")),
            Placement::at(back_x - thickness, 0.0, 0.0),
        ))
        .surface(PlacedSurface::new(
            wide_plane("back").materials(MaterialRef::named("N-BK7"), MaterialRef::named("air")),
            Placement::at(back_x, 0.0, 0.0),
        ))
        .surface(PlacedSurface::new(air_gap("window-b"), Placement::at(20.0, 0.0, 0.0)))
        .surface(PlacedSurface::new(air_gap("window-c"), Placement::at(25.0, 0.0, 0.0)));

    let beam = |wavelength_nm: f64, light_id: u32| CollimatedBeam {
        center: [-5.0, 0.0, 0.0],
        direction: [1.0, 0.0, 0.0],
        radius: 3.0,
        rings: 3,
        spokes: 8,
        wavelength_nm,
        light_id,
        intensity: 1.0,
    };
    let mut rays = beam(633.0, 0).rays();
    rays.extend(beam(532.0, 1).rays());

    let (start, stop) = (40.0, min_bfl - 3.0);
    let steps = 10;
    let mut previous = f64::INFINITY;
    for i in 0..=steps {
        let distance = start + (stop - start) * i as f64 / steps as f64;
        let spec = train.clone().surface(PlacedSurface::new(
            wide_plane("detector").mode(Mode::Absorption),
            Placement::at(back_x + distance, 0.0, 0.0),
        ));
        let system = OpticalSystem::build(&spec, &catalog, &wavelengths).unwrap();
        let detector = system.surface_by_id("detector").unwrap().numeric_id();

        let batch = system.trace_all(&rays).unwrap();
        assert!(batch.ledger.reconciles());
        assert_eq!(batch.ledger.total().absorbed, rays.len() as u64);

        let spot = optrain::spot_on(&batch.collector, detector, SpotFilter::default()).unwrap();
        assert_eq!(spot.count, rays.len());
        assert_relative_eq!(spot.centroid.x, 0.0, epsilon = 1e-9);
        assert!(
            spot.rms_radius < previous,
            "rms {} at {distance} did not shrink from {previous}",
            spot.rms_radius
        );
        previous = spot.rms_radius;
    }
}
