//! Aperture outlines in world space.
//!
//! Outlines are built in local coordinates and mapped to world through the
//! surface's stored inverse transform only, so they agree with the tracer's
//! notion of where the surface is.

use std::f64::consts::TAU;

use optrain_math::Point3;
use optrain_surface::{Aperture, Surface};

/// Default number of vertices for circular outlines.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 32;

fn transverse_outline(aperture: &Aperture, circle_segments: usize) -> Vec<(f64, f64)> {
    match *aperture {
        Aperture::Rectangular { half_y, half_z } => vec![
            (half_y, half_z),
            (-half_y, half_z),
            (-half_y, -half_z),
            (half_y, -half_z),
        ],
        Aperture::Circular { semi_diameter } => {
            let n = circle_segments.max(3);
            (0..n)
                .map(|i| {
                    let theta = TAU * i as f64 / n as f64;
                    (semi_diameter * theta.cos(), semi_diameter * theta.sin())
                })
                .collect()
        }
    }
}

/// Outline of an aperture in local coordinates, at local depth zero.
///
/// Rectangular apertures give their four corners; circular ones a regular
/// polygon with `circle_segments` vertices (at least 3).
pub fn local_outline(aperture: &Aperture, circle_segments: usize) -> Vec<Point3> {
    transverse_outline(aperture, circle_segments)
        .into_iter()
        .map(|(y, z)| Point3::new(0.0, y, z))
        .collect()
}

/// Outline of a surface's aperture in world coordinates.
///
/// Points lie in the vertex plane whatever the shape, i.e. at
/// `inverse * (0, y, z)`.
pub fn boundary_polygon(surface: &Surface, circle_segments: usize) -> Vec<Point3> {
    local_outline(&surface.aperture(), circle_segments)
        .iter()
        .map(|p| surface.local_to_world(p))
        .collect()
}

/// World outline with the default circle resolution.
pub fn boundary_corners(surface: &Surface) -> Vec<Point3> {
    boundary_polygon(surface, DEFAULT_CIRCLE_SEGMENTS)
}

/// World outline lifted onto the surface sag.
///
/// Returns `None` when any outline point lies beyond the vertex-side
/// hemisphere of a curved shape.
pub fn sag_outline(surface: &Surface, circle_segments: usize) -> Option<Vec<Point3>> {
    let shape = surface.shape();
    transverse_outline(&surface.aperture(), circle_segments)
        .into_iter()
        .map(|(y, z)| {
            let x = shape.sag(y, z)?;
            Some(surface.local_to_world(&Point3::new(x, y, z)))
        })
        .collect()
}
