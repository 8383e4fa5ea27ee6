//! Ray-sphere intersection (quadratic equation).
//!
//! The sphere has its vertex at the local origin and its centre at `(R, 0, 0)`,
//! so a positive radius is convex toward incoming light. Only the
//! hemisphere containing the vertex belongs to the surface.

use optrain_math::{Dir3, Point3, Vec3};

use super::{sort_by_t, LocalHit};
use crate::ray::LocalRay;

/// Intersect a local ray with a spherical cap of signed `radius`.
///
/// Returns up to 2 intersections on the vertex-side hemisphere, sorted by t.
/// Only intersections with t >= 0 are returned.
pub fn intersect_sphere(ray: &LocalRay, radius: f64) -> Vec<LocalHit> {
    let center = Point3::new(radius, 0.0, 0.0);
    let oc = ray.origin - center;
    let d = ray.direction;

    let a = d.dot(&d);
    let b = 2.0 * oc.dot(&d);
    let c = oc.dot(&oc) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }

    let sqrt_disc = discriminant.sqrt();
    let mut hits: Vec<LocalHit> = [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)]
        .into_iter()
        .filter(|&t| t >= 0.0)
        .filter_map(|t| {
            let point = ray.at(t);
            let outward: Vec3 = (point - center) / radius;
            // Vertex-side hemisphere only
            if outward.x > 0.0 {
                return None;
            }
            Some(LocalHit {
                t,
                point,
                normal: Dir3::new_normalize(outward),
            })
        })
        .collect();

    sort_by_t(&mut hits);
    hits
}
