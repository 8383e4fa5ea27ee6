//! Ray-cylinder intersection (quadratic equation).
//!
//! The cylinder axis is parallel to local z through `(R, 0, 0)`, giving a
//! surface curved in the local x-y plane and straight along z.

use optrain_math::{Dir3, Point3, Vec3};

use super::{sort_by_t, LocalHit};
use crate::ray::LocalRay;

/// Intersect a local ray with a cylindrical surface of signed `radius`.
///
/// Returns up to 2 intersections on the vertex-side half, sorted by t.
pub fn intersect_cylinder(ray: &LocalRay, radius: f64) -> Vec<LocalHit> {
    let ox = ray.origin.x - radius;
    let oy = ray.origin.y;
    let dx = ray.direction.x;
    let dy = ray.direction.y;

    let a = dx * dx + dy * dy;
    if a < 1e-12 {
        // Ray parallel to the axis
        return Vec::new();
    }

    let b = 2.0 * (ox * dx + oy * dy);
    let c = ox * ox + oy * oy - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }

    let sqrt_disc = discriminant.sqrt();
    let mut hits: Vec<LocalHit> = [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)]
        .into_iter()
        .filter(|&t| t >= 0.0)
        .filter_map(|t| {
            let point: Point3 = ray.at(t);
            let nx = (point.x - radius) / radius;
            if nx > 0.0 {
                return None;
            }
            Some(LocalHit {
                t,
                point,
                normal: Dir3::new_normalize(Vec3::new(nx, point.y / radius, 0.0)),
            })
        })
        .collect();

    sort_by_t(&mut hits);
    hits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ray(o: [f64; 3], d: [f64; 3]) -> LocalRay {
        LocalRay {
            origin: Point3::new(o[0], o[1], o[2]),
            direction: Vec3::new(d[0], d[1], d[2]).normalize(),
        }
    }

    #[test]
    fn test_sag_ignores_z() {
        let r = 25.0;
        let a = intersect_cylinder(&ray([-5.0, 5.0, 0.0], [1.0, 0.0, 0.0]), r);
        let b = intersect_cylinder(&ray([-5.0, 5.0, 8.0], [1.0, 0.0, 0.0]), r);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert!((a[0].point.x - b[0].point.x).abs() < 1e-12);
        assert!(b[0].normal.z.abs() < 1e-12);
        let sag = r - (r * r - 25.0_f64).sqrt();
        assert!((a[0].point.x - sag).abs() < 1e-10);
    }

    #[test]
    fn test_axis_parallel_ray() {
        assert!(intersect_cylinder(&ray([-5.0, 0.0, 0.0], [0.0, 0.0, 1.0]), 25.0).is_empty());
    }

    #[test]
    fn test_vertex_normal() {
        let hits = intersect_cylinder(&ray([-1.0, 0.0, 3.0], [1.0, 0.0, 0.0]), -30.0);
        assert_eq!(hits.len(), 1);
        assert!((hits[0].normal.x + 1.0).abs() < 1e-12);
    }
}
