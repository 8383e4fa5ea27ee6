//! Ray-plane intersection (closed-form).

use optrain_math::{Dir3, Vec3};

use super::LocalHit;
use crate::ray::LocalRay;

/// Intersect a local ray with the plane `x = 0`.
///
/// Returns `None` if the ray is parallel to the plane or intersects behind
/// the origin.
pub fn intersect_plane(ray: &LocalRay) -> Option<LocalHit> {
    let denom = ray.direction.x;

    // Ray is parallel to plane
    if denom.abs() < 1e-12 {
        return None;
    }

    let t = -ray.origin.x / denom;
    if t < 0.0 {
        return None;
    }

    let mut point = ray.at(t);
    point.x = 0.0;
    Some(LocalHit {
        t,
        point,
        normal: Dir3::new_unchecked(-Vec3::x()),
    })
}
