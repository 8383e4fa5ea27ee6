//! Ray-surface intersection in the surface's local frame.
//!
//! Each shape has a dedicated intersector returning every candidate hit at
//! `t >= 0` sorted by `t`. [`intersect_local`] then applies the aperture:
//! the first candidate inside it wins, otherwise the ray is clipped at the
//! first candidate.

mod cylinder;
mod plane;
mod sphere;

pub use cylinder::intersect_cylinder;
pub use plane::intersect_plane;
pub use sphere::intersect_sphere;

use optrain_math::{Dir3, Point2, Point3};
use optrain_surface::{Aperture, Shape, Surface};

use crate::ray::{LocalRay, Ray};

/// A candidate intersection in local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalHit {
    /// Parameter along the local ray.
    pub t: f64,
    /// Local intersection point.
    pub point: Point3,
    /// Local unit normal, pointing toward the vertex side (-x at the vertex).
    pub normal: Dir3,
}

impl LocalHit {
    /// Transverse coordinates `(y, z)` of the hit.
    #[inline]
    pub fn transverse(&self) -> Point2 {
        Point2::new(self.point.y, self.point.z)
    }
}

/// Outcome of intersecting one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The ray never reaches the surface.
    Miss,
    /// The ray reaches the surface outside its clear aperture.
    Clipped(LocalHit),
    /// The ray reaches the surface inside its clear aperture.
    Hit(LocalHit),
}

/// Candidate hits of a local ray with a shape, sorted by t.
pub fn intersect_shape(ray: &LocalRay, shape: Shape) -> Vec<LocalHit> {
    match shape {
        Shape::Planar => intersect_plane(ray).into_iter().collect(),
        Shape::Spherical { radius } => intersect_sphere(ray, radius),
        Shape::Cylindrical { radius } => intersect_cylinder(ray, radius),
    }
}

/// Intersect a local ray with a shape, then clip against an aperture.
pub fn intersect_local(ray: &LocalRay, shape: Shape, aperture: &Aperture) -> Intersection {
    let hits = intersect_shape(ray, shape);
    if let Some(hit) = hits.iter().find(|h| aperture.contains(h.point.y, h.point.z)) {
        return Intersection::Hit(*hit);
    }
    match hits.first() {
        Some(hit) => Intersection::Clipped(*hit),
        None => Intersection::Miss,
    }
}

/// Map a world ray into a surface's local frame.
pub fn to_local(surface: &Surface, ray: &Ray) -> LocalRay {
    let forward = surface.forward();
    LocalRay {
        origin: forward.apply_point(&ray.origin),
        direction: forward.apply_vec(ray.direction.as_ref()),
    }
}

pub(crate) fn sort_by_t(hits: &mut [LocalHit]) {
    hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));
}

#[cfg(test)]
mod tests {
    use super::*;
    use optrain_math::Vec3;

    fn local(o: [f64; 3], d: [f64; 3]) -> LocalRay {
        LocalRay {
            origin: Point3::new(o[0], o[1], o[2]),
            direction: Vec3::new(d[0], d[1], d[2]).normalize(),
        }
    }

    #[test]
    fn test_aperture_clip() {
        let aperture = Aperture::Circular { semi_diameter: 2.0 };
        let ray = local([-5.0, 1.0, 1.0], [1.0, 0.0, 0.0]);
        let inside = intersect_local(&ray, Shape::Planar, &aperture);
        assert!(matches!(inside, Intersection::Hit(_)));

        let ray = local([-5.0, 2.0, 1.0], [1.0, 0.0, 0.0]);
        let outside = intersect_local(&ray, Shape::Planar, &aperture);
        match outside {
            Intersection::Clipped(hit) => assert!((hit.point.y - 2.0).abs() < 1e-12),
            other => panic!("expected clip, got {other:?}"),
        }

        let ray = local([-5.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let parallel = intersect_local(&ray, Shape::Planar, &aperture);
        assert_eq!(parallel, Intersection::Miss);
    }

    #[test]
    fn test_rectangular_aperture() {
        let aperture = Aperture::Rectangular { half_y: 1.0, half_z: 3.0 };
        let ray = local([-1.0, 0.5, 2.5], [1.0, 0.0, 0.0]);
        assert!(matches!(intersect_local(&ray, Shape::Planar, &aperture), Intersection::Hit(_)));
        let ray = local([-1.0, 1.5, 0.0], [1.0, 0.0, 0.0]);
        assert!(matches!(
            intersect_local(&ray, Shape::Planar, &aperture),
            Intersection::Clipped(_)
        ));
    }
}
