//! Vector forms of Snell's law and specular reflection.

use optrain_math::Vec3;

/// Direction leaving a refracting interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refraction {
    /// Transmitted direction.
    Transmitted(Vec3),
    /// Total internal reflection; the reflected direction.
    TotalInternalReflection(Vec3),
}

/// Mirror `direction` about the plane with normal `normal`.
#[inline]
pub fn reflect(direction: &Vec3, normal: &Vec3) -> Vec3 {
    direction - normal * (2.0 * direction.dot(normal))
}

/// Refract `direction` through an interface from index `n1` into `n2`.
///
/// `normal` may face either side; it is flipped to oppose the incident
/// direction. Both vectors must be unit length.
pub fn refract(direction: &Vec3, normal: &Vec3, n1: f64, n2: f64) -> Refraction {
    let normal = if direction.dot(normal) > 0.0 { -normal } else { *normal };
    let cos_i = -direction.dot(&normal);
    let ratio = n1 / n2;
    let k = 1.0 - ratio * ratio * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return Refraction::TotalInternalReflection(reflect(direction, &normal));
    }
    let transmitted = direction * ratio + normal * (ratio * cos_i - k.sqrt());
    Refraction::Transmitted(transmitted.normalize())
}
