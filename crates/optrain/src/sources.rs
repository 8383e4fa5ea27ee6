//! Deterministic light sources.
//!
//! Sources produce finite ray lists in a fixed order; emission indices count
//! up from zero within each source.

use std::f64::consts::TAU;

use optrain_math::{Dir3, Point3, Vec3};
use optrain_trace::Ray;
use serde::{Deserialize, Serialize};

/// Parallel rays filling a disc, arranged in rings and spokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollimatedBeam {
    /// Centre of the emitting disc.
    pub center: [f64; 3],
    /// Propagation direction.
    pub direction: [f64; 3],
    /// Disc radius.
    pub radius: f64,
    /// Number of rings outside the chief ray.
    pub rings: usize,
    /// Rays per ring.
    pub spokes: usize,
    /// Wavelength in nanometres.
    pub wavelength_nm: f64,
    /// Light id stamped on every ray.
    pub light_id: u32,
    /// Intensity of each ray.
    #[serde(default = "unit")]
    pub intensity: f64,
}

impl CollimatedBeam {
    /// Chief ray followed by `rings * spokes` marginal rays.
    pub fn rays(&self) -> Vec<Ray> {
        let direction = vec3(self.direction);
        let (u, v) = transverse_basis(&direction);
        let center = Point3::from(vec3(self.center));

        let offsets = ring_pattern(self.rings, self.spokes);
        offsets
            .into_iter()
            .enumerate()
            .map(|(i, (r, theta))| {
                let offset =
                    u * (self.radius * r * theta.cos()) + v * (self.radius * r * theta.sin());
                Ray::new(center + offset, direction, self.wavelength_nm, self.light_id)
                    .with_intensity(self.intensity)
                    .with_emission(i as u64)
            })
            .collect()
    }
}

/// Rays diverging from a point into a cone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSource {
    /// Emitting point.
    pub origin: [f64; 3],
    /// Cone axis.
    pub axis: [f64; 3],
    /// Cone half-angle in degrees.
    pub half_angle_deg: f64,
    /// Number of rings outside the axial ray.
    pub rings: usize,
    /// Rays per ring.
    pub spokes: usize,
    /// Wavelength in nanometres.
    pub wavelength_nm: f64,
    /// Light id stamped on every ray.
    pub light_id: u32,
    /// Intensity of each ray.
    #[serde(default = "unit")]
    pub intensity: f64,
}

impl PointSource {
    /// Axial ray followed by `rings * spokes` rays on cones of increasing angle.
    pub fn rays(&self) -> Vec<Ray> {
        let axis = Dir3::new_normalize(vec3(self.axis));
        let (u, v) = transverse_basis(axis.as_ref());
        let origin = Point3::from(vec3(self.origin));
        let half_angle = self.half_angle_deg.to_radians();

        ring_pattern(self.rings, self.spokes)
            .into_iter()
            .enumerate()
            .map(|(i, (r, theta))| {
                let tilt = half_angle * r;
                let direction = axis.as_ref() * tilt.cos()
                    + (u * theta.cos() + v * theta.sin()) * tilt.sin();
                Ray::new(origin, direction, self.wavelength_nm, self.light_id)
                    .with_intensity(self.intensity)
                    .with_emission(i as u64)
            })
            .collect()
    }
}

fn unit() -> f64 {
    1.0
}

fn vec3(a: [f64; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

/// Normalized radius and angle of each ray, chief ray first.
fn ring_pattern(rings: usize, spokes: usize) -> Vec<(f64, f64)> {
    let mut pattern = Vec::with_capacity(1 + rings * spokes);
    pattern.push((0.0, 0.0));
    if spokes == 0 {
        return pattern;
    }
    for ring in 1..=rings {
        let r = ring as f64 / rings as f64;
        for spoke in 0..spokes {
            pattern.push((r, TAU * spoke as f64 / spokes as f64));
        }
    }
    pattern
}

/// Two unit vectors spanning the plane perpendicular to `d`.
fn transverse_basis(d: &Vec3) -> (Vec3, Vec3) {
    let d = d.normalize();
    let helper = if d.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let u = d.cross(&helper).normalize();
    let v = d.cross(&u);
    (u, v)
}
