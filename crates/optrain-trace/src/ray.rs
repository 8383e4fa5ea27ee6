//! Optical ray representation and lineage bookkeeping.

use optrain_math::{Dir3, Point3, Vec3};

/// Position of a ray segment in its family tree.
///
/// Every emitted ray starts at generation 0. Each surface interaction that
/// continues the ray produces a child one generation deeper with the same
/// emission index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Lineage {
    /// Index of the emitted ray this segment descends from.
    pub emission: u64,
    /// Number of interactions since emission.
    pub generation: u32,
}

impl Lineage {
    /// Root lineage for the `emission`-th emitted ray.
    pub fn root(emission: u64) -> Self {
        Self {
            emission,
            generation: 0,
        }
    }

    /// Lineage of the segment that produced this one, if any.
    pub fn parent(&self) -> Option<Lineage> {
        self.generation.checked_sub(1).map(|generation| Lineage {
            emission: self.emission,
            generation,
        })
    }

    /// Lineage of the next segment.
    pub fn child(&self) -> Lineage {
        Lineage {
            emission: self.emission,
            generation: self.generation + 1,
        }
    }
}

/// A ray segment in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the segment.
    pub origin: Point3,
    /// Unit propagation direction.
    pub direction: Dir3,
    /// Vacuum wavelength in nanometres.
    pub wavelength_nm: f64,
    /// Light source this ray was emitted by.
    pub light_id: u32,
    /// Relative intensity carried by the ray.
    pub intensity: f64,
    /// Family-tree position.
    pub lineage: Lineage,
}

impl Ray {
    /// Create a root ray with unit intensity.
    ///
    /// The direction will be normalized.
    pub fn new(origin: Point3, direction: Vec3, wavelength_nm: f64, light_id: u32) -> Self {
        Self {
            origin,
            direction: Dir3::new_normalize(direction),
            wavelength_nm,
            light_id,
            intensity: 1.0,
            lineage: Lineage::default(),
        }
    }

    /// Set the emission index.
    pub fn with_emission(mut self, emission: u64) -> Self {
        self.lineage = Lineage::root(emission);
        self
    }

    /// Set the carried intensity.
    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = intensity;
        self
    }

    /// Evaluate the ray at parameter `t`: `origin + t * direction`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction.as_ref()
    }

    /// Next segment, leaving `origin` along `direction`.
    pub fn child(&self, origin: Point3, direction: Dir3) -> Ray {
        Ray {
            origin,
            direction,
            lineage: self.lineage.child(),
            ..*self
        }
    }
}

/// A ray expressed in a surface's local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalRay {
    /// Local origin.
    pub origin: Point3,
    /// Local direction, unit length for rigid transforms.
    pub direction: Vec3,
}

impl LocalRay {
    /// Evaluate at parameter `t`.
    #[inline]
    pub fn at(&self, t: f64) -> Point3 {
        self.origin + t * self.direction
    }
}
