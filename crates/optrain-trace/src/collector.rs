//! Per-surface hit records.
//!
//! A [`HitCollector`] is owned by whoever drives a trace and passed in
//! explicitly, so independent traces never share state. Parallel workers
//! each fill their own collector and [`merge`](HitCollector::merge) them.

use std::collections::BTreeMap;

use optrain_math::{Dir3, Point2, Point3};
use optrain_surface::SurfaceId;

use crate::ray::Lineage;
use crate::tracer::RayState;

/// One ray segment meeting one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    /// Surface that was reached.
    pub surface: SurfaceId,
    /// String id of the surface.
    pub surface_label: String,
    /// World intersection point.
    pub world_point: Point3,
    /// World surface normal at the intersection.
    pub world_normal: Dir3,
    /// Local transverse coordinates `(y, z)`.
    pub local_point: Point2,
    /// Incoming world direction.
    pub incident: Dir3,
    /// Outgoing world direction, `None` when the ray ended here.
    pub exit: Option<Dir3>,
    /// Wavelength in nanometres.
    pub wavelength_nm: f64,
    /// Emitting light source.
    pub light_id: u32,
    /// Segment lineage.
    pub lineage: Lineage,
    /// Intensity carried by the ray.
    pub intensity: f64,
    /// What happened at the surface.
    pub event: RayState,
    /// Whether refraction fell back to total internal reflection.
    pub total_internal_reflection: bool,
    /// Whether the ray fell outside the clear aperture.
    pub blocked: bool,
}

/// Ordered store of hit records.
#[derive(Debug, Clone, Default)]
pub struct HitCollector {
    records: Vec<HitRecord>,
}

impl HitCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: HitRecord) {
        self.records.push(record);
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Append all records of `other`, preserving its order.
    pub fn merge(&mut self, other: HitCollector) {
        self.records.extend(other.records);
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[HitRecord] {
        &self.records
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records were collected.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records on one surface, blocked ones included.
    pub fn for_surface(&self, surface: SurfaceId) -> impl Iterator<Item = &HitRecord> {
        self.records.iter().filter(move |r| r.surface == surface)
    }

    /// Records on one surface that landed inside the aperture.
    pub fn valid_for_surface(&self, surface: SurfaceId) -> impl Iterator<Item = &HitRecord> {
        self.for_surface(surface).filter(|r| !r.blocked)
    }

    /// Number of blocked records on one surface.
    pub fn blocked_count(&self, surface: SurfaceId) -> usize {
        self.for_surface(surface).filter(|r| r.blocked).count()
    }

    /// Records grouped by surface, in surface order.
    pub fn by_surface(&self) -> BTreeMap<SurfaceId, Vec<&HitRecord>> {
        let mut grouped: BTreeMap<SurfaceId, Vec<&HitRecord>> = BTreeMap::new();
        for record in &self.records {
            grouped.entry(record.surface).or_default().push(record);
        }
        grouped
    }
}
