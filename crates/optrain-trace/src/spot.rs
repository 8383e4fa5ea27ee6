//! Spot diagram statistics on a surface.

use optrain_math::Point2;
use optrain_surface::{SurfaceId, WavelengthKey};

use crate::collector::{HitCollector, HitRecord};

/// Centroid and RMS spread of hits in local transverse coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotStats {
    /// Number of hits.
    pub count: usize,
    /// Mean local `(y, z)`.
    pub centroid: Point2,
    /// Root-mean-square distance from the centroid.
    pub rms_radius: f64,
}

/// Which hits to include.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpotFilter {
    /// Only this wavelength, if set.
    pub wavelength_nm: Option<f64>,
    /// Only this light, if set.
    pub light_id: Option<u32>,
}

impl SpotFilter {
    fn accepts(&self, record: &HitRecord) -> bool {
        let wavelength_ok = self.wavelength_nm.map_or(true, |w| {
            WavelengthKey::from_nm(w) == WavelengthKey::from_nm(record.wavelength_nm)
        });
        let light_ok = self.light_id.map_or(true, |l| l == record.light_id);
        wavelength_ok && light_ok
    }
}

/// Statistics over a set of hits, `None` if empty.
pub fn spot_stats<'a>(records: impl IntoIterator<Item = &'a HitRecord>) -> Option<SpotStats> {
    let points: Vec<Point2> = records.into_iter().map(|r| r.local_point).collect();
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum = points.iter().fold(Point2::origin().coords, |acc, p| acc + p.coords);
    let centroid = Point2::from(sum / n);
    let mean_sq = points.iter().map(|p| (*p - centroid).norm_squared()).sum::<f64>() / n;
    Some(SpotStats {
        count: points.len(),
        centroid,
        rms_radius: mean_sq.sqrt(),
    })
}

/// Statistics of unblocked hits on one surface.
pub fn spot_on(
    collector: &HitCollector,
    surface: SurfaceId,
    filter: SpotFilter,
) -> Option<SpotStats> {
    spot_stats(collector.valid_for_surface(surface).filter(|r| filter.accepts(r)))
}
