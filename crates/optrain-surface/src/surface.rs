//! The optical surface record.
//!
//! A [`Surface`] is produced once by the [`SurfaceFactory`](crate::SurfaceFactory)
//! and never modified afterwards. Its fields are private so the transform
//! pair can only come from the factory, where the forward transform is always
//! the matrix inverse of the inverse transform.

use optrain_math::{Dir3, Point3, Transform, Vec3};
use serde::{Deserialize, Serialize};

use crate::material::MaterialRef;

/// Stable insertion-order numeric id of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SurfaceId(pub usize);

impl SurfaceId {
    /// The id as an index.
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Surface geometry in the local frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Plane through the local origin, normal to local x.
    Planar,
    /// Sphere with its vertex at the local origin and centre at `(radius, 0, 0)`.
    Spherical {
        /// Signed radius of curvature.
        radius: f64,
    },
    /// Cylinder curved in the local x-y plane, axis parallel to local z.
    Cylindrical {
        /// Signed radius of curvature.
        radius: f64,
    },
}

impl Shape {
    /// Signed radius of curvature, if the shape is curved.
    pub fn radius(&self) -> Option<f64> {
        match *self {
            Shape::Planar => None,
            Shape::Spherical { radius } | Shape::Cylindrical { radius } => Some(radius),
        }
    }

    /// Human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Planar => "planar",
            Shape::Spherical { .. } => "spherical",
            Shape::Cylindrical { .. } => "cylindrical",
        }
    }

    /// Local x coordinate of the surface at transverse position `(y, z)`.
    ///
    /// Returns `None` outside the vertex-side hemisphere of a curved shape.
    pub fn sag(&self, y: f64, z: f64) -> Option<f64> {
        let (radius, rho2) = match *self {
            Shape::Planar => return Some(0.0),
            Shape::Spherical { radius } => (radius, y * y + z * z),
            Shape::Cylindrical { radius } => (radius, y * y),
        };
        let under = radius * radius - rho2;
        if under < 0.0 {
            return None;
        }
        Some(radius - radius.signum() * under.sqrt())
    }
}

/// Clear aperture of a surface, in local transverse coordinates `(y, z)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Aperture {
    /// Circle of the given semi-diameter.
    Circular {
        /// Radius of the clear aperture.
        semi_diameter: f64,
    },
    /// Rectangle of the given half extents.
    Rectangular {
        /// Half extent along local y.
        half_y: f64,
        /// Half extent along local z.
        half_z: f64,
    },
}

impl Aperture {
    /// Whether the transverse point `(y, z)` lies inside the aperture.
    pub fn contains(&self, y: f64, z: f64) -> bool {
        match *self {
            Aperture::Circular { semi_diameter } => (y * y + z * z).sqrt() <= semi_diameter,
            Aperture::Rectangular { half_y, half_z } => y.abs() <= half_y && z.abs() <= half_z,
        }
    }
}

/// What a surface does to a ray that hits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Refract according to Snell's law.
    Refraction,
    /// Mirror about the local normal.
    Reflection,
    /// Terminate the ray (detector / image plane).
    Absorption,
    /// Pass through unchanged if inside the aperture.
    ApertureStop,
}

/// Membership of a surface in an assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyMembership {
    /// Assembly name.
    pub assembly: String,
    /// Position of the member within the assembly.
    pub index: usize,
    /// Dial applied to the whole assembly, in degrees.
    pub assembly_dial_deg: Option<f64>,
}

/// The canonical local normal: the surface faces local -x.
///
/// This is the normal that azimuth = elevation = 0 produces.
pub fn canonical_normal() -> Dir3 {
    Dir3::new_unchecked(Vec3::new(-1.0, 0.0, 0.0))
}

/// A fully constructed optical surface.
#[derive(Debug, Clone)]
pub struct Surface {
    id: String,
    numeric_id: SurfaceId,
    shape: Shape,
    aperture: Aperture,
    mode: Mode,
    position: Point3,
    normal: Dir3,
    dial_deg: Option<f64>,
    forward: Transform,
    inverse: Transform,
    material_before: MaterialRef,
    material_after: MaterialRef,
    assembly: Option<AssemblyMembership>,
}

/// Everything the factory resolves before a surface receives its id.
#[derive(Debug, Clone)]
pub(crate) struct SurfaceParts {
    pub id: String,
    pub shape: Shape,
    pub aperture: Aperture,
    pub mode: Mode,
    pub dial_deg: Option<f64>,
    pub material_before: MaterialRef,
    pub material_after: MaterialRef,
    pub assembly: Option<AssemblyMembership>,
}

impl Surface {
    /// Assemble a surface from resolved parts and a transform pair.
    ///
    /// `forward` must be the matrix inverse of `inverse`.
    pub(crate) fn from_parts(
        parts: SurfaceParts,
        numeric_id: SurfaceId,
        forward: Transform,
        inverse: Transform,
    ) -> Self {
        let position = inverse.apply_point(&Point3::origin());
        let normal = inverse.apply_dir(&canonical_normal());
        Self {
            id: parts.id,
            numeric_id,
            shape: parts.shape,
            aperture: parts.aperture,
            mode: parts.mode,
            position,
            normal,
            dial_deg: parts.dial_deg,
            forward,
            inverse,
            material_before: parts.material_before,
            material_after: parts.material_after,
            assembly: parts.assembly,
        }
    }

    /// String id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Numeric id, assigned in creation order.
    pub fn numeric_id(&self) -> SurfaceId {
        self.numeric_id
    }

    /// Shape.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Clear aperture.
    pub fn aperture(&self) -> Aperture {
        self.aperture
    }

    /// Interaction mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// World position of the surface vertex.
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// World unit normal at the vertex. Unaffected by dial.
    pub fn normal(&self) -> Dir3 {
        self.normal
    }

    /// Dial angle about the normal, in degrees.
    pub fn dial_deg(&self) -> Option<f64> {
        self.dial_deg
    }

    /// World to local transform (used for intersection).
    pub fn forward(&self) -> &Transform {
        &self.forward
    }

    /// Local to world transform (used to place local geometry).
    pub fn inverse(&self) -> &Transform {
        &self.inverse
    }

    /// Material on the incoming side.
    pub fn material_before(&self) -> &MaterialRef {
        &self.material_before
    }

    /// Material on the outgoing side.
    pub fn material_after(&self) -> &MaterialRef {
        &self.material_after
    }

    /// Assembly membership, if the surface came from an assembly.
    pub fn assembly(&self) -> Option<&AssemblyMembership> {
        self.assembly.as_ref()
    }

    /// Map a world point into the local frame.
    pub fn world_to_local(&self, p: &Point3) -> Point3 {
        self.forward.apply_point(p)
    }

    /// Map a local point into world space.
    pub fn local_to_world(&self, p: &Point3) -> Point3 {
        self.inverse.apply_point(p)
    }
}
