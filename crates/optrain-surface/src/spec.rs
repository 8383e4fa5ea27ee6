//! Declarative surface and assembly requests.
//!
//! These are the structured values handed over by whatever parses the
//! system description. They carry names rather than resolved types (the shape
//! is a string, materials may be names) so that every resolution failure is
//! reported by the factory at construction time.

use serde::{Deserialize, Serialize};

use crate::material::MaterialRef;
use crate::surface::{Aperture, Mode};

/// Optical description of one surface. Every field but `id` may be inherited
/// from a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceSpec {
    /// Surface id, unique within a system.
    pub id: String,
    /// Name of a template to inherit unset fields from.
    pub template: Option<String>,
    /// Shape name: `planar`, `spherical` or `cylindrical`.
    pub shape: Option<String>,
    /// Signed radius of curvature for curved shapes.
    pub radius: Option<f64>,
    /// Clear aperture.
    pub aperture: Option<Aperture>,
    /// Interaction mode. Defaults to refraction.
    pub mode: Option<Mode>,
    /// Material on the incoming side. Defaults to index 1.0.
    pub material_before: Option<MaterialRef>,
    /// Material on the outgoing side. Defaults to index 1.0.
    pub material_after: Option<MaterialRef>,
}

impl SurfaceSpec {
    /// A spec with only the id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the shape name.
    pub fn shape(mut self, shape: impl Into<String>) -> Self {
        self.shape = Some(shape.into());
        self
    }

    /// Set the radius of curvature.
    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Set the aperture.
    pub fn aperture(mut self, aperture: Aperture) -> Self {
        self.aperture = Some(aperture);
        self
    }

    /// Set the mode.
    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set both side materials.
    pub fn materials(mut self, before: MaterialRef, after: MaterialRef) -> Self {
        self.material_before = Some(before);
        self.material_after = Some(after);
        self
    }

    /// Inherit unset fields from the named template.
    pub fn template(mut self, name: impl Into<String>) -> Self {
        self.template = Some(name.into());
        self
    }

    /// Fill every unset field from `base`, taking over its template link.
    pub(crate) fn inherit(&mut self, base: &SurfaceSpec) {
        self.template = base.template.clone();
        if self.shape.is_none() {
            self.shape = base.shape.clone();
        }
        if self.radius.is_none() {
            self.radius = base.radius;
        }
        if self.aperture.is_none() {
            self.aperture = base.aperture;
        }
        if self.mode.is_none() {
            self.mode = base.mode;
        }
        if self.material_before.is_none() {
            self.material_before = base.material_before.clone();
        }
        if self.material_after.is_none() {
            self.material_after = base.material_after.clone();
        }
    }
}

/// Where a surface or assembly sits in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    /// Absolute world coordinates.
    Absolute([f64; 3]),
    /// Offset in world coordinates from an already built surface.
    Relative {
        /// Id of the referenced surface.
        surface: String,
        /// World-space offset from that surface's vertex.
        offset: [f64; 3],
    },
}

impl Default for Position {
    fn default() -> Self {
        Position::Absolute([0.0; 3])
    }
}

/// How the surface normal is specified.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// The canonical normal `(-1, 0, 0)`.
    #[default]
    Default,
    /// Explicit normal vector; normalized on use.
    Normal([f64; 3]),
    /// Azimuth and elevation in degrees.
    Angles {
        /// Azimuth in degrees.
        azimuth_deg: f64,
        /// Elevation in degrees.
        elevation_deg: f64,
    },
}

/// World placement of a surface or assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placement {
    /// Vertex position.
    pub position: Position,
    /// Normal specification.
    pub orientation: Orientation,
    /// Rotation about the normal, in degrees.
    pub dial_deg: Option<f64>,
}

impl Placement {
    /// Placement at an absolute position with the default orientation.
    pub fn at(x: f64, y: f64, z: f64) -> Self {
        Self {
            position: Position::Absolute([x, y, z]),
            ..Self::default()
        }
    }

    /// Set the orientation from azimuth/elevation angles in degrees.
    pub fn angles(mut self, azimuth_deg: f64, elevation_deg: f64) -> Self {
        self.orientation = Orientation::Angles {
            azimuth_deg,
            elevation_deg,
        };
        self
    }

    /// Set an explicit normal.
    pub fn normal(mut self, x: f64, y: f64, z: f64) -> Self {
        self.orientation = Orientation::Normal([x, y, z]);
        self
    }

    /// Set the dial angle in degrees.
    pub fn dial(mut self, dial_deg: f64) -> Self {
        self.dial_deg = Some(dial_deg);
        self
    }
}

/// A standalone surface request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedSurface {
    /// Optical description.
    #[serde(flatten)]
    pub spec: SurfaceSpec,
    /// World placement.
    #[serde(default)]
    pub placement: Placement,
}

impl PlacedSurface {
    /// Pair a spec with a placement.
    pub fn new(spec: SurfaceSpec, placement: Placement) -> Self {
        Self { spec, placement }
    }
}

/// One member of an assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSpec {
    /// Optical description.
    #[serde(flatten)]
    pub spec: SurfaceSpec,
    /// Distance along the assembly axis from the previous member
    /// (from the assembly origin for the first member).
    #[serde(default)]
    pub spacing: f64,
    /// Orientation relative to the assembly frame.
    #[serde(default)]
    pub orientation: Orientation,
    /// Member dial in degrees, composed with the assembly dial.
    #[serde(default)]
    pub dial_deg: Option<f64>,
}

impl MemberSpec {
    /// A member at `spacing` from its predecessor, aligned with the assembly.
    pub fn new(spec: SurfaceSpec, spacing: f64) -> Self {
        Self {
            spec,
            spacing,
            orientation: Orientation::Default,
            dial_deg: None,
        }
    }
}

/// A named group of surfaces placed as a rigid unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblySpec {
    /// Assembly name; member ids are prefixed with it.
    pub name: String,
    /// World placement of the assembly frame.
    #[serde(default)]
    pub placement: Placement,
    /// Members in optical-train order.
    pub members: Vec<MemberSpec>,
}
