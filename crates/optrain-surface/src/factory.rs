//! Surface factory: declarative requests to placed surfaces.
//!
//! Every surface gets its local-to-world transform from a single composition
//! `translate ∘ orient ∘ dial`. The world-to-local transform is always
//! obtained by inverting that matrix, never by a second formula.

use std::collections::{HashMap, HashSet};

use optrain_math::{Dir3, Point3, Transform, Vec3};

use crate::error::{BuildError, Result};
use crate::spec::{AssemblySpec, Orientation, PlacedSurface, Placement, Position, SurfaceSpec};
use crate::surface::{
    canonical_normal, AssemblyMembership, Mode, Shape, Surface, SurfaceId, SurfaceParts,
};

/// Unit normal for an azimuth/elevation pair given in degrees.
///
/// `normal = (-cos(el)cos(az), -cos(el)sin(az), sin(el))`; zero angles give
/// the canonical normal `(-1, 0, 0)`.
pub fn normal_from_angles(azimuth_deg: f64, elevation_deg: f64) -> Dir3 {
    let (az, el) = (azimuth_deg.to_radians(), elevation_deg.to_radians());
    Dir3::new_normalize(Vec3::new(
        -el.cos() * az.cos(),
        -el.cos() * az.sin(),
        el.sin(),
    ))
}

/// Rotation about the local normal axis (local x) by `dial_deg` degrees.
pub fn dial_rotation(dial_deg: Option<f64>) -> Transform {
    match dial_deg {
        Some(deg) => Transform::rotation_x(deg.to_radians()),
        None => Transform::identity(),
    }
}

/// Builds surfaces and assemblies, assigning numeric ids in creation order.
#[derive(Debug, Default)]
pub struct SurfaceFactory {
    next_id: usize,
    templates: HashMap<String, SurfaceSpec>,
    positions: HashMap<String, Point3>,
}

impl SurfaceFactory {
    /// Create a factory whose first surface receives id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named template that specs may inherit from.
    pub fn register_template(&mut self, name: impl Into<String>, spec: SurfaceSpec) {
        self.templates.insert(name.into(), spec);
    }

    /// The id the next surface will receive.
    pub fn next_id(&self) -> SurfaceId {
        SurfaceId(self.next_id)
    }

    /// Build a single surface.
    pub fn build_surface(&mut self, request: &PlacedSurface) -> Result<Surface> {
        let id = request.spec.id.clone();
        self.check_unique(&id)?;

        let parts = self.resolve_parts(&request.spec, id, request.placement.dial_deg, None)?;
        let inverse = self.placement_frame(&parts.id, &request.placement)?;
        let forward = invert(&parts.id, &inverse)?;
        Ok(self.finish(parts, forward, inverse))
    }

    /// Expand an assembly into its member surfaces, in member order.
    ///
    /// Member `i` is placed at
    /// `assemblyTranslate ∘ assemblyOrient ∘ assemblyDial ∘ offset_i ∘ memberOrient_i ∘ memberDial_i`,
    /// where `offset_i` is the running sum of spacings along the assembly's
    /// local +x axis. All members are validated before any id is assigned.
    pub fn build_assembly(&mut self, assembly: &AssemblySpec) -> Result<Vec<Surface>> {
        let frame = self.placement_frame(&assembly.name, &assembly.placement)?;

        let mut staged = Vec::with_capacity(assembly.members.len());
        let mut seen = HashSet::new();
        let mut offset = 0.0;

        for (index, member) in assembly.members.iter().enumerate() {
            let id = format!("{}.{}", assembly.name, member.spec.id);
            self.check_unique(&id)?;
            if !seen.insert(id.clone()) {
                return Err(BuildError::DuplicateSurfaceId { surface: id });
            }

            offset += member.spacing;
            let local = Transform::translation(offset, 0.0, 0.0)
                .then(&orientation_rotation(&id, &member.orientation)?)
                .then(&dial_rotation(member.dial_deg));
            let inverse = frame.then(&local);
            let forward = invert(&id, &inverse)?;

            let membership = AssemblyMembership {
                assembly: assembly.name.clone(),
                index,
                assembly_dial_deg: assembly.placement.dial_deg,
            };
            let parts = self.resolve_parts(&member.spec, id, member.dial_deg, Some(membership))?;
            staged.push((parts, forward, inverse));
        }

        tracing::debug!(
            assembly = %assembly.name,
            members = staged.len(),
            "expanding assembly"
        );

        Ok(staged
            .into_iter()
            .map(|(parts, forward, inverse)| self.finish(parts, forward, inverse))
            .collect())
    }

    /// Resolve templates and names into typed parts.
    fn resolve_parts(
        &self,
        spec: &SurfaceSpec,
        id: String,
        dial_deg: Option<f64>,
        assembly: Option<AssemblyMembership>,
    ) -> Result<SurfaceParts> {
        let resolved = self.resolve_template(spec, &id)?;
        let shape = parse_shape(&id, resolved.shape.as_deref(), resolved.radius)?;
        let aperture = resolved
            .aperture
            .ok_or_else(|| BuildError::MissingAperture { surface: id.clone() })?;

        Ok(SurfaceParts {
            id,
            shape,
            aperture,
            mode: resolved.mode.unwrap_or(Mode::Refraction),
            dial_deg,
            material_before: resolved.material_before.unwrap_or_default(),
            material_after: resolved.material_after.unwrap_or_default(),
            assembly,
        })
    }

    /// Follow the template chain, letting nearer specs override farther ones.
    fn resolve_template(&self, spec: &SurfaceSpec, id: &str) -> Result<SurfaceSpec> {
        let mut resolved = spec.clone();
        let mut visited: Vec<String> = Vec::new();

        while let Some(name) = resolved.template.clone() {
            let unresolved = || BuildError::UnresolvedTemplateReference {
                surface: id.to_string(),
                template: name.clone(),
            };
            if visited.contains(&name) {
                return Err(unresolved());
            }
            let base = self.templates.get(&name).ok_or_else(unresolved)?;
            resolved.inherit(base);
            visited.push(name);
        }

        Ok(resolved)
    }

    /// Local-to-world transform for a placement: `translate ∘ orient ∘ dial`.
    fn placement_frame(&self, id: &str, placement: &Placement) -> Result<Transform> {
        let position = match &placement.position {
            Position::Absolute([x, y, z]) => Point3::new(*x, *y, *z),
            Position::Relative { surface, offset } => {
                let base = self.positions.get(surface).ok_or_else(|| {
                    BuildError::UnknownSurfaceReference {
                        surface: id.to_string(),
                        reference: surface.clone(),
                    }
                })?;
                base + Vec3::new(offset[0], offset[1], offset[2])
            }
        };

        Ok(Transform::translation_to(&position)
            .then(&orientation_rotation(id, &placement.orientation)?)
            .then(&dial_rotation(placement.dial_deg)))
    }

    fn check_unique(&self, id: &str) -> Result<()> {
        if self.positions.contains_key(id) {
            return Err(BuildError::DuplicateSurfaceId {
                surface: id.to_string(),
            });
        }
        Ok(())
    }

    /// Assign the next numeric id. Infallible, so ids are never skipped.
    fn finish(&mut self, parts: SurfaceParts, forward: Transform, inverse: Transform) -> Surface {
        let numeric_id = SurfaceId(self.next_id);
        self.next_id += 1;

        let surface = Surface::from_parts(parts, numeric_id, forward, inverse);
        self.positions
            .insert(surface.id().to_string(), surface.position());

        tracing::debug!(
            id = %surface.id(),
            numeric_id = numeric_id.0,
            shape = surface.shape().name(),
            mode = ?surface.mode(),
            "built surface"
        );
        surface
    }
}

/// Orientation-only rotation taking the canonical normal onto the requested one.
fn orientation_rotation(id: &str, orientation: &Orientation) -> Result<Transform> {
    let normal = match *orientation {
        Orientation::Default => return Ok(Transform::identity()),
        Orientation::Normal([x, y, z]) => {
            let v = Vec3::new(x, y, z);
            let len = v.norm();
            if len.is_nan() || len <= 1e-12 {
                return Err(BuildError::DegenerateNormal {
                    surface: id.to_string(),
                });
            }
            Dir3::new_normalize(v)
        }
        Orientation::Angles {
            azimuth_deg,
            elevation_deg,
        } => normal_from_angles(azimuth_deg, elevation_deg),
    };
    Ok(Transform::aligning(&canonical_normal(), &normal))
}

fn invert(id: &str, inverse: &Transform) -> Result<Transform> {
    inverse
        .try_inverse()
        .map_err(|source| BuildError::SingularMatrix {
            surface: id.to_string(),
            source,
        })
}

fn parse_shape(id: &str, name: Option<&str>, radius: Option<f64>) -> Result<Shape> {
    let unknown = || BuildError::UnknownSurfaceShape {
        surface: id.to_string(),
        shape: name.unwrap_or_default().to_string(),
    };
    let name = name.ok_or_else(unknown)?;
    let curved_radius = |shape: &str| match radius {
        Some(r) if r.is_finite() && r != 0.0 => Ok(r),
        _ => Err(BuildError::MissingRadius {
            surface: id.to_string(),
            shape: shape.to_string(),
        }),
    };

    match name.to_ascii_lowercase().as_str() {
        "planar" | "plane" | "flat" => Ok(Shape::Planar),
        "spherical" | "sphere" => Ok(Shape::Spherical {
            radius: curved_radius("spherical")?,
        }),
        "cylindrical" | "cylinder" => Ok(Shape::Cylindrical {
            radius: curved_radius("cylindrical")?,
        }),
        _ => Err(unknown()),
    }
}
