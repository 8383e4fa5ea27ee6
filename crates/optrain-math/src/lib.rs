#![warn(missing_docs)]

//! Math types for the optrain ray tracer.
//!
//! Thin wrappers around nalgebra providing the value types used by surface
//! placement and ray tracing: points, vectors, directions and homogeneous
//! transforms.

use nalgebra::{Matrix4, Unit, Vector3, Vector4};
use thiserror::Error;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A point in a surface's 2D transverse plane.
pub type Point2 = nalgebra::Point2<f64>;

/// Determinant magnitude below which a transform is treated as singular.
pub const SINGULAR_DETERMINANT: f64 = 1e-15;

/// Errors produced by transform algebra.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum MathError {
    /// The matrix cannot be inverted.
    #[error("singular matrix (determinant {determinant:e})")]
    SingularMatrix {
        /// Determinant of the offending matrix.
        determinant: f64,
    },
}

/// Result type for math operations.
pub type Result<T> = std::result::Result<T, MathError>;

/// A 4x4 homogeneous transformation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Translation moving the origin to `p`.
    pub fn translation_to(p: &Point3) -> Self {
        Self::translation(p.x, p.y, p.z)
    }

    /// Rotation about the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let mut m = Matrix4::identity();
        m[(1, 1)] = c;
        m[(1, 2)] = -s;
        m[(2, 1)] = s;
        m[(2, 2)] = c;
        Self { matrix: m }
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Shortest-arc rotation taking direction `from` onto direction `to`.
    ///
    /// Deterministic for every input pair. When the directions are
    /// antiparallel the rotation is a half turn about a fixed axis
    /// perpendicular to `from`.
    pub fn aligning(from: &Dir3, to: &Dir3) -> Self {
        let a = from.as_ref();
        let b = to.as_ref();
        let axis = a.cross(b);
        let sin = axis.norm();
        let cos = a.dot(b);

        if sin < 1e-12 {
            if cos > 0.0 {
                return Self::identity();
            }
            let arbitrary = if a.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
            let perp = Dir3::new_normalize(arbitrary.cross(a));
            return Self::rotation_about_axis(&perp, std::f64::consts::PI);
        }

        Self::rotation_about_axis(&Dir3::new_normalize(axis), sin.atan2(cos))
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// The result applies `other` first, then `self`.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point, including the homogeneous divide.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        if v.w != 0.0 && v.w != 1.0 {
            Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
        } else {
            Point3::new(v.x, v.y, v.z)
        }
    }

    /// Transform a direction vector (ignores translation).
    pub fn apply_vec(&self, v: &Vec3) -> Vec3 {
        let r = self.matrix * Vector4::new(v.x, v.y, v.z, 0.0);
        Vec3::new(r.x, r.y, r.z)
    }

    /// Transform a unit direction, renormalizing the result.
    pub fn apply_dir(&self, d: &Dir3) -> Dir3 {
        Dir3::new_normalize(self.apply_vec(d.as_ref()))
    }

    /// Determinant of the full 4x4 matrix.
    pub fn determinant(&self) -> f64 {
        self.matrix.determinant()
    }

    /// Inverse of this transform.
    ///
    /// Fails with [`MathError::SingularMatrix`] when `|det| < 1e-15` or the
    /// determinant is NaN.
    pub fn try_inverse(&self) -> Result<Self> {
        let determinant = self.determinant();
        if determinant.is_nan() || determinant.abs() < SINGULAR_DETERMINANT {
            return Err(MathError::SingularMatrix { determinant });
        }
        self.matrix
            .try_inverse()
            .map(|matrix| Self { matrix })
            .ok_or(MathError::SingularMatrix { determinant })
    }

    /// Element-wise comparison within `tol`.
    pub fn approx_eq(&self, other: &Transform, tol: f64) -> bool {
        self.matrix
            .iter()
            .zip(other.matrix.iter())
            .all(|(a, b)| (a - b).abs() <= tol)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
