//! Quaternion helpers for rigid splat rotations.
//!
//! Quaternions are [`Quat`]s with `w` as the scalar part. The helpers here follow the handedness
//! conventions of the splat record, see [`axis_angle_to_quat`].

use glam::*;

/// The norm below which a quaternion is considered degenerate.
pub const QUAT_NORM_EPSILON: f32 = 1e-8;

/// A rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl std::str::FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Self::X),
            "y" | "Y" => Ok(Self::Y),
            "z" | "Z" => Ok(Self::Z),
            _ => Err(format!("invalid axis {s}, expected x, y, or z")),
        }
    }
}

/// The Hamilton product `a * b`.
///
/// Neither operand needs to be normalized.
pub fn multiply(a: Quat, b: Quat) -> Quat {
    Quat::from_xyzw(
        a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y,
        a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x,
        a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w,
        a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
    )
}

/// Normalize the quaternion, falling back to [`Quat::IDENTITY`] if it is degenerate.
pub fn normalize(q: Quat) -> Quat {
    let len = q.length();
    if !(len >= QUAT_NORM_EPSILON) {
        return Quat::IDENTITY;
    }

    q / len
}

/// Create the rotation of `degrees` about a single axis.
///
/// The y axis uses the negated sine term to match the y flip of the splat record, so the visual
/// rotation direction is consistent for all three axes.
pub fn axis_angle_to_quat(axis: Axis, degrees: f32) -> Quat {
    let half = degrees.to_radians() * 0.5;
    let (s, c) = half.sin_cos();

    match axis {
        Axis::X => Quat::from_xyzw(s, 0.0, 0.0, c),
        Axis::Y => Quat::from_xyzw(0.0, -s, 0.0, c),
        Axis::Z => Quat::from_xyzw(0.0, 0.0, s, c),
    }
}

/// Rotate `v` by `q` as `q * (0, v) * q⁻¹`.
///
/// `q` must be normalized, its conjugate is used as the inverse.
pub fn rotate_vector(q: Quat, v: Vec3) -> Vec3 {
    let p = Quat::from_xyzw(v.x, v.y, v.z, 0.0);
    let r = multiply(multiply(q, p), q.conjugate());
    vec3(r.x, r.y, r.z)
}
