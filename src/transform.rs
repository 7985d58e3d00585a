use glam::*;

use crate::{
    Error, Splat,
    quat::{self, Axis},
};

/// A rigid edit applied to every splat of an object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Move by the offset.
    Translate(Vec3),

    /// Scale positions and sizes about the centroid.
    Scale(f32),

    /// Rotate positions and orientations about the centroid.
    Rotate { axis: Axis, degrees: f32 },
}

impl Transform {
    /// Check that the transform keeps the splats finite and their scales positive.
    pub fn validate(&self) -> Result<(), Error> {
        let valid = match *self {
            Self::Translate(delta) => delta.is_finite(),
            Self::Scale(factor) => factor.is_finite() && factor > 0.0,
            Self::Rotate { degrees, .. } => degrees.is_finite(),
        };

        match valid {
            true => Ok(()),
            false => Err(Error::InvalidTransform(*self)),
        }
    }

    /// Apply the transform to the splats.
    pub fn apply(&self, splats: &mut [Splat]) {
        match *self {
            Self::Translate(delta) => translate(splats, delta),
            Self::Scale(factor) => scale_per_splat(splats, factor),
            Self::Rotate { axis, degrees } => rotate_per_splat(splats, axis, degrees),
        }
    }
}

/// Get the mean position of the splats.
///
/// Returns [`None`] if there are no splats.
pub fn centroid(splats: &[Splat]) -> Option<Vec3> {
    if splats.is_empty() {
        return None;
    }

    let sum = splats
        .iter()
        .fold(DVec3::ZERO, |sum, splat| sum + splat.pos.as_dvec3());

    Some((sum / splats.len() as f64).as_vec3())
}

/// Move every splat by `delta`.
pub fn translate(splats: &mut [Splat], delta: Vec3) {
    for splat in splats.iter_mut() {
        splat.pos += delta;
    }
}

/// Scale the splat positions about the centroid and the splat sizes by `factor`.
pub fn scale_per_splat(splats: &mut [Splat], factor: f32) {
    let Some(center) = centroid(splats) else {
        return;
    };

    for splat in splats.iter_mut() {
        splat.pos = center + (splat.pos - center) * factor;
        splat.scale *= factor;
    }
}

/// Rotate the splats about the centroid by `degrees` about `axis`.
///
/// Both the positions and the orientations are rotated.
pub fn rotate_per_splat(splats: &mut [Splat], axis: Axis, degrees: f32) {
    let Some(center) = centroid(splats) else {
        return;
    };

    let rot = quat::axis_angle_to_quat(axis, degrees);

    for splat in splats.iter_mut() {
        splat.pos = center + quat::rotate_vector(rot, splat.pos - center);
        splat.rot = quat::normalize(quat::multiply(rot, splat.rot));
    }
}

/// Shift the splats so the center of their bounding box is at the origin.
///
/// Returns the removed offset, [`None`] if there are no splats.
pub fn recenter(splats: &mut [Splat]) -> Option<Vec3> {
    let center = crate::Aabb::from_splats(splats.iter())?.center();
    translate(splats, -center);
    Some(center)
}
