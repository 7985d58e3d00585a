use glam::*;

use crate::{ImportOptions, quat};

/// A single splat.
///
/// The fields are in the in-memory convention, see [`SplatPod`](crate::SplatPod) for how they map
/// to the on-disk record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Splat {
    /// The position.
    pub pos: Vec3,
    /// The scale, each component must stay positive.
    pub scale: Vec3,
    /// The RGBA color.
    pub color: U8Vec4,
    /// The orientation, `w` is the first component of the record.
    pub rot: Quat,
}

impl Splat {
    /// Create a new splat with unit scale, white color, and identity rotation.
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            scale: Vec3::ONE,
            color: U8Vec4::splat(255),
            rot: Quat::IDENTITY,
        }
    }

    /// Check if every floating point field is finite.
    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.scale.is_finite() && self.rot.is_finite()
    }

    /// Repair the splat according to the [`ImportOptions`].
    ///
    /// - Non-finite or zero rotations become [`Quat::IDENTITY`].
    /// - Non-finite or too small scale components are raised to
    ///   [`ImportOptions::min_scale`] (or [`ImportOptions::DEFAULT_MIN_SCALE`] if non-finite).
    /// - Non-finite positions are dropped or zeroed depending on
    ///   [`ImportOptions::skip_non_finite_positions`].
    pub fn sanitize(mut self, options: &ImportOptions) -> Sanitized {
        let mut repaired = false;

        if !self.pos.is_finite() {
            if options.skip_non_finite_positions {
                return Sanitized::Dropped;
            }

            self.pos = Vec3::select(self.pos.is_finite_mask(), self.pos, Vec3::ZERO);
            repaired = true;
        }

        if !self.rot.is_finite() || self.rot.length() < quat::QUAT_NORM_EPSILON {
            self.rot = Quat::IDENTITY;
            repaired = true;
        }

        let min_scale = options
            .min_scale
            .unwrap_or(ImportOptions::DEFAULT_MIN_SCALE);
        if !self.scale.is_finite() {
            self.scale = Vec3::select(
                self.scale.is_finite_mask(),
                self.scale,
                Vec3::splat(min_scale),
            );
            repaired = true;
        }

        if let Some(min_scale) = options.min_scale {
            if self.scale.cmplt(Vec3::splat(min_scale)).any() {
                self.scale = self.scale.max(Vec3::splat(min_scale));
                repaired = true;
            }
        }

        match repaired {
            true => Sanitized::Repaired(self),
            false => Sanitized::Clean(self),
        }
    }
}

impl Default for Splat {
    fn default() -> Self {
        Self::new(Vec3::ZERO)
    }
}

/// The outcome of [`Splat::sanitize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sanitized {
    /// The splat was valid.
    Clean(Splat),
    /// The splat had invalid fields which were replaced.
    Repaired(Splat),
    /// The splat could not be repaired.
    Dropped,
}

impl Sanitized {
    /// Get the splat if it was not dropped.
    pub fn splat(self) -> Option<Splat> {
        match self {
            Self::Clean(splat) | Self::Repaired(splat) => Some(splat),
            Self::Dropped => None,
        }
    }
}
