use glam::*;

use crate::{ObjectId, SplatObject, SplatSet};

/// The shape of a [`SelectionVolume`].
///
/// Containment is tested in the local space of the volume, where the shape is the unit sphere of
/// radius 0.5 or the unit box of half extent 0.5, and the size is carried by the world transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeShape {
    /// A sphere.
    Sphere { radius: f32 },

    /// A box.
    Box { half_extents: Vec3 },
}

impl VolumeShape {
    /// The squared radius of the unit sphere in local space.
    pub const LOCAL_SPHERE_RADIUS_SQ: f32 = 0.25;

    /// The half extent of the unit box in local space.
    pub const LOCAL_BOX_HALF_EXTENT: f32 = 0.5;

    /// Get the scale mapping the local unit shape to the world size.
    pub fn scale(&self) -> Vec3 {
        match self {
            Self::Sphere { radius } => Vec3::splat(radius * 2.0),
            Self::Box { half_extents } => *half_extents * 2.0,
        }
    }

    /// Check if a point in local space is inside the shape, boundary inclusive.
    pub fn contains_local(&self, local: Vec3) -> bool {
        match self {
            Self::Sphere { .. } => local.length_squared() <= Self::LOCAL_SPHERE_RADIUS_SQ,
            Self::Box { .. } => local
                .abs()
                .cmple(Vec3::splat(Self::LOCAL_BOX_HALF_EXTENT))
                .all(),
        }
    }
}

/// A volume for selecting splats by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionVolume {
    /// The shape.
    pub shape: VolumeShape,

    /// The world position of the center.
    pub pos: Vec3,

    /// The world rotation.
    pub rot: Quat,

    /// Whether the volume is active.
    pub enabled: bool,

    /// Whether to only select splats of the selected object.
    pub restrict_to_selected_object: bool,
}

impl SelectionVolume {
    /// Create a new enabled sphere volume.
    pub fn sphere(pos: Vec3, radius: f32) -> Self {
        Self {
            shape: VolumeShape::Sphere { radius },
            pos,
            rot: Quat::IDENTITY,
            enabled: true,
            restrict_to_selected_object: false,
        }
    }

    /// Create a new enabled box volume.
    pub fn cuboid(pos: Vec3, rot: Quat, half_extents: Vec3) -> Self {
        Self {
            shape: VolumeShape::Box { half_extents },
            pos,
            rot,
            enabled: true,
            restrict_to_selected_object: false,
        }
    }

    /// Set the radius, turning the volume into a sphere.
    pub fn set_radius(&mut self, radius: f32) {
        self.shape = VolumeShape::Sphere { radius };
    }

    /// Set the half extents, turning the volume into a box.
    pub fn set_half_extents(&mut self, half_extents: Vec3) {
        self.shape = VolumeShape::Box { half_extents };
    }

    /// Get the world transform of the local unit shape.
    pub fn world_transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.shape.scale(), self.rot, self.pos)
    }

    /// Create a containment tester for world positions.
    pub fn tester(&self) -> VolumeTester {
        let transform = self.world_transform();

        // A zero sized volume contains nothing.
        let inv_transform = match transform.determinant() {
            det if det.is_finite() && det != 0.0 => Some(transform.inverse()),
            _ => None,
        };

        VolumeTester {
            shape: self.shape,
            inv_transform,
        }
    }

    /// Check if the world position is inside the volume.
    pub fn contains(&self, pos: Vec3) -> bool {
        self.tester().contains(pos)
    }
}

impl Default for SelectionVolume {
    fn default() -> Self {
        Self {
            enabled: false,
            ..Self::sphere(Vec3::ZERO, 0.5)
        }
    }
}

/// Tests world positions against a [`SelectionVolume`].
#[derive(Debug, Clone, Copy)]
pub struct VolumeTester {
    shape: VolumeShape,
    inv_transform: Option<Mat4>,
}

impl VolumeTester {
    /// Check if the world position is inside the volume.
    pub fn contains(&self, pos: Vec3) -> bool {
        self.inv_transform
            .is_some_and(|inv| self.shape.contains_local(inv.transform_point3(pos)))
    }
}

/// Collect the splats inside the volume.
///
/// Only objects present in the last merge are tested, skipping the erased splats, and objects
/// other than `restrict_to` if it is set.
pub fn select_in_volume(
    objects: &[SplatObject],
    volume: &SelectionVolume,
    erased: &SplatSet,
    restrict_to: Option<ObjectId>,
) -> SplatSet {
    let tester = volume.tester();

    objects
        .iter()
        .filter(|object| !object.range().is_empty())
        .filter(|object| restrict_to.is_none_or(|id| id == object.id()))
        .flat_map(|object| {
            let id = object.id();
            object
                .splats()
                .iter()
                .enumerate()
                .filter(move |(local, _)| !erased.contains(id, *local))
                .filter(move |(_, splat)| tester.contains(splat.pos))
                .map(move |(local, _)| (id, local))
        })
        .collect()
}
