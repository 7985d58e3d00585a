use glam::*;

use crate::Splat;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a new bounding box.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Compute the bounding box of the positions.
    ///
    /// Returns [`None`] if there are no positions.
    pub fn from_positions(positions: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        positions.into_iter().fold(None, |aabb, pos| match aabb {
            None => Some(Self::new(pos, pos)),
            Some(Self { min, max }) => Some(Self::new(min.min(pos), max.max(pos))),
        })
    }

    /// Compute the bounding box of the splat positions.
    pub fn from_splats<'a>(splats: impl IntoIterator<Item = &'a Splat>) -> Option<Self> {
        Self::from_positions(splats.into_iter().map(|splat| splat.pos))
    }

    /// Get the center.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the size.
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Get the union with another bounding box.
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Check if the point is inside, boundary inclusive.
    pub fn contains(&self, pos: Vec3) -> bool {
        pos.cmpge(self.min).all() && pos.cmple(self.max).all()
    }
}
