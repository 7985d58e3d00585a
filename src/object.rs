use std::ops::Range;

use glam::*;

use crate::{Aabb, Error, ImportOptions, Sanitized, Splat, codec};

/// The unique identifier of a [`SplatObject`] within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub u64);

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "object-{}", self.0)
    }
}

/// A named collection of splats imported from one file.
#[derive(Debug, Clone)]
pub struct SplatObject {
    /// The ID.
    id: ObjectId,

    /// The source file name.
    pub file_name: String,

    /// The splats.
    splats: Vec<Splat>,

    /// The range in the merged buffer from the last merge.
    range: Range<usize>,

    /// The bounding box of the splats.
    bounds: Option<Aabb>,

    /// Whether the object is visible.
    pub visible: bool,

    /// The color for debug display.
    pub debug_color: U8Vec4,
}

impl SplatObject {
    /// The debug color palette, indexed by the ID.
    const DEBUG_PALETTE: [U8Vec4; 6] = [
        U8Vec4::new(230, 25, 75, 255),
        U8Vec4::new(60, 180, 75, 255),
        U8Vec4::new(0, 130, 200, 255),
        U8Vec4::new(245, 130, 48, 255),
        U8Vec4::new(145, 30, 180, 255),
        U8Vec4::new(70, 240, 240, 255),
    ];

    /// Create a new object.
    pub fn new(id: ObjectId, file_name: impl Into<String>, splats: Vec<Splat>) -> Self {
        let bounds = Aabb::from_splats(&splats);

        Self {
            id,
            file_name: file_name.into(),
            splats,
            range: 0..0,
            bounds,
            visible: true,
            debug_color: Self::DEBUG_PALETTE[(id.0 % Self::DEBUG_PALETTE.len() as u64) as usize],
        }
    }

    /// Create a new object from a splat buffer.
    ///
    /// Every splat is repaired with [`Splat::sanitize`], dropped splats are logged.
    pub fn from_splat_bytes(
        id: ObjectId,
        file_name: impl Into<String>,
        bytes: &[u8],
        options: &ImportOptions,
    ) -> Result<Self, Error> {
        let file_name = file_name.into();
        let splats = codec::unpack_all(bytes)?;

        Ok(Self::new(
            id,
            file_name.as_str(),
            sanitize_splats(&file_name, splats, options),
        ))
    }

    /// Get the ID.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Get the splats.
    pub fn splats(&self) -> &[Splat] {
        &self.splats
    }

    /// Get the number of splats.
    pub fn splat_count(&self) -> usize {
        self.splats.len()
    }

    /// Check if the object has no splats.
    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    /// Get the range in the merged buffer.
    ///
    /// This is only valid until the object list changes, it is reassigned by every full merge.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Get the start index in the merged buffer.
    pub fn start_index(&self) -> usize {
        self.range.start
    }

    /// Get the end index in the merged buffer, exclusive.
    pub fn end_index(&self) -> usize {
        self.range.end
    }

    /// Get the bounding box.
    ///
    /// This is [`None`] if the object has no splats.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Recompute the bounding box from the splats.
    pub fn recompute_bounds(&mut self) {
        self.bounds = Aabb::from_splats(&self.splats);
    }

    /// Get the mean position of the splats.
    pub fn centroid(&self) -> Option<Vec3> {
        crate::transform::centroid(&self.splats)
    }

    /// Mutate the splats, recomputing the bounding box afterwards.
    pub fn edit_splats<T>(&mut self, f: impl FnOnce(&mut [Splat]) -> T) -> T {
        let result = f(&mut self.splats);
        self.recompute_bounds();
        result
    }

    /// Set the range in the merged buffer.
    pub(crate) fn set_range(&mut self, range: Range<usize>) {
        self.range = range;
    }
}

/// Sanitize the splats of a file, logging what was repaired or dropped.
pub(crate) fn sanitize_splats(
    file_name: &str,
    splats: Vec<Splat>,
    options: &ImportOptions,
) -> Vec<Splat> {
    let count = splats.len();
    let mut repaired = 0;

    let splats = splats
        .into_iter()
        .map(|splat| splat.sanitize(options))
        .inspect(|sanitized| {
            if let Sanitized::Repaired(..) = sanitized {
                repaired += 1;
            }
        })
        .filter_map(Sanitized::splat)
        .collect::<Vec<_>>();

    if repaired > 0 {
        log::warn!("Repaired {repaired} invalid splats in {file_name}");
    }

    if splats.len() < count {
        log::warn!(
            "Dropped {} splats with non-finite positions in {file_name}",
            count - splats.len()
        );
    }

    splats
}
