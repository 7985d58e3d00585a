use glam::*;

use crate::{
    Aabb, Error, HighlightStyle, ObjectId, SPLAT_RECORD_BYTES, Splat, SplatObject, SplatPod,
    SplatSet, codec,
};

bitflags::bitflags! {
    /// The merge behavior flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MergeFlags: u8 {
        /// Leave hidden objects out.
        const VISIBLE_ONLY = 1 << 0;

        /// Leave erased splats out.
        const SKIP_ERASED = 1 << 1;

        /// Recolor selected splats and the selected object.
        const HIGHLIGHT = 1 << 2;
    }
}

/// An empty set for options without erased or selected splats.
static EMPTY_SET: SplatSet = SplatSet::new();

/// The options for building a [`MergedBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct MergeOptions<'a> {
    /// The flags.
    pub flags: MergeFlags,

    /// The erased splats, used with [`MergeFlags::SKIP_ERASED`].
    pub erased: &'a SplatSet,

    /// The selected splats, used with [`MergeFlags::HIGHLIGHT`].
    pub selected: &'a SplatSet,

    /// The selected object, used with [`MergeFlags::HIGHLIGHT`].
    pub selected_object: Option<ObjectId>,

    /// The highlight style, used with [`MergeFlags::HIGHLIGHT`].
    pub style: HighlightStyle,
}

impl<'a> MergeOptions<'a> {
    /// Create new options that include every non-empty object as is.
    pub fn new() -> Self {
        Self {
            flags: MergeFlags::empty(),
            erased: &EMPTY_SET,
            selected: &EMPTY_SET,
            selected_object: None,
            style: HighlightStyle::default(),
        }
    }

    /// Set whether to leave hidden objects out.
    pub fn visible_only(mut self, visible_only: bool) -> Self {
        self.flags.set(MergeFlags::VISIBLE_ONLY, visible_only);
        self
    }

    /// Leave the erased splats out.
    pub fn erased(mut self, erased: &'a SplatSet) -> Self {
        self.flags |= MergeFlags::SKIP_ERASED;
        self.erased = erased;
        self
    }

    /// Highlight the selected splats and the selected object.
    pub fn highlight(
        mut self,
        selected: &'a SplatSet,
        selected_object: Option<ObjectId>,
        style: HighlightStyle,
    ) -> Self {
        self.flags |= MergeFlags::HIGHLIGHT;
        self.selected = selected;
        self.selected_object = selected_object;
        self.style = style;
        self
    }

    /// Check if the object is included in the merge.
    pub fn includes(&self, object: &SplatObject) -> bool {
        !object.is_empty() && (object.visible || !self.flags.contains(MergeFlags::VISIBLE_ONLY))
    }

    /// Check if a splat of an object is left out.
    pub fn skips(&self, id: ObjectId, local: usize) -> bool {
        self.flags.contains(MergeFlags::SKIP_ERASED) && self.erased.contains(id, local)
    }

    /// Get the number of records the object contributes to the merge.
    pub fn contribution(&self, object: &SplatObject) -> usize {
        if !self.includes(object) {
            return 0;
        }

        match self.flags.contains(MergeFlags::SKIP_ERASED) {
            true => {
                object.splat_count() - self.erased.count_below(object.id(), object.splat_count())
            }
            false => object.splat_count(),
        }
    }

    /// Get the splats of the object that are kept, with their local indices.
    pub fn kept_splats<'b>(
        &'b self,
        object: &'b SplatObject,
    ) -> impl Iterator<Item = (usize, &'b Splat)> + 'b {
        object
            .splats()
            .iter()
            .enumerate()
            .filter(move |(local, _)| !self.skips(object.id(), *local))
    }

    /// Encode a kept splat, applying the highlight.
    fn encode(&self, id: ObjectId, local: usize, splat: &Splat) -> SplatPod {
        let mut pod = SplatPod::from_splat(splat);

        if !self.flags.contains(MergeFlags::HIGHLIGHT) {
            return pod;
        }

        let rgb = if self.selected.contains(id, local) {
            self.style.selected_rgb
        } else if self.selected_object == Some(id) {
            U8Vec3::new(pod.color[0], pod.color[1], pod.color[2])
                .saturating_add(self.style.object_tint)
        } else {
            return pod;
        };

        pod.color = rgb.extend(pod.color[3]).to_array();
        pod
    }

    /// Encode the kept splats of the object into `records`.
    fn encode_object(&self, object: &SplatObject, records: &mut [u8]) {
        for ((local, splat), record) in self
            .kept_splats(object)
            .zip(records.chunks_exact_mut(SPLAT_RECORD_BYTES))
        {
            let pod = self.encode(object.id(), local, splat);
            record.copy_from_slice(bytemuck::bytes_of(&pod));
        }
    }
}

impl Default for MergeOptions<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// The merged splat buffer holding every included object back to back.
///
/// This is what the renderer consumes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedBuffer(Vec<u8>);

impl MergedBuffer {
    /// Build the merged buffer, assigning the range of every object.
    ///
    /// Objects left out by the options get an empty range at their position in the list.
    pub fn build(objects: &mut [SplatObject], options: &MergeOptions) -> Self {
        let total = objects
            .iter()
            .map(|object| options.contribution(object))
            .sum::<usize>();

        log::debug!("Building merged buffer of {total} splats");

        let mut bytes = vec![0; total * SPLAT_RECORD_BYTES];
        let mut cursor = 0;

        for object in objects.iter_mut() {
            let count = options.contribution(object);
            let range = cursor..cursor + count;

            options.encode_object(
                object,
                &mut bytes[range.start * SPLAT_RECORD_BYTES..range.end * SPLAT_RECORD_BYTES],
            );

            object.set_range(range);
            cursor += count;
        }

        Self(bytes)
    }

    /// Repack the object into its range from the last build.
    ///
    /// This is only valid when the object list and the erased splats did not change since the last
    /// [`MergedBuffer::build`], otherwise [`Error::StaleObjectRange`] is returned and the buffer is
    /// left untouched.
    pub fn commit_object(
        &mut self,
        object: &SplatObject,
        options: &MergeOptions,
    ) -> Result<(), Error> {
        let range = object.range();
        let expected = options.contribution(object);

        if range.len() != expected || range.end > self.len() {
            return Err(Error::StaleObjectRange {
                id: object.id(),
                start: range.start,
                end: range.end,
                expected,
            });
        }

        options.encode_object(
            object,
            &mut self.0[range.start * SPLAT_RECORD_BYTES..range.end * SPLAT_RECORD_BYTES],
        );

        Ok(())
    }

    /// Get the number of splats.
    pub fn len(&self) -> usize {
        self.0.len() / SPLAT_RECORD_BYTES
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Take the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Unpack the splat at a global index.
    pub fn splat(&self, index: usize) -> Result<Splat, Error> {
        codec::unpack(&self.0, index)
    }

    /// Unpack every splat.
    pub fn splats(&self) -> Vec<Splat> {
        self.0
            .chunks_exact(SPLAT_RECORD_BYTES)
            .map(|record| bytemuck::pod_read_unaligned::<SplatPod>(record).to_splat())
            .collect()
    }

    /// Compute the bounding box of the merged splats.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_splats(&self.splats())
    }
}
