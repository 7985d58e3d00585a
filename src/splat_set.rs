use std::collections::{BTreeMap, BTreeSet};

use crate::{ObjectId, SplatObject};

/// A set of splats keyed by object and local index.
///
/// Unlike global indices into the merged buffer, the keys stay valid when objects are added,
/// removed, reordered, or hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplatSet(BTreeMap<ObjectId, BTreeSet<usize>>);

impl SplatSet {
    /// Create a new empty set.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a splat, returns whether it was newly inserted.
    pub fn insert(&mut self, id: ObjectId, local: usize) -> bool {
        self.0.entry(id).or_default().insert(local)
    }

    /// Check if the splat is in the set.
    pub fn contains(&self, id: ObjectId, local: usize) -> bool {
        self.0.get(&id).is_some_and(|locals| locals.contains(&local))
    }

    /// Get the local indices of an object.
    pub fn object(&self, id: ObjectId) -> Option<&BTreeSet<usize>> {
        self.0.get(&id)
    }

    /// Remove every splat of an object.
    pub fn remove_object(&mut self, id: ObjectId) -> Option<BTreeSet<usize>> {
        self.0.remove(&id)
    }

    /// Move every splat of `other` into this set, returns the number newly inserted.
    pub fn append(&mut self, other: &mut Self) -> usize {
        let mut inserted = 0;
        for (id, locals) in std::mem::take(&mut other.0) {
            let entry = self.0.entry(id).or_default();
            let before = entry.len();
            entry.extend(locals);
            inserted += entry.len() - before;
        }
        inserted
    }

    /// Get the number of splats.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeSet::len).sum()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeSet::is_empty)
    }

    /// Clear the set.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterate over the splats as `(object, local index)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, usize)> + '_ {
        self.0
            .iter()
            .flat_map(|(id, locals)| locals.iter().map(move |local| (*id, *local)))
    }

    /// Count the splats of an object with local index below `end`.
    pub(crate) fn count_below(&self, id: ObjectId, end: usize) -> usize {
        self.0
            .get(&id)
            .map_or(0, |locals| locals.range(..end).count())
    }

    /// Translate the splats to global indices of the last merge.
    ///
    /// `erased` must be the set the merge skipped. Splats of objects absent from the merged buffer
    /// and erased splats have no global index and are left out.
    pub fn global_indices(&self, objects: &[SplatObject], erased: &SplatSet) -> BTreeSet<usize> {
        let mut indices = BTreeSet::new();

        for object in objects.iter().filter(|object| !object.range().is_empty()) {
            let Some(selected) = self.object(object.id()) else {
                continue;
            };

            // Both sets are ordered, so one pass counts the erased splats below each local.
            let mut erased_locals = erased.object(object.id()).into_iter().flatten().peekable();
            let mut erased_below = 0;

            for &local in selected.range(..object.splat_count()) {
                while erased_locals.next_if(|erased| **erased < local).is_some() {
                    erased_below += 1;
                }

                if erased_locals.next_if_eq(&&local).is_some() {
                    erased_below += 1;
                    continue;
                }

                indices.insert(object.start_index() + local - erased_below);
            }
        }

        indices
    }
}

impl FromIterator<(ObjectId, usize)> for SplatSet {
    fn from_iter<T: IntoIterator<Item = (ObjectId, usize)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (id, local) in iter {
            set.insert(id, local);
        }
        set
    }
}
