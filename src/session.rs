use std::collections::BTreeSet;

use glam::*;

use crate::{
    Aabb, Error, MergeOptions, MergedBuffer, NullRenderTarget, ObjectId, RenderTarget,
    SelectionVolume, SessionConfig, Splat, SplatObject, SplatSet, Transform, codec,
    object::sanitize_splats, ply, quat::Axis, selection, transform,
};

/// A change of the session for the UI to react to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionEvent {
    /// An object was imported.
    ObjectAdded(ObjectId),

    /// An object was removed.
    ObjectRemoved(ObjectId),

    /// An object was moved to a new position in the object list.
    ObjectMoved { id: ObjectId, index: usize },

    /// The splats of an object were transformed.
    ObjectTransformed(ObjectId),

    /// The visibility of an object changed.
    VisibilityChanged { id: ObjectId, visible: bool },

    /// The selected object changed.
    SelectedObjectChanged(Option<ObjectId>),

    /// The selected splats changed.
    SelectionChanged { count: usize },

    /// Splats were erased.
    SplatsErased { count: usize, total: usize },
}

/// The export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Binary splat records.
    Splat,

    /// ASCII PLY text.
    Ply,
}

impl ExportFormat {
    /// Get the file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Splat => "splat",
            Self::Ply => "ply",
        }
    }

    /// Encode the splats in this format.
    pub fn encode(&self, splats: &[Splat]) -> Result<Vec<u8>, Error> {
        match self {
            Self::Splat => Ok(codec::pack_all(splats)),
            Self::Ply => Ok(ply::splats_to_ply_text(splats)?.into_bytes()),
        }
    }
}

/// An exported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    /// The file name.
    pub file_name: String,

    /// The file content.
    pub bytes: Vec<u8>,
}

/// An editing session over an ordered list of splat objects.
///
/// The session owns the splat data, which is the source of truth, and keeps the derived
/// [`MergedBuffer`] and the [`RenderTarget`] in sync after every operation.
#[derive(Debug)]
pub struct EditorSession<R: RenderTarget = NullRenderTarget> {
    /// The objects in merge order.
    objects: Vec<SplatObject>,

    /// The selected object.
    selected_object: Option<ObjectId>,

    /// The merged buffer from the last merge, with highlight.
    merged: MergedBuffer,

    /// The selected splats.
    selection: SplatSet,

    /// The erased splats.
    erased: SplatSet,

    /// The selection volume.
    pub volume: SelectionVolume,

    /// The configuration.
    config: SessionConfig,

    /// The render target.
    render_target: R,

    /// The events not yet taken.
    events: Vec<SessionEvent>,

    /// The ID of the next object.
    next_id: u64,
}

impl<R: RenderTarget> EditorSession<R> {
    /// Create a new session.
    pub fn new(render_target: R) -> Self {
        Self::new_with(render_target, SessionConfig::default())
    }

    /// Create a new session with all extra options.
    pub fn new_with(render_target: R, config: SessionConfig) -> Self {
        log::debug!("Creating editor session with {config:?}");

        Self {
            objects: Vec::new(),
            selected_object: None,
            merged: MergedBuffer::default(),
            selection: SplatSet::new(),
            erased: SplatSet::new(),
            volume: SelectionVolume::default(),
            config,
            render_target,
            events: Vec::new(),
            next_id: 0,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Get the objects in merge order.
    pub fn objects(&self) -> &[SplatObject] {
        &self.objects
    }

    /// Get an object.
    pub fn object(&self, id: ObjectId) -> Option<&SplatObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    /// Get the position of an object in the object list.
    pub fn object_index(&self, id: ObjectId) -> Result<usize, Error> {
        self.objects
            .iter()
            .position(|object| object.id() == id)
            .ok_or(Error::ObjectNotFound(id))
    }

    /// Get the merged buffer as displayed.
    pub fn merged(&self) -> &MergedBuffer {
        &self.merged
    }

    /// Get the bounding box of the merged buffer.
    pub fn merged_bounds(&self) -> Option<Aabb> {
        self.merged.bounds()
    }

    /// Get the selected object.
    pub fn selected_object(&self) -> Option<&SplatObject> {
        self.selected_object.and_then(|id| self.object(id))
    }

    /// Get the selected splats.
    pub fn selection(&self) -> &SplatSet {
        &self.selection
    }

    /// Get the selected splats as global indices of the merged buffer.
    pub fn selected_indices(&self) -> BTreeSet<usize> {
        self.selection.global_indices(&self.objects, &self.erased)
    }

    /// Get the erased splats.
    pub fn erased(&self) -> &SplatSet {
        &self.erased
    }

    /// Get the render target.
    pub fn render_target(&self) -> &R {
        &self.render_target
    }

    /// Get the render target mutably.
    pub fn render_target_mut(&mut self) -> &mut R {
        &mut self.render_target
    }

    /// Take the events since the last call.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Import a splat buffer as a new object.
    pub fn import_splat(&mut self, file_name: &str, bytes: &[u8]) -> Result<ObjectId, Error> {
        let splats = codec::unpack_all(bytes)?;
        self.insert_object(file_name, sanitize_splats(file_name, splats, &self.config.import))
    }

    /// Import a PLY file as a new object.
    pub fn import_ply(&mut self, file_name: &str, bytes: &[u8]) -> Result<ObjectId, Error> {
        let splats = ply::read_ply(&mut &bytes[..])?;
        self.insert_object(file_name, sanitize_splats(file_name, splats, &self.config.import))
    }

    /// Insert the splats as a new object at the end of the object list.
    pub fn insert_object(
        &mut self,
        file_name: &str,
        splats: Vec<Splat>,
    ) -> Result<ObjectId, Error> {
        let id = ObjectId(self.next_id);
        self.next_id += 1;

        let object = SplatObject::new(id, file_name, splats);
        log::info!(
            "Imported {} splats from {file_name} as {id}",
            object.splat_count()
        );

        self.objects.push(object);
        self.events.push(SessionEvent::ObjectAdded(id));

        self.rebuild()?;
        Ok(id)
    }

    /// Remove an object.
    ///
    /// Its selected and erased splats are forgotten, and later objects shift down.
    pub fn remove_object(&mut self, id: ObjectId) -> Result<SplatObject, Error> {
        let index = self.object_index(id)?;
        let object = self.objects.remove(index);

        self.selection.remove_object(id);
        self.erased.remove_object(id);

        if self.selected_object == Some(id) {
            self.selected_object = None;
            self.events.push(SessionEvent::SelectedObjectChanged(None));
        }

        log::info!("Removed {id} ({})", object.file_name);
        self.events.push(SessionEvent::ObjectRemoved(id));

        self.rebuild()?;
        Ok(object)
    }

    /// Move an object to a new position in the object list.
    pub fn move_object(&mut self, id: ObjectId, index: usize) -> Result<(), Error> {
        let from = self.object_index(id)?;
        let index = index.min(self.objects.len() - 1);

        let object = self.objects.remove(from);
        self.objects.insert(index, object);
        self.events.push(SessionEvent::ObjectMoved { id, index });

        self.rebuild()
    }

    /// Set the visibility of an object.
    ///
    /// Hiding the selected object deselects it.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> Result<(), Error> {
        let index = self.object_index(id)?;
        if self.objects[index].visible == visible {
            return Ok(());
        }

        self.objects[index].visible = visible;
        self.events
            .push(SessionEvent::VisibilityChanged { id, visible });

        if !visible && self.selected_object == Some(id) {
            self.selected_object = None;
            self.events.push(SessionEvent::SelectedObjectChanged(None));
        }

        self.rebuild()
    }

    /// Toggle the visibility of an object, returns the new visibility.
    pub fn toggle_visibility(&mut self, id: ObjectId) -> Result<bool, Error> {
        let visible = !self.object(id).ok_or(Error::ObjectNotFound(id))?.visible;
        self.set_visible(id, visible)?;
        Ok(visible)
    }

    /// Select an object.
    pub fn select_object(&mut self, id: ObjectId) -> Result<(), Error> {
        self.object_index(id)?;
        if self.selected_object == Some(id) {
            return Ok(());
        }

        self.selected_object = Some(id);
        self.events.push(SessionEvent::SelectedObjectChanged(Some(id)));
        self.rebuild()
    }

    /// Deselect the selected object.
    pub fn deselect_object(&mut self) -> Result<(), Error> {
        if self.selected_object.take().is_none() {
            return Ok(());
        }

        self.events.push(SessionEvent::SelectedObjectChanged(None));
        self.rebuild()
    }

    /// Transform every splat of an object.
    pub fn transform_object(&mut self, id: ObjectId, transform: Transform) -> Result<(), Error> {
        let index = self.object_index(id)?;
        transform.validate()?;

        log::debug!("Applying {transform:?} to {id}");
        self.objects[index].edit_splats(|splats| transform.apply(splats));
        self.events.push(SessionEvent::ObjectTransformed(id));

        self.commit_object(index)
    }

    /// Move every splat of an object by `delta`.
    pub fn translate_object(&mut self, id: ObjectId, delta: Vec3) -> Result<(), Error> {
        self.transform_object(id, Transform::Translate(delta))
    }

    /// Scale an object about its centroid.
    pub fn scale_object(&mut self, id: ObjectId, factor: f32) -> Result<(), Error> {
        self.transform_object(id, Transform::Scale(factor))
    }

    /// Rotate an object about its centroid.
    pub fn rotate_object(&mut self, id: ObjectId, axis: Axis, degrees: f32) -> Result<(), Error> {
        self.transform_object(id, Transform::Rotate { axis, degrees })
    }

    /// Shift an object so its bounding box is centered at the origin.
    ///
    /// Returns the removed offset, [`None`] if the object has no splats.
    pub fn recenter_object(&mut self, id: ObjectId) -> Result<Option<Vec3>, Error> {
        let index = self.object_index(id)?;

        let offset = self.objects[index].edit_splats(transform::recenter);
        if offset.is_some() {
            self.events.push(SessionEvent::ObjectTransformed(id));
            self.commit_object(index)?;
        }

        Ok(offset)
    }

    /// Select the splats inside the [`EditorSession::volume`].
    ///
    /// Returns the selected global indices. A disabled volume leaves the selection untouched.
    pub fn apply_selection_volume(&mut self) -> Result<BTreeSet<usize>, Error> {
        if !self.volume.enabled {
            log::debug!("Selection volume is disabled");
            return Ok(self.selected_indices());
        }

        let restrict_to = self
            .selected_object
            .filter(|_| self.volume.restrict_to_selected_object);

        self.selection =
            selection::select_in_volume(&self.objects, &self.volume, &self.erased, restrict_to);

        log::info!(
            "Selected {} splats{}",
            self.selection.len(),
            match restrict_to {
                Some(..) => " (restricted)",
                None => "",
            }
        );
        self.events.push(SessionEvent::SelectionChanged {
            count: self.selection.len(),
        });

        self.rebuild()?;
        Ok(self.selected_indices())
    }

    /// Clear the selected splats.
    pub fn clear_selection(&mut self) -> Result<(), Error> {
        if self.selection.is_empty() {
            return Ok(());
        }

        self.selection.clear();
        self.events
            .push(SessionEvent::SelectionChanged { count: 0 });

        log::info!("Selection cleared");
        self.rebuild()
    }

    /// Erase the selected splats, returns the number of erased splats.
    ///
    /// Erased splats are permanently left out of the merged buffer, the object data is kept.
    pub fn erase_selected(&mut self) -> Result<usize, Error> {
        if self.selection.is_empty() {
            log::warn!("No splats selected to erase");
            return Ok(0);
        }

        let count = self.erased.append(&mut self.selection);
        self.events.push(SessionEvent::SelectionChanged { count: 0 });
        self.events.push(SessionEvent::SplatsErased {
            count,
            total: self.erased.len(),
        });

        log::info!("Erased {count} splats, {} in total", self.erased.len());
        self.rebuild()?;
        Ok(count)
    }

    /// Erase the splats inside the volume directly, returns the number of erased splats.
    ///
    /// The selection is kept, except for the splats erased.
    pub fn erase_in_volume(&mut self, volume: &SelectionVolume) -> Result<usize, Error> {
        let mut inside = selection::select_in_volume(&self.objects, volume, &self.erased, None);
        if inside.is_empty() {
            return Ok(0);
        }

        let selected = self.selection.len();
        self.selection = self
            .selection
            .iter()
            .filter(|(id, local)| !inside.contains(*id, *local))
            .collect();
        if self.selection.len() != selected {
            self.events.push(SessionEvent::SelectionChanged {
                count: self.selection.len(),
            });
        }

        let count = self.erased.append(&mut inside);
        self.events.push(SessionEvent::SplatsErased {
            count,
            total: self.erased.len(),
        });

        log::info!("Erased {count} splats in volume, {} in total", self.erased.len());
        self.rebuild()?;
        Ok(count)
    }

    /// Export the merged splats, without highlight and erased splats.
    pub fn export_merged(&self, format: ExportFormat) -> Result<Export, Error> {
        let options = self.export_options();
        let splats = self
            .objects
            .iter()
            .filter(|object| options.includes(object))
            .flat_map(|object| options.kept_splats(object).map(|(_, splat)| *splat))
            .collect::<Vec<_>>();

        Ok(Export {
            file_name: format!("merged.{}", format.extension()),
            bytes: format.encode(&splats)?,
        })
    }

    /// Export every object individually, without erased splats.
    pub fn export_each(&self, format: ExportFormat) -> Result<Vec<Export>, Error> {
        let options = self.export_options();

        self.objects
            .iter()
            .map(|object| {
                let splats = options
                    .kept_splats(object)
                    .map(|(_, splat)| *splat)
                    .collect::<Vec<_>>();

                let stem = std::path::Path::new(&object.file_name)
                    .file_stem()
                    .map_or_else(
                        || object.id().to_string(),
                        |stem| stem.to_string_lossy().into_owned(),
                    );

                Ok(Export {
                    file_name: format!("{stem}_export.{}", format.extension()),
                    bytes: format.encode(&splats)?,
                })
            })
            .collect()
    }

    /// Rebuild the merged buffer from every object and update the render target.
    ///
    /// This reassigns the range of every object.
    pub fn rebuild(&mut self) -> Result<(), Error> {
        let options = MergeOptions::new()
            .visible_only(self.config.visible_only)
            .erased(&self.erased)
            .highlight(
                &self.selection,
                self.selected_object,
                self.config.highlight,
            );

        self.merged = MergedBuffer::build(&mut self.objects, &options);
        self.sync_render_target()
    }

    /// Repack a single object into the merged buffer and update the render target.
    ///
    /// Falls back to [`EditorSession::rebuild`] if the object range is stale.
    fn commit_object(&mut self, index: usize) -> Result<(), Error> {
        let options = MergeOptions::new()
            .visible_only(self.config.visible_only)
            .erased(&self.erased)
            .highlight(
                &self.selection,
                self.selected_object,
                self.config.highlight,
            );

        match self.merged.commit_object(&self.objects[index], &options) {
            Ok(()) => self.sync_render_target(),
            Err(e @ Error::StaleObjectRange { .. }) => {
                log::warn!("{e}, rebuilding merged buffer");
                self.rebuild()
            }
            Err(e) => Err(e),
        }
    }

    /// Update the render target, recreating it once if it rejects the buffer.
    fn sync_render_target(&mut self) -> Result<(), Error> {
        if let Err(e) = self.render_target.update(&self.merged) {
            log::warn!("{e}, recreating render target");
            self.render_target.recreate();

            self.render_target
                .update(&self.merged)
                .inspect_err(|e| log::error!("Recreated render target also failed: {e}"))?;
        }

        Ok(())
    }

    /// The merge options for exports.
    fn export_options(&self) -> MergeOptions<'_> {
        MergeOptions::new()
            .visible_only(self.config.visible_only)
            .erased(&self.erased)
    }
}

impl Default for EditorSession<NullRenderTarget> {
    fn default() -> Self {
        Self::new(NullRenderTarget)
    }
}
