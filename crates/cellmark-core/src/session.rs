//! Editing session: owns every piece of editor state and routes input to it.

use crate::annotation::Annotation;
use crate::camera::Camera;
use crate::classes::{ClassId, ClassRegistry};
use crate::config::EditorConfig;
use crate::error::{EditError, EditResult};
use crate::hit_test::HitBands;
use crate::history::HistoryManager;
use crate::input::InputEvent;
use crate::notice::{Notice, NoticeKind};
use crate::shortcuts::{EditorCommand, command_for};
use crate::storage::{SaveReceipt, StorageError};
use crate::store::AnnotationStore;
use crate::tools::{CursorIcon, ToolContext, ToolKind, ToolMachine};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// The image being annotated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub id: String,
    pub path: String,
    pub width: f64,
    pub height: f64,
}

impl ImageInfo {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ImageState {
    #[default]
    Loading,
    Ready(ImageInfo),
    Failed(String),
}

/// A snapshot of annotations to hand to a storage backend.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub image_id: String,
    pub annotations: Vec<Annotation>,
    /// Store revision the snapshot was taken at.
    pub revision: u64,
}

/// What the host should do after an event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventResponse {
    pub redraw: bool,
    /// Set when the event asked for a save.
    pub save_request: Option<SaveRequest>,
}

impl EventResponse {
    fn redraw(redraw: bool) -> Self {
        Self {
            redraw,
            save_request: None,
        }
    }
}

/// One row of the annotation list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotationSummary {
    pub index: usize,
    pub class_id: ClassId,
    pub class_name: String,
    pub kind: &'static str,
    /// Circle center or polygon centroid.
    pub center: Point,
    pub radius: Option<f64>,
    pub point_count: Option<usize>,
    pub selected: bool,
}

/// An interactive annotation editing session for one image.
#[derive(Debug)]
pub struct EditorSession {
    config: EditorConfig,
    camera: Camera,
    store: AnnotationStore,
    history: HistoryManager,
    tools: ToolMachine,
    image: ImageState,
    current_class: ClassId,
    current_radius: f64,
    /// Revision of the save in flight, if any.
    saving: Option<u64>,
    notices: Vec<Notice>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// Start a session. The config's class registry is valid by
    /// construction; the numeric fields are used as given, see
    /// [`EditorConfig::validate`].
    pub fn new(config: EditorConfig) -> Self {
        let store = AnnotationStore::new();
        let mut history = HistoryManager::new(config.history_capacity);
        history.save_state(&store);
        Self {
            camera: Camera::with_scale_range(config.min_scale, config.max_scale),
            current_radius: config.default_radius,
            current_class: config.classes.default_class(),
            config,
            store,
            history,
            tools: ToolMachine::new(),
            image: ImageState::Loading,
            saving: None,
            notices: Vec::new(),
        }
    }

    fn image_size(&self) -> Option<Size> {
        match &self.image {
            ImageState::Ready(info) => Some(info.size()),
            _ => None,
        }
    }

    fn with_tools<R>(&mut self, f: impl FnOnce(&mut ToolMachine, &mut ToolContext<'_>) -> R) -> R {
        let image = self.image_size();
        let mut ctx = ToolContext {
            store: &mut self.store,
            camera: &mut self.camera,
            history: &mut self.history,
            config: &self.config,
            image,
            current_class: &self.current_class,
            current_radius: self.current_radius,
            notices: &mut self.notices,
        };
        f(&mut self.tools, &mut ctx)
    }

    /// Indices changed under the tools: a drag in progress no longer knows
    /// which annotation it holds.
    fn store_restructured(&mut self) {
        self.tools.abort_drag();
    }

    /// Record the store in history after a mutation.
    fn commit(&mut self) {
        self.history.save_state(&self.store);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Report a failed operation the way its category calls for: index
    /// errors are logged, everything else becomes a notice.
    fn report(&mut self, err: EditError) {
        match err {
            EditError::IndexOutOfRange { .. } => log::debug!("Ignoring edit: {err}"),
            _ => {
                log::warn!("Rejected edit: {err}");
                self.notify(Notice::rejected(err));
            }
        }
    }

    /// Process one input event.
    pub fn handle_event(&mut self, event: InputEvent, now: Instant) -> EventResponse {
        let redraw = match event {
            InputEvent::PointerDown { position, button } => {
                self.with_tools(|tools, ctx| tools.pointer_down(ctx, position, button))
            }
            InputEvent::PointerMove { position } => self.with_tools(|tools, ctx| tools.pointer_move(ctx, position)),
            InputEvent::PointerUp { position, .. } => {
                self.with_tools(|tools, ctx| tools.pointer_up(ctx, position, now))
            }
            InputEvent::Click { position } => self.with_tools(|tools, ctx| tools.click(ctx, position, now)),
            InputEvent::DoubleClick { position } => self.with_tools(|tools, ctx| tools.double_click(ctx, position)),
            InputEvent::Wheel { position, delta_y } => {
                self.with_tools(|tools, ctx| tools.wheel(ctx, position, delta_y))
            }
            InputEvent::PointerLeave => self.with_tools(|tools, ctx| tools.pointer_leave(ctx, now)),
            InputEvent::Key(press) => {
                return match command_for(&press) {
                    Some(command) => self.execute(command),
                    None => EventResponse::default(),
                };
            }
        };
        EventResponse::redraw(redraw)
    }

    /// Run a keyboard command.
    pub fn execute(&mut self, command: EditorCommand) -> EventResponse {
        match command {
            EditorCommand::Save => match self.begin_save() {
                Ok(request) => EventResponse {
                    redraw: false,
                    save_request: Some(request),
                },
                Err(err) => {
                    self.report(err);
                    EventResponse::default()
                }
            },
            EditorCommand::Undo => EventResponse::redraw(self.undo()),
            EditorCommand::Redo => EventResponse::redraw(self.redo()),
            EditorCommand::DeleteSelection => EventResponse::redraw(self.delete_selected()),
            EditorCommand::CancelOrDeselect => {
                if self.tools.cancel_drawing().is_some() {
                    self.notify(Notice::info(NoticeKind::PolygonCancelled));
                } else {
                    self.store.clear_selection();
                }
                EventResponse::redraw(true)
            }
            EditorCommand::SelectTool(kind) => {
                self.set_tool(kind);
                EventResponse::redraw(true)
            }
            EditorCommand::ZoomIn => EventResponse::redraw(self.zoom_in()),
            EditorCommand::ZoomOut => EventResponse::redraw(self.zoom_out()),
            EditorCommand::ZoomToFit => {
                self.zoom_to_fit();
                EventResponse::redraw(true)
            }
        }
    }

    /// Switch tools, discarding any in-progress polygon and the selection.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if self.tools.set_tool(kind).is_some() {
            self.notify(Notice::info(NoticeKind::PolygonCancelled));
        }
        self.store.clear_selection();
        log::debug!("Tool set to {}", kind.name());
    }

    /// Class for new annotations.
    pub fn set_current_class(&mut self, class_id: ClassId) -> EditResult<()> {
        if !self.config.classes.contains(&class_id) {
            return Err(EditError::UnknownClass(class_id.to_string()));
        }
        self.current_class = class_id;
        Ok(())
    }

    /// Radius for new circles, clamped to the configured range. A selected
    /// circle takes the new radius too. Returns the clamped value.
    pub fn set_radius(&mut self, radius: f64) -> f64 {
        let radius = self.config.clamp_radius(radius);
        self.current_radius = radius;
        if let Some(index) = self.store.selected() {
            let changed = matches!(self.store.get(index), Some(Annotation::Circle(c)) if c.radius != radius);
            if changed && self.store.set_radius(index, radius).is_ok() {
                self.commit();
            }
        }
        radius
    }

    pub fn select(&mut self, index: usize) -> EditResult<()> {
        self.store.select(index).inspect_err(|err| log::debug!("Ignoring selection: {err}"))
    }

    pub fn clear_selection(&mut self) {
        self.store.clear_selection();
    }

    /// Reclassify an existing annotation.
    pub fn set_annotation_class(&mut self, index: usize, class_id: ClassId) -> EditResult<()> {
        if !self.config.classes.contains(&class_id) {
            return Err(EditError::UnknownClass(class_id.to_string()));
        }
        self.store.set_class(index, class_id)?;
        self.commit();
        Ok(())
    }

    pub fn remove_annotation(&mut self, index: usize) -> EditResult<Annotation> {
        let removed = self
            .store
            .remove_at(index)
            .inspect_err(|err| log::debug!("Ignoring removal: {err}"))?;
        self.store_restructured();
        self.commit();
        log::info!("Removed {} annotation {index}", removed.kind());
        self.notify(Notice::info(NoticeKind::AnnotationDeleted));
        Ok(removed)
    }

    /// Remove the selected annotation. Returns whether anything was removed.
    pub fn delete_selected(&mut self) -> bool {
        match self.store.selected() {
            Some(index) => self.remove_annotation(index).is_ok(),
            None => false,
        }
    }

    /// Remove every annotation (undoable).
    pub fn clear_all(&mut self) -> bool {
        if self.store.is_empty() {
            return false;
        }
        self.store.clear();
        self.store_restructured();
        self.commit();
        log::info!("Cleared all annotations");
        self.notify(Notice::info(NoticeKind::AllCleared));
        true
    }

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(snapshot) => {
                snapshot.restore(&mut self.store);
                self.store_restructured();
                self.notify(Notice::info(NoticeKind::Undone));
                true
            }
            None => {
                self.notify(Notice::info(NoticeKind::NothingToUndo));
                false
            }
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(snapshot) => {
                snapshot.restore(&mut self.store);
                self.store_restructured();
                self.notify(Notice::info(NoticeKind::Redone));
                true
            }
            None => {
                self.notify(Notice::info(NoticeKind::NothingToRedo));
                false
            }
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.camera.zoom_centered(self.config.step_zoom_in)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.camera.zoom_centered(self.config.step_zoom_out)
    }

    pub fn zoom_to_fit(&mut self) {
        self.camera.reset_to_fit();
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.camera.set_viewport(size);
    }

    /// The image finished loading: size the camera and fit the view.
    /// Annotations seeded earlier are clamped into the image, and the clamped
    /// set becomes the history baseline.
    pub fn image_loaded(&mut self, info: ImageInfo) {
        log::info!("Image {} loaded ({}x{})", info.id, info.width, info.height);
        let size = info.size();
        self.camera.set_image_size(size);
        self.camera.reset_to_fit();
        self.image = ImageState::Ready(info);
        let moved = self.store.clamp_all(size);
        if moved > 0 {
            log::warn!("Clamped {moved} annotation(s) into the image");
            self.history.clear();
            self.commit();
        }
    }

    pub fn image_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::error!("Image failed to load: {reason}");
        self.notify(Notice::error(NoticeKind::ImageFailed(reason.clone())));
        self.image = ImageState::Failed(reason);
    }

    /// Replace the annotations with previously saved ones. Malformed entries
    /// are dropped with a warning and, once the image is ready, coordinates
    /// are clamped into it; history restarts from the seeded state.
    pub fn seed_annotations(&mut self, annotations: Vec<Annotation>) {
        let total = annotations.len();
        let mut valid: Vec<Annotation> = annotations.into_iter().filter(Annotation::is_valid).collect();
        if let Some(image) = self.image_size() {
            for annotation in &mut valid {
                annotation.clamp_to(image);
            }
        }
        let dropped = total - valid.len();
        if dropped > 0 {
            log::warn!("Dropped {dropped} invalid annotation(s) from seed data");
            self.notify(Notice::warning(NoticeKind::SeedDropped(dropped)));
        }
        self.tools.cancel_drawing();
        self.tools.abort_drag();
        self.store = AnnotationStore::with_annotations(valid);
        self.history.clear();
        self.history.save_state(&self.store);
        log::info!("Seeded {} annotations", self.store.len());
    }

    /// Start a save: snapshot the annotations for the storage backend.
    pub fn begin_save(&mut self) -> EditResult<SaveRequest> {
        if self.saving.is_some() {
            return Err(EditError::SaveInProgress);
        }
        let ImageState::Ready(info) = &self.image else {
            return Err(EditError::ImageNotReady);
        };
        let request = SaveRequest {
            image_id: info.id.clone(),
            annotations: self.store.annotations().to_vec(),
            revision: self.store.revision(),
        };
        self.saving = Some(request.revision);
        self.notify(Notice::info(NoticeKind::Saving));
        Ok(request)
    }

    /// Finish the save started by [`begin_save`](Self::begin_save).
    ///
    /// On success the store is marked clean unless it changed meanwhile; on
    /// failure state and the dirty flag are left as they are.
    pub fn finish_save(&mut self, result: Result<SaveReceipt, StorageError>) {
        let Some(revision) = self.saving.take() else {
            log::warn!("finish_save called with no save in progress");
            return;
        };
        match result {
            Ok(receipt) => {
                if !self.store.mark_saved(revision) {
                    log::debug!("Annotations changed during save; keeping dirty flag");
                }
                log::info!("{}", receipt.message);
                self.notify(Notice::success(NoticeKind::Saved {
                    count: receipt.count,
                    message: receipt.message,
                }));
            }
            Err(err) => {
                log::error!("Save failed: {err}");
                self.notify(Notice::error(NoticeKind::SaveFailed(err.to_string())));
            }
        }
    }

    pub fn is_saving(&self) -> bool {
        self.saving.is_some()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.store.is_dirty()
    }

    /// Take all pending notices, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Rows for an annotation list.
    pub fn annotation_summaries(&self) -> Vec<AnnotationSummary> {
        let selected = self.store.selected();
        self.store
            .iter()
            .map(|(index, annotation)| {
                let class_id = annotation.class_id().clone();
                let class_name = self
                    .config
                    .classes
                    .display_info(&class_id)
                    .map_or_else(|| class_id.to_string(), |info| info.display_name.clone());
                let (radius, point_count) = match annotation {
                    Annotation::Circle(c) => (Some(c.radius), None),
                    Annotation::Polygon(p) => (None, Some(p.vertices.len())),
                };
                AnnotationSummary {
                    index,
                    class_id,
                    class_name,
                    kind: annotation.kind(),
                    center: annotation.anchor(),
                    radius,
                    point_count,
                    selected: selected == Some(index),
                }
            })
            .collect()
    }

    /// Outline of an annotation in image space, circles tessellated with
    /// `circle_segments` points.
    pub fn outline(&self, index: usize) -> EditResult<Vec<Point>> {
        let len = self.store.len();
        self.store
            .get(index)
            .map(|annotation| annotation.outline(self.config.circle_segments))
            .ok_or(EditError::IndexOutOfRange { index, len })
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        self.tools
            .cursor_icon(&self.store, &self.camera, &self.config.classes, HitBands::from(&self.config))
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn tools(&self) -> &ToolMachine {
        &self.tools
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.config.classes
    }

    pub fn image_state(&self) -> &ImageState {
        &self.image
    }

    pub fn image_info(&self) -> Option<&ImageInfo> {
        match &self.image {
            ImageState::Ready(info) => Some(info),
            _ => None,
        }
    }

    pub fn current_class(&self) -> &ClassId {
        &self.current_class
    }

    pub fn current_radius(&self) -> f64 {
        self.current_radius
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools.kind()
    }

    pub fn selected(&self) -> Option<usize> {
        self.store.selected()
    }
}
