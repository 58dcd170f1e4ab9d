//! Tool system: interprets pointer input according to the active tool.

use crate::annotation::{Annotation, MIN_POLYGON_VERTICES};
use crate::camera::Camera;
use crate::classes::{ClassId, ClassRegistry};
use crate::config::EditorConfig;
use crate::error::EditError;
use crate::geometry::bounds_contains;
use crate::hit_test::{HitBands, hit_test};
use crate::history::HistoryManager;
use crate::input::PointerButton;
use crate::notice::{Notice, NoticeKind};
use crate::store::AnnotationStore;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Drag annotations, or pan on empty space.
    Move,
    /// Click to place circles, drag existing annotations.
    #[default]
    Circle,
    /// Click to add vertices, double-click to close.
    Polygon,
}

impl ToolKind {
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Move => "Move",
            ToolKind::Circle => "Circle",
            ToolKind::Polygon => "Polygon",
        }
    }
}

/// Vertices of a polygon being drawn, in image space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingSession {
    vertices: Vec<Point>,
}

impl DrawingSession {
    pub fn start(first: Point) -> Self {
        Self { vertices: vec![first] }
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a vertex. A repeat of the last vertex (the second click of a
    /// double-click) is ignored; returns whether the vertex was added.
    pub fn push(&mut self, vertex: Point) -> bool {
        if self.vertices.last().is_some_and(|last| last.distance(vertex) < 1e-9) {
            return false;
        }
        self.vertices.push(vertex);
        true
    }
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ToolState {
    /// Waiting for interaction.
    #[default]
    Idle,
    /// Panning the view. A polygon being drawn when the pan started is
    /// parked in `suspended` and resumed on release.
    DraggingView {
        last: Point,
        moved: bool,
        suspended: Option<DrawingSession>,
    },
    /// Moving an annotation.
    DraggingAnnotation { index: usize, last: Point, moved: bool },
    /// Building a polygon vertex by vertex.
    DrawingPolygon(DrawingSession),
}

/// Pointer cursor to show over the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorIcon {
    #[default]
    Default,
    Grab,
    Grabbing,
    Move,
    Crosshair,
}

/// Everything a tool may read or change while handling an event.
pub struct ToolContext<'a> {
    pub store: &'a mut AnnotationStore,
    pub camera: &'a mut Camera,
    pub history: &'a mut HistoryManager,
    pub config: &'a EditorConfig,
    /// Image size, `None` until the image is ready.
    pub image: Option<Size>,
    pub current_class: &'a ClassId,
    pub current_radius: f64,
    pub notices: &'a mut Vec<Notice>,
}

impl ToolContext<'_> {
    fn bands(&self) -> HitBands {
        HitBands::from(self.config)
    }

    fn hit(&self, position: Point) -> Option<usize> {
        hit_test(&*self.store, &*self.camera, &self.config.classes, position, self.bands())
    }

    fn reject(&mut self, err: EditError) {
        log::warn!("Rejected edit: {err}");
        self.notices.push(Notice::rejected(err));
    }

    /// Image point under `position`, if the image is ready and contains it.
    fn image_point(&mut self, position: Point) -> Option<Point> {
        let Some(image) = self.image else {
            self.reject(EditError::ImageNotReady);
            return None;
        };
        let point = self.camera.screen_to_image(position);
        if !bounds_contains(point, image) {
            self.reject(EditError::OutsideImage { x: point.x, y: point.y });
            return None;
        }
        Some(point)
    }
}

/// Manages the current tool and its state.
#[derive(Debug, Clone, Default)]
pub struct ToolMachine {
    /// Currently selected tool.
    kind: ToolKind,
    /// Current state of the tool.
    state: ToolState,
    /// Clicks before this instant are ignored (set after a view drag).
    suppress_clicks_until: Option<Instant>,
    /// Last known pointer position, for the polygon preview and cursor.
    pointer: Option<Point>,
}

impl ToolMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> ToolKind {
        self.kind
    }

    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    /// The polygon being drawn, including one parked during a pan.
    pub fn drawing(&self) -> Option<&DrawingSession> {
        match &self.state {
            ToolState::DrawingPolygon(session) => Some(session),
            ToolState::DraggingView {
                suspended: Some(session),
                ..
            } => Some(session),
            _ => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self.state,
            ToolState::DraggingView { .. } | ToolState::DraggingAnnotation { .. }
        )
    }

    /// Switch tools. Any in-progress polygon is discarded and returned.
    pub fn set_tool(&mut self, kind: ToolKind) -> Option<DrawingSession> {
        self.kind = kind;
        self.cancel_drawing()
    }

    /// Abandon the polygon being drawn, if any.
    pub fn cancel_drawing(&mut self) -> Option<DrawingSession> {
        match std::mem::take(&mut self.state) {
            ToolState::DrawingPolygon(session) => Some(session),
            ToolState::DraggingView {
                last,
                moved,
                suspended,
            } => {
                self.state = ToolState::DraggingView {
                    last,
                    moved,
                    suspended: None,
                };
                suspended
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Drop an annotation drag without recording it. Called when the store
    /// is restructured, since the dragged index may now name another
    /// annotation. Returns whether a drag was dropped.
    pub fn abort_drag(&mut self) -> bool {
        if let ToolState::DraggingAnnotation { index, .. } = self.state {
            log::debug!("Dropping drag of annotation {index}");
            self.state = ToolState::Idle;
            return true;
        }
        false
    }

    /// Whether a click at `now` falls inside the post-drag suppression window.
    pub fn clicks_suppressed(&self, now: Instant) -> bool {
        self.suppress_clicks_until.is_some_and(|until| now < until)
    }

    pub fn pointer_down(&mut self, ctx: &mut ToolContext<'_>, position: Point, button: PointerButton) -> bool {
        self.pointer = Some(position);
        if self.is_dragging() {
            return false;
        }
        match button {
            PointerButton::Secondary | PointerButton::Middle => {
                let suspended = self.cancel_drawing();
                self.begin_view_drag(position, suspended);
                false
            }
            PointerButton::Primary => match self.kind {
                ToolKind::Polygon => false,
                ToolKind::Move | ToolKind::Circle => {
                    if matches!(self.state, ToolState::DrawingPolygon(_)) {
                        return false;
                    }
                    match ctx.hit(position) {
                        Some(index) => {
                            // hit_test only yields valid indices
                            let _ = ctx.store.select(index);
                            log::debug!("Dragging annotation {index}");
                            self.state = ToolState::DraggingAnnotation {
                                index,
                                last: position,
                                moved: false,
                            };
                            true
                        }
                        None if self.kind == ToolKind::Move => {
                            self.begin_view_drag(position, None);
                            false
                        }
                        None => false,
                    }
                }
            },
        }
    }

    fn begin_view_drag(&mut self, position: Point, suspended: Option<DrawingSession>) {
        self.state = ToolState::DraggingView {
            last: position,
            moved: false,
            suspended,
        };
    }

    pub fn pointer_move(&mut self, ctx: &mut ToolContext<'_>, position: Point) -> bool {
        self.pointer = Some(position);
        match &mut self.state {
            ToolState::DraggingView { last, moved, .. } => {
                let delta = position - *last;
                if delta.x == 0.0 && delta.y == 0.0 {
                    return false;
                }
                ctx.camera.pan(delta);
                *last = position;
                *moved = true;
                true
            }
            ToolState::DraggingAnnotation { index, last, moved } => {
                let Some(image) = ctx.image else {
                    return false;
                };
                let index = *index;
                let is_circle = ctx.store.get(index).map(|a| matches!(a, Annotation::Circle(_)));
                let result = match is_circle {
                    Some(true) => {
                        let target = ctx.camera.screen_to_image(position);
                        ctx.store.move_circle_to(index, target, image)
                    }
                    Some(false) => {
                        let delta = ctx.camera.screen_delta_to_image(position - *last);
                        ctx.store.translate(index, delta, image)
                    }
                    None => Err(EditError::IndexOutOfRange {
                        index,
                        len: ctx.store.len(),
                    }),
                };
                match result {
                    Ok(()) => {
                        *last = position;
                        *moved = true;
                        true
                    }
                    Err(err) => {
                        log::debug!("Dropping drag: {err}");
                        self.state = ToolState::Idle;
                        false
                    }
                }
            }
            ToolState::DrawingPolygon(_) => true,
            ToolState::Idle => false,
        }
    }

    pub fn pointer_up(&mut self, ctx: &mut ToolContext<'_>, position: Point, now: Instant) -> bool {
        self.pointer = Some(position);
        self.end_drag(ctx, now)
    }

    /// The pointer left the surface: finish any drag and hide the preview.
    pub fn pointer_leave(&mut self, ctx: &mut ToolContext<'_>, now: Instant) -> bool {
        let ended = self.end_drag(ctx, now);
        let had_preview = self.pointer.take().is_some() && self.drawing().is_some();
        ended || had_preview
    }

    fn end_drag(&mut self, ctx: &mut ToolContext<'_>, now: Instant) -> bool {
        match std::mem::take(&mut self.state) {
            ToolState::DraggingView { moved, suspended, .. } => {
                if moved {
                    self.suppress_clicks_until = Some(now + ctx.config.click_suppression());
                }
                if let Some(session) = suspended {
                    self.state = ToolState::DrawingPolygon(session);
                }
                moved
            }
            ToolState::DraggingAnnotation { index, moved, .. } => {
                if moved {
                    log::debug!("Moved annotation {index}");
                    ctx.history.save_state(ctx.store);
                }
                moved
            }
            other => {
                self.state = other;
                false
            }
        }
    }

    pub fn click(&mut self, ctx: &mut ToolContext<'_>, position: Point, now: Instant) -> bool {
        self.pointer = Some(position);
        if self.is_dragging() || self.clicks_suppressed(now) {
            return false;
        }
        match self.kind {
            ToolKind::Move => false,
            ToolKind::Circle => self.place_circle(ctx, position),
            ToolKind::Polygon => self.add_vertex(ctx, position),
        }
    }

    fn place_circle(&mut self, ctx: &mut ToolContext<'_>, position: Point) -> bool {
        if let Some(index) = ctx.hit(position) {
            let _ = ctx.store.select(index);
            return true;
        }
        let Some(center) = ctx.image_point(position) else {
            return false;
        };
        let annotation = Annotation::circle(center, ctx.current_radius, ctx.current_class.clone());
        let index = ctx.store.add(annotation);
        let _ = ctx.store.select(index);
        ctx.history.save_state(ctx.store);
        log::info!(
            "Added circle {} at ({:.1}, {:.1}) r={}",
            ctx.current_class,
            center.x,
            center.y,
            ctx.current_radius
        );
        ctx.notices.push(Notice::success(NoticeKind::CircleAdded));
        true
    }

    fn add_vertex(&mut self, ctx: &mut ToolContext<'_>, position: Point) -> bool {
        let Some(vertex) = ctx.image_point(position) else {
            return false;
        };
        match &mut self.state {
            ToolState::DrawingPolygon(session) => session.push(vertex),
            _ => {
                self.state = ToolState::DrawingPolygon(DrawingSession::start(vertex));
                log::debug!("Polygon started");
                ctx.notices.push(Notice::info(NoticeKind::PolygonStarted));
                true
            }
        }
    }

    pub fn double_click(&mut self, ctx: &mut ToolContext<'_>, position: Point) -> bool {
        self.pointer = Some(position);
        let ToolState::DrawingPolygon(session) = &self.state else {
            return false;
        };
        if session.len() < MIN_POLYGON_VERTICES {
            ctx.reject(EditError::TooFewVertices(session.len()));
            return false;
        }
        let ToolState::DrawingPolygon(session) = std::mem::take(&mut self.state) else {
            return false;
        };
        let count = session.len();
        match Annotation::polygon(session.vertices, ctx.current_class.clone()) {
            Ok(annotation) => {
                let index = ctx.store.add(annotation);
                let _ = ctx.store.select(index);
                ctx.history.save_state(ctx.store);
                log::info!("Added polygon {} with {count} vertices", ctx.current_class);
                ctx.notices.push(Notice::success(NoticeKind::PolygonAdded(count)));
                true
            }
            Err(err) => {
                ctx.reject(err);
                false
            }
        }
    }

    pub fn wheel(&mut self, ctx: &mut ToolContext<'_>, position: Point, delta_y: f64) -> bool {
        self.pointer = Some(position);
        let factor = if delta_y < 0.0 {
            ctx.config.wheel_zoom_in
        } else if delta_y > 0.0 {
            ctx.config.wheel_zoom_out
        } else {
            return false;
        };
        ctx.camera.zoom_at(position, factor)
    }

    /// Cursor for the current state and pointer position.
    pub fn cursor_icon(
        &self,
        store: &AnnotationStore,
        camera: &Camera,
        registry: &ClassRegistry,
        bands: HitBands,
    ) -> CursorIcon {
        match self.state {
            ToolState::DraggingView { .. } => return CursorIcon::Grabbing,
            ToolState::DraggingAnnotation { .. } => return CursorIcon::Move,
            _ => {}
        }
        let hit = self
            .pointer
            .and_then(|p| hit_test(store, camera, registry, p, bands))
            .is_some();
        match (self.kind, hit) {
            (_, true) => CursorIcon::Move,
            (ToolKind::Move, false) => CursorIcon::Grab,
            (ToolKind::Circle | ToolKind::Polygon, false) => CursorIcon::Crosshair,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Fixture {
        store: AnnotationStore,
        camera: Camera,
        history: HistoryManager,
        config: EditorConfig,
        image: Option<Size>,
        class: ClassId,
        notices: Vec<Notice>,
        tools: ToolMachine,
    }

    impl Fixture {
        fn new() -> Self {
            let mut camera = Camera::new();
            camera.set_viewport(Size::new(800.0, 600.0));
            camera.set_image_size(Size::new(800.0, 600.0));
            let store = AnnotationStore::new();
            let mut history = HistoryManager::default();
            history.save_state(&store);
            Self {
                store,
                camera,
                history,
                config: EditorConfig::default(),
                image: Some(Size::new(800.0, 600.0)),
                class: ClassId::new("larvae"),
                notices: Vec::new(),
                tools: ToolMachine::new(),
            }
        }

        fn run<R>(&mut self, f: impl FnOnce(&mut ToolMachine, &mut ToolContext<'_>) -> R) -> R {
            let mut ctx = ToolContext {
                store: &mut self.store,
                camera: &mut self.camera,
                history: &mut self.history,
                config: &self.config,
                image: self.image,
                current_class: &self.class,
                current_radius: 20.0,
                notices: &mut self.notices,
            };
            f(&mut self.tools, &mut ctx)
        }

        fn click(&mut self, p: Point, now: Instant) -> bool {
            self.run(|t, ctx| t.click(ctx, p, now))
        }
    }

    #[test]
    fn test_circle_click_adds_and_selects() {
        let mut fx = Fixture::new();
        assert!(fx.click(Point::new(100.0, 120.0), Instant::now()));
        assert_eq!(fx.store.len(), 1);
        assert_eq!(fx.store.selected(), Some(0));
        assert_eq!(fx.history.len(), 2);
        assert_eq!(fx.store.get(0).map(|a| a.anchor()), Some(Point::new(100.0, 120.0)));
    }

    #[test]
    fn test_circle_click_outside_image_warns() {
        let mut fx = Fixture::new();
        fx.camera.scale = 0.5;
        assert!(!fx.click(Point::new(10.0, 10.0), Instant::now()));
        assert!(fx.store.is_empty());
        assert!(matches!(
            fx.notices.last().map(|n| &n.kind),
            Some(NoticeKind::Rejected(EditError::OutsideImage { .. }))
        ));
    }

    #[test]
    fn test_click_on_existing_selects_instead_of_adding() {
        let mut fx = Fixture::new();
        let now = Instant::now();
        fx.click(Point::new(100.0, 100.0), now);
        fx.store.clear_selection();
        fx.click(Point::new(105.0, 100.0), now);
        assert_eq!(fx.store.len(), 1);
        assert_eq!(fx.store.selected(), Some(0));
    }

    #[test]
    fn test_image_not_ready() {
        let mut fx = Fixture::new();
        fx.image = None;
        assert!(!fx.click(Point::new(100.0, 100.0), Instant::now()));
        assert!(fx.store.is_empty());
        assert!(matches!(
            fx.notices.last().map(|n| &n.kind),
            Some(NoticeKind::Rejected(EditError::ImageNotReady))
        ));
    }

    #[test]
    fn test_view_drag_suppresses_click() {
        let mut fx = Fixture::new();
        let t0 = Instant::now();
        fx.run(|t, ctx| t.pointer_down(ctx, Point::new(300.0, 300.0), PointerButton::Secondary));
        assert_eq!(
            fx.tools.cursor_icon(&fx.store, &fx.camera, &fx.config.classes, HitBands::default()),
            CursorIcon::Grabbing
        );
        fx.run(|t, ctx| t.pointer_move(ctx, Point::new(320.0, 310.0)));
        assert_eq!(fx.camera.offset, kurbo::Vec2::new(20.0, 10.0));
        fx.run(|t, ctx| t.pointer_up(ctx, Point::new(320.0, 310.0), t0));

        assert!(!fx.click(Point::new(320.0, 310.0), t0 + Duration::from_millis(50)));
        assert!(fx.store.is_empty());
        assert!(fx.click(Point::new(320.0, 310.0), t0 + Duration::from_millis(150)));
        assert_eq!(fx.store.len(), 1);
    }

    #[test]
    fn test_drag_circle_snapshots_once_on_release() {
        let mut fx = Fixture::new();
        let now = Instant::now();
        fx.click(Point::new(100.0, 100.0), now);
        let history_len = fx.history.len();

        fx.run(|t, ctx| t.pointer_down(ctx, Point::new(100.0, 100.0), PointerButton::Primary));
        for x in [120.0, 140.0, 900.0] {
            fx.run(|t, ctx| t.pointer_move(ctx, Point::new(x, 100.0)));
        }
        assert_eq!(fx.history.len(), history_len);
        assert_eq!(fx.store.get(0).map(|a| a.anchor()), Some(Point::new(800.0, 100.0)));
        fx.run(|t, ctx| t.pointer_up(ctx, Point::new(900.0, 100.0), now));
        assert_eq!(fx.history.len(), history_len + 1);
        assert_eq!(fx.tools.state(), &ToolState::Idle);
    }

    #[test]
    fn test_press_without_move_does_not_snapshot() {
        let mut fx = Fixture::new();
        let now = Instant::now();
        fx.click(Point::new(100.0, 100.0), now);
        let history_len = fx.history.len();
        fx.run(|t, ctx| t.pointer_down(ctx, Point::new(100.0, 100.0), PointerButton::Primary));
        fx.run(|t, ctx| t.pointer_up(ctx, Point::new(100.0, 100.0), now));
        assert_eq!(fx.history.len(), history_len);
    }

    #[test]
    fn test_abort_drag_returns_to_idle() {
        let mut fx = Fixture::new();
        let now = Instant::now();
        fx.click(Point::new(100.0, 100.0), now);
        assert!(!fx.tools.abort_drag());

        fx.run(|t, ctx| t.pointer_down(ctx, Point::new(100.0, 100.0), PointerButton::Primary));
        assert!(matches!(fx.tools.state(), ToolState::DraggingAnnotation { index: 0, .. }));
        assert!(fx.tools.abort_drag());
        assert_eq!(fx.tools.state(), &ToolState::Idle);

        let history_len = fx.history.len();
        fx.run(|t, ctx| t.pointer_move(ctx, Point::new(200.0, 100.0)));
        fx.run(|t, ctx| t.pointer_up(ctx, Point::new(200.0, 100.0), now));
        assert_eq!(fx.store.get(0).map(|a| a.anchor()), Some(Point::new(100.0, 100.0)));
        assert_eq!(fx.history.len(), history_len);
    }

    #[test]
    fn test_move_tool_drags_polygon_relatively() {
        let mut fx = Fixture::new();
        fx.camera.scale = 2.0;
        fx.store.add(
            Annotation::polygon(
                vec![Point::new(400.0, 300.0), Point::new(420.0, 300.0), Point::new(410.0, 320.0)],
                ClassId::new("honey"),
            )
            .unwrap(),
        );
        fx.tools.set_tool(ToolKind::Move);
        let start = fx.camera.image_to_screen(Point::new(410.0, 305.0));
        fx.run(|t, ctx| t.pointer_down(ctx, start, PointerButton::Primary));
        fx.run(|t, ctx| t.pointer_move(ctx, start + kurbo::Vec2::new(20.0, 10.0)));
        let Some(Annotation::Polygon(p)) = fx.store.get(0) else {
            panic!("expected polygon");
        };
        assert!((p.vertices[0].x - 410.0).abs() < 1e-9);
        assert!((p.vertices[0].y - 305.0).abs() < 1e-9);
    }

    #[test]
    fn test_move_tool_miss_pans() {
        let mut fx = Fixture::new();
        fx.tools.set_tool(ToolKind::Move);
        fx.run(|t, ctx| t.pointer_down(ctx, Point::new(50.0, 50.0), PointerButton::Primary));
        assert!(matches!(fx.tools.state(), ToolState::DraggingView { .. }));
    }

    #[test]
    fn test_polygon_draw_and_finish() {
        let mut fx = Fixture::new();
        fx.tools.set_tool(ToolKind::Polygon);
        let now = Instant::now();
        fx.click(Point::new(100.0, 100.0), now);
        fx.click(Point::new(200.0, 100.0), now);
        // Double-click rejects while under three vertices and keeps drawing
        assert!(!fx.run(|t, ctx| t.double_click(ctx, Point::new(200.0, 100.0))));
        assert_eq!(fx.tools.drawing().map(|d| d.len()), Some(2));

        fx.click(Point::new(150.0, 200.0), now);
        // Second click of a double-click repeats the last vertex and is ignored
        fx.click(Point::new(150.0, 200.0), now);
        assert!(fx.run(|t, ctx| t.double_click(ctx, Point::new(150.0, 200.0))));
        assert_eq!(fx.tools.state(), &ToolState::Idle);
        let Some(Annotation::Polygon(p)) = fx.store.get(0) else {
            panic!("expected polygon");
        };
        assert_eq!(p.vertices.len(), 3);
        assert_eq!(p.class_id, ClassId::new("larvae"));
        assert_eq!(fx.store.selected(), Some(0));
    }

    #[test]
    fn test_polygon_vertex_outside_image_rejected() {
        let mut fx = Fixture::new();
        fx.camera.scale = 0.5;
        fx.tools.set_tool(ToolKind::Polygon);
        let now = Instant::now();
        fx.click(Point::new(400.0, 300.0), now);
        fx.click(Point::new(5.0, 5.0), now);
        assert_eq!(fx.tools.drawing().map(|d| d.len()), Some(1));
    }

    #[test]
    fn test_pan_keeps_polygon_in_progress() {
        let mut fx = Fixture::new();
        fx.tools.set_tool(ToolKind::Polygon);
        let now = Instant::now();
        fx.click(Point::new(100.0, 100.0), now);
        fx.click(Point::new(200.0, 100.0), now);
        fx.run(|t, ctx| t.pointer_down(ctx, Point::new(400.0, 400.0), PointerButton::Secondary));
        assert_eq!(fx.tools.drawing().map(|d| d.len()), Some(2));
        fx.run(|t, ctx| t.pointer_move(ctx, Point::new(420.0, 400.0)));
        fx.run(|t, ctx| t.pointer_up(ctx, Point::new(420.0, 400.0), now));
        assert!(matches!(fx.tools.state(), ToolState::DrawingPolygon(s) if s.len() == 2));
    }

    #[test]
    fn test_set_tool_cancels_polygon() {
        let mut fx = Fixture::new();
        fx.tools.set_tool(ToolKind::Polygon);
        fx.click(Point::new(100.0, 100.0), Instant::now());
        let cancelled = fx.tools.set_tool(ToolKind::Circle);
        assert_eq!(cancelled.map(|s| s.len()), Some(1));
        assert_eq!(fx.tools.state(), &ToolState::Idle);
    }

    #[test]
    fn test_wheel_zoom() {
        let mut fx = Fixture::new();
        let cursor = Point::new(200.0, 150.0);
        let before = fx.camera.screen_to_image(cursor);
        assert!(fx.run(|t, ctx| t.wheel(ctx, cursor, -120.0)));
        assert!((fx.camera.scale - 1.1).abs() < 1e-12);
        let after = fx.camera.screen_to_image(cursor);
        assert!((before.x - after.x).abs() < 1e-9 && (before.y - after.y).abs() < 1e-9);
        assert!(fx.run(|t, ctx| t.wheel(ctx, cursor, 120.0)));
        assert!((fx.camera.scale - 0.99).abs() < 1e-12);
    }

    #[test]
    fn test_cursor_icons() {
        let mut fx = Fixture::new();
        fx.click(Point::new(100.0, 100.0), Instant::now());
        let icon = |fx: &Fixture| fx.tools.cursor_icon(&fx.store, &fx.camera, &fx.config.classes, HitBands::default());
        fx.run(|t, ctx| t.pointer_move(ctx, Point::new(100.0, 100.0)));
        assert_eq!(icon(&fx), CursorIcon::Move);
        fx.run(|t, ctx| t.pointer_move(ctx, Point::new(500.0, 500.0)));
        assert_eq!(icon(&fx), CursorIcon::Crosshair);
        fx.tools.set_tool(ToolKind::Move);
        assert_eq!(icon(&fx), CursorIcon::Grab);
    }
}
