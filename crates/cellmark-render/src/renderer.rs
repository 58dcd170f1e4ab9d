//! Renderer trait abstraction and the annotation renderer.

use cellmark_core::annotation::{Annotation, MIN_POLYGON_VERTICES};
use cellmark_core::camera::Camera;
use cellmark_core::classes::ClassInfo;
use cellmark_core::session::{EditorSession, ImageState};
use kurbo::{BezPath, Circle, Point, Rect, Shape, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Image not available: {0}")]
    ImageUnavailable(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Outline style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f64,
    /// On/off dash lengths, solid when `None`.
    pub dash: Option<[f64; 2]>,
}

impl StrokeStyle {
    pub const fn solid(width: f64) -> Self {
        Self { width, dash: None }
    }

    pub const fn dashed(width: f64, on: f64, off: f64) -> Self {
        Self {
            width,
            dash: Some([on, off]),
        }
    }
}

/// Abstract drawing surface, in screen coordinates.
///
/// Fills use the even-odd rule so polygon holes stay open.
pub trait DrawSink {
    fn clear(&mut self, color: Color, viewport: Size);

    /// Draw the image identified by `image_id` stretched over `dest`.
    fn draw_image(&mut self, image_id: &str, dest: Rect) -> RenderResult<()>;

    fn fill_path(&mut self, path: &BezPath, color: Color);

    fn stroke_path(&mut self, path: &BezPath, style: StrokeStyle, color: Color);

    /// Draw text horizontally centered on `position` (baseline).
    fn fill_text(&mut self, text: &str, position: Point, size: f64, color: Color);
}

/// One recorded drawing operation.
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Clear { color: Color, viewport: Size },
    Image { image_id: String, dest: Rect },
    FillPath { path: BezPath, color: Color },
    StrokePath { path: BezPath, style: StrokeStyle, color: Color },
    Text { text: String, position: Point, size: f64, color: Color },
}

/// A sink that records a display list, for tests and headless use.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl DrawSink for RecordingSink {
    fn clear(&mut self, color: Color, viewport: Size) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color, viewport });
    }

    fn draw_image(&mut self, image_id: &str, dest: Rect) -> RenderResult<()> {
        self.commands.push(DrawCommand::Image {
            image_id: image_id.to_string(),
            dest,
        });
        Ok(())
    }

    fn fill_path(&mut self, path: &BezPath, color: Color) {
        self.commands.push(DrawCommand::FillPath {
            path: path.clone(),
            color,
        });
    }

    fn stroke_path(&mut self, path: &BezPath, style: StrokeStyle, color: Color) {
        self.commands.push(DrawCommand::StrokePath {
            path: path.clone(),
            style,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, position: Point, size: f64, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            size,
            color,
        });
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The session to render.
    pub session: &'a EditorSession,
    /// Background color.
    pub background_color: Color,
    /// Outline color of the selected annotation.
    pub selection_color: Color,
    /// Index label color.
    pub label_color: Color,
    /// Index label font size.
    pub label_size: f64,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(session: &'a EditorSession) -> Self {
        Self {
            session,
            background_color: Color::from_rgba8(240, 240, 240, 255),
            selection_color: Color::from_rgba8(255, 0, 0, 255),
            label_color: Color::from_rgba8(0, 0, 0, 255),
            label_size: 12.0,
        }
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the selection outline color.
    pub fn with_selection_color(mut self, color: Color) -> Self {
        self.selection_color = color;
        self
    }

    /// Set the label color.
    pub fn with_label_color(mut self, color: Color) -> Self {
        self.label_color = color;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer {
    /// Draw one frame of `ctx` into `sink`.
    fn render(&mut self, ctx: &RenderContext, sink: &mut dyn DrawSink) -> RenderResult<()>;
}

/// Fill alpha of an unselected annotation.
const FILL_ALPHA: f64 = 0.05;
/// Fill alpha of the selected annotation.
const SELECTED_FILL_ALPHA: f64 = 0.15;
const STROKE_WIDTH: f64 = 2.0;
const SELECTED_STROKE_WIDTH: f64 = 3.0;
/// Label baseline offset below the anchor.
const LABEL_OFFSET: f64 = 4.0;
const PREVIEW_STROKE: StrokeStyle = StrokeStyle::dashed(2.0, 5.0, 5.0);
const VERTEX_DOT_RADIUS: f64 = 4.0;

/// Renders the image, the annotations and the polygon preview.
#[derive(Debug, Clone, Default)]
pub struct AnnotationRenderer;

impl AnnotationRenderer {
    pub fn new() -> Self {
        Self
    }

    fn polygon_path(camera: &Camera, rings: impl Iterator<Item = impl AsRef<[Point]>>) -> BezPath {
        let mut path = BezPath::new();
        for ring in rings {
            let mut points = ring.as_ref().iter().map(|p| camera.image_to_screen(*p));
            if let Some(first) = points.next() {
                path.move_to(first);
                for p in points {
                    path.line_to(p);
                }
                path.close_path();
            }
        }
        path
    }

    fn draw_annotation(
        ctx: &RenderContext,
        sink: &mut dyn DrawSink,
        index: usize,
        annotation: &Annotation,
        info: &ClassInfo,
    ) {
        let session = ctx.session;
        let camera = session.camera();
        let path = match annotation {
            Annotation::Circle(c) => {
                Circle::new(camera.image_to_screen(c.center), c.radius * camera.scale).to_path(0.1)
            }
            Annotation::Polygon(p) => {
                if p.vertices.len() < MIN_POLYGON_VERTICES {
                    log::debug!("Skipping polygon {index} with {} vertices", p.vertices.len());
                    return;
                }
                let rings = std::iter::once(p.vertices.as_slice()).chain(p.holes.iter().map(Vec::as_slice));
                Self::polygon_path(camera, rings)
            }
        };
        let selected = session.selected() == Some(index);

        if !session.registry().is_boundary_only(annotation.class_id()) {
            let alpha = if selected { SELECTED_FILL_ALPHA } else { FILL_ALPHA };
            sink.fill_path(&path, info.border_color.with_alpha(alpha));
        }
        if selected {
            sink.stroke_path(&path, StrokeStyle::solid(SELECTED_STROKE_WIDTH), ctx.selection_color);
        } else {
            sink.stroke_path(&path, StrokeStyle::solid(STROKE_WIDTH), info.border_color.into());
        }

        let anchor = camera.image_to_screen(annotation.anchor());
        sink.fill_text(
            &(index + 1).to_string(),
            Point::new(anchor.x, anchor.y + LABEL_OFFSET),
            ctx.label_size,
            ctx.label_color,
        );
    }

    fn draw_preview(ctx: &RenderContext, sink: &mut dyn DrawSink) {
        let session = ctx.session;
        let Some(drawing) = session.tools().drawing() else {
            return;
        };
        let camera = session.camera();
        let Some(info) = session.registry().display_info(session.current_class()) else {
            return;
        };
        let screen: Vec<Point> = drawing.vertices().iter().map(|p| camera.image_to_screen(*p)).collect();
        let Some((first, rest)) = screen.split_first() else {
            return;
        };

        let mut path = BezPath::new();
        path.move_to(*first);
        for p in rest {
            path.line_to(*p);
        }
        if let Some(pointer) = session.tools().pointer() {
            path.line_to(pointer);
        }
        sink.stroke_path(&path, PREVIEW_STROKE, info.border_color.into());

        let outline = Color::from_rgba8(0, 0, 0, 255);
        for (i, p) in screen.iter().enumerate() {
            let dot = Circle::new(*p, VERTEX_DOT_RADIUS).to_path(0.1);
            let fill = if i == 0 {
                Color::from_rgba8(255, 0, 0, 255)
            } else {
                info.fill_color.into()
            };
            sink.fill_path(&dot, fill);
            sink.stroke_path(&dot, StrokeStyle::solid(1.0), outline);
        }
    }
}

impl Renderer for AnnotationRenderer {
    fn render(&mut self, ctx: &RenderContext, sink: &mut dyn DrawSink) -> RenderResult<()> {
        let session = ctx.session;
        let camera = session.camera();
        sink.clear(ctx.background_color, camera.viewport);

        if let ImageState::Ready(info) = session.image_state() {
            let dest = Rect::from_points(
                camera.image_to_screen(Point::ZERO),
                camera.image_to_screen(Point::new(info.width, info.height)),
            );
            sink.draw_image(&info.id, dest)?;
        }

        let registry = session.registry();
        for (index, annotation) in session.store().iter() {
            match registry.display_info(annotation.class_id()) {
                Some(info) => Self::draw_annotation(ctx, sink, index, annotation, info),
                None => log::debug!("No display info for annotation {index}"),
            }
        }

        Self::draw_preview(ctx, sink);
        Ok(())
    }
}
