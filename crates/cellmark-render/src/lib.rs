//! Cellmark Render Library
//!
//! Turns an editing session into drawing operations on an abstract surface.

mod renderer;

pub use renderer::{
    AnnotationRenderer, DrawCommand, DrawSink, RecordingSink, RenderContext, RenderResult, Renderer,
    RendererError, StrokeStyle,
};
