//! Cellmark core library
//!
//! Editing engine for classifying regions of an image with circles and
//! polygons: view transform, geometry, annotation store, hit testing, tool
//! state machine, undo history and persistence backends.

pub mod annotation;
pub mod camera;
pub mod classes;
pub mod config;
pub mod error;
pub mod geometry;
pub mod history;
pub mod input;
pub mod notice;
pub mod session;
pub mod shortcuts;
pub mod storage;
pub mod store;
pub mod tools;

pub use annotation::{Annotation, CircleAnnotation, PolygonAnnotation};
pub use camera::Camera;
pub use classes::{ClassId, ClassInfo, ClassRegistry, SerializableColor};
pub use config::EditorConfig;
pub use error::{ConfigError, EditError, EditResult};
pub use history::{HistoryManager, HistorySnapshot};
pub use hit_test::{HitBands, hit_test};
pub use input::{InputEvent, Key, KeyPress, Modifiers, PointerButton};
pub use notice::{Notice, NoticeKind, NoticeLevel};
pub use session::{AnnotationSummary, EditorSession, EventResponse, ImageInfo, ImageState, SaveRequest};
pub use shortcuts::{EditorCommand, ShortcutRegistry};
pub use store::AnnotationStore;
pub use tools::{CursorIcon, ToolKind, ToolState};

// Re-export kurbo and peniko for convenience
pub use kurbo;
pub use peniko;
