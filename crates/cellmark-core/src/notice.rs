//! User-facing notices raised by the session.

use crate::error::EditError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// What happened. Hosts may localize by matching on this.
#[derive(Debug, Clone, PartialEq)]
pub enum NoticeKind {
    /// A circle was added.
    CircleAdded,
    /// A polygon was committed with this many vertices.
    PolygonAdded(usize),
    /// Polygon drawing started; double-click finishes it.
    PolygonStarted,
    PolygonCancelled,
    AnnotationDeleted,
    AllCleared,
    Undone,
    Redone,
    NothingToUndo,
    NothingToRedo,
    /// Seed data contained annotations that were dropped.
    SeedDropped(usize),
    Saving,
    Saved { count: usize, message: String },
    SaveFailed(String),
    ImageFailed(String),
    /// A rejected edit.
    Rejected(EditError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: NoticeKind,
}

impl Notice {
    pub fn new(level: NoticeLevel, kind: NoticeKind) -> Self {
        Self { level, kind }
    }

    pub fn info(kind: NoticeKind) -> Self {
        Self::new(NoticeLevel::Info, kind)
    }

    pub fn success(kind: NoticeKind) -> Self {
        Self::new(NoticeLevel::Success, kind)
    }

    pub fn warning(kind: NoticeKind) -> Self {
        Self::new(NoticeLevel::Warning, kind)
    }

    pub fn error(kind: NoticeKind) -> Self {
        Self::new(NoticeLevel::Error, kind)
    }

    /// Notice for a rejected edit, with the level its category calls for.
    pub fn rejected(err: EditError) -> Self {
        let level = match err {
            EditError::ImageNotReady => NoticeLevel::Error,
            EditError::IndexOutOfRange { .. } | EditError::NotACircle(_) => NoticeLevel::Info,
            _ => NoticeLevel::Warning,
        };
        Self::new(level, NoticeKind::Rejected(err))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NoticeKind::CircleAdded => f.write_str("Circle added"),
            NoticeKind::PolygonAdded(n) => write!(f, "Polygon added with {n} points"),
            NoticeKind::PolygonStarted => {
                f.write_str("Polygon started. Click to add points, double-click to finish")
            }
            NoticeKind::PolygonCancelled => f.write_str("Polygon cancelled"),
            NoticeKind::AnnotationDeleted => f.write_str("Annotation deleted"),
            NoticeKind::AllCleared => f.write_str("All annotations cleared"),
            NoticeKind::Undone => f.write_str("Undone"),
            NoticeKind::Redone => f.write_str("Redone"),
            NoticeKind::NothingToUndo => f.write_str("Nothing to undo"),
            NoticeKind::NothingToRedo => f.write_str("Nothing to redo"),
            NoticeKind::SeedDropped(n) => write!(f, "Dropped {n} invalid annotation(s) while loading"),
            NoticeKind::Saving => f.write_str("Saving..."),
            NoticeKind::Saved { message, .. } => f.write_str(message),
            NoticeKind::SaveFailed(reason) => write!(f, "Save failed: {reason}"),
            NoticeKind::ImageFailed(reason) => write!(f, "Failed to load image: {reason}"),
            NoticeKind::Rejected(err) => write!(f, "{err}"),
        }
    }
}
