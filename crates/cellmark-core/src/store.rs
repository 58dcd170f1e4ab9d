//! Annotation store: the ordered annotation sequence plus selection and
//! dirty tracking.

use crate::annotation::Annotation;
use crate::classes::ClassId;
use crate::error::{EditError, EditResult};
use crate::geometry::clamp_to_bounds;
use kurbo::{Point, Size, Vec2};

/// Ordered annotations. Insertion order is the display and hit-test order.
#[derive(Debug, Clone, Default)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    /// Index of the selected annotation, always valid when set.
    selected: Option<usize>,
    /// Set by every successful mutation, cleared after a save.
    dirty: bool,
    /// Bumped by every successful mutation.
    revision: u64,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store from existing annotations without marking it dirty.
    pub fn with_annotations(annotations: Vec<Annotation>) -> Self {
        Self {
            annotations,
            ..Self::default()
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }

    fn check_index(&self, index: usize) -> EditResult<()> {
        if index < self.annotations.len() {
            Ok(())
        } else {
            Err(EditError::IndexOutOfRange {
                index,
                len: self.annotations.len(),
            })
        }
    }

    /// Append an annotation and return its index.
    pub fn add(&mut self, annotation: Annotation) -> usize {
        self.annotations.push(annotation);
        self.touch();
        self.annotations.len() - 1
    }

    /// Remove the annotation at `index`. Later indices shift down by one and
    /// the selection follows its annotation.
    pub fn remove_at(&mut self, index: usize) -> EditResult<Annotation> {
        self.check_index(index)?;
        let removed = self.annotations.remove(index);
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        self.touch();
        Ok(removed)
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.annotations.get(index)
    }

    pub fn set_class(&mut self, index: usize, class_id: ClassId) -> EditResult<()> {
        self.check_index(index)?;
        self.annotations[index].set_class_id(class_id);
        self.touch();
        Ok(())
    }

    /// Change a circle's radius. The caller is responsible for range limits.
    pub fn set_radius(&mut self, index: usize, radius: f64) -> EditResult<()> {
        self.check_index(index)?;
        match &mut self.annotations[index] {
            Annotation::Circle(c) => c.radius = radius,
            Annotation::Polygon(_) => return Err(EditError::NotACircle(index)),
        }
        self.touch();
        Ok(())
    }

    /// Move an annotation by an image-space delta, clamping every coordinate
    /// into `bounds`.
    pub fn translate(&mut self, index: usize, delta: Vec2, bounds: Size) -> EditResult<()> {
        self.check_index(index)?;
        self.annotations[index].translate_clamped(delta, bounds);
        self.touch();
        Ok(())
    }

    /// Place a circle's center at `point`, clamped into `bounds`.
    pub fn move_circle_to(&mut self, index: usize, point: Point, bounds: Size) -> EditResult<()> {
        self.check_index(index)?;
        match &mut self.annotations[index] {
            Annotation::Circle(c) => c.center = clamp_to_bounds(point, bounds),
            Annotation::Polygon(_) => return Err(EditError::NotACircle(index)),
        }
        self.touch();
        Ok(())
    }

    /// Remove every annotation and the selection.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.selected = None;
        self.touch();
    }

    /// Clamp every annotation into the image. Returns how many moved.
    pub fn clamp_all(&mut self, image: Size) -> usize {
        let mut moved = 0;
        for annotation in &mut self.annotations {
            let before = annotation.clone();
            annotation.clamp_to(image);
            if *annotation != before {
                moved += 1;
            }
        }
        if moved > 0 {
            self.touch();
        }
        moved
    }

    /// Replace the whole sequence (history restore). A selection that no
    /// longer points at an annotation is cleared.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        if self.selected.is_some_and(|s| s >= self.annotations.len()) {
            self.selected = None;
        }
        self.touch();
    }

    pub fn select(&mut self, index: usize) -> EditResult<()> {
        self.check_index(index)?;
        self.selected = Some(index);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.and_then(|i| self.annotations.get(i))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag if nothing changed since `revision`.
    /// Returns whether the flag was cleared.
    pub fn mark_saved(&mut self, revision: u64) -> bool {
        if self.revision == revision {
            self.dirty = false;
            true
        } else {
            false
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &Annotation)> {
        self.annotations.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }
}
