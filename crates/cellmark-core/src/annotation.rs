//! Annotation entities.

use crate::classes::ClassId;
use crate::error::{EditError, EditResult};
use crate::geometry::{self, clamp_to_bounds, polygon_centroid};
use chrono::{DateTime, Utc};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum number of vertices for a closed polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// A circular region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleAnnotation {
    /// Center in image space.
    #[serde(flatten)]
    pub center: Point,
    pub radius: f64,
    #[serde(rename = "class")]
    pub class_id: ClassId,
    #[serde(rename = "timestamp", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl CircleAnnotation {
    pub fn new(center: Point, radius: f64, class_id: ClassId) -> Self {
        Self {
            center,
            radius,
            class_id,
            created_at: Utc::now(),
        }
    }
}

/// A polygonal region, optionally with holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonAnnotation {
    /// Outer boundary in image space.
    #[serde(rename = "points")]
    pub vertices: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<Vec<Point>>,
    #[serde(rename = "class")]
    pub class_id: ClassId,
    #[serde(rename = "timestamp", default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl PolygonAnnotation {
    /// Create a closed polygon. Fails with fewer than three vertices.
    pub fn new(vertices: Vec<Point>, class_id: ClassId) -> EditResult<Self> {
        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(EditError::TooFewVertices(vertices.len()));
        }
        Ok(Self {
            vertices,
            holes: Vec::new(),
            class_id,
            created_at: Utc::now(),
        })
    }

    pub fn with_holes(mut self, holes: Vec<Vec<Point>>) -> Self {
        self.holes = holes;
        self
    }

    pub fn is_closed(&self) -> bool {
        self.vertices.len() >= MIN_POLYGON_VERTICES
    }

    pub fn centroid(&self) -> Point {
        polygon_centroid(&self.vertices)
    }
}

/// An annotation: a classified region of the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Annotation {
    Circle(CircleAnnotation),
    Polygon(PolygonAnnotation),
}

impl Annotation {
    pub fn circle(center: Point, radius: f64, class_id: ClassId) -> Self {
        Annotation::Circle(CircleAnnotation::new(center, radius, class_id))
    }

    pub fn polygon(vertices: Vec<Point>, class_id: ClassId) -> EditResult<Self> {
        PolygonAnnotation::new(vertices, class_id).map(Annotation::Polygon)
    }

    pub fn class_id(&self) -> &ClassId {
        match self {
            Annotation::Circle(c) => &c.class_id,
            Annotation::Polygon(p) => &p.class_id,
        }
    }

    pub fn set_class_id(&mut self, class_id: ClassId) {
        match self {
            Annotation::Circle(c) => c.class_id = class_id,
            Annotation::Polygon(p) => p.class_id = class_id,
        }
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            Annotation::Circle(c) => c.created_at,
            Annotation::Polygon(p) => p.created_at,
        }
    }

    /// Short kind name, as used in the wire format.
    pub fn kind(&self) -> &'static str {
        match self {
            Annotation::Circle(_) => "circle",
            Annotation::Polygon(_) => "polygon",
        }
    }

    /// Label anchor: circle center or polygon vertex mean.
    pub fn anchor(&self) -> Point {
        match self {
            Annotation::Circle(c) => c.center,
            Annotation::Polygon(p) => p.centroid(),
        }
    }

    /// Bounding box in image space.
    pub fn bounds(&self) -> Rect {
        match self {
            Annotation::Circle(c) => Rect::from_center_size(c.center, (c.radius * 2.0, c.radius * 2.0)),
            Annotation::Polygon(p) => {
                let mut iter = p.vertices.iter();
                let Some(first) = iter.next() else {
                    return Rect::ZERO;
                };
                iter.fold(Rect::from_points(*first, *first), |r, v| r.union_pt(*v))
            }
        }
    }

    /// Outline approximated as a polygon (circles are tessellated).
    pub fn outline(&self, circle_segments: usize) -> Vec<Point> {
        match self {
            Annotation::Circle(c) => geometry::circle_to_polygon(c.center, c.radius, circle_segments),
            Annotation::Polygon(p) => p.vertices.clone(),
        }
    }

    /// Move by `delta`, clamping each coordinate into the image independently.
    pub fn translate_clamped(&mut self, delta: Vec2, image: Size) {
        match self {
            Annotation::Circle(c) => c.center = clamp_to_bounds(c.center + delta, image),
            Annotation::Polygon(p) => {
                for v in p.vertices.iter_mut().chain(p.holes.iter_mut().flatten()) {
                    *v = clamp_to_bounds(*v + delta, image);
                }
            }
        }
    }

    /// Clamp every coordinate into the image.
    pub fn clamp_to(&mut self, image: Size) {
        self.translate_clamped(Vec2::ZERO, image);
    }

    /// Whether this annotation is well formed (positive radius, closed polygon).
    pub fn is_valid(&self) -> bool {
        match self {
            Annotation::Circle(c) => c.radius > 0.0 && c.radius.is_finite(),
            Annotation::Polygon(p) => p.is_closed(),
        }
    }
}
