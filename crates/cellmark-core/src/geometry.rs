//! Geometry kernel used by hit testing, rendering and export.
//!
//! All functions are coordinate-system agnostic: callers decide whether the
//! points are in image space or screen space.

use kurbo::{Point, Size, Vec2};
use std::f64::consts::TAU;

/// Number of segments used when approximating a circle as a polygon.
pub const DEFAULT_CIRCLE_SEGMENTS: usize = 16;

/// Even-odd (ray casting) point-in-polygon test.
///
/// A horizontal ray is cast from `point` towards +x and the number of edge
/// crossings is counted. Each edge is treated as half-open in y, so a point
/// lying exactly on an edge or vertex has implementation-defined membership:
/// the result is deterministic for a given input, but a point on a left/top
/// edge usually reports inside while one on a right/bottom edge reports
/// outside. Polygons with fewer than three vertices contain nothing.
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (pi, pj) = (vertices[i], vertices[j]);
        if (pi.y > point.y) != (pj.y > point.y) {
            let x_cross = (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Check whether `point` lies inside (or on) a circle.
pub fn point_in_circle(point: Point, center: Point, radius: f64) -> bool {
    (point - center).hypot2() <= radius * radius
}

/// Distance from a point to a line segment (a→b).
///
/// The projection parameter is clamped to the segment; a zero-length segment
/// degenerates to the distance between `point` and `a`.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = a + seg * t;
    point.distance(proj)
}

/// Minimum distance from a point to the closed outline of a polygon.
///
/// Returns `f64::INFINITY` for an empty vertex list.
pub fn polygon_border_dist(point: Point, vertices: &[Point]) -> f64 {
    let n = vertices.len();
    (0..n)
        .map(|i| point_to_segment_dist(point, vertices[i], vertices[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

/// Arithmetic mean of the vertices.
///
/// This is the label anchor, not the area-weighted centroid. An empty slice
/// yields the origin.
pub fn polygon_centroid(vertices: &[Point]) -> Point {
    if vertices.is_empty() {
        return Point::ZERO;
    }
    let sum = vertices
        .iter()
        .fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    (sum / vertices.len() as f64).to_point()
}

/// Approximate a circle by a regular polygon with `segments` vertices,
/// starting at angle zero and going counter-clockwise in a y-up frame.
pub fn circle_to_polygon(center: Point, radius: f64, segments: usize) -> Vec<Point> {
    (0..segments)
        .map(|i| {
            let angle = i as f64 / segments as f64 * TAU;
            Point::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            )
        })
        .collect()
}

/// Check whether a circle overlaps a polygon: either the center is inside
/// the polygon or some edge passes within `radius` of the center.
pub fn circle_intersects_polygon(center: Point, radius: f64, vertices: &[Point]) -> bool {
    if point_in_polygon(center, vertices) {
        return true;
    }
    !vertices.is_empty() && polygon_border_dist(center, vertices) <= radius
}

/// Clamp each coordinate of `point` independently into `[0, size]`.
pub fn clamp_to_bounds(point: Point, size: Size) -> Point {
    Point::new(
        point.x.clamp(0.0, size.width.max(0.0)),
        point.y.clamp(0.0, size.height.max(0.0)),
    )
}

/// Inclusive bounds check against `[0, width] × [0, height]`.
pub fn bounds_contains(point: Point, size: Size) -> bool {
    point.x >= 0.0 && point.x <= size.width && point.y >= 0.0 && point.y <= size.height
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_point_in_square() {
        let sq = square();
        assert!(point_in_polygon(Point::new(5.0, 5.0), &sq));
        assert!(!point_in_polygon(Point::new(15.0, 5.0), &sq));
        assert!(!point_in_polygon(Point::new(5.0, -1.0), &sq));
    }

    #[test]
    fn test_point_on_edge_is_consistent() {
        let sq = square();
        let first = point_in_polygon(Point::new(0.0, 5.0), &sq);
        for _ in 0..10 {
            assert_eq!(point_in_polygon(Point::new(0.0, 5.0), &sq), first);
        }
    }

    #[test]
    fn test_concave_polygon() {
        // U shape opening upwards
        let u = vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(3.0, 8.0),
            Point::new(7.0, 8.0),
            Point::new(7.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(!point_in_polygon(Point::new(5.0, 4.0), &u));
        assert!(point_in_polygon(Point::new(1.5, 4.0), &u));
        assert!(point_in_polygon(Point::new(5.0, 9.0), &u));
    }

    #[test]
    fn test_degenerate_polygon() {
        let line = vec![Point::new(0.0, 0.0), Point::new(10.0, 10.0)];
        assert!(!point_in_polygon(Point::new(5.0, 5.0), &line));
    }

    #[test]
    fn test_point_in_circle() {
        let c = Point::new(10.0, 10.0);
        assert!(point_in_circle(Point::new(10.0, 10.0), c, 5.0));
        assert!(point_in_circle(Point::new(15.0, 10.0), c, 5.0));
        assert!(!point_in_circle(Point::new(15.1, 10.0), c, 5.0));
    }

    #[test]
    fn test_segment_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-12);
        // Beyond the end projects onto the endpoint
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-12);
        assert!((point_to_segment_dist(Point::new(-3.0, 0.0), a, b) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_length_segment() {
        let a = Point::new(2.0, 2.0);
        let d = point_to_segment_dist(Point::new(5.0, 6.0), a, a);
        assert!((d - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_border_dist_includes_closing_edge() {
        let sq = square();
        // Closest to the closing edge (0,10) -> (0,0)
        let d = polygon_border_dist(Point::new(-2.0, 5.0), &sq);
        assert!((d - 2.0).abs() < 1e-12);
        assert_eq!(polygon_border_dist(Point::ZERO, &[]), f64::INFINITY);
    }

    #[test]
    fn test_centroid_is_vertex_mean() {
        let tri = vec![
            Point::new(0.0, 0.0),
            Point::new(6.0, 0.0),
            Point::new(0.0, 3.0),
        ];
        let c = polygon_centroid(&tri);
        assert!((c.x - 2.0).abs() < 1e-12);
        assert!((c.y - 1.0).abs() < 1e-12);
        assert_eq!(polygon_centroid(&[]), Point::ZERO);
    }

    #[test]
    fn test_circle_to_polygon() {
        let pts = circle_to_polygon(Point::new(5.0, 5.0), 2.0, DEFAULT_CIRCLE_SEGMENTS);
        assert_eq!(pts.len(), 16);
        assert!((pts[0].x - 7.0).abs() < 1e-12);
        assert!((pts[0].y - 5.0).abs() < 1e-12);
        for p in &pts {
            assert!((p.distance(Point::new(5.0, 5.0)) - 2.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_circle_intersects_polygon() {
        let sq = square();
        assert!(circle_intersects_polygon(Point::new(5.0, 5.0), 1.0, &sq));
        assert!(circle_intersects_polygon(Point::new(12.0, 5.0), 2.5, &sq));
        assert!(!circle_intersects_polygon(Point::new(20.0, 5.0), 2.5, &sq));
    }

    #[test]
    fn test_clamp_and_contains() {
        let size = Size::new(800.0, 600.0);
        let p = clamp_to_bounds(Point::new(900.0, -5.0), size);
        assert_eq!(p, Point::new(800.0, 0.0));
        assert!(bounds_contains(Point::new(800.0, 600.0), size));
        assert!(!bounds_contains(Point::new(800.1, 10.0), size));
    }
}
