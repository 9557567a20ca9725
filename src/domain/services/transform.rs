//! Rigid transforms over sketch documents.
//!
//! Pure functions: the input document is never mutated, every call returns a
//! fresh copy. Rotation happens about a pivot defined in the untransformed
//! frame, then the translation is applied — reversing that order changes the
//! result whenever both are non-zero.

use crate::domain::models::{
    PivotPolicy, Point2D, Primitive, SketchDocument, TransformRequest,
};

/// Rotates `point` about `pivot` by `angle` degrees counter-clockwise, then
/// translates by `(dx, dy)`.
pub fn transform_point(point: Point2D, dx: f64, dy: f64, angle: f64, pivot: Point2D) -> Point2D {
    let (mut x, mut y) = (point.x, point.y);

    if angle != 0.0 {
        let (sin_a, cos_a) = angle.to_radians().sin_cos();
        let rel_x = x - pivot.x;
        let rel_y = y - pivot.y;
        x = rel_x * cos_a - rel_y * sin_a + pivot.x;
        y = rel_x * sin_a + rel_y * cos_a + pivot.y;
    }

    Point2D::new(x + dx, y + dy)
}

/// Arithmetic mean of the document's representative points (line endpoints,
/// circle centers, arc centers and endpoints, point positions, spline control
/// points). An empty sketch yields the origin.
pub fn sketch_centroid(doc: &SketchDocument) -> Point2D {
    let points = representative_points(doc);
    if points.is_empty() {
        return Point2D::ORIGIN;
    }

    let n = points.len() as f64;
    let sum_x: f64 = points.iter().map(|p| p.x).sum();
    let sum_y: f64 = points.iter().map(|p| p.y).sum();
    Point2D::new(sum_x / n, sum_y / n)
}

/// Axis-aligned bounding box as `(min, max)` corners. Circles contribute
/// `center ± radius`; arcs are approximated by center and endpoints. An empty
/// sketch yields two origin corners.
pub fn sketch_bounds(doc: &SketchDocument) -> (Point2D, Point2D) {
    let mut points = representative_points(doc);
    for primitive in doc.primitives.values() {
        if let Primitive::Circle { center, radius } = primitive {
            points.push(Point2D::new(center.x - radius, center.y - radius));
            points.push(Point2D::new(center.x + radius, center.y + radius));
        }
    }

    if points.is_empty() {
        return (Point2D::ORIGIN, Point2D::ORIGIN);
    }

    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min.x = min.x.min(p.x);
        min.y = min.y.min(p.y);
        max.x = max.x.max(p.x);
        max.y = max.y.max(p.y);
    }
    (min, max)
}

/// Returns a transformed copy of `doc`.
///
/// The pivot for a centroid rotation is computed from the input document, so
/// it lives in the untransformed frame. Radii and arc directions are left
/// untouched; constraints are dropped when the request asks for it.
pub fn transform_sketch(doc: &SketchDocument, request: &TransformRequest) -> SketchDocument {
    let mut out = doc.clone();

    if request.strip_constraints {
        out.constraints.clear();
    }

    let pivot = match request.pivot {
        PivotPolicy::Centroid if request.angle != 0.0 => sketch_centroid(doc),
        _ => Point2D::ORIGIN,
    };

    for primitive in out.primitives.values_mut() {
        primitive.map_points(|p| transform_point(p, request.dx, request.dy, request.angle, pivot));
    }

    out
}

fn representative_points(doc: &SketchDocument) -> Vec<Point2D> {
    let mut points = Vec::new();
    for primitive in doc.primitives.values() {
        primitive.representative_points(&mut points);
    }
    points
}
