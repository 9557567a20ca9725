use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A 2D coordinate in sketch space (millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Winding direction of an arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArcDirection {
    #[default]
    Ccw,
    Cw,
}

/// Sketch geometry variants.
///
/// Every variant exposes its transformable coordinates through
/// [`Primitive::map_points`]; radii and arc directions are invariant under
/// rigid transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Line {
        start: Point2D,
        end: Point2D,
    },
    Circle {
        center: Point2D,
        radius: f64,
    },
    Arc {
        center: Point2D,
        start_point: Point2D,
        end_point: Point2D,
        radius: f64,
        direction: ArcDirection,
    },
    Point {
        position: Point2D,
    },
    Spline {
        control_points: Vec<Point2D>,
        knots: Vec<f64>,
        degree: u32,
    },
}

impl Primitive {
    /// Applies `f` to every transformable coordinate of this primitive.
    pub fn map_points(&mut self, f: impl Fn(Point2D) -> Point2D) {
        match self {
            Primitive::Line { start, end } => {
                *start = f(*start);
                *end = f(*end);
            }
            Primitive::Circle { center, .. } => {
                *center = f(*center);
            }
            Primitive::Arc {
                center,
                start_point,
                end_point,
                ..
            } => {
                *center = f(*center);
                *start_point = f(*start_point);
                *end_point = f(*end_point);
            }
            Primitive::Point { position } => {
                *position = f(*position);
            }
            Primitive::Spline { control_points, .. } => {
                for cp in control_points.iter_mut() {
                    *cp = f(*cp);
                }
            }
        }
    }

    /// Collects the representative points used for centroid computation:
    /// line endpoints, circle center, arc center plus endpoints, point
    /// position, and every spline control point.
    pub fn representative_points(&self, out: &mut Vec<Point2D>) {
        match self {
            Primitive::Line { start, end } => {
                out.push(*start);
                out.push(*end);
            }
            Primitive::Circle { center, .. } => {
                out.push(*center);
            }
            Primitive::Arc {
                center,
                start_point,
                end_point,
                ..
            } => {
                out.push(*center);
                out.push(*start_point);
                out.push(*end_point);
            }
            Primitive::Point { position } => {
                out.push(*position);
            }
            Primitive::Spline { control_points, .. } => {
                out.extend(control_points.iter().copied());
            }
        }
    }
}

/// A geometric constraint between primitives or their points.
///
/// The transfer core only cares whether constraints are present; their
/// semantics belong to the backend's solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub kind: String,
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// A 2D sketch: named, ordered geometry plus the constraints that reference
/// it. Primitive ids are unique; insertion order is preserved for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchDocument {
    pub name: String,
    pub primitives: IndexMap<String, Primitive>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
    /// Solver metadata reported by the source backend, passed through opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver_status: Option<serde_json::Value>,
}

impl SketchDocument {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            primitives: IndexMap::new(),
            constraints: Vec::new(),
            solver_status: None,
        }
    }

    /// Inserts a primitive, replacing any existing one with the same id.
    pub fn insert(&mut self, id: impl Into<String>, primitive: Primitive) {
        self.primitives.insert(id.into(), primitive);
    }

    pub fn geometry_count(&self) -> usize {
        self.primitives.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }
}
