use serde::{Deserialize, Serialize};

/// Summary of a sketch as listed by a backend, before export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SketchInfo {
    pub name: String,
    pub label: String,
    pub geometry_count: usize,
    pub constraint_count: usize,
}

impl SketchInfo {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            geometry_count: 0,
            constraint_count: 0,
        }
    }

    pub fn with_counts(mut self, geometry: usize, constraints: usize) -> Self {
        self.geometry_count = geometry;
        self.constraint_count = constraints;
        self
    }
}

/// A plane a backend can create a sketch on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}
