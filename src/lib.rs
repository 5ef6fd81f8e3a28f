pub mod config;
pub mod data;
pub mod fetch;
pub mod geometry;
pub mod hover;
pub mod markers;
pub mod refresh;
pub mod scene;
pub mod viewer;

use serde::{Deserialize, Serialize};

/// Embedding coordinate in arbitrary (non-unit) scale.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    pub const ORIGIN: Point3D = Point3D { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Point3D { x, y, z }
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn scale(&self, factor: f64) -> Point3D {
        Point3D::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

/// One document's embedding, as served by the document points resource.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DocumentPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub doc: String,
}

impl DocumentPoint {
    pub fn new(doc: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        DocumentPoint {
            x,
            y,
            z,
            doc: doc.into(),
        }
    }

    pub fn point(&self) -> Point3D {
        Point3D::new(self.x, self.y, self.z)
    }
}

/// Query point payload. Any coordinate may be missing, which means
/// "no query yet"; unknown fields such as `doc` are ignored.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryPoint {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub z: Option<f64>,
}

impl QueryPoint {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        QueryPoint {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    /// The point, if all three coordinates are present.
    pub fn point(&self) -> Option<Point3D> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Some(Point3D::new(x, y, z)),
            _ => None,
        }
    }
}
