use crate::Point3D;

/// Radius of the globe mesh the markers sit on.
pub const GLOBE_RADIUS: f64 = 1.0;

/// Document markers float just outside the globe surface.
pub const DOC_MARKER_RADIUS: f64 = 1.02;

/// Query marker sits further out than document markers so the two classes
/// never share a depth.
pub const QUERY_MARKER_RADIUS: f64 = 1.05;

/// Direction used for the all-zero input.
pub const ZERO_VECTOR_DIRECTION: Point3D = Point3D { x: 1.0, y: 0.0, z: 0.0 };

/// A point at a fixed distance from the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePosition {
    pub position: Point3D,
    pub radius: f64,
}

impl SurfacePosition {
    /// Unit direction from the origin towards this position.
    pub fn direction(&self) -> Point3D {
        self.position.scale(1.0 / self.radius)
    }

    pub fn as_array(&self) -> [f64; 3] {
        [self.position.x, self.position.y, self.position.z]
    }
}

/// Unit direction of `p`, or `(1, 0, 0)` for the exact zero vector.
///
/// NaN or infinite components are not checked and propagate into the result.
pub fn direction_of(p: Point3D) -> Point3D {
    let len = p.length();
    if len == 0.0 {
        ZERO_VECTOR_DIRECTION
    } else {
        Point3D::new(p.x / len, p.y / len, p.z / len)
    }
}

/// Projects `p` onto the sphere of the given radius.
pub fn normalize_to_sphere(p: Point3D, radius: f64) -> SurfacePosition {
    SurfacePosition {
        position: direction_of(p).scale(radius),
        radius,
    }
}
