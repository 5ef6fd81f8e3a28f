//! Boundary between marker bookkeeping and whatever engine draws the globe.
//!
//! The host renderer implements [`Scene`]; the crate only ever creates and
//! disposes markers and radial lines through it.

use thiserror::Error;

use crate::geometry::normalize::SurfacePosition;
use crate::Point3D;

/// Opaque handle to an object living in a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("failed to create {kind} '{name}': {reason}")]
    Create {
        kind: &'static str,
        name: String,
        reason: String,
    },
    #[error("unknown scene object {0:?}")]
    UnknownHandle(MarkerHandle),
}

/// Linear RGB color with components in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Color { r, g, b }
    }

    /// Converts a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        Color {
            r: ((hex >> 16) & 255) as f32 / 255.0,
            g: ((hex >> 8) & 255) as f32 / 255.0,
            b: (hex & 255) as f32 / 255.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkerStyle {
    pub color_hex: u32,
    /// Sphere radius of the marker itself.
    pub size: f32,
}

impl MarkerStyle {
    pub const DOCUMENT: MarkerStyle = MarkerStyle {
        color_hex: 0x006400,
        size: 0.03,
    };
    pub const QUERY: MarkerStyle = MarkerStyle {
        color_hex: 0xff0000,
        size: 0.05,
    };

    pub fn color(&self) -> Color {
        Color::from_hex(self.color_hex)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub thickness: f32,
}

impl LineStyle {
    pub const DOCUMENT: LineStyle = LineStyle {
        color: Color::new(0.9, 0.3, 0.3),
        thickness: 2.0,
    };
    pub const QUERY: LineStyle = LineStyle {
        color: Color::new(1.0, 0.0, 0.0),
        thickness: 3.0,
    };
}

/// Globe and camera parameters for the host renderer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobeStyle {
    pub radius: f32,
    pub color: Color,
    pub alpha: f32,
    /// Rotation about the vertical axis per rendered frame, in radians.
    pub spin_per_frame: f32,
    pub camera_min_radius: f32,
    pub camera_max_radius: f32,
}

impl GlobeStyle {
    pub const DEFAULT: GlobeStyle = GlobeStyle {
        radius: 1.0,
        color: Color::new(0.12, 0.15, 0.22),
        alpha: 0.7,
        spin_per_frame: 0.0008,
        camera_min_radius: 1.5,
        camera_max_radius: 12.0,
    };
}

/// Scale applied to a hovered marker.
pub const HOVER_SCALE: f32 = 1.6;

/// Object creation request for a marker sphere.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerSpec {
    pub name: String,
    pub position: SurfacePosition,
    pub style: MarkerStyle,
    /// Document association used by picking; `None` makes the marker unpickable.
    pub doc: Option<String>,
}

/// Object creation request for a line from the origin to a marker.
#[derive(Clone, Debug, PartialEq)]
pub struct LineSpec {
    pub name: String,
    pub from: Point3D,
    pub to: Point3D,
    pub style: LineStyle,
}

impl LineSpec {
    pub fn radial(name: impl Into<String>, to: &SurfacePosition, style: LineStyle) -> Self {
        LineSpec {
            name: name.into(),
            from: Point3D::ORIGIN,
            to: to.position,
            style,
        }
    }
}

pub trait Scene {
    fn create_marker(&mut self, spec: MarkerSpec) -> Result<MarkerHandle, SceneError>;

    fn create_line(&mut self, spec: LineSpec) -> Result<MarkerHandle, SceneError>;

    /// Releases a marker or line. Disposing an unknown handle is an error.
    fn dispose(&mut self, handle: MarkerHandle) -> Result<(), SceneError>;

    fn set_scale(&mut self, handle: MarkerHandle, scale: f32) -> Result<(), SceneError>;
}
