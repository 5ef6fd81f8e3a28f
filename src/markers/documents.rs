use std::collections::HashMap;

use log::{info, warn};

use crate::geometry::normalize::{normalize_to_sphere, SurfacePosition, DOC_MARKER_RADIUS};
use crate::scene::scene::{
    LineSpec, LineStyle, MarkerHandle, MarkerSpec, MarkerStyle, Scene, SceneError,
};
use crate::DocumentPoint;

#[derive(Clone, Debug, PartialEq)]
pub struct DocumentMarker {
    pub marker: MarkerHandle,
    pub line: MarkerHandle,
    pub position: SurfacePosition,
    pub doc: String,
}

/// Markers for the document points, built once and never updated.
#[derive(Debug, Default)]
pub struct DocumentMarkerSet {
    markers: Vec<DocumentMarker>,
    by_handle: HashMap<MarkerHandle, usize>,
}

impl DocumentMarkerSet {
    /// Creates one marker and one radial line per point, in input order.
    ///
    /// If the scene rejects an object part way through, everything created
    /// so far is disposed again before the error is returned.
    pub fn build<S: Scene + ?Sized>(
        scene: &mut S,
        points: &[DocumentPoint],
    ) -> Result<Self, SceneError> {
        if points.is_empty() {
            warn!("document point set is empty; no markers rendered");
            return Ok(Self::default());
        }

        let mut set = DocumentMarkerSet {
            markers: Vec::with_capacity(points.len()),
            by_handle: HashMap::with_capacity(points.len()),
        };
        for (idx, p) in points.iter().enumerate() {
            match Self::place(scene, idx, p) {
                Ok(m) => {
                    set.by_handle.insert(m.marker, set.markers.len());
                    set.markers.push(m);
                }
                Err(err) => {
                    set.release(scene);
                    return Err(err);
                }
            }
        }

        info!("placed {} document markers", set.markers.len());
        Ok(set)
    }

    fn place<S: Scene + ?Sized>(
        scene: &mut S,
        idx: usize,
        p: &DocumentPoint,
    ) -> Result<DocumentMarker, SceneError> {
        let position = normalize_to_sphere(p.point(), DOC_MARKER_RADIUS);
        let marker = scene.create_marker(MarkerSpec {
            name: format!("m{idx}"),
            position,
            style: MarkerStyle::DOCUMENT,
            doc: Some(p.doc.clone()),
        })?;
        let line = match scene.create_line(LineSpec::radial(
            format!("line{idx}"),
            &position,
            LineStyle::DOCUMENT,
        )) {
            Ok(line) => line,
            Err(err) => {
                let _ = scene.dispose(marker);
                return Err(err);
            }
        };
        Ok(DocumentMarker {
            marker,
            line,
            position,
            doc: p.doc.clone(),
        })
    }

    fn release<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for m in self.markers.drain(..) {
            let _ = scene.dispose(m.marker);
            let _ = scene.dispose(m.line);
        }
        self.by_handle.clear();
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentMarker> {
        self.markers.iter()
    }

    /// Document identifier associated with a picked marker.
    pub fn doc_for(&self, handle: MarkerHandle) -> Option<&str> {
        self.by_handle
            .get(&handle)
            .map(|&idx| self.markers[idx].doc.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::memory::MemoryScene;
    use crate::Point3D;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn places_points_on_document_radius() {
        let mut scene = MemoryScene::new();
        let points = vec![
            DocumentPoint::new("a", 1.0, 0.0, 0.0),
            DocumentPoint::new("b", 0.0, 1.0, 0.0),
        ];
        let set = DocumentMarkerSet::build(&mut scene, &points).unwrap();

        let positions: Vec<Point3D> = set.iter().map(|m| m.position.position).collect();
        assert_eq!(positions[0], Point3D::new(1.02, 0.0, 0.0));
        assert_eq!(positions[1], Point3D::new(0.0, 1.02, 0.0));
        assert_eq!(scene.markers().count(), 2);
        assert_eq!(scene.lines().count(), 2);
    }

    #[test]
    fn empty_input_renders_nothing() {
        let mut scene = MemoryScene::new();
        let set = DocumentMarkerSet::build(&mut scene, &[]).unwrap();
        assert!(set.is_empty());
        assert!(scene.is_empty());
    }

    #[test]
    fn lookup_by_marker_handle() {
        let mut scene = MemoryScene::new();
        let points = vec![
            DocumentPoint::new("doc-17", 3.0, 4.0, 0.0),
            DocumentPoint::new("doc-4", 0.0, 0.0, -2.0),
        ];
        let set = DocumentMarkerSet::build(&mut scene, &points).unwrap();
        let second = set.iter().nth(1).unwrap();

        assert_eq!(set.doc_for(second.marker), Some("doc-4"));
        assert_eq!(set.doc_for(second.line), None);
        assert_approx_eq!(second.position.position.z, -1.02, 1e-12);
    }

    #[test]
    fn failed_build_leaves_scene_clean() {
        let mut scene = MemoryScene::new();
        scene.fail_on("line2");
        let points: Vec<DocumentPoint> = (0..4)
            .map(|i| DocumentPoint::new(format!("d{i}"), i as f64 + 1.0, 0.0, 0.0))
            .collect();

        assert!(DocumentMarkerSet::build(&mut scene, &points).is_err());
        assert!(scene.is_empty());
    }
}
