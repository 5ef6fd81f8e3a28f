use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry::normalize::{normalize_to_sphere, SurfacePosition, QUERY_MARKER_RADIUS};
use crate::scene::scene::{
    LineSpec, LineStyle, MarkerHandle, MarkerSpec, MarkerStyle, Scene, SceneError,
};
use crate::{Point3D, QueryPoint};

/// Document association carried by the query marker.
pub const QUERY_DOC_LABEL: &str = "QUERY";

/// What to do with a query response that was issued before the one
/// currently shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleResponsePolicy {
    /// Apply every response in completion order; the last to resolve wins.
    #[default]
    Apply,
    /// Drop responses tagged older than the applied one.
    Discard,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueryMarker {
    pub marker: MarkerHandle,
    pub line: MarkerHandle,
    pub position: SurfacePosition,
    /// Sequence number of the fetch this marker came from, if tagged.
    pub seq: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum QueryState {
    Absent,
    Present(QueryMarker),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    /// First marker created from `Absent`.
    Placed(QueryMarker),
    /// Previous marker disposed, then the new one created.
    Replaced {
        previous: QueryMarker,
        current: QueryMarker,
    },
    /// Payload was missing coordinates; nothing changed.
    Ignored,
    /// Response predates the applied one and was dropped.
    Stale { seq: u64, applied: u64 },
}

/// Owns the single query marker and its radial line.
#[derive(Debug)]
pub struct QueryMarkerController {
    state: QueryState,
    policy: StaleResponsePolicy,
}

impl Default for QueryMarkerController {
    fn default() -> Self {
        Self::new(StaleResponsePolicy::Apply)
    }
}

impl QueryMarkerController {
    pub fn new(policy: StaleResponsePolicy) -> Self {
        QueryMarkerController {
            state: QueryState::Absent,
            policy,
        }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn current_marker(&self) -> Option<MarkerHandle> {
        match self.state {
            QueryState::Present(q) => Some(q.marker),
            QueryState::Absent => None,
        }
    }

    pub fn current(&self) -> Option<&QueryMarker> {
        match &self.state {
            QueryState::Present(q) => Some(q),
            QueryState::Absent => None,
        }
    }

    /// Applies a freshly fetched query payload.
    pub fn refresh<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        point: &QueryPoint,
    ) -> Result<Transition, SceneError> {
        self.apply(scene, None, point)
    }

    /// Like [`refresh`](Self::refresh) for a payload from fetch number `seq`.
    pub fn refresh_tagged<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        seq: u64,
        point: &QueryPoint,
    ) -> Result<Transition, SceneError> {
        if self.policy == StaleResponsePolicy::Discard {
            if let Some(applied) = self.current().and_then(|q| q.seq) {
                if seq < applied {
                    debug!("discarding query response #{seq}; #{applied} already shown");
                    return Ok(Transition::Stale { seq, applied });
                }
            }
        }
        self.apply(scene, Some(seq), point)
    }

    fn apply<S: Scene + ?Sized>(
        &mut self,
        scene: &mut S,
        seq: Option<u64>,
        point: &QueryPoint,
    ) -> Result<Transition, SceneError> {
        let Some(p) = point.point() else {
            debug!("query payload has no complete point; keeping current marker");
            return Ok(Transition::Ignored);
        };

        let previous = self.release(scene);
        let current = Self::create(scene, p, seq)?;
        self.state = QueryState::Present(current);

        Ok(match previous {
            Some(previous) => {
                debug!(
                    "query marker moved {:?} -> {:?}",
                    previous.position.as_array(),
                    current.position.as_array()
                );
                Transition::Replaced { previous, current }
            }
            None => Transition::Placed(current),
        })
    }

    /// Disposes the current marker and line, leaving the controller `Absent`.
    pub fn release<S: Scene + ?Sized>(&mut self, scene: &mut S) -> Option<QueryMarker> {
        let QueryState::Present(old) = std::mem::replace(&mut self.state, QueryState::Absent)
        else {
            return None;
        };
        if let Err(err) = scene.dispose(old.marker) {
            debug!("query marker already gone: {err}");
        }
        if let Err(err) = scene.dispose(old.line) {
            debug!("query line already gone: {err}");
        }
        Some(old)
    }

    fn create<S: Scene + ?Sized>(
        scene: &mut S,
        p: Point3D,
        seq: Option<u64>,
    ) -> Result<QueryMarker, SceneError> {
        let position = normalize_to_sphere(p, QUERY_MARKER_RADIUS);
        let marker = scene.create_marker(MarkerSpec {
            name: "query".into(),
            position,
            style: MarkerStyle::QUERY,
            doc: Some(QUERY_DOC_LABEL.into()),
        })?;
        let line_spec = LineSpec::radial("queryLine", &position, LineStyle::QUERY);
        let line = match scene.create_line(line_spec) {
            Ok(line) => line,
            Err(err) => {
                let _ = scene.dispose(marker);
                return Err(err);
            }
        };
        Ok(QueryMarker {
            marker,
            line,
            position,
            seq,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::memory::MemoryScene;

    fn query_markers(scene: &MemoryScene) -> usize {
        scene
            .markers()
            .filter(|(_, spec)| spec.doc.as_deref() == Some(QUERY_DOC_LABEL))
            .count()
    }

    #[test]
    fn refresh_sequence_replaces_marker() {
        let mut scene = MemoryScene::new();
        let mut ctl = QueryMarkerController::default();
        assert_eq!(ctl.state(), QueryState::Absent);

        let a = ctl.refresh(&mut scene, &QueryPoint::new(1.0, 0.0, 0.0)).unwrap();
        let Transition::Placed(first) = a else {
            panic!("expected Placed, got {a:?}");
        };
        assert_eq!(first.position.position, Point3D::new(1.05, 0.0, 0.0));
        assert_eq!(query_markers(&scene), 1);

        let b = ctl.refresh(&mut scene, &QueryPoint::default()).unwrap();
        assert_eq!(b, Transition::Ignored);
        assert_eq!(ctl.current(), Some(&first));
        assert_eq!(scene.len(), 2);

        let c = ctl.refresh(&mut scene, &QueryPoint::new(0.0, 0.0, 1.0)).unwrap();
        match c {
            Transition::Replaced { previous, current } => {
                assert_eq!(previous, first);
                assert_eq!(current.position.position, Point3D::new(0.0, 0.0, 1.05));
            }
            other => panic!("expected Replaced, got {other:?}"),
        }
        assert_eq!(query_markers(&scene), 1);
        assert_eq!(scene.len(), 2);
        assert!(scene.get(first.marker).is_none());
        assert!(scene.get(first.line).is_none());
    }

    #[test]
    fn zero_query_sits_on_x_axis() {
        let mut scene = MemoryScene::new();
        let mut ctl = QueryMarkerController::default();
        ctl.refresh(&mut scene, &QueryPoint::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(
            ctl.current().unwrap().position.position,
            Point3D::new(QUERY_MARKER_RADIUS, 0.0, 0.0)
        );
    }

    #[test]
    fn failed_creation_releases_old_marker() {
        let mut scene = MemoryScene::new();
        let mut ctl = QueryMarkerController::default();
        ctl.refresh(&mut scene, &QueryPoint::new(1.0, 1.0, 0.0)).unwrap();

        scene.fail_on("queryLine");
        assert!(ctl.refresh(&mut scene, &QueryPoint::new(0.0, 1.0, 0.0)).is_err());
        assert_eq!(ctl.state(), QueryState::Absent);
        assert!(scene.is_empty());

        scene.clear_failures();
        let t = ctl.refresh(&mut scene, &QueryPoint::new(0.0, 1.0, 0.0)).unwrap();
        assert!(matches!(t, Transition::Placed(_)));
    }

    #[test]
    fn last_resolved_wins_by_default() {
        let mut scene = MemoryScene::new();
        let mut ctl = QueryMarkerController::default();
        ctl.refresh_tagged(&mut scene, 2, &QueryPoint::new(0.0, 1.0, 0.0)).unwrap();
        let t = ctl
            .refresh_tagged(&mut scene, 1, &QueryPoint::new(1.0, 0.0, 0.0))
            .unwrap();
        assert!(matches!(t, Transition::Replaced { .. }));
        assert_eq!(ctl.current().unwrap().seq, Some(1));
    }

    #[test]
    fn discard_policy_drops_older_responses() {
        let mut scene = MemoryScene::new();
        let mut ctl = QueryMarkerController::new(StaleResponsePolicy::Discard);
        ctl.refresh_tagged(&mut scene, 2, &QueryPoint::new(0.0, 1.0, 0.0)).unwrap();
        let t = ctl
            .refresh_tagged(&mut scene, 1, &QueryPoint::new(1.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(t, Transition::Stale { seq: 1, applied: 2 });
        assert_eq!(ctl.current().unwrap().seq, Some(2));

        let t = ctl
            .refresh_tagged(&mut scene, 3, &QueryPoint::new(1.0, 0.0, 0.0))
            .unwrap();
        assert!(matches!(t, Transition::Replaced { .. }));
    }

    #[test]
    fn release_empties_scene() {
        let mut scene = MemoryScene::new();
        let mut ctl = QueryMarkerController::default();
        assert!(ctl.release(&mut scene).is_none());
        ctl.refresh(&mut scene, &QueryPoint::new(0.0, 2.0, 0.0)).unwrap();
        assert!(ctl.release(&mut scene).is_some());
        assert!(scene.is_empty());
        assert_eq!(ctl.current_marker(), None);
    }
}
