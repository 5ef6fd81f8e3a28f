//! The object a host renderer drives: owns the scene, both marker sets and
//! hover state, and applies fetch outcomes to them.

use log::{debug, error, warn};
use thiserror::Error;

use crate::fetch::source::FetchError;
use crate::hover::hover::{apply_hover_scale, HoverChange, HoverTracker};
use crate::markers::documents::DocumentMarkerSet;
use crate::markers::query::{
    QueryMarkerController, StaleResponsePolicy, Transition, QUERY_DOC_LABEL,
};
use crate::refresh::refresh::QueryFetch;
use crate::scene::scene::{MarkerHandle, Scene, SceneError};
use crate::DocumentPoint;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("failed to load document points: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to build document markers: {0}")]
    Scene(#[from] SceneError),
    #[error("document points are already loaded")]
    AlreadyLoaded,
}

pub struct Viewer<S: Scene> {
    scene: S,
    documents: Option<DocumentMarkerSet>,
    query: QueryMarkerController,
    hover: HoverTracker,
}

impl<S: Scene> Viewer<S> {
    pub fn new(scene: S, policy: StaleResponsePolicy) -> Self {
        Viewer {
            scene,
            documents: None,
            query: QueryMarkerController::new(policy),
            hover: HoverTracker::new(),
        }
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Builds the document markers from the one-time document fetch.
    ///
    /// Failures are logged and leave the globe without document markers;
    /// they are also returned so the host can tell the user.
    pub fn load_documents(
        &mut self,
        fetched: Result<Vec<DocumentPoint>, FetchError>,
    ) -> Result<usize, ViewerError> {
        if self.documents.is_some() {
            return Err(ViewerError::AlreadyLoaded);
        }
        let points = fetched.map_err(|err| {
            error!("{err}");
            ViewerError::from(err)
        })?;
        let set = DocumentMarkerSet::build(&mut self.scene, &points).map_err(|err| {
            error!("{err}");
            ViewerError::from(err)
        })?;
        let count = set.len();
        self.documents = Some(set);
        Ok(count)
    }

    pub fn documents(&self) -> Option<&DocumentMarkerSet> {
        self.documents.as_ref()
    }

    pub fn query(&self) -> &QueryMarkerController {
        &self.query
    }

    pub fn query_marker(&self) -> Option<MarkerHandle> {
        self.query.current_marker()
    }

    /// Applies one query fetch outcome. Returns the transition, or `None`
    /// when the fetch failed or the scene rejected the new marker.
    pub fn apply_query(&mut self, fetch: QueryFetch) -> Option<Transition> {
        let point = match fetch.result {
            Ok(point) => point,
            Err(err) => {
                warn!("query fetch #{} failed: {err}", fetch.seq);
                return None;
            }
        };
        let previous = self.query.current_marker();
        match self.query.refresh_tagged(&mut self.scene, fetch.seq, &point) {
            Ok(transition) => {
                if let Transition::Placed(q) | Transition::Replaced { current: q, .. } =
                    &transition
                {
                    debug!("query marker at {:?}", q.position.as_array());
                    if let Some(previous) = previous {
                        self.hover.forget(previous);
                    }
                }
                Some(transition)
            }
            Err(err) => {
                error!("failed to place query marker: {err}");
                if let Some(previous) = previous {
                    self.hover.forget(previous);
                }
                None
            }
        }
    }

    /// Document identifier for a marker, including the query marker.
    pub fn doc_for(&self, handle: MarkerHandle) -> Option<&str> {
        if self.query.current_marker() == Some(handle) {
            return Some(QUERY_DOC_LABEL);
        }
        self.documents.as_ref().and_then(|d| d.doc_for(handle))
    }

    /// Feeds the renderer's pick result for the current pointer position and
    /// updates marker scaling accordingly.
    pub fn pick(&mut self, picked: Option<MarkerHandle>) -> HoverChange {
        let documents = self.documents.as_ref();
        let query = self.query.current_marker();
        let change = self.hover.update(picked, |h| {
            if query == Some(h) {
                Some(QUERY_DOC_LABEL)
            } else {
                documents.and_then(|d| d.doc_for(h))
            }
        });
        apply_hover_scale(&mut self.scene, &change);
        change
    }

    /// Releases the query marker; document markers stay with the scene.
    pub fn shutdown(&mut self) {
        if let Some(old) = self.query.release(&mut self.scene) {
            self.hover.forget(old.marker);
        }
    }
}
