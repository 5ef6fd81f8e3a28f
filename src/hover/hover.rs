use crate::scene::scene::{MarkerHandle, Scene, HOVER_SCALE};

/// What the host should do with the tooltip after a pick.
#[derive(Clone, Debug, PartialEq)]
pub enum HoverChange {
    /// A new marker is under the pointer: show `doc` and enlarge `marker`.
    /// `previous` should be restored to normal scale.
    Entered {
        marker: MarkerHandle,
        doc: String,
        previous: Option<MarkerHandle>,
    },
    /// Still over the same marker; only the tooltip position changes.
    Moved { marker: MarkerHandle },
    /// Pointer left `marker`; hide the tooltip.
    Left { marker: MarkerHandle },
    Idle,
}

/// Remembers the last hovered marker between pointer events.
#[derive(Debug, Default)]
pub struct HoverTracker {
    last: Option<MarkerHandle>,
}

impl HoverTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<MarkerHandle> {
        self.last
    }

    /// Feeds one pick result. Picks whose marker has no document association
    /// count as a miss.
    pub fn update<'a, F>(&mut self, pick: Option<MarkerHandle>, lookup: F) -> HoverChange
    where
        F: Fn(MarkerHandle) -> Option<&'a str>,
    {
        let hit = pick.and_then(|h| lookup(h).map(|doc| (h, doc)));
        match (hit, self.last) {
            (Some((marker, _)), Some(last)) if marker == last => HoverChange::Moved { marker },
            (Some((marker, doc)), previous) => {
                self.last = Some(marker);
                HoverChange::Entered {
                    marker,
                    doc: doc.to_string(),
                    previous,
                }
            }
            (None, Some(marker)) => {
                self.last = None;
                HoverChange::Left { marker }
            }
            (None, None) => HoverChange::Idle,
        }
    }

    /// Forgets `handle` if it is the hovered marker, e.g. after it was disposed.
    pub fn forget(&mut self, handle: MarkerHandle) {
        if self.last == Some(handle) {
            self.last = None;
        }
    }
}

/// Applies the marker scaling part of a [`HoverChange`] to the scene.
pub fn apply_hover_scale<S: Scene + ?Sized>(scene: &mut S, change: &HoverChange) {
    match change {
        HoverChange::Entered {
            marker, previous, ..
        } => {
            if let Some(prev) = previous {
                let _ = scene.set_scale(*prev, 1.0);
            }
            let _ = scene.set_scale(*marker, HOVER_SCALE);
        }
        HoverChange::Left { marker } => {
            let _ = scene.set_scale(*marker, 1.0);
        }
        HoverChange::Moved { .. } | HoverChange::Idle => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(h: MarkerHandle) -> Option<&'static str> {
        match h.0 {
            1 => Some("doc-1"),
            2 => Some("doc-2"),
            _ => None,
        }
    }

    #[test]
    fn enter_move_leave() {
        let mut hover = HoverTracker::new();
        assert_eq!(hover.update(None, lookup), HoverChange::Idle);

        let m1 = MarkerHandle(1);
        assert_eq!(
            hover.update(Some(m1), lookup),
            HoverChange::Entered {
                marker: m1,
                doc: "doc-1".into(),
                previous: None
            }
        );
        assert_eq!(hover.update(Some(m1), lookup), HoverChange::Moved { marker: m1 });

        let m2 = MarkerHandle(2);
        assert_eq!(
            hover.update(Some(m2), lookup),
            HoverChange::Entered {
                marker: m2,
                doc: "doc-2".into(),
                previous: Some(m1)
            }
        );
        assert_eq!(hover.update(None, lookup), HoverChange::Left { marker: m2 });
        assert_eq!(hover.hovered(), None);
    }

    #[test]
    fn pick_without_document_is_a_miss() {
        let mut hover = HoverTracker::new();
        hover.update(Some(MarkerHandle(1)), lookup);
        assert_eq!(
            hover.update(Some(MarkerHandle(7)), lookup),
            HoverChange::Left {
                marker: MarkerHandle(1)
            }
        );
    }

    #[test]
    fn forget_clears_hovered_marker() {
        let mut hover = HoverTracker::new();
        hover.update(Some(MarkerHandle(2)), lookup);
        hover.forget(MarkerHandle(1));
        assert_eq!(hover.hovered(), Some(MarkerHandle(2)));
        hover.forget(MarkerHandle(2));
        assert_eq!(hover.hovered(), None);
    }
}
