use crate::models::{Candidate, PoiId};
use crate::tracker::Snapshot;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

/// What the map and its controls render.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct Presentation {
    pub candidates: Arc<[Candidate]>,
    pub selected_popup: Option<PoiId>,
    pub target: Option<Candidate>,
    pub distance_to_target: Option<f64>,
}

/// Read side of the tracker plus the popup selection made by the user.
#[derive(Clone)]
pub(crate) struct Surface {
    snapshots: watch::Receiver<Snapshot>,
    selected_popup: Arc<Mutex<Option<PoiId>>>,
}

impl Surface {
    pub(crate) fn new(snapshots: watch::Receiver<Snapshot>) -> Self {
        Self {
            snapshots,
            selected_popup: Arc::new(Mutex::new(None)),
        }
    }

    pub(crate) fn select_popup(&self, id: Option<PoiId>) {
        *self.selected_popup.lock() = id;
    }

    pub(crate) fn present(&self) -> Presentation {
        let snapshot = self.snapshots.borrow().clone();
        Presentation {
            candidates: snapshot.candidates,
            selected_popup: *self.selected_popup.lock(),
            target: snapshot.state.target,
            distance_to_target: snapshot.state.distance_to_target,
        }
    }
}
