use crate::coordinates::{distance_meters, to_coordinates, Coordinates, InvalidSampleError};
use crate::core::{Sampler, Subscription};
use crate::models::{Candidate, PoiId, RawSample};
use log::{debug, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

const NOTICE_CAPACITY: usize = 64;

/// Position, target and the distance between them.
///
/// `distance_to_target` is present exactly when both other fields are, and is
/// always computed from that same pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub(crate) struct TrackingState {
    pub user_position: Option<Coordinates>,
    pub target: Option<Candidate>,
    pub distance_to_target: Option<f64>,
}

#[derive(Debug, Clone)]
pub(crate) enum TrackerEvent {
    PositionSample(RawSample),
    CandidateSetRefreshed(Arc<[Candidate]>),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TrackerNotice {
    SampleRejected(InvalidSampleError),
    TargetChanged { from: Option<PoiId>, to: Option<PoiId> },
}

/// Both tracker inputs together with the state derived from them.
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    pub candidates: Arc<[Candidate]>,
    pub state: TrackingState,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::derive(None, Arc::from(Vec::<Candidate>::new()))
    }
}

impl Snapshot {
    fn derive(position: Option<Coordinates>, candidates: Arc<[Candidate]>) -> Self {
        let nearest = position.and_then(|p| nearest_incomplete(p, &candidates));
        let state = TrackingState {
            user_position: position,
            target: nearest.map(|(c, _)| c.clone()),
            distance_to_target: nearest.map(|(_, d)| d),
        };
        Self { candidates, state }
    }

    /// The transition function. A rejected sample leaves `self` untouched.
    pub(crate) fn next(&self, event: TrackerEvent) -> Result<Self, InvalidSampleError> {
        match event {
            TrackerEvent::PositionSample(sample) => {
                let position = to_coordinates(&sample)?;
                Ok(Self::derive(Some(position), self.candidates.clone()))
            }
            TrackerEvent::CandidateSetRefreshed(candidates) => Ok(Self::derive(self.state.user_position, candidates)),
        }
    }

    fn target_id(&self) -> Option<PoiId> {
        self.state.target.as_ref().map(|c| c.id)
    }
}

/// Closest candidate not yet completed, by exact coordinates. Ties go to the
/// earliest candidate in `candidates`.
pub(crate) fn nearest_incomplete(position: Coordinates, candidates: &[Candidate]) -> Option<(&Candidate, f64)> {
    let mut best: Option<(&Candidate, f64)> = None;
    for candidate in candidates.iter().filter(|c| !c.is_completed) {
        let distance = distance_meters(position, candidate.exact);
        if best.map_or(true, |(_, min)| distance < min) {
            best = Some((candidate, distance));
        }
    }
    best
}

/// A running tracker. Dropping it stops the task and releases the sampler
/// subscription.
pub(crate) struct TrackerHandle {
    snapshots: watch::Receiver<Snapshot>,
    notices: broadcast::Sender<TrackerNotice>,
    subscription: Subscription,
    stop: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TrackerHandle {
    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Snapshot {
        self.snapshots.borrow().clone()
    }

    pub(crate) fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.clone()
    }

    pub(crate) fn notices(&self) -> broadcast::Receiver<TrackerNotice> {
        self.notices.subscribe()
    }

    pub(crate) async fn shutdown(mut self) {
        self.subscription.unsubscribe();
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

/// Starts tracking. Takes exactly one subscription on `sampler` and follows
/// the candidate set published on `candidates`.
pub(crate) fn spawn<S>(sampler: &S, mut candidates: watch::Receiver<Arc<[Candidate]>>) -> TrackerHandle
where
    S: Sampler,
{
    let (sample_tx, samples) = mpsc::unbounded_channel();
    let subscription = sampler.subscribe(Box::new(move |sample: RawSample| {
        let _ = sample_tx.send(sample);
    }));
    let initial = Snapshot::derive(None, candidates.borrow_and_update().clone());
    let (snapshot_tx, snapshots) = watch::channel(initial);
    let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
    let (stop, stopped) = oneshot::channel();
    let task = tokio::spawn(run(samples, candidates, snapshot_tx, notices.clone(), stopped));
    TrackerHandle {
        snapshots,
        notices,
        subscription,
        stop: Some(stop),
        task: Some(task),
    }
}

async fn run(
    mut samples: mpsc::UnboundedReceiver<RawSample>,
    mut candidates: watch::Receiver<Arc<[Candidate]>>,
    snapshots: watch::Sender<Snapshot>,
    notices: broadcast::Sender<TrackerNotice>,
    mut stopped: oneshot::Receiver<()>,
) {
    loop {
        let event = tokio::select! {
            _ = &mut stopped => break,
            Some(sample) = samples.recv() => TrackerEvent::PositionSample(sample),
            Ok(()) = candidates.changed() => {
                TrackerEvent::CandidateSetRefreshed(candidates.borrow_and_update().clone())
            }
            else => break,
        };
        let current = snapshots.borrow().clone();
        match current.next(event) {
            Ok(next) => {
                let (from, to) = (current.target_id(), next.target_id());
                if from != to {
                    debug!("target changed from {:?} to {:?}", from, to);
                    let _ = notices.send(TrackerNotice::TargetChanged { from, to });
                }
                debug!("distance to target: {:?}", next.state.distance_to_target);
                snapshots.send_replace(next);
            }
            Err(e) => {
                warn!("dropping position sample: {}", e);
                let _ = notices.send(TrackerNotice::SampleRejected(e));
            }
        }
    }
}
