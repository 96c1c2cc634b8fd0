use crate::error::FetchError;
use crate::models::{CandidateRecord, RawSample, Session};
use crate::store::CandidateStore;
use std::future::Future;
use std::pin::Pin;

pub(crate) type Fetch<'a, T> = Pin<Box<dyn Future<Output = Result<T, FetchError>> + Send + 'a>>;

/// Continuous source of device positions.
///
/// Subscribers receive every sample published after they subscribed, in
/// publication order, until the returned [`Subscription`] is cancelled. A
/// source without permission or without a fix simply never calls back.
pub(crate) trait Sampler {
    fn subscribe(&self, on_sample: Box<dyn FnMut(RawSample) + Send>) -> Subscription;
}

/// Remote supplier of candidates and tags.
pub(crate) trait CandidateSource {
    fn candidates_for_user<'a>(&'a self, user_id: &'a str) -> Fetch<'a, Vec<CandidateRecord>>;
    fn all_candidates<'a>(&'a self) -> Fetch<'a, Vec<CandidateRecord>>;
    fn tags<'a>(&'a self) -> Fetch<'a, Vec<String>>;
}

/// Handle to a live sampler subscription. Cancelled on drop.
pub(crate) struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Stops delivery. Calling it again is a no-op.
    pub(crate) fn unsubscribe(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[derive(Debug)]
pub(crate) struct RefreshOutcome {
    pub candidates: Result<usize, FetchError>,
    pub tags: Result<usize, FetchError>,
}

/// Refreshes candidates and tags concurrently. Each half fails independently
/// and leaves its part of the store empty on failure.
pub(crate) async fn refresh<S>(store: &CandidateStore<S>, session: &Session) -> RefreshOutcome
where
    S: CandidateSource,
{
    let (candidates, tags) = futures::join!(store.refresh_candidates(session), store.refresh_tags());
    RefreshOutcome { candidates, tags }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        sub.unsubscribe();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        sub.unsubscribe();
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let sub = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
