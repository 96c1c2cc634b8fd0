use crate::core::CandidateSource;
use crate::error::FetchError;
use crate::models::{Candidate, CandidateRecord, Session};
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::watch;

/// The currently known candidates and tags.
///
/// Every refresh replaces the whole set. A failed refresh replaces it with an
/// empty set rather than keeping the previous one.
pub(crate) struct CandidateStore<S> {
    source: S,
    candidates: watch::Sender<Arc<[Candidate]>>,
    tags: watch::Sender<Arc<[String]>>,
}

impl<S> CandidateStore<S>
where
    S: CandidateSource,
{
    pub(crate) fn new(source: S) -> Self {
        let (candidates, _) = watch::channel(Arc::from(Vec::<Candidate>::new()));
        let (tags, _) = watch::channel(Arc::from(Vec::<String>::new()));
        Self {
            source,
            candidates,
            tags,
        }
    }

    pub(crate) fn current_candidates(&self) -> Arc<[Candidate]> {
        self.candidates.borrow().clone()
    }

    pub(crate) fn current_tags(&self) -> Arc<[String]> {
        self.tags.borrow().clone()
    }

    #[cfg(test)]
    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    /// Receiver that is notified on every replacement of the candidate set.
    pub(crate) fn watch_candidates(&self) -> watch::Receiver<Arc<[Candidate]>> {
        self.candidates.subscribe()
    }

    pub(crate) async fn refresh_candidates(&self, session: &Session) -> Result<usize, FetchError> {
        let fetched = match session.user_id() {
            Some(uid) => self.source.candidates_for_user(uid).await,
            None => self.source.all_candidates().await.map(|records| {
                records
                    .into_iter()
                    .map(|r| CandidateRecord {
                        is_completed: false,
                        ..r
                    })
                    .collect()
            }),
        };
        match fetched {
            Ok(records) => {
                let candidates = into_candidates(records);
                let count = candidates.len();
                info!("candidate set refreshed with {} entries", count);
                self.candidates.send_replace(Arc::from(candidates));
                Ok(count)
            }
            Err(e) => {
                warn!("candidate fetch failed, clearing candidates: {}", e);
                self.candidates.send_replace(Arc::from(Vec::<Candidate>::new()));
                Err(e)
            }
        }
    }

    pub(crate) async fn refresh_tags(&self) -> Result<usize, FetchError> {
        match self.source.tags().await {
            Ok(tags) => {
                let count = tags.len();
                self.tags.send_replace(Arc::from(tags));
                Ok(count)
            }
            Err(e) => {
                warn!("tag fetch failed, clearing tags: {}", e);
                self.tags.send_replace(Arc::from(Vec::<String>::new()));
                Err(e)
            }
        }
    }
}

fn into_candidates(records: Vec<CandidateRecord>) -> Vec<Candidate> {
    records
        .into_iter()
        .filter_map(|r| {
            let id = r.poi_id;
            Candidate::try_from(r)
                .map_err(|e| warn!("dropping candidate {}: {}", id, e))
                .ok()
        })
        .collect()
}
