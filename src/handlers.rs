use crate::config::Viewport;
use crate::core::{self, CandidateSource};
use crate::error::Error;
use crate::models::{PoiId, RawSample, Session};
use crate::presentation::{Presentation, Surface};
use crate::samplers::FanoutSampler;
use crate::store::CandidateStore;
use actix_header::actix_header;
use actix_web::web::{get, post, put, Data, Header, Json, ServiceConfig};
use actix_web::HttpResponse;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[actix_header("UID")]
pub struct Uid(String);

impl From<String> for Uid {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<Uid> for String {
    fn from(u: Uid) -> Self {
        u.0
    }
}

fn session(uid: Option<Header<Uid>>) -> Session {
    match uid {
        Some(Header(Uid(uid))) if !uid.trim().is_empty() => Session::authenticated(uid),
        _ => Session::anonymous(),
    }
}

pub(crate) fn configure<S>(cfg: &mut ServiceConfig)
where
    S: CandidateSource + 'static,
{
    cfg.route("/samples", post().to(publish_sample))
        .route("/candidates/refresh", post().to(refresh_candidates::<S>))
        .route("/tracking", get().to(tracking))
        .route("/popup", put().to(select_popup))
        .route("/tags", get().to(tags::<S>))
        .route("/viewport", get().to(viewport));
}

pub(crate) async fn publish_sample(Json(sample): Json<RawSample>, sampler: Data<FanoutSampler>) -> HttpResponse {
    let (timestamp, accuracy) = (sample.timestamp, sample.accuracy);
    let queued = sampler.publish(sample);
    debug!("sample at {:?} (accuracy {:?} m) queued for {} subscribers", timestamp, accuracy, queued);
    HttpResponse::Accepted().finish()
}

#[derive(Serialize)]
pub(crate) struct RefreshResponse {
    candidates: usize,
    tags: usize,
}

pub(crate) async fn refresh_candidates<S>(uid: Option<Header<Uid>>, store: Data<CandidateStore<S>>) -> Result<Json<RefreshResponse>, Error>
where
    S: CandidateSource + 'static,
{
    let outcome = core::refresh(store.get_ref(), &session(uid)).await;
    let tags = outcome.tags.unwrap_or_else(|e| {
        warn!("serving empty tag list: {}", e);
        0
    });
    Ok(Json(RefreshResponse {
        candidates: outcome.candidates?,
        tags,
    }))
}

pub(crate) async fn tracking(surface: Data<Surface>) -> Json<Presentation> {
    Json(surface.present())
}

#[derive(Deserialize)]
pub(crate) struct SelectPopup {
    poi_id: Option<PoiId>,
}

pub(crate) async fn select_popup(Json(body): Json<SelectPopup>, surface: Data<Surface>) -> HttpResponse {
    surface.select_popup(body.poi_id);
    HttpResponse::NoContent().finish()
}

pub(crate) async fn tags<S>(store: Data<CandidateStore<S>>) -> Json<Arc<[String]>>
where
    S: CandidateSource + 'static,
{
    Json(store.current_tags())
}

pub(crate) async fn viewport(viewport: Data<Viewport>) -> Json<Viewport> {
    Json(*viewport.get_ref())
}
