mod config;
mod coordinates;
mod core;
mod error;
mod handlers;
mod models;
mod presentation;
mod samplers;
mod sources;
mod store;
mod tracker;

use crate::config::Config;
use crate::models::Session;
use crate::tracker::TrackerNotice;
use actix_web::{self, web::Data};
use log::{info, warn};
use presentation::Surface;
use samplers::FanoutSampler;
use sources::HttpSource;
use store::CandidateStore;
use tokio::sync::broadcast::error::RecvError;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    env_logger::init();

    let store = Data::new(CandidateStore::new(HttpSource::new(
        &config.api_base_url,
        config.fetch_timeout,
    )?));
    let sampler = FanoutSampler::new();
    let tracker = tracker::spawn(&sampler, store.watch_candidates());
    let surface = Surface::new(tracker.watch());

    let mut notices = tracker.notices();
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(TrackerNotice::TargetChanged { from, to }) => info!("tracking target {:?} (was {:?})", to, from),
                Ok(TrackerNotice::SampleRejected(e)) => warn!("rejected position sample: {}", e),
                Err(RecvError::Lagged(n)) => warn!("missed {} tracker notices", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = core::refresh(store.get_ref(), &Session::anonymous()).await;
    match outcome.candidates {
        Ok(_) => info!("starting with {} candidates", store.current_candidates().len()),
        Err(e) => warn!("starting with no candidates: {}", e),
    }

    let viewport = config.viewport;
    info!("listening on {}", config.bind_addr);
    actix_web::HttpServer::new(move || {
        actix_web::App::new()
            .app_data(Data::new(sampler.clone()))
            .app_data(store.clone())
            .app_data(Data::new(surface.clone()))
            .app_data(Data::new(viewport))
            .configure(handlers::configure::<HttpSource>)
    })
    .bind(&config.bind_addr)?
    .run()
    .await?;

    tracker.shutdown().await;
    Ok(())
}
