use crate::core::{CandidateSource, Fetch};
use crate::error::FetchError;
use crate::models::CandidateRecord;
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

#[derive(Serialize)]
struct StatusRequest<'a> {
    user_id: &'a str,
}

/// Candidate source backed by the POI HTTP API.
#[derive(Clone)]
pub(crate) struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    pub(crate) fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn check(resp: Response) -> Result<Response, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }
    Ok(resp)
}

impl CandidateSource for HttpSource {
    fn candidates_for_user<'a>(&'a self, user_id: &'a str) -> Fetch<'a, Vec<CandidateRecord>> {
        Box::pin(async move {
            let resp = self
                .client
                .post(self.url("/api/poi/status"))
                .json(&StatusRequest { user_id })
                .send()
                .await?;
            Ok(check(resp)?.json().await?)
        })
    }

    fn all_candidates<'a>(&'a self) -> Fetch<'a, Vec<CandidateRecord>> {
        Box::pin(async move {
            let resp = self.client.get(self.url("/api/poi/")).send().await?;
            Ok(check(resp)?.json().await?)
        })
    }

    fn tags<'a>(&'a self) -> Fetch<'a, Vec<String>> {
        Box::pin(async move {
            let resp = self.client.get(self.url("/api/tag")).send().await?;
            Ok(check(resp)?.json().await?)
        })
    }
}
