use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use thiserror::Error;

/// Failure of one candidate or tag fetch attempt.
#[derive(Debug, Error)]
pub(crate) enum FetchError {
    #[error("request to poi api failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("poi api responded with status {0}")]
    Status(u16),
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("missing required variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::Fetch(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}
