use crate::coordinates::{Coordinates, InvalidSampleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) type PoiId = i64;

/// One position report as delivered by the device.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawSample {
    pub longitude: f64,
    pub latitude: f64,
    // carried for diagnostics, the tracker never reads it
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct Candidate {
    pub id: PoiId,
    pub exact: Coordinates,
    pub search: Coordinates,
    pub is_completed: bool,
    pub tags: Vec<String>,
}

/// Candidate as it comes over the wire from the POI API.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CandidateRecord {
    pub poi_id: PoiId,
    pub exact_latitude: f64,
    pub exact_longitude: f64,
    pub search_latitude: f64,
    pub search_longitude: f64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl TryFrom<CandidateRecord> for Candidate {
    type Error = InvalidSampleError;

    fn try_from(r: CandidateRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.poi_id,
            exact: Coordinates::new(r.exact_longitude, r.exact_latitude)?,
            search: Coordinates::new(r.search_longitude, r.search_latitude)?,
            is_completed: r.is_completed,
            tags: r.tags,
        })
    }
}

/// Who is asking. Passed explicitly into every store refresh.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Session {
    user_id: Option<String>,
}

impl Session {
    pub(crate) fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub(crate) fn authenticated(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }

    pub(crate) fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}
