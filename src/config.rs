use crate::coordinates::Coordinates;
use crate::error::ConfigError;
use serde::Serialize;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_LONGITUDE: f64 = 139.72953967417234;
const DEFAULT_LATITUDE: f64 = 35.66060121205606;
const DEFAULT_ZOOM: f64 = 14.0;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Initial map camera handed to clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct Viewport {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub api_base_url: String,
    pub bind_addr: String,
    pub viewport: Viewport,
    pub fetch_timeout: Duration,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let api_base_url = lookup("POI_API_BASE_URL").ok_or(ConfigError::Missing("POI_API_BASE_URL"))?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let longitude = parse_or(&lookup, "DEFAULT_LONGITUDE", DEFAULT_LONGITUDE)?;
        let latitude = parse_or(&lookup, "DEFAULT_LATITUDE", DEFAULT_LATITUDE)?;
        let zoom = parse_or(&lookup, "DEFAULT_ZOOM", DEFAULT_ZOOM)?;
        let timeout_secs = parse_or(&lookup, "FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;

        let center = Coordinates::new(longitude, latitude).map_err(|e| ConfigError::Invalid {
            name: "DEFAULT_LONGITUDE/DEFAULT_LATITUDE",
            value: e.to_string(),
        })?;
        Ok(Self {
            api_base_url,
            bind_addr,
            viewport: Viewport {
                longitude: center.longitude(),
                latitude: center.latitude(),
                zoom,
            },
            fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&'static str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { name, value }),
    }
}
