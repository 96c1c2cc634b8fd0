use crate::models::RawSample;
use serde::Serialize;
use thiserror::Error;

/// Mean earth radius used by the spherical approximation, in meters.
pub(crate) const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum InvalidSampleError {
    #[error("{field} is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// A validated point on the earth's surface, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct Coordinates {
    longitude: f64,
    latitude: f64,
}

impl Coordinates {
    pub(crate) fn new(longitude: f64, latitude: f64) -> Result<Self, InvalidSampleError> {
        check("longitude", longitude, 180.0)?;
        check("latitude", latitude, 90.0)?;
        Ok(Self { longitude, latitude })
    }

    pub(crate) fn longitude(&self) -> f64 {
        self.longitude
    }

    pub(crate) fn latitude(&self) -> f64 {
        self.latitude
    }
}

fn check(field: &'static str, value: f64, bound: f64) -> Result<(), InvalidSampleError> {
    if !value.is_finite() {
        return Err(InvalidSampleError::NonFinite { field, value });
    }
    if value < -bound || value > bound {
        return Err(InvalidSampleError::OutOfRange { field, value });
    }
    Ok(())
}

pub(crate) fn to_coordinates(sample: &RawSample) -> Result<Coordinates, InvalidSampleError> {
    Coordinates::new(sample.longitude, sample.latitude)
}

/// Great-circle distance in meters (haversine).
pub(crate) fn distance_meters(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * h.clamp(0.0, 1.0).sqrt().asin()
}

#[cfg(test)]
mod test {
    use super::*;

    fn pt(longitude: f64, latitude: f64) -> Coordinates {
        Coordinates::new(longitude, latitude).unwrap()
    }

    fn sample(longitude: f64, latitude: f64) -> RawSample {
        RawSample {
            longitude,
            latitude,
            timestamp: None,
            accuracy: None,
        }
    }

    #[test]
    fn test_to_coordinates() {
        let c = to_coordinates(&sample(139.7295, 35.6606)).unwrap();
        assert_eq!(c.longitude(), 139.7295);
        assert_eq!(c.latitude(), 35.6606);
    }

    #[test]
    fn test_to_coordinates_rejects_non_finite() {
        assert!(matches!(
            to_coordinates(&sample(10.0, f64::NAN)),
            Err(InvalidSampleError::NonFinite { field: "latitude", .. })
        ));
        assert!(matches!(
            to_coordinates(&sample(f64::INFINITY, 0.0)),
            Err(InvalidSampleError::NonFinite { field: "longitude", .. })
        ));
    }

    #[test]
    fn test_to_coordinates_rejects_out_of_range() {
        assert!(matches!(
            to_coordinates(&sample(180.5, 0.0)),
            Err(InvalidSampleError::OutOfRange { field: "longitude", .. })
        ));
        assert!(matches!(
            to_coordinates(&sample(0.0, -90.01)),
            Err(InvalidSampleError::OutOfRange { field: "latitude", .. })
        ));
        assert!(to_coordinates(&sample(-180.0, 90.0)).is_ok());
    }

    #[test]
    fn test_distance_same_point() {
        let p = pt(16.3738, 48.2082);
        assert_eq!(distance_meters(p, p), 0.0);
        assert_eq!(distance_meters(pt(0.0, 0.0), pt(0.0, 0.0)), 0.0);
    }

    #[test]
    fn test_distance_symmetric() {
        let pairs = [
            (pt(0.0, 0.0), pt(0.0, 1.0)),
            (pt(139.7295, 35.6606), pt(-0.1276, 51.5072)),
            (pt(-179.9, -89.0), pt(179.9, 89.0)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_meters(a, b), distance_meters(b, a));
        }
    }

    #[test]
    fn test_distance_known() {
        // Vienna to Bratislava, roughly 55 km
        let d = distance_meters(pt(16.3738, 48.2082), pt(17.1077, 48.1486));
        assert!(d > 50_000.0 && d < 60_000.0, "got {}", d);
        // one degree of latitude, roughly 111.2 km
        let d = distance_meters(pt(0.0, 0.0), pt(0.0, 1.0));
        assert!((d - 111_194.9).abs() < 1.0, "got {}", d);
    }

    #[test]
    fn test_distance_along_great_circle() {
        // the equator is a great circle
        let a = pt(0.0, 0.0);
        let b = pt(10.0, 0.0);
        let c = pt(25.0, 0.0);
        let ac = distance_meters(a, c);
        assert!(ac >= distance_meters(a, b));
        assert!(ac >= distance_meters(b, c));
        assert!((ac - distance_meters(a, b) - distance_meters(b, c)).abs() < 1e-3);
    }

    #[test]
    fn test_distance_monotonic() {
        let origin = pt(5.0, 45.0);
        let mut last = 0.0;
        for step in 1..=17 {
            let d = distance_meters(origin, pt(5.0, 45.0 - 5.0 * step as f64));
            assert!(d > last);
            last = d;
        }
    }
}
