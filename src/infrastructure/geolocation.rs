use crate::domain::Coordinates;
use serde::Deserialize;
use std::time::Duration;

/// One-shot device position lookup. Asked exactly once at startup;
/// failure is surfaced to the user and the lookup is never retried.
pub trait GeolocationProvider {
    fn current_position(&self) -> Result<Coordinates, String>;
}

/// Position lookup via an IP geolocation HTTP endpoint.
pub struct IpGeolocator {
    endpoint: String,
    timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    lat: f64,
    lon: f64,
}

impl IpGeolocator {
    pub fn new() -> Self {
        Self {
            endpoint: "http://ip-api.com/json".to_string(),
            timeout: Duration::from_secs(3),
        }
    }

    pub fn with_endpoint(endpoint: String) -> Self {
        Self {
            endpoint,
            timeout: Duration::from_secs(3),
        }
    }
}

impl Default for IpGeolocator {
    fn default() -> Self {
        Self::new()
    }
}

impl GeolocationProvider for IpGeolocator {
    fn current_position(&self) -> Result<Coordinates, String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| e.to_string())?;

        let response: IpApiResponse = client
            .get(&self.endpoint)
            .send()
            .map_err(|e| e.to_string())?
            .json()
            .map_err(|e| e.to_string())?;

        Ok(Coordinates::new(response.lat, response.lon))
    }
}

/// Fixed-position provider, used in tests and offline runs.
pub struct FixedPosition(pub Coordinates);

impl GeolocationProvider for FixedPosition {
    fn current_position(&self) -> Result<Coordinates, String> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_position_reports_its_coordinates() {
        let provider = FixedPosition(Coordinates::new(51.5, -0.1));
        let coords = provider.current_position().unwrap();
        assert_eq!(coords.lat, 51.5);
        assert_eq!(coords.lon, -0.1);
    }

    #[test]
    fn test_unreachable_endpoint_reports_error() {
        let geolocator = IpGeolocator::with_endpoint("http://127.0.0.1:1/json".to_string());
        assert!(geolocator.current_position().is_err());
    }
}
