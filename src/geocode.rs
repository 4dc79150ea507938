use crate::rate_limiter::RateLimiter;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/search";
const NOMINATIM_MIN_INTERVAL_SECS: u64 = 1;
const GEOCODE_TIMEOUT_SECS: u64 = 10;

// Nominatim returns coordinates as JSON strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Forward geocoding through the public Nominatim API, throttled to its
/// one-request-per-second usage policy.
pub struct Geocoder {
    client: Client,
    limiter: RateLimiter,
}

impl Geocoder {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(GEOCODE_TIMEOUT_SECS))
            .user_agent("sitegrade/0.1 (lead list map rendering)")
            .build()?;

        Ok(Self {
            client,
            limiter: RateLimiter::new(Duration::from_secs(NOMINATIM_MIN_INTERVAL_SECS)),
        })
    }

    /// Best hit for a free-form address, or None when the geocoder has
    /// nothing for it.
    pub async fn lookup(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        self.limiter.wait_if_needed().await;

        let places: Vec<Place> = self
            .client
            .get(NOMINATIM_URL)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|_| GeocodeError::BadCoordinate(place.lat.clone()))?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|_| GeocodeError::BadCoordinate(place.lon.clone()))?;

        Ok(Some(Coordinates { lat, lon }))
    }
}

#[derive(Debug)]
pub enum GeocodeError {
    Request(reqwest::Error),
    BadCoordinate(String),
}

impl From<reqwest::Error> for GeocodeError {
    fn from(err: reqwest::Error) -> Self {
        GeocodeError::Request(err)
    }
}

impl std::fmt::Display for GeocodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeocodeError::Request(e) => write!(f, "geocoding request failed: {}", e),
            GeocodeError::BadCoordinate(raw) => {
                write!(f, "geocoder returned a bad coordinate: {}", raw)
            }
        }
    }
}

impl std::error::Error for GeocodeError {}
