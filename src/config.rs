use std::time::Duration;

use crate::buffer::{INITIAL_CAPACITY, MAX_CAPACITY};

pub const LOCATION_URL: &str = "https://ipinfo.io/json";
pub const WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Where the two lookups are sent.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Geolocation endpoint returning `{"loc": "<lat>,<lon>"}`.
    pub location: String,
    /// Forecast endpoint; the query string is appended to it.
    pub weather: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            location: LOCATION_URL.to_string(),
            weather: WEATHER_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Points both lookups at one host, keeping the provider paths.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            location: format!("{base}/json"),
            weather: format!("{base}/v1/forecast"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
    /// Bytes allocated before the first chunk arrives.
    pub initial_capacity: usize,
    /// The response buffer never grows past this many bytes.
    pub max_capacity: usize,
    /// Show a progress bar on stderr while the body downloads.
    pub progress: bool,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            initial_capacity: INITIAL_CAPACITY,
            max_capacity: MAX_CAPACITY,
            progress: false,
            user_agent: format!("weather-here/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
