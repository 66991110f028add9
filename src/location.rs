use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use crate::client::Fetcher;
use crate::error::{DocumentError, Error};
use crate::json::Fields;

/// Approximate position of the caller. The default (0, 0) stands for unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Optional descriptive fields of the geolocation payload, logged only.
#[derive(Debug, Default, Deserialize)]
struct Place {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reads the `loc` string of a geolocation payload.
    pub fn from_document(document: &Value) -> Result<Self, DocumentError> {
        Fields::root(document)?.string("loc")?.parse()
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Location:")?;
        writeln!(out, "\tLatitude: {}", self.latitude)?;
        writeln!(out, "\tLongitude: {}", self.longitude)?;
        writeln!(out)
    }
}

impl FromStr for Location {
    type Err = DocumentError;

    /// Parses `"<latitude>,<longitude>"`, independent of the process locale.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DocumentError::LocationFormat {
            value: s.to_string(),
        };
        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }
        Ok(Self::new(latitude, longitude))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Asks the geolocation service at `url` where the caller is.
pub fn get_location(fetcher: &Fetcher, url: &str) -> Result<Location, Error> {
    let document = fetcher.fetch_document(url)?;
    let location = Location::from_document(&document)?;

    if log::log_enabled!(log::Level::Info) {
        let place = Place::deserialize(&document).unwrap_or_default();
        log::info!(
            "located at {} ({}, {}, {})",
            location,
            place.city.as_deref().unwrap_or("?"),
            place.region.as_deref().unwrap_or("?"),
            place.country.as_deref().unwrap_or("?"),
        );
    }
    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Expected;
    use serde_json::json;

    #[test]
    fn parses_loc_field() {
        let doc = json!({ "ip": "203.0.113.7", "loc": "37.4,-122.1" });
        let location = Location::from_document(&doc).unwrap();
        assert!((location.latitude - 37.4).abs() < 1e-12);
        assert!((location.longitude - -122.1).abs() < 1e-12);
    }

    #[test]
    fn tolerates_spaces_around_numbers() {
        let location: Location = " 51.5074 , -0.1278 ".parse().unwrap();
        assert_eq!(location, Location::new(51.5074, -0.1278));
    }

    #[test]
    fn malformed_loc_is_a_format_error() {
        for value in ["not-a-location", "37.4", "37.4;-122.1", ",", "1,x", "inf,0", "NaN,1"] {
            let err = value.parse::<Location>().unwrap_err();
            assert_eq!(
                err,
                DocumentError::LocationFormat {
                    value: value.to_string()
                },
                "{value}"
            );
        }

        let doc = json!({ "loc": "not-a-location" });
        let location = Location::from_document(&doc).unwrap_or_default();
        assert_eq!(location, Location::default());
        assert_eq!(location.latitude, 0.0);
        assert_eq!(location.longitude, 0.0);
    }

    #[test]
    fn missing_or_mistyped_loc_is_a_field_error() {
        let expected = DocumentError::Field {
            container: "root".into(),
            key: "loc".into(),
            expected: Expected::String,
        };
        assert_eq!(Location::from_document(&json!({})).unwrap_err(), expected);
        assert_eq!(Location::from_document(&json!({ "loc": [37.4, -122.1] })).unwrap_err(), expected);
        assert!(matches!(
            Location::from_document(&json!("37.4,-122.1")).unwrap_err(),
            DocumentError::NotAnObject { .. }
        ));
    }

    #[test]
    fn writes_location_block() {
        let mut out = Vec::new();
        Location::new(37.4, -122.1).write_to(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Location:\n\tLatitude: 37.4\n\tLongitude: -122.1\n\n"
        );
    }
}
