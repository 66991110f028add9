//! Current weather for wherever you are.
//!
//! This crate implements a two-step flow:
//! ask a geolocation service where the caller is, then ask Open-Meteo for the
//! weather at that spot and print a short report.
//!
//! ## Quick start
//! - [`get_location`] fetches `https://ipinfo.io/json` and reads its `loc` field.
//! - [`get_weather`] fetches the forecast document for a [`Location`].
//! - [`WeatherReport`] validates the document field by field and writes it out.
//! - [`write_weather`] does the last two steps under a `Weather:` header.
//!
//! ```no_run
//! use weather_here::{Endpoints, Fetcher, WeatherReport, get_location, get_weather};
//!
//! fn main() -> Result<(), weather_here::Error> {
//!     let endpoints = Endpoints::default();
//!     let fetcher = Fetcher::new();
//!     let location = get_location(&fetcher, &endpoints.location)?;
//!     let document = get_weather(&fetcher, &endpoints.weather, &location)?;
//!     WeatherReport::new(&document).write_to(&mut std::io::stdout())?;
//!     Ok(())
//! }
//! ```
//!
//! Every field of both payloads is checked before use; a missing or mistyped
//! value becomes a [`DocumentError`] naming its path.

#![forbid(unsafe_code)]

mod buffer;
mod client;
mod config;
mod error;
mod json;
mod location;
mod util;
mod weather;

pub use buffer::{Body, INITIAL_CAPACITY, MAX_CAPACITY, ResponseBuffer, grow_capacity};
pub use client::Fetcher;
pub use config::{Endpoints, FetchOptions, LOCATION_URL, WEATHER_URL};
pub use error::{BufferError, DocumentError, Error, Expected, FetchError, ParseError};
pub use json::{Fields, object_field, parse_document};
pub use location::{Location, get_location};
pub use weather::{
    Measure, Reading, Readings, WeatherReport, get_weather, weather_url, write_weather,
};
