//! End-to-end tests: geolocation then forecast, against a mock server.

use serde_json::{Value, json};
use tokio::runtime::Runtime;
use weather_here::{
    DocumentError, Endpoints, Error, Fetcher, Location, WeatherReport, get_location, get_weather,
    write_weather,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast() -> Value {
    json!({
        "current_units": {
            "temperature_2m": "°C",
            "apparent_temperature": "°C",
            "relative_humidity_2m": "%"
        },
        "current": {
            "temperature_2m": 18.5,
            "apparent_temperature": 17.9,
            "relative_humidity_2m": 64
        },
        "daily_units": {
            "temperature_2m_max": "°C",
            "temperature_2m_min": "°C"
        },
        "daily": {
            "temperature_2m_max": [21.3],
            "temperature_2m_min": [12.0]
        }
    })
}

fn start(rt: &Runtime, ipinfo: ResponseTemplate, forecast: ResponseTemplate) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ipinfo)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "37.4"))
            .and(query_param("longitude", "-122.1"))
            .and(query_param("timezone", "auto"))
            .and(query_param(
                "current",
                "temperature_2m,apparent_temperature,relative_humidity_2m",
            ))
            .and(query_param("daily", "temperature_2m_max,temperature_2m_min"))
            .and(query_param("forecast_days", "1"))
            .respond_with(forecast)
            .mount(&server)
            .await;
        server
    })
}

#[test]
fn test_location_then_weather() {
    let rt = Runtime::new().unwrap();
    let server = start(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({
            "ip": "203.0.113.7",
            "city": "Mountain View",
            "loc": "37.4,-122.1"
        })),
        ResponseTemplate::new(200).set_body_json(forecast()),
    );
    let endpoints = Endpoints::with_base(&server.uri());
    let fetcher = Fetcher::new();

    let location = get_location(&fetcher, &endpoints.location).unwrap();
    assert_eq!(location, Location::new(37.4, -122.1));

    let document = get_weather(&fetcher, &endpoints.weather, &location).unwrap();
    let mut out = Vec::new();
    location.write_to(&mut out).unwrap();
    WeatherReport::new(&document).write_to(&mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Location:\n\
         \tLatitude: 37.4\n\
         \tLongitude: -122.1\n\
         \n\
         \tTemperature: 18.5°C\n\
         \tApparent Temperature: 17.9°C\n\
         \tMaximum Temperature: 21.3°C\n\
         \tMinimum Temperature: 12°C\n\
         \tRelative Humidity: 64%\n"
    );
}

#[test]
fn test_malformed_location() {
    let rt = Runtime::new().unwrap();
    let server = start(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({ "loc": "not-a-location" })),
        ResponseTemplate::new(200).set_body_json(forecast()),
    );
    let endpoints = Endpoints::with_base(&server.uri());

    let err = get_location(&Fetcher::new(), &endpoints.location).unwrap_err();

    assert!(matches!(
        err,
        Error::Document(DocumentError::LocationFormat { ref value }) if value == "not-a-location"
    ));
}

#[test]
fn test_geolocation_unavailable() {
    let rt = Runtime::new().unwrap();
    let server = start(
        &rt,
        ResponseTemplate::new(503),
        ResponseTemplate::new(200).set_body_json(forecast()),
    );
    let endpoints = Endpoints::with_base(&server.uri());

    let err = get_location(&Fetcher::new(), &endpoints.location).unwrap_err();

    match err {
        Error::Fetch(err) => assert_eq!(err.status().map(|s| s.as_u16()), Some(503)),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_incomplete_forecast_stops_at_first_missing_field() {
    let rt = Runtime::new().unwrap();
    let mut partial = forecast();
    partial["current_units"]
        .as_object_mut()
        .unwrap()
        .remove("temperature_2m");
    let server = start(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({ "loc": "37.4,-122.1" })),
        ResponseTemplate::new(200).set_body_json(partial),
    );
    let endpoints = Endpoints::with_base(&server.uri());
    let fetcher = Fetcher::new();

    let location = get_location(&fetcher, &endpoints.location).unwrap();
    let document = get_weather(&fetcher, &endpoints.weather, &location).unwrap();

    let mut out = Vec::new();
    let err = WeatherReport::new(&document).write_to(&mut out).unwrap_err();
    assert!(out.is_empty());
    match err {
        Error::Document(err) => {
            assert_eq!(err.path().as_deref(), Some("current_units.temperature_2m"))
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_forecast_that_is_not_json() {
    let rt = Runtime::new().unwrap();
    let server = start(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({ "loc": "37.4,-122.1" })),
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    );
    let endpoints = Endpoints::with_base(&server.uri());

    let err = get_weather(&Fetcher::new(), &endpoints.weather, &Location::new(37.4, -122.1))
        .unwrap_err();

    assert!(matches!(err, Error::Parse(ref e) if e.line == 1 && e.column == 1));
}

#[test]
fn test_weather_block() {
    let rt = Runtime::new().unwrap();
    let server = start(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({ "loc": "37.4,-122.1" })),
        ResponseTemplate::new(200).set_body_json(forecast()),
    );
    let endpoints = Endpoints::with_base(&server.uri());

    let mut out = Vec::new();
    write_weather(&Fetcher::new(), &endpoints.weather, &Location::new(37.4, -122.1), &mut out)
        .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Weather:\n\tTemperature: 18.5°C\n"));
    assert!(text.ends_with("\tRelative Humidity: 64%\n"));
}

#[test]
fn test_weather_header_precedes_parse_failure() {
    let rt = Runtime::new().unwrap();
    let server = start(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({ "loc": "37.4,-122.1" })),
        ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"),
    );
    let endpoints = Endpoints::with_base(&server.uri());

    let mut out = Vec::new();
    let err = write_weather(&Fetcher::new(), &endpoints.weather, &Location::new(37.4, -122.1), &mut out)
        .unwrap_err();

    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(out, b"Weather:\n");
}

#[test]
fn test_weather_header_withheld_when_fetch_fails() {
    let rt = Runtime::new().unwrap();
    let server = start(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({ "loc": "37.4,-122.1" })),
        ResponseTemplate::new(500),
    );
    let endpoints = Endpoints::with_base(&server.uri());

    let mut out = Vec::new();
    let err = write_weather(&Fetcher::new(), &endpoints.weather, &Location::new(37.4, -122.1), &mut out)
        .unwrap_err();

    assert!(matches!(err, Error::Fetch(_)));
    assert!(out.is_empty());
}
