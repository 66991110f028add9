//! Open-Meteo forecast request and report.
//!
//! The report is validated one reading at a time, in a fixed order, and
//! stops at the first value or unit that is missing or mistyped.

use serde_json::Value;
use std::fmt;
use std::io::Write;
use std::slice;

use crate::client::Fetcher;
use crate::error::{DocumentError, Error};
use crate::json::{Fields, parse_document};
use crate::location::Location;

pub const CURRENT_FIELDS: [&str; 3] = [
    "temperature_2m",
    "apparent_temperature",
    "relative_humidity_2m",
];
pub const DAILY_FIELDS: [&str; 2] = ["temperature_2m_max", "temperature_2m_min"];

/// Builds the forecast URL for `location` on top of `base`.
pub fn weather_url(base: &str, location: &Location) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{sep}latitude={}&longitude={}&timezone=auto&current={}&daily={}&forecast_days=1",
        location.latitude,
        location.longitude,
        CURRENT_FIELDS.join(","),
        DAILY_FIELDS.join(","),
    )
}

/// Fetches and parses the forecast document for `location`.
pub fn get_weather(fetcher: &Fetcher, base: &str, location: &Location) -> Result<Value, Error> {
    fetcher.fetch_document(&weather_url(base, location))
}

/// Fetches the forecast for `location` and writes the `Weather:` block.
///
/// The header is written as soon as the body has arrived, so a forecast that
/// fails to parse or validate still leaves it in `out`.
pub fn write_weather<W: Write>(
    fetcher: &Fetcher,
    base: &str,
    location: &Location,
    out: &mut W,
) -> Result<(), Error> {
    let body = fetcher.fetch(&weather_url(base, location))?;
    writeln!(out, "Weather:")?;
    let document = parse_document(body.as_bytes())?;
    WeatherReport::new(&document).write_to(out)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Number(f64),
    Integer(i64),
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Number(v) => write!(f, "{v}"),
            Measure::Integer(v) => write!(f, "{v}"),
        }
    }
}

/// One line of the report. The unit is borrowed from the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading<'a> {
    pub label: &'static str,
    pub value: Measure,
    pub unit: &'a str,
}

impl fmt::Display for Reading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}{}", self.label, self.value, self.unit)
    }
}

#[derive(Debug, Clone, Copy)]
enum Section {
    Current,
    Daily,
}

impl Section {
    fn values(self) -> &'static str {
        match self {
            Section::Current => "current",
            Section::Daily => "daily",
        }
    }

    fn units(self) -> &'static str {
        match self {
            Section::Current => "current_units",
            Section::Daily => "daily_units",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Shape {
    Number,
    Integer,
    FirstNumber,
}

struct Step {
    label: &'static str,
    section: Section,
    key: &'static str,
    shape: Shape,
}

static STEPS: [Step; 5] = [
    Step {
        label: "Temperature",
        section: Section::Current,
        key: "temperature_2m",
        shape: Shape::Number,
    },
    Step {
        label: "Apparent Temperature",
        section: Section::Current,
        key: "apparent_temperature",
        shape: Shape::Number,
    },
    Step {
        label: "Maximum Temperature",
        section: Section::Daily,
        key: "temperature_2m_max",
        shape: Shape::FirstNumber,
    },
    Step {
        label: "Minimum Temperature",
        section: Section::Daily,
        key: "temperature_2m_min",
        shape: Shape::FirstNumber,
    },
    Step {
        label: "Relative Humidity",
        section: Section::Current,
        key: "relative_humidity_2m",
        shape: Shape::Integer,
    },
];

/// Values object and units object of one section, validated together.
struct SectionFields<'a> {
    values: Fields<'a>,
    units: Fields<'a>,
}

impl<'a> SectionFields<'a> {
    fn resolve(root: &Fields<'a>, section: Section) -> Result<Self, DocumentError> {
        let values = root.object(section.values())?;
        let units = root.object(section.units())?;
        Ok(Self { values, units })
    }

    fn read(&self, step: &Step) -> Result<Reading<'a>, DocumentError> {
        let value = match step.shape {
            Shape::Number => Measure::Number(self.values.number(step.key)?),
            Shape::Integer => Measure::Integer(self.values.integer(step.key)?),
            Shape::FirstNumber => Measure::Number(self.values.first_number(step.key)?),
        };
        let unit = self.units.string(step.key)?;
        Ok(Reading {
            label: step.label,
            value,
            unit,
        })
    }
}

/// Read-only view over a forecast document.
#[derive(Debug, Clone, Copy)]
pub struct WeatherReport<'a> {
    document: &'a Value,
}

impl<'a> WeatherReport<'a> {
    pub fn new(document: &'a Value) -> Self {
        Self { document }
    }

    /// Readings in report order; iteration ends after the first error.
    pub fn readings(&self) -> Readings<'a> {
        Readings {
            root: Fields::root(self.document),
            current: None,
            daily: None,
            steps: STEPS.iter(),
            failed: false,
        }
    }

    /// Validates the whole report without printing anything.
    pub fn validate(&self) -> Result<Vec<Reading<'a>>, DocumentError> {
        self.readings().collect()
    }

    /// Writes one line per reading as soon as it has been validated.
    pub fn write_to<W: Write>(&self, out: &mut W) -> Result<(), Error> {
        for reading in self.readings() {
            writeln!(out, "\t{}", reading?)?;
        }
        Ok(())
    }
}

pub struct Readings<'a> {
    root: Result<Fields<'a>, DocumentError>,
    current: Option<SectionFields<'a>>,
    daily: Option<SectionFields<'a>>,
    steps: slice::Iter<'static, Step>,
    failed: bool,
}

impl<'a> Readings<'a> {
    fn read(&mut self, step: &Step) -> Result<Reading<'a>, DocumentError> {
        let root = self.root.as_ref().map_err(DocumentError::clone)?;
        let slot = match step.section {
            Section::Current => &mut self.current,
            Section::Daily => &mut self.daily,
        };
        let section = match slot.take() {
            Some(section) => section,
            None => SectionFields::resolve(root, step.section)?,
        };
        let reading = section.read(step);
        *slot = Some(section);
        reading
    }
}

impl<'a> Iterator for Readings<'a> {
    type Item = Result<Reading<'a>, DocumentError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let step = self.steps.next()?;
        let reading = self.read(step);
        self.failed = reading.is_err();
        Some(reading)
    }
}
