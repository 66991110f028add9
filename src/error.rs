use reqwest::StatusCode;
use std::io;
use thiserror::Error;

/// Any failure along the fetch, parse, validate chain.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("failed to write report")]
    Output(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to initialize HTTP client")]
    TransportInit(#[source] reqwest::Error),
    #[error("failed to get data from {url}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },
    #[error("server responded with code {} for {url}{}", .status.as_u16(), describe_status(.status))]
    HttpStatus { url: String, status: StatusCode },
    #[error("failed to buffer response from {url}")]
    Buffer {
        url: String,
        #[source]
        source: BufferError,
    },
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error(
        "buffer capacity overflowed: {len} + {count} x {element_size} bytes does not fit below {limit}"
    )]
    CapacityOverflow {
        len: usize,
        count: usize,
        element_size: usize,
        limit: usize,
    },
    #[error("failed to reallocate buffer capacity to {capacity}")]
    Allocation { capacity: usize },
}

#[derive(Debug, Error)]
#[error("failed to parse json: {line}:{column}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    #[source]
    pub source: serde_json::Error,
}

impl From<serde_json::Error> for ParseError {
    fn from(source: serde_json::Error) -> Self {
        Self {
            line: source.line(),
            column: source.column(),
            source,
        }
    }
}

/// Type expected at a document path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Object,
    Number,
    Integer,
    String,
    NumberArray,
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Expected::Object => "an object",
            Expected::Number => "a number",
            Expected::Integer => "an integer",
            Expected::String => "a string",
            Expected::NumberArray => "an array starting with a number",
        })
    }
}

/// A well-formed document that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("{path} is not an object")]
    NotAnObject { path: String },
    #[error("{container} doesn't contain {key} as {expected}")]
    Field {
        container: String,
        key: String,
        expected: Expected,
    },
    #[error("failed to parse location: {value:?}")]
    LocationFormat { value: String },
}

impl DocumentError {
    /// Dotted path of the offending value, e.g. `current_units.temperature_2m`.
    pub fn path(&self) -> Option<String> {
        match self {
            DocumentError::NotAnObject { path } => Some(path.clone()),
            DocumentError::Field { container, key, .. } => Some(join_path(container, key)),
            DocumentError::LocationFormat { .. } => None,
        }
    }
}

pub(crate) const ROOT: &str = "root";

pub(crate) fn join_path(container: &str, key: &str) -> String {
    if container == ROOT {
        key.to_string()
    } else {
        format!("{container}.{key}")
    }
}

/// Short remediation hint appended to HTTP status failures.
pub(crate) fn describe_status(status: &StatusCode) -> &'static str {
    let status = *status;
    if status == StatusCode::NOT_FOUND {
        return " (endpoint not found; the API path may have changed)";
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return " (access denied by the provider)";
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return " (rate limited; try again later)";
    }
    if status.is_server_error() {
        return " (provider-side error)";
    }
    ""
}
