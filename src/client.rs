use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use std::io::{ErrorKind, Read};
use std::time::Duration;

use crate::buffer::{Body, ResponseBuffer};
use crate::config::FetchOptions;
use crate::error::{Error, FetchError};
use crate::json::parse_document;
use crate::util::truncate_body;

const CHUNK_SIZE: usize = 64 * 1024;
// bytes of a rejected response kept for the debug log
const PREVIEW_SIZE: u64 = 512;

/// Blocking HTTP GET that buffers the whole response body.
///
/// A `Fetcher` only holds options. The HTTP client is built at the start of
/// every [`fetch`](Self::fetch) and dropped before it returns.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    options: FetchOptions,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: FetchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FetchOptions {
        &self.options
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.options.initial_capacity = capacity;
        self
    }

    pub fn with_max_capacity(mut self, capacity: usize) -> Self {
        self.options.max_capacity = capacity;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.options.progress = progress;
        self
    }

    /// Downloads `url` and returns its body once the server answered 200.
    ///
    /// Any other status is an error. The body sent with it is never buffered,
    /// so the status is reported whatever the body size.
    pub fn fetch(&self, url: &str) -> Result<Body, FetchError> {
        let http = self.transport()?;

        log::debug!("GET {}", url);
        let mut resp = http.get(url).send().map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;
        let status = resp.status();
        if status != StatusCode::OK {
            let mut preview = Vec::new();
            if resp.by_ref().take(PREVIEW_SIZE).read_to_end(&mut preview).is_ok() {
                log::debug!("HTTP {} body: {}", status, truncate_body(&preview));
            }
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }

        let mut buffer =
            ResponseBuffer::with_limit(self.options.initial_capacity, self.options.max_capacity)
                .map_err(|source| FetchError::Buffer {
                    url: url.to_string(),
                    source,
                })?;

        let pb = if self.options.progress {
            Some(progress_bar(resp.content_length()))
        } else {
            None
        };
        let received = accumulate(&mut resp, &mut buffer, url, pb.as_ref());
        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        received?;

        log::debug!("HTTP {} with {} byte(s) from {}", status, buffer.len(), url);
        Ok(buffer.finish())
    }

    /// Fetches `url` and parses the body as JSON.
    pub fn fetch_document(&self, url: &str) -> Result<Value, Error> {
        let body = self.fetch(url)?;
        Ok(parse_document(body.as_bytes())?)
    }

    fn transport(&self) -> Result<HttpClient, FetchError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.options.user_agent)
                .unwrap_or(HeaderValue::from_static("weather-here")),
        );

        let mut builder = HttpClient::builder().default_headers(default_headers);
        if let Some(timeout) = self.options.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().map_err(FetchError::TransportInit)
    }
}

/// Drains `reader` into `buffer` chunk by chunk.
///
/// Returns the number of bytes received. On error the bytes written so far
/// stay in `buffer`.
pub(crate) fn accumulate<R: Read>(
    reader: &mut R,
    buffer: &mut ResponseBuffer,
    url: &str,
    pb: Option<&ProgressBar>,
) -> Result<u64, FetchError> {
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut received: u64 = 0;
    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(FetchError::Body {
                    url: url.to_string(),
                    source,
                });
            }
        };

        buffer
            .write(&chunk[..n])
            .map_err(|source| FetchError::Buffer {
                url: url.to_string(),
                source,
            })?;
        received += n as u64;
        if let Some(pb) = pb {
            pb.inc(n as u64);
        }
    }
    Ok(received)
}

fn progress_bar(len: Option<u64>) -> ProgressBar {
    let (pb, template) = match len {
        Some(len) => (
            ProgressBar::new(len),
            "{spinner:.green} {bytes}/{total_bytes} ({bytes_per_sec}) {wide_bar} {eta}",
        ),
        None => (ProgressBar::new_spinner(), "{spinner:.green} {bytes} ({bytes_per_sec})"),
    };
    if let Ok(style) = ProgressStyle::with_template(template) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
