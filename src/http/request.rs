//! HTTP/1.1 request parsing using the [`httparse`] crate.
//!
//! On top of the parsed method/path/headers/body, [`Request`] exposes the
//! content-negotiation helpers the dispatch chain relies on: XHR detection
//! via `X-Requested-With` and JavaScript acceptance via the `Accept` header.

use std::collections::HashMap;
use std::str;

use bytes::Bytes;
use thiserror::Error;

use super::{Headers, Method};

/// MIME types treated as "the client accepts JavaScript" during template
/// content negotiation.
pub const JAVASCRIPT_MIMETYPES: [&str; 4] = [
    "text/javascript",
    "application/x-ecmascript",
    "application/javascript",
    "application/ecmascript",
];

/// Errors that can occur while parsing an HTTP/1.1 request.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request is incomplete — more data needed")]
    Incomplete,

    #[error("HTTP parse error: {0}")]
    Parse(#[from] httparse::Error),

    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
}

/// A fully parsed HTTP/1.1 request.
///
/// Created by [`Request::parse`] from a raw byte buffer. Read-only from the
/// router's perspective; the body is stored as a [`Bytes`] buffer.
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    /// HTTP minor version: 0 for HTTP/1.0, 1 for HTTP/1.1.
    version: u8,
    headers: Headers,
    query: Option<String>,
    body: Bytes,
    params: HashMap<String, String>,
}

impl Request {
    /// Maximum number of headers we support per request.
    const MAX_HEADERS: usize = 64;

    /// Parse a raw HTTP/1.1 request from a byte slice.
    ///
    /// Returns the parsed `Request` and the byte offset at which the body
    /// begins in `buf` (immediately after the `\r\n\r\n` header terminator).
    ///
    /// # Errors
    ///
    /// - [`RequestError::Incomplete`] — more data is needed for the headers.
    /// - [`RequestError::Parse`] — the data is malformed.
    /// - [`RequestError::MissingField`] — method, path, or version is absent.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), RequestError> {
        let mut headers = [httparse::EMPTY_HEADER; Self::MAX_HEADERS];
        let mut raw_req = httparse::Request::new(&mut headers);

        let body_offset = match raw_req.parse(buf)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => return Err(RequestError::Incomplete),
        };

        let method: Method = raw_req
            .method
            .ok_or(RequestError::MissingField { field: "method" })?
            .parse()
            .unwrap(); // Infallible

        let raw_path = raw_req
            .path
            .ok_or(RequestError::MissingField { field: "path" })?;

        let (path, query) = match raw_path.find('?') {
            Some(pos) => (
                raw_path[..pos].to_owned(),
                Some(raw_path[pos + 1..].to_owned()),
            ),
            None => (raw_path.to_owned(), None),
        };

        let version = raw_req
            .version
            .ok_or(RequestError::MissingField { field: "version" })?;

        let mut header_map = Headers::with_capacity(raw_req.headers.len());
        for header in raw_req.headers.iter() {
            if let Ok(value) = str::from_utf8(header.value) {
                header_map.insert(header.name, value);
            }
        }

        let params = query.as_deref().map(parse_query_string).unwrap_or_default();

        // The buffer may hold more than this request (pipelining); take only
        // the declared body. No Content-Length means no body for a request.
        let content_length: usize = header_map
            .get("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let body_end = buf.len().min(body_offset + content_length);
        let body = Bytes::copy_from_slice(&buf[body_offset..body_end]);

        Ok((
            Self {
                method,
                path,
                version,
                headers: header_map,
                query,
                body,
                params,
            },
            body_offset,
        ))
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path (without the query string).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the HTTP minor version number (0 = HTTP/1.0, 1 = HTTP/1.1).
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the raw query string (without the leading `?`), if any.
    pub fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns a parsed query parameter value by key.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Returns the request body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the request body as JSON.
    pub fn json<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_slice(&self.body)
    }

    /// Returns `true` when the request was made by an in-page asynchronous
    /// client, signalled by `X-Requested-With: XMLHttpRequest`.
    pub fn is_xhr(&self) -> bool {
        self.headers
            .get("x-requested-with")
            .is_some_and(|v| v == "XMLHttpRequest")
    }

    /// Returns `true` when the `Accept` header lists a JavaScript MIME type.
    ///
    /// Media-type parameters (`;q=...`) are ignored; only the bare type is
    /// compared against [`JAVASCRIPT_MIMETYPES`].
    pub fn accepts_javascript(&self) -> bool {
        self.headers
            .get("accept")
            .map(|accept| {
                accept
                    .split(',')
                    .filter_map(|item| item.split(';').next())
                    .map(str::trim)
                    .any(|mime| {
                        JAVASCRIPT_MIMETYPES
                            .iter()
                            .any(|js| mime.eq_ignore_ascii_case(js))
                    })
            })
            .unwrap_or(false)
    }

    /// Returns the raw `If-None-Match` header, if present.
    pub fn if_none_match(&self) -> Option<&str> {
        self.headers.get("if-none-match")
    }

    /// Returns `true` if the connection should be kept alive after this
    /// request. HTTP/1.1 defaults to keep-alive; HTTP/1.0 defaults to close
    /// unless `Connection: keep-alive` is set.
    pub fn is_keep_alive(&self) -> bool {
        match self.headers.get("connection") {
            Some(conn) => conn.eq_ignore_ascii_case("keep-alive"),
            None => self.version == 1,
        }
    }

    /// Returns the `Content-Length` header parsed as a `usize`, if present.
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("content-length")?.parse().ok()
    }
}

// Parses a `key=value&key2=value2` query string. `+` decodes to a space;
// full percent-decoding is left to the consumer.
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?.replace('+', " ");
            let value = parts.next().unwrap_or("").replace('+', " ");
            Some((key, value))
        })
        .collect()
}
