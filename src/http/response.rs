//! HTTP/1.1 response builder.
//!
//! Responses are constructed fresh per dispatch, decorated by the caching
//! policy step, and serialized to a byte buffer for the transport.

use bytes::{BufMut, BytesMut};

use super::{Headers, StatusCode};

/// An HTTP/1.1 response, ready to be serialized and sent.
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
    keep_alive: bool,
}

impl Response {
    /// Creates a new response with the given status and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
            keep_alive: true,
        }
    }

    /// Creates a `302 Found` redirect to `location`.
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::new(StatusCode::Found).header("Location", location.into())
    }

    /// Appends a response header. Multiple calls with the same name are
    /// additive.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replaces any existing header with the same name. Used by the caching
    /// layer for `ETag` and `Cache-Control`, which are single-valued.
    #[must_use]
    pub fn set_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets the response body from a string.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Sets the response body from raw bytes.
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Controls whether `Connection: keep-alive` or `Connection: close` is
    /// written at serialization time.
    #[must_use]
    pub fn keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the response body bytes.
    pub fn body_ref(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response into a `BytesMut` buffer in HTTP/1.1 wire
    /// format.
    ///
    /// Automatically adds:
    /// - `Content-Type: text/plain; charset=utf-8` when the body is non-empty
    ///   and no `Content-Type` was set.
    /// - `Content-Length: <n>` (always).
    /// - `Connection: keep-alive` or `Connection: close`.
    pub fn into_bytes(mut self) -> BytesMut {
        let content_length = self.body.len();

        if !self.body.is_empty() && !self.headers.contains("content-type") {
            self.headers
                .insert("Content-Type", "text/plain; charset=utf-8");
        }

        let connection = if self.keep_alive {
            "keep-alive"
        } else {
            "close"
        };
        self.headers.insert("Connection", connection);

        let estimated_size = 128 + self.headers.len() * 64 + content_length;
        let mut buf = BytesMut::with_capacity(estimated_size);

        buf.put(
            format!(
                "HTTP/1.1 {} {}\r\n",
                self.status.as_u16(),
                self.status.canonical_reason()
            )
            .as_bytes(),
        );

        for (name, value) in self.headers.iter() {
            buf.put(format!("{name}: {value}\r\n").as_bytes());
        }

        // Content-Length is always the last header before the blank line
        buf.put(format!("Content-Length: {content_length}\r\n").as_bytes());

        buf.put(&b"\r\n"[..]);

        if !self.body.is_empty() {
            buf.put(self.body.as_slice());
        }

        buf
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn simple_ok_response() {
        let r = Response::new(StatusCode::Ok).body("Hello");
        let s = to_string(r.into_bytes());
        assert!(s.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(s.contains("Content-Length: 5\r\n"));
        assert!(s.ends_with("\r\n\r\nHello"));
    }

    #[test]
    fn redirect_carries_location() {
        let r = Response::redirect("/wiki/page");
        assert_eq!(r.status(), StatusCode::Found);
        assert_eq!(r.headers().get("location"), Some("/wiki/page"));
        let s = to_string(r.into_bytes());
        assert!(s.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(s.contains("Location: /wiki/page\r\n"));
    }

    #[test]
    fn set_header_replaces() {
        let r = Response::new(StatusCode::Ok)
            .header("ETag", "\"old\"")
            .set_header("ETag", "\"new\"");
        assert_eq!(r.headers().get("etag"), Some("\"new\""));
        assert_eq!(r.headers().get_all("etag").count(), 1);
    }

    #[test]
    fn no_body_no_content_type() {
        let r = Response::new(StatusCode::NotModified);
        let s = to_string(r.into_bytes());
        assert!(!s.contains("Content-Type"));
        assert!(s.contains("Content-Length: 0\r\n"));
    }

    #[test]
    fn explicit_content_type_preserved() {
        let r = Response::new(StatusCode::Ok)
            .header("Content-Type", "application/json")
            .body("{}");
        let s = to_string(r.into_bytes());
        assert!(s.contains("Content-Type: application/json\r\n"));
        assert!(!s.contains("text/plain"));
    }

    #[test]
    fn connection_close() {
        let r = Response::new(StatusCode::Ok).keep_alive(false);
        let s = to_string(r.into_bytes());
        assert!(s.contains("Connection: close\r\n"));
    }
}
