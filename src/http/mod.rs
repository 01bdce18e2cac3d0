//! HTTP protocol primitives.
//!
//! [`Method`], [`StatusCode`], [`Headers`], [`Request`], and [`Response`] —
//! the request/response abstractions the routing and dispatch layers operate
//! on. Parsing is delegated to [`httparse`]; serialization targets HTTP/1.1
//! wire format.

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;

pub use headers::Headers;
pub use request::Request;
pub use response::Response;

/// An HTTP response status code.
///
/// Only the codes the framework itself produces (plus the usual transport
/// errors) are enumerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,

    MovedPermanently = 301,
    Found = 302,
    NotModified = 304,

    BadRequest = 400,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    PreconditionFailed = 412,
    PayloadTooLarge = 413,

    InternalServerError = 500,
    NotImplemented = 501,
}

impl StatusCode {
    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::NoContent => "No Content",
            Self::MovedPermanently => "Moved Permanently",
            Self::Found => "Found",
            Self::NotModified => "Not Modified",
            Self::BadRequest => "Bad Request",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::PreconditionFailed => "Precondition Failed",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
        }
    }

    /// Returns `true` for 2xx codes.
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.as_u16())
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

impl From<StatusCode> for u16 {
    fn from(code: StatusCode) -> u16 {
        code.as_u16()
    }
}

/// An HTTP request method.
///
/// Standard methods are unit variants for zero-cost comparison; anything else
/// lands in `Custom` so the REST verb router can reject it uniformly instead
/// of the parser failing early.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    /// A non-standard extension method.
    Custom(String),
}

impl Method {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            other => Self::Custom(other.to_owned()),
        })
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_numeric_value() {
        assert_eq!(StatusCode::Found.as_u16(), 302);
        assert_eq!(StatusCode::NotModified.as_u16(), 304);
        assert_eq!(StatusCode::MethodNotAllowed.as_u16(), 405);
    }

    #[test]
    fn status_code_display() {
        assert_eq!(StatusCode::NotModified.to_string(), "304 Not Modified");
    }

    #[test]
    fn success_range() {
        assert!(StatusCode::Ok.is_success());
        assert!(StatusCode::Created.is_success());
        assert!(!StatusCode::Found.is_success());
        assert!(!StatusCode::NotFound.is_success());
    }

    #[test]
    fn method_round_trip() {
        let m: Method = "DELETE".parse().unwrap();
        assert_eq!(m, Method::Delete);
        assert_eq!(m.as_str(), "DELETE");
    }

    #[test]
    fn unknown_method_is_custom() {
        let m: Method = "CARROT".parse().unwrap();
        assert_eq!(m, Method::Custom("CARROT".into()));
        assert_eq!(m.as_str(), "CARROT");
    }
}
