//! The framework error taxonomy.
//!
//! Every failure in the routing/dispatch/caching core is one of the variants
//! below. They are local, synchronous conditions: a request either completes
//! with a well-formed [`Response`] or fails with exactly one of these, which
//! the application boundary converts into an HTTP error response via
//! [`Error::into_response`].

use thiserror::Error;

use crate::http::{Response, StatusCode};

/// Errors raised by the dispatch core.
#[derive(Debug, Error)]
pub enum Error {
    /// No controller is registered for the resolved route, even after the
    /// index fallback.
    #[error("no controller registered for /{module}/{controller}")]
    NotFound { module: String, controller: String },

    /// The HTTP method is not supported by the matched controller, or a
    /// default (unoverridden) REST verb handler was invoked.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// A reserved module name was used during controller registration.
    /// Fatal at startup; never produced while serving requests.
    #[error("module name {0:?} is reserved")]
    ReservedModule(String),

    /// A caching response was requested with no body and no ETag. A null
    /// body with no fingerprint is undefined, so this is a caller bug
    /// rather than a runtime condition.
    #[error("a response without a body requires an explicit etag")]
    MissingEtag,

    /// The template collaborator failed to render.
    #[error("failed to render template {name:?}: {reason}")]
    Template { name: String, reason: String },

    /// A REST body could not be encoded as JSON.
    #[error("failed to encode response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Error {
    /// The HTTP status this error surfaces as.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NotFound,
            Self::MethodNotAllowed => StatusCode::MethodNotAllowed,
            Self::ReservedModule(_) | Self::MissingEtag | Self::Template { .. } => {
                StatusCode::InternalServerError
            }
            Self::Serialize(_) => StatusCode::InternalServerError,
        }
    }

    /// Convert this error into a plain-text HTTP error response.
    pub fn into_response(self) -> Response {
        let status = self.status();
        Response::new(status).body(status.canonical_reason())
    }
}
