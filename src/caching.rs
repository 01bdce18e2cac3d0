//! ETag fingerprints, `If-None-Match` evaluation, and caching policies.
//!
//! The REST dispatch path hands its JSON-able result to [`build_response`],
//! which computes (or accepts) an ETag, answers a matching conditional GET
//! with an empty `304`, and stamps the configured [`CachePolicy`] onto the
//! outgoing response.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::Error;
use crate::http::{Request, Response, StatusCode};

/// How a response may be reused by clients and intermediaries.
///
/// A pure transformation over the outgoing response; applied as the last
/// step of [`build_response`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Clients must revalidate with the ETag before reusing the response.
    #[default]
    ConditionalGet,
    /// Clients may not store the response at all. Only useful when the data
    /// itself is sensitive; this hurts browser performance (back button), so
    /// prefer [`CachePolicy::ConditionalGet`] where possible.
    NoStore,
}

impl CachePolicy {
    /// Stamps the corresponding `Cache-Control` header onto `response`.
    pub fn apply(self, response: Response) -> Response {
        let directive = match self {
            Self::ConditionalGet => "must-revalidate",
            Self::NoStore => "no-store",
        };
        response.set_header("Cache-Control", directive)
    }
}

/// Computes a deterministic content fingerprint.
///
/// The digest is seeded with the application version string — a new
/// deployment invalidates every cached representation immediately — then
/// folds in each part in order. JSON objects are folded as a key-sorted pair
/// list, so two logically equal objects always produce the same digest no
/// matter their insertion order.
pub fn compute_etag(version: &str, parts: &[Value]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(version.as_bytes());
    for part in parts {
        // Record separator keeps adjacent parts from colliding
        hasher.update([0x1e]);
        fold_value(&mut hasher, part);
    }
    hex::encode(hasher.finalize())
}

fn fold_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| k.as_str());
            for (key, val) in pairs {
                hasher.update(key.as_bytes());
                hasher.update([0x1f]);
                fold_value(hasher, val);
                hasher.update([0x1f]);
            }
        }
        other => hasher.update(other.to_string().as_bytes()),
    }
}

/// Wraps `etag` in double quotes for use as an `ETag` header value.
pub fn quote_etag(etag: &str) -> String {
    format!("\"{etag}\"")
}

/// A parsed `If-None-Match` header.
///
/// Supports the header's multi-value grammar: comma-separated quoted or bare
/// tags, weak tags marked `W/`, and the `*` wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EtagSet {
    star: bool,
    strong: Vec<String>,
    weak: Vec<String>,
}

impl EtagSet {
    /// Parses a raw header value. An empty or missing header parses to an
    /// empty set that matches nothing.
    pub fn parse(header: &str) -> Self {
        let mut set = Self::default();
        for token in split_outside_quotes(header) {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            if token == "*" {
                set.star = true;
                continue;
            }
            let (weak, tag) = match token.strip_prefix("W/").or_else(|| token.strip_prefix("w/")) {
                Some(rest) => (true, rest),
                None => (false, token),
            };
            let tag = tag.trim_matches('"').to_owned();
            if weak {
                set.weak.push(tag);
            } else {
                set.strong.push(tag);
            }
        }
        set
    }

    /// Returns `true` when the wildcard `*` was present.
    pub fn star(&self) -> bool {
        self.star
    }

    /// Strong comparison: the wildcard matches everything; otherwise `etag`
    /// must appear among the strong tags.
    pub fn contains(&self, etag: &str) -> bool {
        self.star || self.strong.iter().any(|t| t == etag)
    }

    /// Weak comparison: like [`contains`](Self::contains) but weak tags
    /// match as well.
    pub fn contains_weak(&self, etag: &str) -> bool {
        self.contains(etag) || self.weak.iter().any(|t| t == etag)
    }

    /// Returns `true` when no tags (and no wildcard) were parsed.
    pub fn is_empty(&self) -> bool {
        !self.star && self.strong.is_empty() && self.weak.is_empty()
    }
}

// Splits on commas that sit outside double-quoted sections, so quoted etags
// containing commas survive.
fn split_outside_quotes(value: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                tokens.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    tokens.push(&value[start..]);
    tokens
}

/// Renders `data` to a JSON response with conditional-GET semantics.
///
/// - `data` of `None` represents an intentionally empty body and requires a
///   caller-supplied `etag` ([`Error::MissingEtag`] otherwise); the result is
///   an empty `304`.
/// - Otherwise an ETag is computed from `data` when none is given and
///   compared against the client's `If-None-Match` header: on a match the
///   body is never serialized and an empty `304` is returned; on a miss the
///   JSON body is sent with a `200`.
///
/// The response always carries the quoted `ETag` header and the applied
/// `policy`.
pub fn build_response(
    version: &str,
    request: &Request,
    data: Option<&Value>,
    etag: Option<String>,
    policy: CachePolicy,
) -> Result<Response, Error> {
    let etag = match (etag, data) {
        (Some(tag), _) => tag,
        (None, Some(value)) => compute_etag(version, std::slice::from_ref(value)),
        (None, None) => return Err(Error::MissingEtag),
    };

    let response = match data {
        None => Response::new(StatusCode::NotModified),
        Some(value) => {
            let client_etags = EtagSet::parse(request.if_none_match().unwrap_or(""));
            if client_etags.contains(&etag) {
                // Resource unchanged; skip re-serializing the body
                Response::new(StatusCode::NotModified)
            } else {
                Response::new(StatusCode::Ok).body(serde_json::to_string(value)?)
            }
        }
    };

    let response = response
        .set_header("Content-Type", "application/json")
        .set_header("ETag", quote_etag(&etag));
    Ok(policy.apply(response))
}
