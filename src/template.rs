//! Template name resolution, content negotiation, and the rendering
//! collaborator seam.
//!
//! The framework computes *which* template to render — the engine itself is
//! an external collaborator behind [`TemplateEngine`]. The template name is
//! inferred from the route key by convention:
//!
//! ```text
//! fancymodule/FancyClass => fancymodule/fancyclass.html
//! ```
//!
//! For XHR requests whose `Accept` header includes a JavaScript MIME type
//! the extension flips to `.js` and the declared content type to
//! `application/javascript`.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::controller::View;
use crate::error::Error as DispatchError;
use crate::http::{Request, Response, StatusCode};
use crate::routing::RouteKey;

/// Render data passed to the engine: a string-keyed JSON map.
pub type RenderData = Map<String, Value>;

/// Failure reported by a template engine.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RenderError(pub String);

/// The external template-rendering collaborator.
///
/// Given a template name like `blog/post.html` and a data mapping, returns
/// the rendered text. Engines must be shareable across request workers.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, name: &str, data: &RenderData) -> Result<String, RenderError>;
}

/// Chooses template extension and response content type for `request`.
fn negotiate(request: &Request) -> (&'static str, &'static str) {
    if request.is_xhr() && request.accepts_javascript() {
        (".js", "application/javascript")
    } else {
        (".html", "text/html")
    }
}

/// Resolves the conventional template name for `key` under the negotiated
/// extension. Returns the name and the content type to declare.
pub fn template_name(key: &RouteKey, request: &Request) -> (String, &'static str) {
    let (extension, content_type) = negotiate(request);
    (
        format!("{}/{}{}", key.module(), key.controller(), extension),
        content_type,
    )
}

/// Renders a dispatch outcome to a response.
///
/// Pre-built responses pass through unchanged. Data maps are rendered by the
/// engine under the conventional template name; a missing engine is a
/// configuration problem surfaced as a template error.
pub fn render(
    engine: Option<&dyn TemplateEngine>,
    key: &RouteKey,
    request: &Request,
    view: View,
) -> Result<Response, DispatchError> {
    let data = match view {
        View::Response(response) => return Ok(response),
        View::Data(data) => data,
    };

    let (name, content_type) = template_name(key, request);
    let engine = engine.ok_or_else(|| DispatchError::Template {
        name: name.clone(),
        reason: "no template engine configured".into(),
    })?;
    let body = engine
        .render(&name, &data)
        .map_err(|e| DispatchError::Template {
            name: name.clone(),
            reason: e.to_string(),
        })?;

    Ok(Response::new(StatusCode::Ok)
        .header("Content-Type", content_type)
        .body(body))
}

// Ordered replacement table; order matters, e.g. `\r\n` must be rewritten
// before `\r`.
const JS_ESCAPE_PATTERNS: [(&str, &str); 7] = [
    ("\\", "\\\\"),
    ("</", "<\\/"),
    ("\r\n", "\\n"),
    ("\n", "\\n"),
    ("\r", "\\n"),
    ("\"", "\\\""),
    ("'", "\\'"),
];

/// Escapes `value` for safe embedding inside a JavaScript string literal.
///
/// All patterns are applied in a single pass, so replacement output is never
/// itself re-escaped.
pub fn js_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    'outer: while !rest.is_empty() {
        for (pattern, replacement) in JS_ESCAPE_PATTERNS {
            if let Some(tail) = rest.strip_prefix(pattern) {
                out.push_str(replacement);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        // rest is non-empty, so next() always yields
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}
