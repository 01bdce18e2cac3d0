//! The controller dispatch chain.
//!
//! Controllers come in four kinds, each with its own contract for turning a
//! request into a response:
//!
//! - [`Handler`] (plain) — `index` returns a finished [`Response`].
//! - [`ViewHandler`] (template-rendering) — `index` returns a [`View`];
//!   render-data maps go through the template collaborator, pre-built
//!   responses pass through unchanged.
//! - [`FormHandler`] (form-processing) — `form()` builds a form object,
//!   then GET dispatches to `view` and POST to `process`; results render
//!   like a template controller.
//! - [`crate::rest::RestHandler`] — HTTP-verb routing with ETag caching.
//!
//! The kind is fixed at registration via [`ControllerKind`], and
//! [`dispatch`] selects the contract by explicit variant matching.

use std::any::Any;
use std::sync::Arc;

use crate::app::AppState;
use crate::error::Error;
use crate::http::{Method, Request, Response};
use crate::rest::{self, RestHandler};
use crate::routing::RouteKey;
use crate::template::{self, RenderData};

/// The structured outcome of a template or form controller entrypoint.
#[derive(Debug)]
pub enum View {
    /// Render this mapping through the conventionally-named template.
    Data(RenderData),
    /// A pre-built response; returned unchanged, no rendering.
    Response(Response),
}

impl From<RenderData> for View {
    fn from(data: RenderData) -> Self {
        Self::Data(data)
    }
}

impl From<Response> for View {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

/// A type-erased form/validation object produced by [`FormHandler::form`].
///
/// The dispatcher shuttles it between `form` and `view`/`process` without
/// knowing its concrete type; the handler downcasts it back.
pub struct FormState(Box<dyn Any + Send>);

impl FormState {
    /// Wraps a concrete form value.
    pub fn new<T: Send + 'static>(form: T) -> Self {
        Self(Box::new(form))
    }

    /// Borrows the form as its concrete type, or `None` on a type mismatch.
    pub fn downcast_ref<T: Send + 'static>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

/// A plain controller: whatever `index` returns is the final response.
pub trait Handler: Send + Sync {
    fn index(&self, request: &Request, arg: Option<&str>) -> Result<Response, Error>;
}

/// A template-rendering controller.
pub trait ViewHandler: Send + Sync {
    fn index(&self, request: &Request, arg: Option<&str>) -> Result<View, Error>;
}

/// A form-processing controller.
///
/// `form` runs for every request; `view` handles GET and `process` handles
/// POST. Any other method is rejected with method-not-allowed before the
/// handler is consulted.
pub trait FormHandler: Send + Sync {
    fn form(&self, request: &Request, arg: Option<&str>) -> Result<FormState, Error>;

    fn view(&self, request: &Request, form: &FormState, arg: Option<&str>)
    -> Result<View, Error>;

    fn process(
        &self,
        request: &Request,
        form: &FormState,
        arg: Option<&str>,
    ) -> Result<View, Error>;
}

/// A registered controller instance, tagged with its dispatch contract.
#[derive(Clone)]
pub enum ControllerKind {
    Plain(Arc<dyn Handler>),
    Template(Arc<dyn ViewHandler>),
    Form(Arc<dyn FormHandler>),
    Rest(Arc<dyn RestHandler>),
}

impl std::fmt::Debug for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain(_) => f.write_str("Plain"),
            Self::Template(_) => f.write_str("Template"),
            Self::Form(_) => f.write_str("Form"),
            Self::Rest(_) => f.write_str("Rest"),
        }
    }
}

/// Runs the dispatch contract for `kind` against `request`.
///
/// `key` is the canonical registry key of the controller; template and form
/// controllers derive their template name from it.
pub fn dispatch(
    state: &AppState,
    key: &RouteKey,
    kind: &ControllerKind,
    request: &Request,
    arg: Option<&str>,
) -> Result<Response, Error> {
    match kind {
        ControllerKind::Plain(handler) => handler.index(request, arg),
        ControllerKind::Template(handler) => {
            let view = handler.index(request, arg)?;
            template::render(state.templates(), key, request, view)
        }
        ControllerKind::Form(handler) => {
            let form = handler.form(request, arg)?;
            let view = match request.method() {
                Method::Get => handler.view(request, &form, arg)?,
                Method::Post => handler.process(request, &form, arg)?,
                _ => return Err(Error::MethodNotAllowed),
            };
            template::render(state.templates(), key, request, view)
        }
        ControllerKind::Rest(handler) => {
            rest::dispatch(state.version(), handler.as_ref(), request, arg)
        }
    }
}
