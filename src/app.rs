//! The application: startup registration and the per-request entrypoint.
//!
//! An [`Application`] owns the controller [`Registry`] and the immutable
//! [`AppState`] (version string plus template collaborator). Registration
//! happens once through the builder; afterwards the application is read-only
//! and safe to share across request workers.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::controller::{self, ControllerKind};
use crate::error::Error;
use crate::http::{Request, Response};
use crate::routing::{Registry, Resolution, RouteKey, resolve};
use crate::template::TemplateEngine;

/// Immutable per-application state shared with controllers.
pub struct AppState {
    version: String,
    templates: Option<Arc<dyn TemplateEngine>>,
}

impl AppState {
    /// Creates state with the given version and optional template engine.
    pub fn new(version: impl Into<String>, templates: Option<Arc<dyn TemplateEngine>>) -> Self {
        Self {
            version: version.into(),
            templates,
        }
    }

    /// The running application's version string; folded into every computed
    /// ETag so a new deployment takes effect immediately.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The template collaborator, when configured.
    pub fn templates(&self) -> Option<&dyn TemplateEngine> {
        self.templates.as_deref()
    }
}

type Factory = Box<dyn FnOnce(&Arc<AppState>) -> ControllerKind>;

/// Collects controller registrations before the application is built.
///
/// Controllers receive the shared [`AppState`] at construction time, which
/// replaces the original runtime namespace scan with an explicit
/// registration list.
pub struct ApplicationBuilder {
    version: String,
    templates: Option<Arc<dyn TemplateEngine>>,
    registrations: Vec<(String, String, Factory)>,
}

impl ApplicationBuilder {
    /// Sets the template-rendering collaborator.
    #[must_use]
    pub fn templates(mut self, engine: Arc<dyn TemplateEngine>) -> Self {
        self.templates = Some(engine);
        self
    }

    /// Queues a controller registration under `(module, name)`.
    ///
    /// The factory runs during [`build`](Self::build) with the shared
    /// application state. Names are lower-cased at registration; a later
    /// registration for the same pair silently overwrites an earlier one.
    #[must_use]
    pub fn controller<F>(mut self, module: &str, name: &str, factory: F) -> Self
    where
        F: FnOnce(&Arc<AppState>) -> ControllerKind + 'static,
    {
        self.registrations
            .push((module.to_owned(), name.to_owned(), Box::new(factory)));
        self
    }

    /// Instantiates every queued controller and builds the application.
    ///
    /// # Errors
    ///
    /// [`Error::ReservedModule`] when a registration uses the reserved
    /// static-asset module name. Fatal: the application must not start.
    pub fn build(self) -> Result<Application, Error> {
        let state = Arc::new(AppState::new(self.version, self.templates));
        let mut registry = Registry::new();
        for (module, name, factory) in self.registrations {
            let kind = factory(&state);
            registry.register(&module, &name, kind)?;
        }
        info!(
            version = %state.version(),
            controllers = registry.len(),
            "application configured"
        );
        Ok(Application { state, registry })
    }
}

/// A configured application, ready to handle requests.
pub struct Application {
    state: Arc<AppState>,
    registry: Registry,
}

impl Application {
    /// Starts building an application with the given version string.
    pub fn builder(version: impl Into<String>) -> ApplicationBuilder {
        ApplicationBuilder {
            version: version.into(),
            templates: None,
            registrations: Vec::new(),
        }
    }

    /// The shared application state.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// The controller registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Handles one request start-to-finish: trailing-slash redirect, route
    /// resolution, registry lookup with index fallback, controller dispatch,
    /// and error-to-response conversion.
    pub fn handle(&self, request: &Request) -> Response {
        let (module, controller, remainder) = match resolve(request.path()) {
            Resolution::Redirect(location) => {
                debug!(path = %request.path(), to = %location, "redirecting trailing slash");
                return Response::redirect(location);
            }
            Resolution::Route {
                module,
                controller,
                remainder,
            } => (module, controller, remainder),
        };

        let result = self
            .registry
            .route(&module, &controller, &remainder)
            .and_then(|(key, kind, arg)| {
                debug!(route = %key, arg = ?arg, "dispatching");
                controller::dispatch(&self.state, key, kind, request, arg.as_deref())
            });

        match result {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    method = %request.method(),
                    path = %request.path(),
                    error = %err,
                    "request failed"
                );
                err.into_response()
            }
        }
    }

    /// Builds the URL for a registered controller, e.g.
    /// `url_for("hello.World", &["42"])` → `/hello/world/42`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the path is malformed or no controller is
    /// registered under the (lower-cased) pair.
    pub fn url_for(&self, controller_path: &str, args: &[&str]) -> Result<String, Error> {
        let lowered = controller_path.to_lowercase();
        let (module, controller) = lowered.split_once('.').ok_or_else(|| Error::NotFound {
            module: lowered.clone(),
            controller: String::new(),
        })?;
        let key = RouteKey::new(module, controller);
        if !self.registry.contains(&key) {
            return Err(Error::NotFound {
                module: module.to_owned(),
                controller: controller.to_owned(),
            });
        }

        let mut url = format!("/{module}/{controller}");
        for arg in args {
            url.push('/');
            url.push_str(arg);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Handler;
    use crate::http::StatusCode;

    struct Greets(&'static str);

    impl Handler for Greets {
        fn index(&self, _request: &Request, arg: Option<&str>) -> Result<Response, Error> {
            let body = match arg {
                Some(arg) => format!("{} ({arg})", self.0),
                None => self.0.to_owned(),
            };
            Ok(Response::new(StatusCode::Ok).body(body))
        }
    }

    // Mirrors the demo controller set: index/index, hello/index, hello/world.
    fn demo_app() -> Application {
        Application::builder("1.0")
            .controller("index", "Index", |_| {
                ControllerKind::Plain(Arc::new(Greets("Index Index!")))
            })
            .controller("hello", "Index", |_| {
                ControllerKind::Plain(Arc::new(Greets("Hello Index!")))
            })
            .controller("hello", "World", |_| {
                ControllerKind::Plain(Arc::new(Greets("Hello World!")))
            })
            .build()
            .unwrap()
    }

    fn get(app: &Application, path: &str) -> Response {
        let raw = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\n\r\n");
        let (req, _) = Request::parse(raw.as_bytes()).unwrap();
        app.handle(&req)
    }

    #[test]
    fn configured_controllers_are_registered() {
        let app = demo_app();
        let mut keys: Vec<String> = app.registry().keys().map(ToString::to_string).collect();
        keys.sort();
        assert_eq!(keys, vec!["hello/index", "hello/world", "index/index"]);
    }

    #[test]
    fn dispatches_to_module_index() {
        let resp = get(&demo_app(), "/");
        assert_eq!(resp.status(), StatusCode::Ok);
        assert_eq!(resp.body_ref(), b"Index Index!");
    }

    #[test]
    fn dispatches_to_index_class() {
        let resp = get(&demo_app(), "/hello");
        assert_eq!(resp.body_ref(), b"Hello Index!");
    }

    #[test]
    fn dispatches_to_named_class() {
        let resp = get(&demo_app(), "/hello/world");
        assert_eq!(resp.body_ref(), b"Hello World!");
    }

    #[test]
    fn fallback_reinjects_controller_name_as_argument() {
        let resp = get(&demo_app(), "/hello/42");
        assert_eq!(resp.body_ref(), b"Hello Index! (42)");
    }

    #[test]
    fn trailing_slash_redirects() {
        let resp = get(&demo_app(), "/hello/world/");
        assert_eq!(resp.status(), StatusCode::Found);
        assert_eq!(resp.headers().get("location"), Some("/hello/world"));
    }

    #[test]
    fn unknown_route_is_404() {
        let resp = get(&demo_app(), "/does/not/exist");
        assert_eq!(resp.status(), StatusCode::NotFound);
    }

    #[test]
    fn reserved_module_fails_build() {
        let result = Application::builder("1.0")
            .controller("static", "Index", |_| {
                ControllerKind::Plain(Arc::new(Greets("nope")))
            })
            .build();
        assert!(matches!(result, Err(Error::ReservedModule(_))));
    }

    #[test]
    fn url_for_known_controller() {
        let app = demo_app();
        assert_eq!(app.url_for("hello.World", &[]).unwrap(), "/hello/world");
        assert_eq!(
            app.url_for("Hello.World", &["jam", "cheese"]).unwrap(),
            "/hello/world/jam/cheese"
        );
    }

    #[test]
    fn url_for_unregistered_controller_fails() {
        let app = demo_app();
        assert!(matches!(
            app.url_for("peanut.Butter", &[]),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn url_for_malformed_path_fails() {
        let app = demo_app();
        assert!(app.url_for("nodot", &[]).is_err());
    }
}
