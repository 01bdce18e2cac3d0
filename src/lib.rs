//! # senko
//!
//! A convention-over-configuration web micro-framework: URL paths map to
//! controllers by naming convention, controllers dispatch through layered
//! contracts (plain, template-rendering, form-processing, REST), and REST
//! responses get ETag/conditional-GET caching for free.
//!
//! ```text
//! /wiki              => (wiki, index)
//! /wiki/list         => (wiki, list)
//! /wiki/page/45/edit => (wiki, page) with argument "45/edit"
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use senko::{Application, ControllerKind, Error, Handler, Request, Response, Server, StatusCode};
//!
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn index(&self, _request: &Request, _arg: Option<&str>) -> Result<Response, Error> {
//!         Ok(Response::new(StatusCode::Ok).body("Hello, World!"))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Application::builder("1.0")
//!         .controller("index", "Index", |_| ControllerKind::Plain(Arc::new(Hello)))
//!         .build()?;
//!
//!     let server = Server::bind("127.0.0.1:8080").await?;
//!     println!("Listening on http://127.0.0.1:8080");
//!     server.run(app).await?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod caching;
pub mod controller;
pub mod error;
pub mod http;
pub mod rest;
pub mod routing;
pub mod server;
pub mod template;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use app::{AppState, Application, ApplicationBuilder};
pub use caching::{CachePolicy, EtagSet, compute_etag, quote_etag};
pub use controller::{ControllerKind, FormHandler, FormState, Handler, View, ViewHandler};
pub use error::Error;
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use rest::{RestHandler, RestOutcome};
pub use routing::{Registry, Resolution, RouteKey, resolve};
pub use server::{Server, ServerError};
pub use template::{RenderData, TemplateEngine};
