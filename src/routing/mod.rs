//! Convention-based URL routing.
//!
//! A request path is resolved into a `(module, controller, remainder)`
//! triple by [`resolver::resolve`], then looked up in the [`Registry`] built
//! at application startup:
//!
//! ```text
//! /wiki              => (wiki, index)
//! /wiki/list         => (wiki, list)         — or (wiki, index) with "list"
//! /wiki/page/45/edit => (wiki, page) + "45/edit"
//! ```

use std::fmt;

pub mod registry;
pub mod resolver;

pub use registry::Registry;
pub use resolver::{Resolution, resolve};

/// Identifies one registered controller: a `(module, controller)` name pair.
///
/// Keys stored in the registry are always lower-case (registration
/// normalizes them); keys built from incoming paths are used verbatim, so a
/// request for `/Wiki` does not match a controller registered as `wiki`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    module: String,
    controller: String,
}

impl RouteKey {
    /// Builds a key from the given names, unmodified.
    pub fn new(module: impl Into<String>, controller: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            controller: controller.into(),
        }
    }

    /// The module name.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// The controller name.
    pub fn controller(&self) -> &str {
        &self.controller
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.controller)
    }
}
