//! The controller registry: name → controller mapping built once at startup.
//!
//! The registry is populated while the application is constructed and never
//! mutated afterwards, so request workers may share it without locking.

use std::collections::HashMap;

use tracing::debug;

use super::RouteKey;
use crate::controller::ControllerKind;
use crate::error::Error;

/// Module name reserved for static asset serving by the transport.
pub const RESERVED_MODULE: &str = "static";

/// Maps lower-cased `(module, controller)` pairs to controller instances.
#[derive(Default)]
pub struct Registry {
    controllers: HashMap<RouteKey, ControllerKind>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under the lower-cased `(module, name)` key.
    ///
    /// Any existing registration for the same key is silently overwritten.
    ///
    /// # Errors
    ///
    /// [`Error::ReservedModule`] when `module` is the reserved static-asset
    /// namespace, regardless of the controller name.
    pub fn register(
        &mut self,
        module: &str,
        name: &str,
        controller: ControllerKind,
    ) -> Result<(), Error> {
        let module = module.to_lowercase();
        if module == RESERVED_MODULE {
            return Err(Error::ReservedModule(module));
        }
        let key = RouteKey::new(module, name.to_lowercase());
        debug!(route = %key, "registered controller");
        self.controllers.insert(key, controller);
        Ok(())
    }

    /// Looks up the controller for `(module, controller)`, applying the
    /// index fallback.
    ///
    /// On a direct miss with a controller name other than `"index"`, the
    /// lookup retries `(module, "index")` and re-injects the failed
    /// controller name into the effective argument (joined to the remainder
    /// with `/`). A second miss — or a direct miss when the controller
    /// already is `"index"` — is a definitive not-found; no further fallback
    /// is attempted.
    ///
    /// Returns the canonical stored key, the controller, and the effective
    /// argument (`None` when there is nothing to pass).
    pub fn route(
        &self,
        module: &str,
        controller: &str,
        remainder: &str,
    ) -> Result<(&RouteKey, &ControllerKind, Option<String>), Error> {
        let key = RouteKey::new(module, controller);
        if let Some((stored, kind)) = self.controllers.get_key_value(&key) {
            let arg = (!remainder.is_empty()).then(|| remainder.to_owned());
            return Ok((stored, kind, arg));
        }

        if controller != "index" {
            let fallback = RouteKey::new(module, "index");
            if let Some((stored, kind)) = self.controllers.get_key_value(&fallback) {
                let arg = if remainder.is_empty() {
                    controller.to_owned()
                } else {
                    format!("{controller}/{remainder}")
                };
                return Ok((stored, kind, Some(arg)));
            }
        }

        Err(Error::NotFound {
            module: module.to_owned(),
            controller: controller.to_owned(),
        })
    }

    /// Returns `true` when a controller is registered under `key`.
    pub fn contains(&self, key: &RouteKey) -> bool {
        self.controllers.contains_key(key)
    }

    /// Number of registered controllers.
    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    /// Iterates over the registered route keys.
    pub fn keys(&self) -> impl Iterator<Item = &RouteKey> {
        self.controllers.keys()
    }
}
