//! Per-entity handler overrides ("escape hatches").
//!
//! An entity may name an external function that fully supersedes a
//! module's default handling of one event, via the reserved property
//! `<event_name>_handler` holding a `module/path::function` reference.
//! Resolution failure is deliberately soft - the dispatcher logs it and
//! falls back to the module default - because a hatch is an optional
//! per-entity override, not structural wiring like a declared module.

use std::cell::RefCell;
use std::collections::HashMap;

use thiserror::Error;
use tracing::warn;

use crate::module::EventHandler;

/// Separator between module path and function name in a handler
/// reference.
pub const REFERENCE_SEPARATOR: &str = "::";

/// Soft resolution failures for handler references.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HatchError {
    #[error("malformed handler reference `{reference}` (expected `module/path::function`)")]
    Malformed { reference: String },

    #[error("handler reference `{reference}` names no registered function")]
    Unknown { reference: String },
}

/// Init-time registry of externally addressable handler functions.
#[derive(Debug, Clone, Default)]
pub struct HatchLibrary {
    functions: HashMap<String, EventHandler>,
}

impl HatchLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function under `module::function`.
    pub fn register(
        &mut self,
        module: impl AsRef<str>,
        function: impl AsRef<str>,
        handler: EventHandler,
    ) -> &mut Self {
        let key = format!(
            "{}{}{}",
            module.as_ref(),
            REFERENCE_SEPARATOR,
            function.as_ref()
        );
        self.functions.insert(key, handler);
        self
    }

    fn get(&self, reference: &str) -> Option<EventHandler> {
        self.functions.get(reference).copied()
    }

    /// The number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Memoizing resolver for handler references.
///
/// The same reference string resolves to the same function for the
/// remainder of the run. Failed resolutions are cached too, so the
/// diagnostic for a bad reference is logged once, not per dispatch.
#[derive(Debug)]
pub struct HatchResolver {
    library: HatchLibrary,
    cache: RefCell<HashMap<String, Result<EventHandler, HatchError>>>,
}

impl HatchResolver {
    /// Create a resolver over a function library.
    pub fn new(library: HatchLibrary) -> Self {
        Self {
            library,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Resolve a handler reference to its registered function.
    pub fn resolve(&self, reference: &str) -> Result<EventHandler, HatchError> {
        if let Some(cached) = self.cache.borrow().get(reference) {
            return cached.clone();
        }

        let result = self.look_up(reference);
        self.cache
            .borrow_mut()
            .insert(reference.to_string(), result.clone());
        result
    }

    fn look_up(&self, reference: &str) -> Result<EventHandler, HatchError> {
        let malformed = match reference.split_once(REFERENCE_SEPARATOR) {
            Some((module, function)) => module.is_empty() || function.is_empty(),
            None => true,
        };
        if malformed {
            warn!(
                "malformed handler reference `{}`; using module default",
                reference
            );
            return Err(HatchError::Malformed {
                reference: reference.to_string(),
            });
        }

        match self.library.get(reference) {
            Some(handler) => Ok(handler),
            None => {
                warn!(
                    "handler reference `{}` names no registered function; using module default",
                    reference
                );
                Err(HatchError::Unknown {
                    reference: reference.to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::EventContext;
    use crate::result::EventResult;
    use world_model::{EntityId, WorldState};

    fn ignite_idol(_: Option<&EntityId>, _: &mut WorldState, _: &EventContext) -> EventResult {
        EventResult::deny("the idol refuses to burn")
    }

    fn resolver() -> HatchResolver {
        let mut library = HatchLibrary::new();
        library.register("demo/curses", "ignite_idol", ignite_idol);
        HatchResolver::new(library)
    }

    #[test]
    fn test_resolves_registered_reference() {
        let resolver = resolver();
        let handler = resolver
            .resolve("demo/curses::ignite_idol")
            .expect("registered");

        let mut world = WorldState::new();
        let result = handler(None, &mut world, &EventContext::new());
        assert_eq!(result.feedback(), Some("the idol refuses to burn"));
    }

    #[test]
    fn test_resolution_is_stable_across_calls() {
        let resolver = resolver();
        let mut world = WorldState::new();
        let ctx = EventContext::new();

        let first = resolver.resolve("demo/curses::ignite_idol").unwrap();
        let second = resolver.resolve("demo/curses::ignite_idol").unwrap();
        assert_eq!(
            first(None, &mut world, &ctx),
            second(None, &mut world, &ctx)
        );
    }

    #[test]
    fn test_malformed_references() {
        let resolver = resolver();
        for reference in ["no_separator", "::ignite_idol", "demo/curses::"] {
            assert_eq!(
                resolver.resolve(reference),
                Err(HatchError::Malformed {
                    reference: reference.to_string()
                })
            );
        }
    }

    #[test]
    fn test_unknown_reference_fails_consistently() {
        let resolver = resolver();
        let expected = Err(HatchError::Unknown {
            reference: "demo/curses::missing".to_string(),
        });
        assert_eq!(resolver.resolve("demo/curses::missing"), expected);
        // Cached failure keeps failing the same way.
        assert_eq!(resolver.resolve("demo/curses::missing"), expected);
    }
}
