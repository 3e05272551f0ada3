//! Init-time registration of loadable modules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::module::CapabilityModule;

/// Priority tiers sharing one flat module namespace.
///
/// Each tier is a separate content source contributing modules under the
/// same paths. When two tiers define the same path, the higher-priority
/// tier's module wins entirely; fields are never merged across tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Content-specific modules, highest priority.
    Content,
    /// Shared-library modules.
    Library,
    /// Generic-core modules, lowest priority.
    Core,
}

impl Tier {
    /// Priority rank; lower ranks override higher ones.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Tier::Content => 0,
            Tier::Library => 1,
            Tier::Core => 2,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Tier::Content => "content",
            Tier::Library => "library",
            Tier::Core => "core",
        };
        write!(f, "{}", label)
    }
}

/// Error returned by a module loader that cannot produce its module.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ModuleError(pub String);

/// A module constructor registered under a tier and path.
pub type ModuleLoader = fn() -> Result<CapabilityModule, ModuleError>;

/// The registration step standing in for dynamic code loading: a map
/// from (tier, stable path string) to module constructor, assembled at
/// init time before the catalog is built.
#[derive(Debug, Clone, Default)]
pub struct ModuleLibrary {
    loaders: HashMap<(Tier, String), ModuleLoader>,
}

impl ModuleLibrary {
    /// Create an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader under a tier and module path. The last
    /// registration for a (tier, path) pair wins.
    pub fn register(&mut self, tier: Tier, path: impl Into<String>, loader: ModuleLoader) -> &mut Self {
        self.loaders.insert((tier, path.into()), loader);
        self
    }

    /// Whether a loader is registered for a tier and path.
    pub fn contains(&self, tier: Tier, path: &str) -> bool {
        self.loaders.contains_key(&(tier, path.to_string()))
    }

    /// The loader registered for a tier and path.
    pub fn loader(&self, tier: Tier, path: &str) -> Option<ModuleLoader> {
        self.loaders.get(&(tier, path.to_string())).copied()
    }

    /// The number of registered loaders.
    pub fn len(&self) -> usize {
        self.loaders.len()
    }

    /// Whether the library is empty.
    pub fn is_empty(&self) -> bool {
        self.loaders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_module() -> Result<CapabilityModule, ModuleError> {
        Ok(CapabilityModule::new("core/empty"))
    }

    #[test]
    fn test_register_and_look_up() {
        let mut library = ModuleLibrary::new();
        assert!(library.is_empty());

        library.register(Tier::Core, "core/empty", empty_module);

        assert!(library.contains(Tier::Core, "core/empty"));
        assert!(!library.contains(Tier::Content, "core/empty"));
        assert!(!library.contains(Tier::Core, "core/missing"));
        assert_eq!(library.len(), 1);

        let loader = library.loader(Tier::Core, "core/empty").expect("registered");
        assert_eq!(loader().unwrap().path(), "core/empty");
    }

    #[test]
    fn test_tiers_hold_independent_definitions() {
        fn content_variant() -> Result<CapabilityModule, ModuleError> {
            Ok(CapabilityModule::new("core/empty"))
        }
        let mut library = ModuleLibrary::new();
        library.register(Tier::Core, "core/empty", empty_module);
        library.register(Tier::Content, "core/empty", content_variant);

        assert_eq!(library.len(), 2);
        assert!(library.loader(Tier::Core, "core/empty").is_some());
        assert!(library.loader(Tier::Content, "core/empty").is_some());
    }

    #[test]
    fn test_tier_display_labels() {
        assert_eq!(Tier::Content.to_string(), "content");
        assert_eq!(Tier::Library.to_string(), "library");
        assert_eq!(Tier::Core.to_string(), "core");
    }
}
