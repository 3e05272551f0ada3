//! The tiered module catalog, built once at startup and frozen.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use super::{EventTable, ModuleError, ModuleLibrary, Tier};
use crate::module::{CapabilityModule, EventHandler, HookDeclaration, Invocation};

/// Fatal load-time errors.
///
/// A declared-but-broken module is an authoring error that aborts the
/// whole load; it is never downgraded to a soft failure.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("module `{path}` is declared at the {tier} tier but not registered in the library")]
    Unregistered { tier: Tier, path: String },

    #[error("module `{path}` failed to load: {reason}")]
    Failed { path: String, reason: ModuleError },

    #[error("module registered as `{declared}` reports path `{actual}`")]
    PathMismatch { declared: String, actual: String },

    #[error("hook `{hook}` is declared by both `{first}` and `{second}`")]
    DuplicateHook {
        hook: String,
        first: String,
        second: String,
    },
}

/// The ordered, deduplicated-by-path module catalog.
///
/// Built once at startup from the declared (tier, path) list; read-only
/// afterward. No handler is added or removed at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    modules: HashMap<String, CapabilityModule>,
    order: Vec<String>,
    events: EventTable,
    global_handlers: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Load every declared module from the library.
    ///
    /// Declarations are given highest-priority tier first. Tier
    /// collisions on the same path keep only the highest-priority
    /// definition, wholesale. Any declared module that is unregistered,
    /// fails to load, or reports a mismatched path aborts the whole
    /// load, as does a hook id declared by two modules.
    pub fn load(declared: &[(Tier, &str)], library: &ModuleLibrary) -> Result<Self, LoadError> {
        let mut loaded: HashMap<String, (Tier, CapabilityModule)> = HashMap::new();
        let mut order: Vec<String> = Vec::new();

        for &(tier, path) in declared {
            let loader = library
                .loader(tier, path)
                .ok_or_else(|| LoadError::Unregistered {
                    tier,
                    path: path.to_string(),
                })?;
            let module = loader().map_err(|reason| LoadError::Failed {
                path: path.to_string(),
                reason,
            })?;
            if module.path() != path {
                return Err(LoadError::PathMismatch {
                    declared: path.to_string(),
                    actual: module.path().to_string(),
                });
            }

            let replace = match loaded.get(path) {
                None => {
                    order.push(path.to_string());
                    true
                }
                Some((existing, _)) => tier.rank() < existing.rank(),
            };
            if replace {
                loaded.insert(path.to_string(), (tier, module));
            }
        }

        let modules: HashMap<String, CapabilityModule> = loaded
            .into_iter()
            .map(|(path, (_, module))| (path, module))
            .collect();

        // Each hook id belongs to exactly one module.
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for path in &order {
            for hook in modules[path].hooks() {
                if let Some(first) = owners.insert(hook.id.as_str(), path.as_str()) {
                    return Err(LoadError::DuplicateHook {
                        hook: hook.id.clone(),
                        first: first.to_string(),
                        second: path.clone(),
                    });
                }
            }
        }

        let events = EventTable::build(&order, &modules);
        let global_handlers = Self::register_global_handlers(&order, &modules);

        Ok(Self {
            modules,
            order,
            events,
            global_handlers,
        })
    }

    /// Load-time global registration: for every event tied to a global
    /// hook, the modules implementing a handler for it in catalog order.
    /// The dispatcher's global path consults this map, never live entity
    /// introspection.
    fn register_global_handlers(
        order: &[String],
        modules: &HashMap<String, CapabilityModule>,
    ) -> HashMap<String, Vec<String>> {
        let mut global_events: BTreeSet<String> = BTreeSet::new();
        for path in order {
            for hook in modules[path].hooks() {
                if hook.invocation == Invocation::Global {
                    global_events.insert(hook.event.clone());
                }
            }
        }

        let mut registered = HashMap::new();
        for event in &global_events {
            let providers: Vec<String> = order
                .iter()
                .filter(|path| modules[path.as_str()].handles(event))
                .cloned()
                .collect();
            if !providers.is_empty() {
                registered.insert(event.clone(), providers);
            }
        }
        registered
    }

    /// The module at a path.
    pub fn module(&self, path: &str) -> Option<&CapabilityModule> {
        self.modules.get(path)
    }

    /// Whether a module path is in the catalog.
    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Module paths in catalog (first-declaration) order.
    pub fn module_paths(&self) -> &[String] {
        &self.order
    }

    /// The number of cataloged modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// The hook/event declaration table.
    pub fn events(&self) -> &EventTable {
        &self.events
    }

    /// Catalog modules implementing an event, in catalog order.
    pub fn modules_implementing(&self, event: &str) -> &[String] {
        self.events.providers(event)
    }

    /// Modules registered at load time for a global event, in catalog
    /// order. Empty when nothing in the catalog cares about the event.
    pub fn global_handlers(&self, event: &str) -> &[String] {
        self.global_handlers
            .get(event)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every hook declaration with its owning module path, in catalog
    /// order.
    pub fn hook_declarations(&self) -> Vec<(&str, &HookDeclaration)> {
        self.order
            .iter()
            .flat_map(|path| {
                self.modules[path]
                    .hooks()
                    .iter()
                    .map(move |hook| (path.as_str(), hook))
            })
            .collect()
    }

    /// Resolve a verb through module vocabulary, in catalog order. The
    /// first module contributing the verb wins.
    pub fn command(&self, verb: &str) -> Option<(&str, EventHandler)> {
        self.order.iter().find_map(|path| {
            self.modules[path]
                .command(verb)
                .map(|handler| (path.as_str(), handler))
        })
    }
}
