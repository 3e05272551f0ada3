//! The hook/event declaration table built from module metadata.

use std::collections::HashMap;

use crate::module::{CapabilityModule, Invocation};

/// What the catalog knows about one named event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventInfo {
    /// The turn-phase hook this event is tied to, if any.
    pub hook: Option<String>,

    /// Whether the event fires on the global dispatch path.
    pub global: bool,

    /// Module paths providing a handler, in catalog order.
    pub providers: Vec<String>,
}

/// Which events exist, which turn-phase hook (if any) each is tied to,
/// and which modules provide handlers - assembled once at load time from
/// module metadata, read-only afterward.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventTable {
    events: HashMap<String, EventInfo>,
}

impl EventTable {
    pub(crate) fn build(order: &[String], modules: &HashMap<String, CapabilityModule>) -> Self {
        let mut events: HashMap<String, EventInfo> = HashMap::new();

        for path in order {
            let module = &modules[path];
            for event in module.events() {
                events
                    .entry(event.to_string())
                    .or_default()
                    .providers
                    .push(path.clone());
            }
            for hook in module.hooks() {
                let info = events.entry(hook.event.clone()).or_default();
                info.hook = Some(hook.id.clone());
                info.global = hook.invocation == Invocation::Global;
            }
        }

        Self { events }
    }

    /// Whether an event is known to the catalog.
    pub fn contains(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    /// Everything known about an event.
    pub fn info(&self, event: &str) -> Option<&EventInfo> {
        self.events.get(event)
    }

    /// Module paths providing a handler for an event, in catalog order.
    pub fn providers(&self, event: &str) -> &[String] {
        self.events
            .get(event)
            .map(|info| info.providers.as_slice())
            .unwrap_or(&[])
    }

    /// All known event names, sorted for stable diagnostics.
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.events.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The number of known events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
