//! Capability modules - self-contained units of behavior logic.

mod hooks;

pub use hooks::*;

use std::collections::HashMap;

use crate::dispatch::EventContext;
use crate::result::EventResult;
use world_model::{EntityId, WorldState};

/// An event or command handler.
///
/// Handlers receive the target entity (absent on the global path), the
/// mutable world accessor, and the auxiliary event context. Plain
/// function pointers keep the module surface an explicit init-time
/// registry rather than live reflection.
pub type EventHandler = fn(Option<&EntityId>, &mut WorldState, &EventContext) -> EventResult;

/// A self-contained unit of logic addressable by a stable path string.
///
/// A module holds named event handlers, the vocabulary (verb to command
/// handler) it contributes, and its turn-phase hook declarations. Modules
/// are immutable once loaded for the remainder of a process run.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityModule {
    path: String,
    handlers: HashMap<String, EventHandler>,
    commands: HashMap<String, EventHandler>,
    hooks: Vec<HookDeclaration>,
}

impl CapabilityModule {
    /// Create an empty module under a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            handlers: HashMap::new(),
            commands: HashMap::new(),
            hooks: Vec::new(),
        }
    }

    /// Register a handler for a named event.
    pub fn with_handler(mut self, event: impl Into<String>, handler: EventHandler) -> Self {
        self.handlers.insert(event.into(), handler);
        self
    }

    /// Register a command handler for a verb.
    pub fn with_command(mut self, verb: impl Into<String>, handler: EventHandler) -> Self {
        self.commands.insert(verb.into(), handler);
        self
    }

    /// Declare a turn-phase hook owned by this module.
    pub fn with_hook(mut self, hook: HookDeclaration) -> Self {
        self.hooks.push(hook);
        self
    }

    /// The module's stable path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The handler for an event, if this module implements it.
    pub fn handler(&self, event: &str) -> Option<EventHandler> {
        self.handlers.get(event).copied()
    }

    /// Whether this module implements an event.
    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    /// The command handler for a verb, if this module contributes it.
    pub fn command(&self, verb: &str) -> Option<EventHandler> {
        self.commands.get(verb).copied()
    }

    /// The events this module implements.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// The verbs this module contributes.
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    /// The hooks this module declares.
    pub fn hooks(&self) -> &[HookDeclaration] {
        &self.hooks
    }
}
