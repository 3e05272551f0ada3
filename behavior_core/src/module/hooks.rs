//! Turn-phase hook declarations contributed by modules.

use serde::{Deserialize, Serialize};

/// How a hook's event is fired each turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Invocation {
    /// Dispatched once per participating entity.
    Entity,
    /// Dispatched once globally per turn.
    Global,
}

/// A named point in the per-turn execution cycle.
///
/// Each hook is declared by exactly one module (its owner) and may carry
/// ordering edges against other hook ids. The scheduler resolves all
/// edges into one canonical sequence at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookDeclaration {
    /// Unique hook id.
    pub id: String,

    /// The event dispatched when this hook fires. Defaults to the hook id.
    pub event: String,

    pub invocation: Invocation,

    /// Hook ids this hook must run before.
    #[serde(default)]
    pub before: Vec<String>,

    /// Hook ids this hook must run after.
    #[serde(default)]
    pub after: Vec<String>,
}

impl HookDeclaration {
    /// Declare a hook whose event name is the hook id.
    pub fn new(id: impl Into<String>, invocation: Invocation) -> Self {
        let id = id.into();
        Self {
            event: id.clone(),
            id,
            invocation,
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Tie the hook to a different event name.
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.event = event.into();
        self
    }

    /// Constrain this hook to run before another.
    pub fn runs_before(mut self, other: impl Into<String>) -> Self {
        self.before.push(other.into());
        self
    }

    /// Constrain this hook to run after another.
    pub fn runs_after(mut self, other: impl Into<String>) -> Self {
        self.after.push(other.into());
        self
    }
}
