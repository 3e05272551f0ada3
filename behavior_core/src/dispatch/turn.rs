//! The per-turn walk over the precomputed hook sequence.

use serde::{Deserialize, Serialize};

use super::{DispatchError, Dispatcher, EventContext};
use crate::module::Invocation;
use crate::result::EventResult;
use crate::scheduler::ScheduledHook;
use world_model::{EntityId, WorldState};

/// Feedback produced by one hook firing during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnEntry {
    pub hook: String,
    pub event: String,
    pub feedback: String,
}

/// Everything one full turn produced, for the narration layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnReport {
    /// The turn this report covers.
    pub turn: u64,

    /// Feedback entries in execution order. Quiet hook firings (ignored,
    /// or responses without feedback) leave no entry.
    pub entries: Vec<TurnEntry>,
}

impl TurnReport {
    /// All feedback joined in execution order.
    pub fn transcript(&self) -> String {
        self.entries
            .iter()
            .map(|entry| entry.feedback.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Dispatcher {
    /// Run one full turn.
    ///
    /// Walks the frozen hook sequence once: a global hook dispatches its
    /// event exactly once on the global path; an entity hook sweeps the
    /// world in insertion order and dispatches its event to each entity
    /// whose attached modules implement it. Entities that do not
    /// participate in a phase are skipped, not errors. Advances the turn
    /// counter after the sweep.
    pub fn run_turn(&self, world: &mut WorldState) -> Result<TurnReport, DispatchError> {
        let ctx = EventContext::new();
        let mut report = TurnReport {
            turn: world.turn(),
            entries: Vec::new(),
        };

        for hook in self.scheduler().sequence() {
            match hook.invocation {
                Invocation::Global => {
                    let result = self.invoke(world, None, &hook.event, &ctx)?;
                    record(&mut report, hook, result);
                }
                Invocation::Entity => {
                    // Snapshot ids up front: handlers may spawn or remove
                    // entities mid-sweep.
                    let ids: Vec<EntityId> = world.entity_ids().to_vec();
                    for id in ids {
                        if !world.contains(&id) {
                            continue;
                        }
                        let result = self.dispatch_entity(world, &id, &hook.event, &ctx)?;
                        if result.is_no_handler() {
                            continue;
                        }
                        record(&mut report, hook, result);
                    }
                }
            }
        }

        world.advance_turn();
        Ok(report)
    }
}

fn record(report: &mut TurnReport, hook: &ScheduledHook, result: EventResult) {
    if let Some(feedback) = result.feedback() {
        if !feedback.is_empty() {
            report.entries.push(TurnEntry {
                hook: hook.id.clone(),
                event: hook.event.clone(),
                feedback: feedback.to_string(),
            });
        }
    }
}
