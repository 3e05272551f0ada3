//! Turn-phase scheduling - one canonical hook order, computed at load.

use std::collections::HashMap;

use thiserror::Error;

use crate::module::{HookDeclaration, Invocation};
use crate::registry::Catalog;

/// A hook in the frozen per-turn execution sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledHook {
    pub id: String,

    /// The event dispatched when this hook fires.
    pub event: String,

    pub invocation: Invocation,

    /// Path of the module that declared the hook.
    pub owner: String,
}

/// Fatal scheduling errors, raised at load time only - never mid-game.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("hook ordering cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("hook `{hook}` orders against unknown hook `{unknown}`")]
    UnknownEdge { hook: String, unknown: String },
}

/// The fixed per-turn execution sequence.
///
/// Built once from the catalog's hook declarations and frozen for the
/// remainder of the run. The topological sort is declaration-stable:
/// among ready hooks, the earliest declared runs first, so the same
/// module set always yields the same sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnScheduler {
    sequence: Vec<ScheduledHook>,
}

impl TurnScheduler {
    /// Order every declared hook, honoring all before/after edges.
    pub fn build(catalog: &Catalog) -> Result<Self, ScheduleError> {
        let declared = catalog.hook_declarations();

        let index: HashMap<&str, usize> = declared
            .iter()
            .enumerate()
            .map(|(i, (_, hook))| (hook.id.as_str(), i))
            .collect();

        // successors[i] holds hooks that must run after hook i.
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); declared.len()];
        let mut indegree: Vec<usize> = vec![0; declared.len()];

        for (i, (_, hook)) in declared.iter().copied().enumerate() {
            for target in &hook.before {
                let j = Self::edge_target(&index, hook, target)?;
                successors[i].push(j);
                indegree[j] += 1;
            }
            for target in &hook.after {
                let j = Self::edge_target(&index, hook, target)?;
                successors[j].push(i);
                indegree[i] += 1;
            }
        }

        let mut placed = vec![false; declared.len()];
        let mut sequence = Vec::with_capacity(declared.len());

        while sequence.len() < declared.len() {
            let next = (0..declared.len()).find(|&i| !placed[i] && indegree[i] == 0);
            let Some(next) = next else {
                return Err(ScheduleError::Cycle {
                    path: Self::find_cycle(&declared, &successors, &placed),
                });
            };
            placed[next] = true;
            for &j in &successors[next] {
                indegree[j] -= 1;
            }
            let (owner, hook) = declared[next];
            sequence.push(ScheduledHook {
                id: hook.id.clone(),
                event: hook.event.clone(),
                invocation: hook.invocation,
                owner: owner.to_string(),
            });
        }

        Ok(Self { sequence })
    }

    fn edge_target(
        index: &HashMap<&str, usize>,
        hook: &HookDeclaration,
        target: &str,
    ) -> Result<usize, ScheduleError> {
        index.get(target).copied().ok_or_else(|| {
            ScheduleError::UnknownEdge {
                hook: hook.id.clone(),
                unknown: target.to_string(),
            }
        })
    }

    /// Extract one concrete cycle from the unresolved remainder of the
    /// hook graph, for the load-failure diagnostic.
    fn find_cycle(
        declared: &[(&str, &HookDeclaration)],
        successors: &[Vec<usize>],
        placed: &[bool],
    ) -> Vec<String> {
        let n = declared.len();
        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (i, targets) in successors.iter().enumerate() {
            for &j in targets {
                predecessors[j].push(i);
            }
        }

        // Every unresolved hook keeps at least one unresolved
        // predecessor, so walking predecessors must revisit a hook.
        let start = (0..n).find(|&i| !placed[i]).unwrap_or(0);
        let mut trail: Vec<usize> = vec![start];
        let mut seen: HashMap<usize, usize> = HashMap::from([(start, 0)]);
        let mut current = start;

        loop {
            let Some(&prev) = predecessors[current].iter().find(|&&p| !placed[p]) else {
                break;
            };
            if let Some(&at) = seen.get(&prev) {
                // Forward order: the repeated hook, then the trail walked
                // back from it, closing on the repeated hook again.
                let mut cycle = vec![declared[trail[at]].1.id.clone()];
                for k in (at + 1..trail.len()).rev() {
                    cycle.push(declared[trail[k]].1.id.clone());
                }
                cycle.push(declared[trail[at]].1.id.clone());
                return cycle;
            }
            seen.insert(prev, trail.len());
            trail.push(prev);
            current = prev;
        }

        trail
            .into_iter()
            .map(|i| declared[i].1.id.clone())
            .collect()
    }

    /// The frozen per-turn sequence.
    pub fn sequence(&self) -> &[ScheduledHook] {
        &self.sequence
    }

    /// The number of scheduled hooks.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether any hooks are scheduled.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}
