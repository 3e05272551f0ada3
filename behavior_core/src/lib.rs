//! # Behavior Core (The Switchboard)
//!
//! The behavior/event dispatch engine at the center of a data-driven,
//! turn-based simulation. Content attaches logic to a fixed set of named
//! events; the engine invokes that logic deterministically, every turn,
//! across thousands of possible entities, without knowing anything about
//! specific content.
//!
//! ## Core Components
//!
//! - **result**: The uniform [`EventResult`] contract and its two sentinels
//! - **module**: Capability modules - named handlers plus hook metadata
//! - **registry**: Tiered module loading into one frozen catalog
//! - **hatch**: Per-entity handler overrides resolved by path reference
//! - **scheduler**: Topological ordering of turn-phase hooks
//! - **dispatch**: The core invocation primitive and the turn runner
//!
//! ## Design Philosophy
//!
//! - **Data-first**: Common cases are plain entity records with no code
//! - **Fail-fast**: A missing entity-targeted handler is an authoring bug
//!   surfaced immediately, never tolerated silently
//! - **Frozen after load**: Modules, hooks, and the turn sequence are
//!   built once at startup and never mutated

pub mod dispatch;
pub mod hatch;
pub mod module;
pub mod registry;
pub mod result;
pub mod scheduler;

pub use dispatch::*;
pub use hatch::*;
pub use module::*;
pub use registry::*;
pub use result::*;
pub use scheduler::*;
