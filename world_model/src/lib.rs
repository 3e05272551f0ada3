//! # World Model
//!
//! The world surface of the Switchboard - entity records, the mutable
//! world-state graph, and the data-driven content surface. This crate is
//! the substrate every behavior handler reads and mutates; it knows
//! nothing about events, modules, or dispatch.

pub mod content;
pub mod entities;
pub mod world_state;

pub use content::*;
pub use entities::*;
pub use world_state::*;
