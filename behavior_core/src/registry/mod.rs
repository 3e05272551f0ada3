//! Module discovery, loading, and tier layering.
//!
//! Three priority tiers contribute modules under one flat namespace; the
//! registry resolves collisions module-wholesale and produces a single
//! addressable [`Catalog`], frozen for the remainder of the run.

mod catalog;
mod events;
mod library;

pub use catalog::*;
pub use events::*;
pub use library::*;
