//! # System Module
//!
//! The stage contract shared by the orchestrator and every stage
//! implementation.
//!
//! The core never spawns processes itself; the application crate provides
//! process-backed [`Stage`] implementations and tests provide in-memory ones.

mod stage;

pub use stage::*;
