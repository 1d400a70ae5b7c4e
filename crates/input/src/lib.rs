//! Navigation input: raw pointer samples mapped to orbit actions.
//!
//! # Invariants
//! - Controls consume [`NavAction`]s, never raw window events.
//! - This crate knows nothing about the windowing backend.

pub mod action;
pub mod pointer;

pub use action::NavAction;
pub use pointer::{PointerButton, PointerTracker};

pub fn crate_info() -> &'static str {
    "cubeview-input v0.1.0"
}
