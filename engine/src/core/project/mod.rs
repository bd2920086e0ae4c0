//! Project Management Module
//!
//! Handles project state and its persisted document form.

mod snapshot;
mod state;

pub use snapshot::*;
pub use state::*;
