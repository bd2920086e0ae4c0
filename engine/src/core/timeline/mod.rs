//! Timeline Module
//!
//! Tracks, clips and transitions, plus the scene that keeps them consistent.

mod models;
mod scene;
mod transitions;

pub use models::*;
pub use scene::*;
pub use transitions::*;
