//! Sniply Core Engine
//!
//! Timeline editing engine: scene model, interaction, selection, history,
//! persistence and the collaborator seams for media, effects and export.

pub mod assets;
pub mod commands;
pub mod effects;
pub mod fs;
pub mod interaction;
pub mod project;
pub mod render;
pub mod selection;
pub mod session;
pub mod settings;
pub mod timeline;

// Re-export common types
mod types;
pub use types::*;

mod error;
pub use error::*;
