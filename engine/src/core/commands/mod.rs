//! Edit Command System
//!
//! All undoable editing operations are performed through Commands in this
//! module; the executor snapshots state around each one.

mod asset;
mod clip;
mod effect;
mod executor;
mod traits;
mod transition;

pub use asset::*;
pub use clip::*;
pub use effect::*;
pub use executor::*;
pub use traits::*;
pub use transition::*;
