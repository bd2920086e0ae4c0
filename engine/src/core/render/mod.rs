//! Render Module
//!
//! Projects the scene into the flat, ordered form consumed by an encoder.

mod export;

pub use export::*;
