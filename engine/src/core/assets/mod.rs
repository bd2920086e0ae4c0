//! Asset Management Module
//!
//! Asset records and the media probing seam used at import time.

mod models;
mod probe;

pub use models::*;
pub use probe::*;
