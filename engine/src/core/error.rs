//! Sniply Error Definitions
//!
//! Defines error types used throughout the engine. Every timeline failure is
//! recoverable: the state it was raised against is left untouched.

use thiserror::Error;

use super::timeline::TrackKind;
use super::{AssetId, ClipId, TimeSec, TrackIndex};

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Project Errors
    // =========================================================================
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    #[error("Project file corrupted: {0}")]
    ProjectCorrupted(String),

    // =========================================================================
    // Asset Errors
    // =========================================================================
    #[error("Asset not found: {0}")]
    AssetNotFound(AssetId),

    #[error("Asset import failed: {0}")]
    AssetImportFailed(String),

    // =========================================================================
    // Timeline Errors
    // =========================================================================
    #[error("Clip not found: {0}")]
    UnknownClip(ClipId),

    #[error("Track not found: {kind} #{index}")]
    UnknownTrack { kind: TrackKind, index: TrackIndex },

    #[error("Invalid interval: {0}~{1} seconds")]
    InvalidInterval(TimeSec, TimeSec),

    #[error("Invalid split point: {0} seconds")]
    InvalidSplitPoint(TimeSec),

    #[error(
        "Clip overlap on {kind} track #{track_index}: {new_start:.3}~{new_end:.3}s conflicts with clip {existing_clip_id}"
    )]
    Overlap {
        kind: TrackKind,
        track_index: TrackIndex,
        existing_clip_id: ClipId,
        new_start: TimeSec,
        new_end: TimeSec,
    },

    #[error("Clip duration {duration:.3}s is below the minimum of {minimum:.3}s")]
    BelowMinimumDuration { duration: TimeSec, minimum: TimeSec },

    #[error("Clip kind {clip} cannot be placed on a {track} track")]
    KindMismatch { clip: TrackKind, track: TrackKind },

    #[error("Transition {from} -> {to} requires two time-adjacent clips on the same track")]
    TransitionAdjacencyViolation { from: ClipId, to: ClipId },

    // =========================================================================
    // Selection Errors
    // =========================================================================
    #[error("Selection is empty")]
    EmptySelection,

    // =========================================================================
    // Gesture Errors
    // =========================================================================
    #[error("A gesture is already in progress")]
    GestureInProgress,

    #[error("No gesture in progress")]
    NoActiveGesture,

    // =========================================================================
    // History Errors
    // =========================================================================
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // =========================================================================
    // Collaborator Errors
    // =========================================================================
    #[error("Effect processing failed: {0}")]
    EffectFailed(String),

    #[error("Export failed: {0}")]
    ExportFailed(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// True for the expected, user-caused rejections of a timeline edit.
    ///
    /// Hosts use this to distinguish "the edit was refused" from real faults.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidInterval(..)
                | CoreError::InvalidSplitPoint(_)
                | CoreError::Overlap { .. }
                | CoreError::BelowMinimumDuration { .. }
                | CoreError::KindMismatch { .. }
                | CoreError::TransitionAdjacencyViolation { .. }
                | CoreError::EmptySelection
                | CoreError::UnknownClip(_)
                | CoreError::UnknownTrack { .. }
        )
    }
}
