//! Playhead Edits
//!
//! Split and trim operations that take the playhead as their edit point.

use crate::core::{timeline::Clip, CoreError, CoreResult, TimeSec};

/// Which edge a playhead trim replaces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimSide {
    Start,
    End,
}

/// Validates the playhead as a split point for `clip`
pub fn split_point(clip: &Clip, playhead: TimeSec) -> CoreResult<TimeSec> {
    if playhead.is_finite() && clip.interval().contains_strictly(playhead) {
        Ok(playhead)
    } else {
        Err(CoreError::InvalidSplitPoint(playhead))
    }
}

/// New interval of a playhead trim, or `None` when the trim would leave
/// nothing (or change nothing).
pub fn trim_interval(clip: &Clip, playhead: TimeSec, side: TrimSide) -> Option<(TimeSec, TimeSec)> {
    if !playhead.is_finite() || playhead < 0.0 {
        return None;
    }
    let (start, end) = match side {
        TrimSide::Start => (playhead, clip.end),
        TrimSide::End => (clip.start, playhead),
    };
    if start < end && (start, end) != (clip.start, clip.end) {
        Some((start, end))
    } else {
        None
    }
}
