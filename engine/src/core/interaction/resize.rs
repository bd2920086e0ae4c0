//! Edge Resize
//!
//! Candidate computation for dragging one edge of a clip. Only the grabbed
//! edge moves and only that edge snaps.

use tracing::debug;

use crate::core::{
    interaction::{
        snap_targets, snap_value, CandidateFrame, Gesture, GestureDelta, InteractionContext,
        ResizeEdge,
    },
    CoreError, CoreResult,
};

pub fn resize_candidate(
    gesture: &Gesture,
    edge: ResizeEdge,
    delta: &GestureDelta,
    ctx: &InteractionContext,
) -> CoreResult<CandidateFrame> {
    let origin = &gesture.origin;
    let anchor = gesture.anchor();
    let track = origin.get_clip(&anchor.clip_id)?.track_ref();
    let targets = snap_targets(origin, track, ctx.playhead, &[anchor.clip_id.as_str()]);

    let (start, end, snapped_to) = match edge {
        ResizeEdge::Start => {
            let raw = (anchor.start + delta.delta_sec).max(0.0);
            let snapped = snap_value(raw, &targets, &ctx.snap);
            (snapped.unwrap_or(raw), anchor.end, snapped)
        }
        ResizeEdge::End => {
            let raw = anchor.end + delta.delta_sec;
            let snapped = snap_value(raw, &targets, &ctx.snap);
            (anchor.start, snapped.unwrap_or(raw), snapped)
        }
    };

    let duration = end - start;
    if duration < ctx.min_duration {
        debug!(clip_id = %anchor.clip_id, duration, "Resize frame below minimum duration");
        return Err(CoreError::BelowMinimumDuration {
            duration,
            minimum: ctx.min_duration,
        });
    }

    let mut scene = origin.clone();
    scene
        .resize_clip(&anchor.clip_id, start, end)
        .inspect_err(|e| debug!(clip_id = %anchor.clip_id, error = %e, "Resize frame rejected"))?;

    Ok(CandidateFrame { scene, snapped_to })
}
