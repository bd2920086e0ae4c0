//! Drag/Move
//!
//! Candidate computation for dragging one clip, or a selection of clips, along
//! the timeline.

use tracing::debug;

use crate::core::{
    interaction::{
        destination_track, snap_interval, snap_targets, CandidateFrame, Gesture, GestureDelta,
        InteractionContext,
    },
    timeline::ClipPlacement,
    CoreError, CoreResult,
};

/// Single-clip move: may change track row, start clamped at zero
pub fn drag_candidate(
    gesture: &Gesture,
    delta: &GestureDelta,
    ctx: &InteractionContext,
) -> CoreResult<CandidateFrame> {
    let origin = &gesture.origin;
    let anchor = gesture.anchor();
    let duration = anchor.duration();
    let dest = destination_track(origin, anchor, delta.delta_tracks)?;

    let raw_start = (anchor.start + delta.delta_sec).max(0.0);
    let targets = snap_targets(origin, dest, ctx.playhead, &[anchor.clip_id.as_str()]);
    let snapped = snap_interval(raw_start, duration, &targets, &ctx.snap);
    // An end snap may push the start below zero; the clamp wins over the snap
    let (start, end, snapped_to) = if snapped.start < 0.0 {
        (0.0, duration, None)
    } else {
        (snapped.start, snapped.end, snapped.snapped_to)
    };

    let mut scene = origin.clone();
    scene
        .apply_placements(&[ClipPlacement::new(&anchor.clip_id, start, end, dest.index)])
        .inspect_err(|e| debug!(clip_id = %anchor.clip_id, error = %e, "Drag frame rejected"))?;

    Ok(CandidateFrame { scene, snapped_to })
}

/// Group move: every member shifts by the anchor's snapped delta, tracks unchanged
pub fn group_drag_candidate(
    gesture: &Gesture,
    delta: &GestureDelta,
    ctx: &InteractionContext,
) -> CoreResult<CandidateFrame> {
    let origin = &gesture.origin;
    let anchor = gesture.anchor();
    let anchor_track = origin.get_clip(&anchor.clip_id)?.track_ref();

    let members: Vec<&str> = gesture.members.iter().map(|m| m.clip_id.as_str()).collect();
    let targets = snap_targets(origin, anchor_track, ctx.playhead, &members);
    let snapped = snap_interval(
        anchor.start + delta.delta_sec,
        anchor.duration(),
        &targets,
        &ctx.snap,
    );
    let effective_delta = snapped.start - anchor.start;

    let mut placements = Vec::with_capacity(gesture.members.len());
    for member in &gesture.members {
        let (start, end) = if member.clip_id == anchor.clip_id {
            (snapped.start, snapped.end)
        } else {
            (member.start + effective_delta, member.end + effective_delta)
        };
        if start < 0.0 {
            debug!(clip_id = %member.clip_id, start, "Group drag frame rejected below zero");
            return Err(CoreError::InvalidInterval(start, end));
        }
        placements.push(ClipPlacement::new(&member.clip_id, start, end, member.track_index));
    }
    let snapped_to = snapped.snapped_to;

    let mut scene = origin.clone();
    scene
        .apply_placements(&placements)
        .inspect_err(|e| debug!(error = %e, "Group drag frame rejected"))?;

    Ok(CandidateFrame { scene, snapped_to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        interaction::{gesture_candidate, SnapConfig},
        timeline::{Clip, Scene, TrackKind, TrackRef},
    };

    fn v(index: usize) -> TrackRef {
        TrackRef::new(TrackKind::Video, index)
    }

    fn scene_with(clips: &[(&str, f64, f64, usize)]) -> Scene {
        let mut scene = Scene::new();
        for (id, start, end, track) in clips {
            scene
                .add_clip(
                    v(*track),
                    Clip::new(TrackKind::Video, "src", 60.0)
                        .with_id(id)
                        .with_interval(*start, *end),
                )
                .unwrap();
        }
        scene
    }

    fn no_snap() -> InteractionContext {
        InteractionContext {
            snap: SnapConfig {
                enabled: false,
                epsilon: 0.1,
            },
            ..InteractionContext::default()
        }
    }

    #[test]
    fn test_drag_moves_clip() {
        let scene = scene_with(&[("a", 0.0, 5.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &[]).unwrap();

        let frame = gesture_candidate(&gesture, &GestureDelta::horizontal(3.0), &no_snap()).unwrap();

        let clip = frame.scene.clip("a").unwrap();
        assert_eq!((clip.start, clip.end), (3.0, 8.0));
        assert_eq!(frame.snapped_to, None);
    }

    #[test]
    fn test_drag_rejects_overlap_without_mutating_origin() {
        let scene = scene_with(&[("a", 0.0, 5.0, 0), ("b", 5.0, 10.0, 0)]);
        let gesture = Gesture::drag(&scene, "b", &[]).unwrap();

        let result = gesture_candidate(&gesture, &GestureDelta::horizontal(-1.0), &no_snap());

        assert!(matches!(result, Err(CoreError::Overlap { .. })));
        assert_eq!(gesture.origin, scene);
    }

    #[test]
    fn test_drag_clamps_start_at_zero() {
        let scene = scene_with(&[("a", 2.0, 5.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &[]).unwrap();

        let frame = gesture_candidate(&gesture, &GestureDelta::horizontal(-10.0), &no_snap()).unwrap();

        let clip = frame.scene.clip("a").unwrap();
        assert_eq!((clip.start, clip.end), (0.0, 3.0));
    }

    #[test]
    fn test_drag_snaps_start_to_neighbour_end() {
        let scene = scene_with(&[("a", 0.0, 5.0, 0), ("b", 8.0, 10.0, 0)]);
        let gesture = Gesture::drag(&scene, "b", &[]).unwrap();
        let ctx = InteractionContext {
            playhead: 30.0,
            ..InteractionContext::default()
        };

        let frame = gesture_candidate(&gesture, &GestureDelta::horizontal(-2.95), &ctx).unwrap();

        let clip = frame.scene.clip("b").unwrap();
        assert_eq!(clip.start, 5.0);
        assert_eq!(clip.end, 7.0);
        assert_eq!(frame.snapped_to, Some(5.0));
    }

    #[test]
    fn test_drag_snaps_to_playhead() {
        let scene = scene_with(&[("a", 0.0, 2.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &[]).unwrap();
        let ctx = InteractionContext {
            playhead: 4.0,
            ..InteractionContext::default()
        };

        let frame = gesture_candidate(&gesture, &GestureDelta::horizontal(3.93), &ctx).unwrap();

        assert_eq!(frame.scene.clip("a").unwrap().start, 4.0);
    }

    #[test]
    fn test_drag_end_snap_flushes_against_neighbour() {
        let scene = scene_with(&[("a", 3.3, 4.1, 0), ("b", 9.1, 10.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &[]).unwrap();
        let ctx = InteractionContext {
            playhead: 50.0,
            ..InteractionContext::default()
        };

        let frame = gesture_candidate(&gesture, &GestureDelta::horizontal(4.95), &ctx).unwrap();

        let clip = frame.scene.clip("a").unwrap();
        assert_eq!(clip.end, 9.1);
        assert_eq!(frame.snapped_to, Some(9.1));
        frame.scene.validate().unwrap();
    }

    #[test]
    fn test_group_drag_end_snap_flushes_anchor() {
        let scene = scene_with(&[("a", 3.3, 4.1, 0), ("c", 0.0, 1.0, 0), ("b", 9.1, 10.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &["c".to_string()]).unwrap();
        let ctx = InteractionContext {
            playhead: 50.0,
            ..InteractionContext::default()
        };

        let frame = gesture_candidate(&gesture, &GestureDelta::horizontal(4.95), &ctx).unwrap();

        assert_eq!(frame.scene.clip("a").unwrap().end, 9.1);
        assert_eq!(frame.snapped_to, Some(9.1));
    }

    #[test]
    fn test_drag_changes_track_row() {
        let scene = scene_with(&[("a", 0.0, 5.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &[]).unwrap();

        let frame = gesture_candidate(&gesture, &GestureDelta::new(0.0, 1.4), &no_snap()).unwrap();

        assert_eq!(frame.scene.clip("a").unwrap().track_index, 1);
        assert!(frame.scene.track(v(1)).unwrap().contains("a"));

        // Rows never go negative
        let frame = gesture_candidate(&gesture, &GestureDelta::new(0.0, -3.0), &no_snap()).unwrap();
        assert_eq!(frame.scene.clip("a").unwrap().track_index, 0);
    }

    #[test]
    fn test_drag_far_below_adds_at_most_one_row() {
        let scene = scene_with(&[("a", 0.0, 5.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &[]).unwrap();

        let frame = gesture_candidate(&gesture, &GestureDelta::new(0.0, 2.0e7), &no_snap()).unwrap();

        assert_eq!(frame.scene.clip("a").unwrap().track_index, 1);
        assert_eq!(frame.scene.tracks(TrackKind::Video).len(), 2);

        let frame = gesture_candidate(&gesture, &GestureDelta::new(0.0, f64::MAX), &no_snap()).unwrap();
        assert_eq!(frame.scene.tracks(TrackKind::Video).len(), 2);
    }

    #[test]
    fn test_group_drag_rejected_atomically() {
        let scene = scene_with(&[("a", 0.0, 5.0, 0), ("b", 10.0, 15.0, 0), ("c", 16.0, 20.0, 0)]);
        let gesture = Gesture::drag(&scene, "a", &["a".to_string(), "b".to_string()]).unwrap();

        let result = gesture_candidate(&gesture, &GestureDelta::horizontal(2.0), &no_snap());

        assert!(matches!(result, Err(CoreError::Overlap { .. })));
    }

    #[test]
    fn test_group_drag_moves_all_members() {
        let scene = scene_with(&[("a", 0.0, 5.0, 0), ("b", 10.0, 15.0, 1)]);
        let gesture = Gesture::drag(&scene, "a", &["b".to_string()]).unwrap();

        let frame = gesture_candidate(&gesture, &GestureDelta::new(2.0, 1.0), &no_snap()).unwrap();

        let a = frame.scene.clip("a").unwrap();
        let b = frame.scene.clip("b").unwrap();
        assert_eq!((a.start, a.track_index), (2.0, 0));
        assert_eq!((b.start, b.track_index), (12.0, 1));
    }

    #[test]
    fn test_group_drag_below_zero_rejected() {
        let scene = scene_with(&[("a", 1.0, 5.0, 0), ("b", 10.0, 15.0, 0)]);
        let gesture = Gesture::drag(&scene, "b", &["a".to_string()]).unwrap();

        let result = gesture_candidate(&gesture, &GestureDelta::horizontal(-2.0), &no_snap());

        assert!(matches!(result, Err(CoreError::InvalidInterval(..))));
    }
}
