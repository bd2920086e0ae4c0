//! Interaction Engine
//!
//! Turns pointer gestures into candidate scenes. Every candidate is computed
//! by a pure function from the scene captured when the gesture began, so a
//! rejected frame simply leaves the last accepted scene in place.

mod drag;
mod playhead;
mod resize;
mod snapping;

pub use drag::*;
pub use playhead::*;
pub use resize::*;
pub use snapping::*;

use serde::{Deserialize, Serialize};

use crate::core::{
    timeline::{Scene, TrackRef},
    ClipId, CoreError, CoreResult, TimeSec, TrackIndex,
};

// =============================================================================
// Gesture
// =============================================================================

/// Clip edge grabbed by a resize gesture
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResizeEdge {
    Start,
    End,
}

/// What the pointer is doing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GestureKind {
    Drag,
    Resize { edge: ResizeEdge },
}

/// Geometry of a clip captured at gesture begin
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipGeometry {
    pub clip_id: ClipId,
    pub start: TimeSec,
    pub end: TimeSec,
    pub track_index: TrackIndex,
}

impl ClipGeometry {
    /// Captures the current geometry of a clip
    pub fn capture(scene: &Scene, clip_id: &str) -> CoreResult<Self> {
        let clip = scene.get_clip(clip_id)?;
        Ok(Self {
            clip_id: clip.id.clone(),
            start: clip.start,
            end: clip.end,
            track_index: clip.track_index,
        })
    }

    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }
}

/// An in-flight pointer gesture.
///
/// `members[0]` is always the clip under the pointer; drags of a selection
/// carry the other selected clips after it.
#[derive(Clone, Debug, PartialEq)]
pub struct Gesture {
    pub kind: GestureKind,
    pub members: Vec<ClipGeometry>,
    /// Scene at gesture begin; every frame is computed from it
    pub origin: Scene,
}

impl Gesture {
    /// Starts a drag of `clip_id`, moving `group` (which may include it) along
    pub fn drag(scene: &Scene, clip_id: &str, group: &[ClipId]) -> CoreResult<Self> {
        let mut members = vec![ClipGeometry::capture(scene, clip_id)?];
        for id in group.iter().filter(|id| id.as_str() != clip_id) {
            members.push(ClipGeometry::capture(scene, id)?);
        }

        Ok(Self {
            kind: GestureKind::Drag,
            members,
            origin: scene.clone(),
        })
    }

    /// Starts a resize of one clip edge
    pub fn resize(scene: &Scene, clip_id: &str, edge: ResizeEdge) -> CoreResult<Self> {
        Ok(Self {
            kind: GestureKind::Resize { edge },
            members: vec![ClipGeometry::capture(scene, clip_id)?],
            origin: scene.clone(),
        })
    }

    /// The clip under the pointer
    pub fn anchor(&self) -> &ClipGeometry {
        &self.members[0]
    }

    pub fn is_group(&self) -> bool {
        self.members.len() > 1
    }
}

/// Pointer displacement since gesture begin
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureDelta {
    /// Horizontal displacement in seconds
    pub delta_sec: TimeSec,
    /// Vertical displacement in track rows (fractional while between rows)
    #[serde(default)]
    pub delta_tracks: f64,
}

impl GestureDelta {
    pub fn new(delta_sec: TimeSec, delta_tracks: f64) -> Self {
        Self {
            delta_sec,
            delta_tracks,
        }
    }

    pub fn horizontal(delta_sec: TimeSec) -> Self {
        Self::new(delta_sec, 0.0)
    }

    fn validate(&self) -> CoreResult<()> {
        if !self.delta_sec.is_finite() || !self.delta_tracks.is_finite() {
            return Err(CoreError::ValidationError(
                "Gesture delta must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Editor parameters that shape candidate computation
#[derive(Clone, Debug, PartialEq)]
pub struct InteractionContext {
    pub playhead: TimeSec,
    pub snap: SnapConfig,
    /// Shortest duration a resize may produce (seconds)
    pub min_duration: TimeSec,
}

impl Default for InteractionContext {
    fn default() -> Self {
        Self {
            playhead: 0.0,
            snap: SnapConfig::default(),
            min_duration: min_clip_duration(40.0, 100.0, 1.0),
        }
    }
}

/// Shortest clip duration that still renders `min_width_px` wide
pub fn min_clip_duration(min_width_px: f64, pixels_per_second: f64, zoom: f64) -> TimeSec {
    min_width_px / (pixels_per_second * zoom)
}

/// Result of one accepted gesture frame
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateFrame {
    pub scene: Scene,
    /// Target the moving edge was snapped to, if any
    pub snapped_to: Option<TimeSec>,
}

/// Computes the candidate scene for a gesture frame
pub fn gesture_candidate(
    gesture: &Gesture,
    delta: &GestureDelta,
    ctx: &InteractionContext,
) -> CoreResult<CandidateFrame> {
    delta.validate()?;
    match gesture.kind {
        GestureKind::Drag if gesture.is_group() => group_drag_candidate(gesture, delta, ctx),
        GestureKind::Drag => drag_candidate(gesture, delta, ctx),
        GestureKind::Resize { edge } => resize_candidate(gesture, edge, delta, ctx),
    }
}

/// True if any member ended somewhere other than where it began
pub fn geometry_changed(gesture: &Gesture, scene: &Scene) -> bool {
    gesture.members.iter().any(|member| match scene.clip(&member.clip_id) {
        Some(clip) => {
            clip.start != member.start
                || clip.end != member.end
                || clip.track_index != member.track_index
        }
        None => true,
    })
}

/// Row under the pointer, limited to the existing rows plus one new row
fn destination_track(scene: &Scene, geometry: &ClipGeometry, delta_tracks: f64) -> CoreResult<TrackRef> {
    let kind = scene.get_clip(&geometry.clip_id)?.kind;
    let max_row = scene.tracks(kind).len() as f64;
    let row = (geometry.track_index as f64 + delta_tracks)
        .round()
        .clamp(0.0, max_row);
    Ok(TrackRef::new(kind, row as TrackIndex))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::{Clip, TrackKind};

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let v0 = TrackRef::new(TrackKind::Video, 0);
        scene
            .add_clip(v0, Clip::new(TrackKind::Video, "a", 5.0).with_id("a"))
            .unwrap();
        scene
            .add_clip(
                v0,
                Clip::new(TrackKind::Video, "b", 5.0)
                    .with_id("b")
                    .place_at(10.0),
            )
            .unwrap();
        scene
    }

    #[test]
    fn test_min_clip_duration_defaults() {
        assert!((min_clip_duration(40.0, 100.0, 1.0) - 0.4).abs() < 1e-12);
        assert!((min_clip_duration(40.0, 100.0, 2.0) - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_drag_gesture_anchor_first() {
        let gesture = Gesture::drag(&scene(), "b", &["a".to_string(), "b".to_string()]).unwrap();

        assert_eq!(gesture.anchor().clip_id, "b");
        assert_eq!(gesture.members.len(), 2);
        assert!(gesture.is_group());
    }

    #[test]
    fn test_gesture_unknown_clip() {
        assert!(matches!(
            Gesture::resize(&scene(), "zzz", ResizeEdge::End),
            Err(CoreError::UnknownClip(_))
        ));
    }

    #[test]
    fn test_non_finite_delta_rejected() {
        let gesture = Gesture::drag(&scene(), "a", &[]).unwrap();
        let result = gesture_candidate(
            &gesture,
            &GestureDelta::horizontal(f64::NAN),
            &InteractionContext::default(),
        );
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn test_geometry_changed() {
        let s = scene();
        let gesture = Gesture::drag(&s, "a", &[]).unwrap();
        assert!(!geometry_changed(&gesture, &s));

        let mut moved = s.clone();
        moved.move_clip("a", 1.0, 0).unwrap();
        assert!(geometry_changed(&gesture, &moved));
    }
}
