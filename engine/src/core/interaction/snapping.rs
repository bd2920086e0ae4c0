//! Snapping
//!
//! Pulls a moving edge onto nearby edit points: the playhead and the edges of
//! the other clips on the destination track.

use crate::core::{
    timeline::{Scene, TrackRef},
    TimeSec,
};

/// Snapping parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Maximum distance (seconds) at which a value is pulled onto a target
    pub epsilon: TimeSec,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            epsilon: 0.1,
        }
    }
}

/// Ordered snap targets: the playhead first, then each clip's start and end
/// in track order.
pub fn snap_targets(scene: &Scene, track: TrackRef, playhead: TimeSec, exclude: &[&str]) -> Vec<TimeSec> {
    let mut targets = vec![playhead];
    for clip in scene.clips_on_track(track) {
        if exclude.contains(&clip.id.as_str()) {
            continue;
        }
        targets.push(clip.start);
        targets.push(clip.end);
    }
    targets
}

/// Returns the first target within `epsilon` of `value`
pub fn snap_value(value: TimeSec, targets: &[TimeSec], config: &SnapConfig) -> Option<TimeSec> {
    if !config.enabled {
        return None;
    }
    targets
        .iter()
        .copied()
        .find(|target| (value - target).abs() <= config.epsilon)
}

/// A moving interval after snapping
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SnappedInterval {
    pub start: TimeSec,
    pub end: TimeSec,
    pub snapped_to: Option<TimeSec>,
}

/// Snaps a moving interval, preferring its start edge.
///
/// The snapped edge lands exactly on its target; the opposite edge is derived
/// from the duration.
pub fn snap_interval(
    start: TimeSec,
    duration: TimeSec,
    targets: &[TimeSec],
    config: &SnapConfig,
) -> SnappedInterval {
    if let Some(target) = snap_value(start, targets, config) {
        return SnappedInterval {
            start: target,
            end: target + duration,
            snapped_to: Some(target),
        };
    }
    if let Some(target) = snap_value(start + duration, targets, config) {
        return SnappedInterval {
            start: target - duration,
            end: target,
            snapped_to: Some(target),
        };
    }
    SnappedInterval {
        start,
        end: start + duration,
        snapped_to: None,
    }
}
