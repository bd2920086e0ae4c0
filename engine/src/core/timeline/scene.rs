//! Scene Model
//!
//! Canonical in-memory timeline: an arena of clips addressed by id, per-kind
//! rows of tracks holding ordered id lists, and the transition index.
//!
//! Every mutation validates BEFORE touching state, so a returned error always
//! leaves the scene exactly as it was.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::{
    timeline::{
        Clip, ClipProperties, Keyframe, Track, TrackKind, TrackRef, Transition, TransitionIndex,
        TransitionType,
    },
    ClipId, CoreError, CoreResult, SourceRef, TimeRange, TimeSec, TrackIndex,
};

/// Target geometry for one clip in an atomic placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipPlacement {
    pub clip_id: ClipId,
    pub start: TimeSec,
    pub end: TimeSec,
    pub track_index: TrackIndex,
}

impl ClipPlacement {
    pub fn new(clip_id: &str, start: TimeSec, end: TimeSec, track_index: TrackIndex) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            start,
            end,
            track_index,
        }
    }

    pub fn interval(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }
}

/// Derived ids of the two children produced by splitting `id`
pub fn split_child_ids(id: &str) -> (ClipId, ClipId) {
    (format!("{id}.1"), format!("{id}.2"))
}

/// Two clips can carry a transition when they share a track and `from` ends
/// no later than `to` starts.
pub fn clips_adjacent(from: &Clip, to: &Clip) -> bool {
    from.id != to.id && from.track_ref() == to.track_ref() && from.end <= to.start
}

fn sort_track(track: &mut Track, clips: &BTreeMap<ClipId, Clip>) {
    track.clip_ids.sort_by(|a, b| {
        let start_a = clips.get(a).map(|c| c.start).unwrap_or(f64::MAX);
        let start_b = clips.get(b).map(|c| c.start).unwrap_or(f64::MAX);
        // Ties are broken by id to keep ordering deterministic.
        start_a.total_cmp(&start_b).then_with(|| a.cmp(b))
    });
}

// =============================================================================
// Scene
// =============================================================================

/// Tracks, clips and transitions of a project
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    clips: BTreeMap<ClipId, Clip>,
    tracks_by_kind: BTreeMap<TrackKind, Vec<Track>>,
    transitions: TransitionIndex,
}

impl Scene {
    /// Creates an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn clip(&self, clip_id: &str) -> Option<&Clip> {
        self.clips.get(clip_id)
    }

    /// Gets a clip or fails with `UnknownClip`
    pub fn get_clip(&self, clip_id: &str) -> CoreResult<&Clip> {
        self.clips
            .get(clip_id)
            .ok_or_else(|| CoreError::UnknownClip(clip_id.to_string()))
    }

    pub fn contains_clip(&self, clip_id: &str) -> bool {
        self.clips.contains_key(clip_id)
    }

    /// All clips, ordered by id
    pub fn clips(&self) -> impl Iterator<Item = &Clip> {
        self.clips.values()
    }

    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn tracks_by_kind(&self) -> &BTreeMap<TrackKind, Vec<Track>> {
        &self.tracks_by_kind
    }

    /// Track rows of one kind (empty if none were created yet)
    pub fn tracks(&self, kind: TrackKind) -> &[Track] {
        self.tracks_by_kind
            .get(&kind)
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    /// Gets a track or fails with `UnknownTrack`
    pub fn track(&self, track: TrackRef) -> CoreResult<&Track> {
        self.tracks(track.kind)
            .get(track.index)
            .ok_or(CoreError::UnknownTrack {
                kind: track.kind,
                index: track.index,
            })
    }

    /// Clips of a track in timeline order (empty if the track does not exist)
    pub fn clips_on_track(&self, track: TrackRef) -> Vec<&Clip> {
        self.tracks(track.kind)
            .get(track.index)
            .map(|row| {
                row.clip_ids
                    .iter()
                    .filter_map(|id| self.clips.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn transitions(&self) -> &TransitionIndex {
        &self.transitions
    }

    /// End of the last clip on any track
    pub fn duration(&self) -> TimeSec {
        self.clips.values().map(|c| c.end).fold(0.0, f64::max)
    }

    /// First clip on the track intersecting `range`, skipping the ignored ids
    pub fn find_overlap(&self, track: TrackRef, range: &TimeRange, ignore: &[&str]) -> Option<&Clip> {
        self.clips_on_track(track).into_iter().find(|existing| {
            !ignore.contains(&existing.id.as_str()) && existing.interval().overlaps(range)
        })
    }

    /// Fails with `Overlap` if `range` intersects any non-ignored clip on the track
    pub fn validate_no_overlap(
        &self,
        track: TrackRef,
        range: &TimeRange,
        ignore: &[&str],
    ) -> CoreResult<()> {
        if let Some(conflict) = self.find_overlap(track, range, ignore) {
            return Err(CoreError::Overlap {
                kind: track.kind,
                track_index: track.index,
                existing_clip_id: conflict.id.clone(),
                new_start: range.start_sec,
                new_end: range.end_sec,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Track Plumbing
    // =========================================================================

    /// Rejects a row more than one past the last existing row of its kind
    pub fn check_track_index(&self, track: TrackRef) -> CoreResult<()> {
        if track.index > self.tracks(track.kind).len() {
            return Err(CoreError::UnknownTrack {
                kind: track.kind,
                index: track.index,
            });
        }
        Ok(())
    }

    /// Returns the track, creating it (and any missing rows below it) on first reference.
    /// Callers check the row with [`Scene::check_track_index`] first.
    pub(crate) fn ensure_track(&mut self, track: TrackRef) -> &mut Track {
        let rows = self.tracks_by_kind.entry(track.kind).or_default();
        while rows.len() <= track.index {
            rows.push(Track::new(track.kind));
        }
        &mut rows[track.index]
    }

    fn track_mut(&mut self, track: TrackRef) -> Option<&mut Track> {
        self.tracks_by_kind
            .get_mut(&track.kind)
            .and_then(|rows| rows.get_mut(track.index))
    }

    fn insert_sorted(&mut self, track: TrackRef, clip_id: ClipId) {
        self.ensure_track(track).clip_ids.push(clip_id);
        self.resort(track);
    }

    fn resort(&mut self, track: TrackRef) {
        let clips = &self.clips;
        if let Some(row) = self
            .tracks_by_kind
            .get_mut(&track.kind)
            .and_then(|rows| rows.get_mut(track.index))
        {
            sort_track(row, clips);
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a clip to a track
    pub fn add_clip(&mut self, track: TrackRef, mut clip: Clip) -> CoreResult<ClipId> {
        let range = clip.interval();
        if !range.is_valid() {
            return Err(CoreError::InvalidInterval(clip.start, clip.end));
        }
        if clip.kind != track.kind {
            return Err(CoreError::KindMismatch {
                clip: clip.kind,
                track: track.kind,
            });
        }
        self.check_track_index(track)?;
        if clip.properties.kind() != clip.kind {
            return Err(CoreError::ValidationError(format!(
                "Clip {} has {} properties but is a {} clip",
                clip.id,
                clip.properties.kind(),
                clip.kind
            )));
        }
        if self.clips.contains_key(&clip.id) {
            return Err(CoreError::ValidationError(format!(
                "Clip id already exists: {}",
                clip.id
            )));
        }

        self.validate_no_overlap(track, &range, &[])?;

        clip.track_index = track.index;
        let clip_id = clip.id.clone();
        self.clips.insert(clip_id.clone(), clip);
        self.insert_sorted(track, clip_id.clone());

        Ok(clip_id)
    }

    /// Moves a clip to a new start (duration preserved) and track row of the same kind
    pub fn move_clip(
        &mut self,
        clip_id: &str,
        new_start: TimeSec,
        new_track_index: TrackIndex,
    ) -> CoreResult<()> {
        let clip = self.get_clip(clip_id)?;
        let placement = ClipPlacement::new(
            clip_id,
            new_start,
            new_start + clip.duration(),
            new_track_index,
        );
        self.apply_placements(&[placement])
    }

    /// Applies new geometry to several clips at once.
    ///
    /// Each member is validated against non-member clips on its destination
    /// track and against the other members; any failure rejects the whole set.
    pub fn apply_placements(&mut self, placements: &[ClipPlacement]) -> CoreResult<()> {
        if placements.is_empty() {
            return Err(CoreError::EmptySelection);
        }

        let members: Vec<&str> = placements.iter().map(|p| p.clip_id.as_str()).collect();

        for (i, placement) in placements.iter().enumerate() {
            let clip = self.get_clip(&placement.clip_id)?;
            let range = placement.interval();
            if !range.is_valid() {
                return Err(CoreError::InvalidInterval(placement.start, placement.end));
            }

            let dest = TrackRef::new(clip.kind, placement.track_index);
            self.check_track_index(dest)?;
            self.validate_no_overlap(dest, &range, &members)?;

            for other in &placements[..i] {
                let other_kind = self.get_clip(&other.clip_id)?.kind;
                if other_kind == clip.kind
                    && other.track_index == placement.track_index
                    && other.interval().overlaps(&range)
                {
                    return Err(CoreError::Overlap {
                        kind: dest.kind,
                        track_index: dest.index,
                        existing_clip_id: other.clip_id.clone(),
                        new_start: range.start_sec,
                        new_end: range.end_sec,
                    });
                }
            }
        }

        for placement in placements {
            let Some(clip) = self.clips.get_mut(&placement.clip_id) else {
                continue;
            };
            let old_track = clip.track_ref();
            clip.start = placement.start;
            clip.end = placement.end;
            clip.track_index = placement.track_index;

            if let Some(row) = self.track_mut(old_track) {
                row.remove(&placement.clip_id);
            }
            self.insert_sorted(
                TrackRef::new(old_track.kind, placement.track_index),
                placement.clip_id.clone(),
            );
        }

        self.prune_transitions();
        Ok(())
    }

    /// Changes both edges of a clip on its current track
    pub fn resize_clip(&mut self, clip_id: &str, new_start: TimeSec, new_end: TimeSec) -> CoreResult<()> {
        let clip = self.get_clip(clip_id)?;
        let range = TimeRange::new(new_start, new_end);
        if !range.is_valid() {
            return Err(CoreError::InvalidInterval(new_start, new_end));
        }

        let track = clip.track_ref();
        self.validate_no_overlap(track, &range, &[clip_id])?;

        if let Some(clip) = self.clips.get_mut(clip_id) {
            let delta_in = new_start - clip.start;
            clip.source_in_sec = (clip.source_in_sec + delta_in).max(0.0);
            clip.start = new_start;
            clip.end = new_end;
        }
        self.resort(track);
        self.prune_transitions();

        Ok(())
    }

    /// Splits a clip at `at_time` into two children sharing the boundary.
    ///
    /// Returns `(earlier_id, later_id)`.
    pub fn split_clip(&mut self, clip_id: &str, at_time: TimeSec) -> CoreResult<(ClipId, ClipId)> {
        let original = self.get_clip(clip_id)?.clone();
        if !at_time.is_finite() || !original.interval().contains_strictly(at_time) {
            return Err(CoreError::InvalidSplitPoint(at_time));
        }

        let (left_id, right_id) = split_child_ids(clip_id);
        for id in [&left_id, &right_id] {
            if self.clips.contains_key(id) {
                return Err(CoreError::ValidationError(format!(
                    "Split would reuse existing clip id {id}"
                )));
            }
        }

        let offset = at_time - original.start;

        let mut left = original.clone();
        left.id = left_id.clone();
        left.end = at_time;
        left.keyframes = original
            .keyframes
            .iter()
            .filter(|k| k.time_sec < offset)
            .cloned()
            .collect();

        let mut right = original.clone();
        right.id = right_id.clone();
        right.start = at_time;
        right.source_in_sec = original.source_in_sec + offset;
        right.keyframes = original
            .keyframes
            .iter()
            .filter(|k| k.time_sec >= offset)
            .map(|k| Keyframe {
                time_sec: k.time_sec - offset,
                ..k.clone()
            })
            .collect();

        let track = original.track_ref();
        self.clips.remove(clip_id);
        if let Some(row) = self.track_mut(track) {
            if let Some(pos) = row.position(clip_id) {
                row.clip_ids
                    .splice(pos..=pos, [left_id.clone(), right_id.clone()]);
            }
        }
        self.clips.insert(left_id.clone(), left);
        self.clips.insert(right_id.clone(), right);
        self.transitions.repoint(clip_id, &left_id, &right_id);

        Ok((left_id, right_id))
    }

    /// Removes a clip and every transition referencing it
    pub fn delete_clip(&mut self, clip_id: &str) -> CoreResult<Clip> {
        let clip = self
            .clips
            .remove(clip_id)
            .ok_or_else(|| CoreError::UnknownClip(clip_id.to_string()))?;

        if let Some(row) = self.track_mut(clip.track_ref()) {
            row.remove(clip_id);
        }

        let removed = self.transitions.remove_referencing(clip_id);
        if !removed.is_empty() {
            debug!(
                clip_id,
                count = removed.len(),
                "Removed transitions of deleted clip"
            );
        }

        Ok(clip)
    }

    /// Copies a clip to just after its end on the same track.
    ///
    /// Earlier duplicates of the same chain are skipped over; any other clip
    /// in the way fails with `Overlap`.
    pub fn duplicate_clip(&mut self, clip_id: &str) -> CoreResult<ClipId> {
        let source = self.get_clip(clip_id)?.clone();
        let duration = source.duration();
        let track = source.track_ref();
        let root = source.chain_root().to_string();

        let mut candidate_start = source.end;
        loop {
            let range = TimeRange::new(candidate_start, candidate_start + duration);
            match self.find_overlap(track, &range, &[]) {
                None => break,
                Some(blocker) if blocker.chain_root() == root => candidate_start = blocker.end,
                Some(blocker) => {
                    return Err(CoreError::Overlap {
                        kind: track.kind,
                        track_index: track.index,
                        existing_clip_id: blocker.id.clone(),
                        new_start: range.start_sec,
                        new_end: range.end_sec,
                    })
                }
            }
        }

        let mut copy = source;
        copy.id = ulid::Ulid::new().to_string();
        copy.start = candidate_start;
        copy.end = candidate_start + duration;
        copy.duplicate_of = Some(root);

        let copy_id = copy.id.clone();
        self.clips.insert(copy_id.clone(), copy);
        self.insert_sorted(track, copy_id.clone());

        Ok(copy_id)
    }

    /// Places (or overwrites) a transition between two adjacent clips
    pub fn add_transition(
        &mut self,
        from_id: &str,
        to_id: &str,
        transition_type: TransitionType,
        duration_sec: TimeSec,
    ) -> CoreResult<Option<Transition>> {
        if !duration_sec.is_finite() || duration_sec <= 0.0 {
            return Err(CoreError::ValidationError(
                "Transition duration must be finite and > 0".to_string(),
            ));
        }

        let from = self.get_clip(from_id)?;
        let to = self.get_clip(to_id)?;
        if !clips_adjacent(from, to) {
            return Err(CoreError::TransitionAdjacencyViolation {
                from: from_id.to_string(),
                to: to_id.to_string(),
            });
        }

        Ok(self.transitions.upsert(Transition::new(
            from_id,
            to_id,
            transition_type,
            duration_sec,
        )))
    }

    /// Removes the transition for the ordered pair
    pub fn remove_transition(&mut self, from_id: &str, to_id: &str) -> CoreResult<Transition> {
        self.transitions.remove(from_id, to_id).ok_or_else(|| {
            CoreError::ValidationError(format!("No transition from {from_id} to {to_id}"))
        })
    }

    /// Replaces the keyframes of a clip (sorted by time)
    pub fn set_keyframes(&mut self, clip_id: &str, mut keyframes: Vec<Keyframe>) -> CoreResult<()> {
        self.get_clip(clip_id)?;
        if let Some(bad) = keyframes
            .iter()
            .find(|k| !k.time_sec.is_finite() || k.time_sec < 0.0 || !k.value.is_finite())
        {
            return Err(CoreError::ValidationError(format!(
                "Invalid keyframe for '{}' at {}",
                bad.property, bad.time_sec
            )));
        }

        keyframes.sort_by(|a, b| a.time_sec.total_cmp(&b.time_sec));
        if let Some(clip) = self.clips.get_mut(clip_id) {
            clip.keyframes = keyframes;
        }
        Ok(())
    }

    /// Replaces the kind properties of a clip
    pub fn set_properties(&mut self, clip_id: &str, properties: ClipProperties) -> CoreResult<()> {
        let clip = self.get_clip(clip_id)?;
        if properties.kind() != clip.kind {
            return Err(CoreError::KindMismatch {
                clip: properties.kind(),
                track: clip.kind,
            });
        }
        if let Some(clip) = self.clips.get_mut(clip_id) {
            clip.properties = properties;
        }
        Ok(())
    }

    /// Points a clip at new media (e.g. the output of an effect)
    pub fn replace_source(
        &mut self,
        clip_id: &str,
        source_ref: SourceRef,
        source_duration: TimeSec,
    ) -> CoreResult<()> {
        self.get_clip(clip_id)?;
        if !source_duration.is_finite() || source_duration <= 0.0 {
            return Err(CoreError::ValidationError(
                "Source duration must be finite and > 0".to_string(),
            ));
        }
        if let Some(clip) = self.clips.get_mut(clip_id) {
            clip.source_ref = source_ref;
            clip.source_duration = source_duration;
            clip.source_in_sec = 0.0;
        }
        Ok(())
    }

    /// Drops transitions whose clips are gone or no longer adjacent
    pub fn prune_transitions(&mut self) -> Vec<Transition> {
        let clips = &self.clips;
        let dropped = self.transitions.retain(|t| {
            match (clips.get(&t.from_clip_id), clips.get(&t.to_clip_id)) {
                (Some(from), Some(to)) => clips_adjacent(from, to),
                _ => false,
            }
        });

        for transition in &dropped {
            warn!(
                from = %transition.from_clip_id,
                to = %transition.to_clip_id,
                "Dropped transition whose clips are no longer adjacent"
            );
        }
        dropped
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Checks every structural invariant of the scene
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = 0usize;

        for (kind, rows) in &self.tracks_by_kind {
            for (index, row) in rows.iter().enumerate() {
                if row.kind != *kind {
                    return Err(CoreError::ValidationError(format!(
                        "Track {kind} #{index} is marked as {}",
                        row.kind
                    )));
                }

                let mut previous: Option<&Clip> = None;
                for id in &row.clip_ids {
                    let clip = self.clips.get(id).ok_or_else(|| {
                        CoreError::ValidationError(format!(
                            "Track {kind} #{index} references missing clip {id}"
                        ))
                    })?;
                    if clip.kind != *kind || clip.track_index != index {
                        return Err(CoreError::ValidationError(format!(
                            "Clip {id} is listed on {kind} #{index} but claims {} #{}",
                            clip.kind, clip.track_index
                        )));
                    }
                    if !clip.interval().is_valid() {
                        return Err(CoreError::InvalidInterval(clip.start, clip.end));
                    }
                    if let Some(prev) = previous {
                        if prev.start > clip.start {
                            return Err(CoreError::ValidationError(format!(
                                "Track {kind} #{index} is not sorted at clip {id}"
                            )));
                        }
                        if prev.end > clip.start {
                            return Err(CoreError::Overlap {
                                kind: *kind,
                                track_index: index,
                                existing_clip_id: prev.id.clone(),
                                new_start: clip.start,
                                new_end: clip.end,
                            });
                        }
                    }
                    previous = Some(clip);
                    seen += 1;
                }
            }
        }

        if seen != self.clips.len() {
            return Err(CoreError::ValidationError(format!(
                "{} clips are placed on tracks but {} exist",
                seen,
                self.clips.len()
            )));
        }

        for transition in self.transitions.iter() {
            let from = self.get_clip(&transition.from_clip_id)?;
            let to = self.get_clip(&transition.to_clip_id)?;
            if !clips_adjacent(from, to) {
                return Err(CoreError::TransitionAdjacencyViolation {
                    from: from.id.clone(),
                    to: to.id.clone(),
                });
            }
        }

        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
