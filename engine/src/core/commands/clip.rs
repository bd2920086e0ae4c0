//! Clip Commands Module
//!
//! Implements all clip-related editing commands.

use serde::{Deserialize, Serialize};

use crate::core::{
    assets::AssetKind,
    commands::{Command, CommandResult, StateChange},
    is_valid_time_sec,
    project::ProjectState,
    timeline::{Clip, ClipPlacement, ClipProperties, Keyframe, TrackRef},
    AssetId, ClipId, CoreError, CoreResult, TimeSec, TrackIndex,
};

fn to_json<T: Serialize>(command: &T) -> serde_json::Value {
    serde_json::to_value(command).unwrap_or_default()
}

// =============================================================================
// InsertClipCommand
// =============================================================================

/// Command to place an imported asset on a track
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertClipCommand {
    /// Source asset ID
    pub asset_id: AssetId,
    /// Target row of the asset's track kind
    pub track_index: TrackIndex,
    /// Timeline position to insert at
    pub timeline_start: TimeSec,
    /// Duration given to still images
    pub image_duration: TimeSec,
}

impl InsertClipCommand {
    /// Creates a new insert clip command
    pub fn new(asset_id: &str, track_index: TrackIndex, timeline_start: TimeSec) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            track_index,
            timeline_start,
            image_duration: 5.0,
        }
    }

    pub fn with_image_duration(mut self, duration: TimeSec) -> Self {
        self.image_duration = duration;
        self
    }
}

impl Command for InsertClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        if !is_valid_time_sec(self.timeline_start) {
            return Err(CoreError::ValidationError(
                "timelineStart must be finite and non-negative".to_string(),
            ));
        }

        let asset = state.get_asset(&self.asset_id)?;
        let duration = match (asset.kind, asset.duration_sec) {
            (_, Some(duration)) => duration,
            (AssetKind::Image, None) => self.image_duration,
            (_, None) => {
                return Err(CoreError::ValidationError(format!(
                    "Asset {} has no known duration",
                    asset.id
                )))
            }
        };

        let kind = asset.kind.track_kind();
        let clip = Clip::new(kind, &asset.path, duration)
            .place_at(self.timeline_start)
            .with_asset(&asset.id);

        let clip_id = state
            .scene
            .add_clip(TrackRef::new(kind, self.track_index), clip)?;

        Ok(CommandResult::new()
            .with_change(StateChange::ClipCreated {
                clip_id: clip_id.clone(),
            })
            .with_created_id(&clip_id))
    }

    fn type_name(&self) -> &'static str {
        "InsertClip"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// AddClipCommand
// =============================================================================

/// Command to add a fully described clip (text clips, programmatic edits)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddClipCommand {
    pub track: TrackRef,
    pub clip: Clip,
}

impl AddClipCommand {
    pub fn new(track: TrackRef, clip: Clip) -> Self {
        Self { track, clip }
    }
}

impl Command for AddClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let clip_id = state.scene.add_clip(self.track, self.clip.clone())?;

        Ok(CommandResult::new()
            .with_change(StateChange::ClipCreated {
                clip_id: clip_id.clone(),
            })
            .with_created_id(&clip_id))
    }

    fn type_name(&self) -> &'static str {
        "AddClip"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// MoveClipCommand
// =============================================================================

/// Command to move a clip to a new position and/or track row
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveClipCommand {
    pub clip_id: ClipId,
    pub new_start: TimeSec,
    /// Destination row (defaults to the clip's current row)
    pub new_track_index: Option<TrackIndex>,
}

impl MoveClipCommand {
    pub fn new(clip_id: &str, new_start: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            new_start,
            new_track_index: None,
        }
    }

    pub fn to_track(mut self, track_index: TrackIndex) -> Self {
        self.new_track_index = Some(track_index);
        self
    }
}

impl Command for MoveClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        if !is_valid_time_sec(self.new_start) {
            return Err(CoreError::InvalidInterval(self.new_start, self.new_start));
        }

        let clip = state.scene.get_clip(&self.clip_id)?;
        let track_index = self.new_track_index.unwrap_or(clip.track_index);
        state
            .scene
            .move_clip(&self.clip_id, self.new_start, track_index)?;

        Ok(CommandResult::new().with_change(StateChange::ClipModified {
            clip_id: self.clip_id.clone(),
        }))
    }

    fn type_name(&self) -> &'static str {
        "MoveClip"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// MoveClipsCommand
// =============================================================================

/// Command to reposition several clips atomically
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveClipsCommand {
    pub placements: Vec<ClipPlacement>,
}

impl MoveClipsCommand {
    pub fn new(placements: Vec<ClipPlacement>) -> Self {
        Self { placements }
    }
}

impl Command for MoveClipsCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        if let Some(p) = self.placements.iter().find(|p| !is_valid_time_sec(p.start)) {
            return Err(CoreError::InvalidInterval(p.start, p.end));
        }
        state.scene.apply_placements(&self.placements)?;

        Ok(self
            .placements
            .iter()
            .fold(CommandResult::new(), |result, p| {
                result.with_change(StateChange::ClipModified {
                    clip_id: p.clip_id.clone(),
                })
            }))
    }

    fn type_name(&self) -> &'static str {
        "MoveClips"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// ResizeClipCommand
// =============================================================================

/// Command to change both edges of a clip
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeClipCommand {
    pub clip_id: ClipId,
    pub new_start: TimeSec,
    pub new_end: TimeSec,
    /// Reported as a trim in history labels
    #[serde(skip)]
    trim: bool,
}

impl ResizeClipCommand {
    pub fn new(clip_id: &str, new_start: TimeSec, new_end: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            new_start,
            new_end,
            trim: false,
        }
    }

    /// Resize issued by a trim-to-playhead action
    pub fn trim(clip_id: &str, new_start: TimeSec, new_end: TimeSec) -> Self {
        Self {
            trim: true,
            ..Self::new(clip_id, new_start, new_end)
        }
    }
}

impl Command for ResizeClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        if !is_valid_time_sec(self.new_start) || !is_valid_time_sec(self.new_end) {
            return Err(CoreError::InvalidInterval(self.new_start, self.new_end));
        }
        state
            .scene
            .resize_clip(&self.clip_id, self.new_start, self.new_end)?;

        Ok(CommandResult::new().with_change(StateChange::ClipModified {
            clip_id: self.clip_id.clone(),
        }))
    }

    fn type_name(&self) -> &'static str {
        if self.trim {
            "TrimClip"
        } else {
            "ResizeClip"
        }
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// SplitClipCommand
// =============================================================================

/// Command to split a clip into two at a timeline position
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitClipCommand {
    pub clip_id: ClipId,
    pub at_time: TimeSec,
    /// Select the later child afterwards
    #[serde(default)]
    pub select_later: bool,
}

impl SplitClipCommand {
    pub fn new(clip_id: &str, at_time: TimeSec) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            at_time,
            select_later: false,
        }
    }

    pub fn selecting_later(mut self) -> Self {
        self.select_later = true;
        self
    }
}

impl Command for SplitClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let (left_id, right_id) = state.scene.split_clip(&self.clip_id, self.at_time)?;

        let mut result = CommandResult::new()
            .with_change(StateChange::ClipDeleted {
                clip_id: self.clip_id.clone(),
            })
            .with_change(StateChange::ClipCreated {
                clip_id: left_id.clone(),
            })
            .with_change(StateChange::ClipCreated {
                clip_id: right_id.clone(),
            })
            .with_deleted_id(&self.clip_id)
            .with_created_id(&left_id)
            .with_created_id(&right_id);

        if self.select_later {
            state.selection.select_only(&right_id);
            result = result.with_change(StateChange::SelectionChanged);
        }
        Ok(result)
    }

    fn type_name(&self) -> &'static str {
        "SplitClip"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// DeleteClipsCommand
// =============================================================================

/// Command to delete one or more clips
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteClipsCommand {
    pub clip_ids: Vec<ClipId>,
}

impl DeleteClipsCommand {
    pub fn new(clip_ids: Vec<ClipId>) -> Self {
        Self { clip_ids }
    }

    pub fn single(clip_id: &str) -> Self {
        Self::new(vec![clip_id.to_string()])
    }
}

impl Command for DeleteClipsCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        if self.clip_ids.is_empty() {
            return Err(CoreError::EmptySelection);
        }

        let mut result = CommandResult::new();
        for clip_id in &self.clip_ids {
            state.scene.delete_clip(clip_id)?;
            result = result
                .with_change(StateChange::ClipDeleted {
                    clip_id: clip_id.clone(),
                })
                .with_deleted_id(clip_id);
        }
        Ok(result)
    }

    fn type_name(&self) -> &'static str {
        if self.clip_ids.len() > 1 {
            "DeleteClips"
        } else {
            "DeleteClip"
        }
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// DuplicateClipCommand
// =============================================================================

/// Command to duplicate a clip right after itself
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateClipCommand {
    pub clip_id: ClipId,
}

impl DuplicateClipCommand {
    pub fn new(clip_id: &str) -> Self {
        Self {
            clip_id: clip_id.to_string(),
        }
    }
}

impl Command for DuplicateClipCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let copy_id = state.scene.duplicate_clip(&self.clip_id)?;

        Ok(CommandResult::new()
            .with_change(StateChange::ClipCreated {
                clip_id: copy_id.clone(),
            })
            .with_created_id(&copy_id))
    }

    fn type_name(&self) -> &'static str {
        "DuplicateClip"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// SetKeyframesCommand
// =============================================================================

/// Command to replace a clip's keyframes
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetKeyframesCommand {
    pub clip_id: ClipId,
    pub keyframes: Vec<Keyframe>,
}

impl SetKeyframesCommand {
    pub fn new(clip_id: &str, keyframes: Vec<Keyframe>) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            keyframes,
        }
    }
}

impl Command for SetKeyframesCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        state
            .scene
            .set_keyframes(&self.clip_id, self.keyframes.clone())?;

        Ok(CommandResult::new().with_change(StateChange::ClipModified {
            clip_id: self.clip_id.clone(),
        }))
    }

    fn type_name(&self) -> &'static str {
        "SetKeyframes"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// SetClipPropertiesCommand
// =============================================================================

/// Command to replace a clip's kind properties (text content, volume, ...)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetClipPropertiesCommand {
    pub clip_id: ClipId,
    pub properties: ClipProperties,
}

impl SetClipPropertiesCommand {
    pub fn new(clip_id: &str, properties: ClipProperties) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            properties,
        }
    }
}

impl Command for SetClipPropertiesCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        state
            .scene
            .set_properties(&self.clip_id, self.properties.clone())?;

        Ok(CommandResult::new().with_change(StateChange::ClipModified {
            clip_id: self.clip_id.clone(),
        }))
    }

    fn type_name(&self) -> &'static str {
        "SetClipProperties"
    }

    fn to_json(&self) -> serde_json::Value {
        to_json(self)
    }
}

// =============================================================================
// Tests
// =============================================================================
