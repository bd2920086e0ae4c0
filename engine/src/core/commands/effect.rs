//! Effect Commands Module
//!
//! Effects are processed before the command runs; the command only swaps the
//! clip over to the processed media.

use serde::{Deserialize, Serialize};

use crate::core::{
    commands::{Command, CommandResult, StateChange},
    effects::ProcessedSource,
    project::ProjectState,
    ClipId, CoreResult,
};

/// Command to point a clip at the output of an effect processor
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyEffectResultCommand {
    pub clip_id: ClipId,
    /// Processor route that produced the media
    pub processor: String,
    pub processed: ProcessedSource,
}

impl ApplyEffectResultCommand {
    pub fn new(clip_id: &str, processor: &str, processed: ProcessedSource) -> Self {
        Self {
            clip_id: clip_id.to_string(),
            processor: processor.to_string(),
            processed,
        }
    }
}

impl Command for ApplyEffectResultCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        let clip = state.scene.get_clip(&self.clip_id)?;
        let (start, end) = (clip.start, clip.end);

        // Processed media can come back shorter (smart trim); the clip may not outrun it.
        let new_end = end.min(start + self.processed.duration_sec);
        if new_end != end {
            state.scene.resize_clip(&self.clip_id, start, new_end)?;
        }
        state.scene.replace_source(
            &self.clip_id,
            self.processed.source_ref.clone(),
            self.processed.duration_sec,
        )?;

        Ok(CommandResult::new().with_change(StateChange::ClipModified {
            clip_id: self.clip_id.clone(),
        }))
    }

    fn type_name(&self) -> &'static str {
        "ApplyEffect"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
