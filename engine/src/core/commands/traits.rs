//! Edit commands
//!
//! Every timeline mutation a user can undo is a `Command`. The executor owns
//! history; a command only knows how to apply itself and describe the result.

use serde::{Deserialize, Serialize};

use crate::core::{project::ProjectState, ClipId, CoreResult, OpId};

/// What a command did, for callers that need the ids it produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub op_id: OpId,

    pub changes: Vec<StateChange>,

    /// Ids of clips or assets that now exist, in creation order
    pub created_ids: Vec<String>,

    pub deleted_ids: Vec<String>,
}

impl CommandResult {
    /// Creates an empty result with a fresh operation ID
    pub fn new() -> Self {
        Self {
            op_id: ulid::Ulid::new().to_string(),
            changes: vec![],
            created_ids: vec![],
            deleted_ids: vec![],
        }
    }

    pub fn with_change(mut self, change: StateChange) -> Self {
        self.changes.push(change);
        self
    }

    pub fn with_created_id(mut self, id: &str) -> Self {
        self.created_ids.push(id.to_string());
        self
    }

    pub fn with_deleted_id(mut self, id: &str) -> Self {
        self.deleted_ids.push(id.to_string());
        self
    }
}

impl Default for CommandResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Coarse description of one effect of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateChange {
    #[serde(rename_all = "camelCase")]
    ClipCreated { clip_id: ClipId },
    #[serde(rename_all = "camelCase")]
    ClipModified { clip_id: ClipId },
    #[serde(rename_all = "camelCase")]
    ClipDeleted { clip_id: ClipId },
    #[serde(rename_all = "camelCase")]
    AssetAdded { asset_id: String },
    #[serde(rename_all = "camelCase")]
    TransitionSet { from_clip_id: ClipId, to_clip_id: ClipId },
    #[serde(rename_all = "camelCase")]
    TransitionRemoved { from_clip_id: ClipId, to_clip_id: ClipId },
    SelectionChanged,
}

/// An undoable edit.
///
/// `execute` may leave the state half-modified when it fails: the executor
/// runs it on a working copy and drops that copy on error. Undo is handled by
/// the executor restoring the snapshot it took beforehand.
pub trait Command: Send + Sync {
    /// Execute the command against the project state
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult>;

    /// Command type name, used for history labels and logs
    fn type_name(&self) -> &'static str;

    /// JSON form of the command's parameters
    fn to_json(&self) -> serde_json::Value;
}
