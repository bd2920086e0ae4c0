//! Project State Module
//!
//! The in-memory project: metadata, assets, the scene, selection and playhead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{
    assets::Asset, selection::Selection, timeline::Scene, AssetId, CoreError, CoreResult,
    TimeSec,
};

// =============================================================================
// Project Metadata
// =============================================================================

/// Project metadata stored in the project document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    /// Project name
    pub name: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last modified timestamp (RFC 3339)
    pub modified_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ProjectMeta {
    /// Creates new project metadata
    pub fn new(name: &str) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            name: name.to_string(),
            created_at: now.clone(),
            modified_at: now,
            description: None,
        }
    }

    /// Updates the modified timestamp
    pub fn touch(&mut self) {
        self.modified_at = chrono::Utc::now().to_rfc3339();
    }
}

// =============================================================================
// History Snapshot
// =============================================================================

/// Everything undo/redo restores. The playhead is deliberately not part of it.
#[derive(Clone, Debug, PartialEq)]
pub struct HistorySnapshot {
    pub scene: Scene,
    pub selection: Selection,
    pub assets: BTreeMap<AssetId, Asset>,
}

// =============================================================================
// Project State
// =============================================================================

/// In-memory project state
#[derive(Clone, Debug)]
pub struct ProjectState {
    pub meta: ProjectMeta,
    /// All assets indexed by ID
    pub assets: BTreeMap<AssetId, Asset>,
    pub scene: Scene,
    pub selection: Selection,
    /// Playhead position (seconds)
    pub playhead: TimeSec,
    /// Whether state has unsaved changes
    pub is_dirty: bool,
}

impl ProjectState {
    /// Creates a new empty project state
    pub fn new(name: &str) -> Self {
        Self {
            meta: ProjectMeta::new(name),
            assets: BTreeMap::new(),
            scene: Scene::new(),
            selection: Selection::new(),
            playhead: 0.0,
            is_dirty: false,
        }
    }

    /// Gets an asset or fails with `AssetNotFound`
    pub fn get_asset(&self, asset_id: &str) -> CoreResult<&Asset> {
        self.assets
            .get(asset_id)
            .ok_or_else(|| CoreError::AssetNotFound(asset_id.to_string()))
    }

    /// Captures the undoable part of the state
    pub fn snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            scene: self.scene.clone(),
            selection: self.selection.clone(),
            assets: self.assets.clone(),
        }
    }

    /// Restores a snapshot; the playhead stays where it is
    pub fn restore(&mut self, snapshot: HistorySnapshot) {
        self.scene = snapshot.scene;
        self.selection = snapshot.selection;
        self.assets = snapshot.assets;
        self.is_dirty = true;
        self.meta.touch();
    }

    /// Moves the playhead
    pub fn set_playhead(&mut self, time_sec: TimeSec) -> CoreResult<()> {
        if !time_sec.is_finite() || time_sec < 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Playhead must be finite and non-negative, got {time_sec}"
            )));
        }
        self.playhead = time_sec;
        Ok(())
    }

    /// Checks scene invariants and that the selection only names existing clips
    pub fn validate(&self) -> CoreResult<()> {
        self.scene.validate()?;
        if let Some(missing) = self
            .selection
            .ids()
            .iter()
            .find(|id| !self.scene.contains_clip(id))
        {
            return Err(CoreError::ValidationError(format!(
                "Selection references missing clip {missing}"
            )));
        }
        Ok(())
    }
}
