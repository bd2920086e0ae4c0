//! Project Document Module
//!
//! The persisted JSON form of a project. Clips are stored nested under their
//! tracks; loading rebuilds the scene through its validated operations and
//! rejects anything that breaks an invariant.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{
    assets::Asset,
    fs::write_json_atomic,
    project::{ProjectMeta, ProjectState},
    selection::Selection,
    timeline::{Clip, Scene, TrackKind, TrackRef, Transition},
    ClipId, CoreError, CoreResult, TimeSec,
};

/// Current document format version
pub const DOCUMENT_VERSION: u32 = 1;

/// One track row in the document
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackDocument {
    #[serde(default)]
    pub clips: Vec<Clip>,
}

/// Persisted project
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub version: u32,
    pub meta: ProjectMeta,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub tracks_by_kind: BTreeMap<TrackKind, Vec<TrackDocument>>,
    #[serde(default)]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub selection: Vec<ClipId>,
    #[serde(default)]
    pub playhead: TimeSec,
}

fn corrupted(err: CoreError) -> CoreError {
    match err {
        CoreError::ProjectCorrupted(_) => err,
        other => CoreError::ProjectCorrupted(other.to_string()),
    }
}

impl ProjectDocument {
    /// Captures a project state
    pub fn from_state(state: &ProjectState) -> Self {
        let tracks_by_kind = state
            .scene
            .tracks_by_kind()
            .iter()
            .map(|(kind, rows)| {
                let rows = rows
                    .iter()
                    .map(|row| TrackDocument {
                        clips: row
                            .clip_ids
                            .iter()
                            .filter_map(|id| state.scene.clip(id).cloned())
                            .collect(),
                    })
                    .collect();
                (*kind, rows)
            })
            .collect();

        Self {
            version: DOCUMENT_VERSION,
            meta: state.meta.clone(),
            assets: state.assets.values().cloned().collect(),
            tracks_by_kind,
            transitions: state.scene.transitions().iter().cloned().collect(),
            selection: state.selection.ids().to_vec(),
            playhead: state.playhead,
        }
    }

    /// Rebuilds a validated project state; any violation is `ProjectCorrupted`
    pub fn into_state(self) -> CoreResult<ProjectState> {
        if self.version > DOCUMENT_VERSION {
            return Err(CoreError::ProjectCorrupted(format!(
                "Unsupported document version {} (newest known is {})",
                self.version, DOCUMENT_VERSION
            )));
        }
        if !self.playhead.is_finite() || self.playhead < 0.0 {
            return Err(CoreError::ProjectCorrupted(format!(
                "Invalid playhead {}",
                self.playhead
            )));
        }

        let mut scene = Scene::new();
        for (kind, rows) in self.tracks_by_kind {
            for (index, row) in rows.into_iter().enumerate() {
                let track = TrackRef::new(kind, index);
                scene.ensure_track(track);
                for clip in row.clips {
                    if clip.track_index != index {
                        return Err(CoreError::ProjectCorrupted(format!(
                            "Clip {} is stored on {} #{} but claims row {}",
                            clip.id, kind, index, clip.track_index
                        )));
                    }
                    scene.add_clip(track, clip).map_err(corrupted)?;
                }
            }
        }

        for transition in self.transitions {
            scene
                .add_transition(
                    &transition.from_clip_id,
                    &transition.to_clip_id,
                    transition.transition_type,
                    transition.duration_sec,
                )
                .map_err(corrupted)?;
        }
        scene.validate().map_err(corrupted)?;

        if let Some(missing) = self.selection.iter().find(|id| !scene.contains_clip(id)) {
            return Err(CoreError::ProjectCorrupted(format!(
                "Selection references missing clip {missing}"
            )));
        }
        let mut selection = Selection::new();
        selection.set(&scene, &self.selection);

        let mut assets = BTreeMap::new();
        for asset in self.assets {
            assets.insert(asset.id.clone(), asset);
        }

        Ok(ProjectState {
            meta: self.meta,
            assets,
            scene,
            selection,
            playhead: self.playhead,
            is_dirty: false,
        })
    }

    /// Writes the document atomically
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        write_json_atomic(path, self)?;
        info!("Saved project document to {}", path.display());
        Ok(())
    }

    /// Reads a document from disk
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ProjectNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| CoreError::ProjectCorrupted(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        assets::AssetKind,
        timeline::{ClipProperties, TransitionType},
        Color,
    };
    use tempfile::TempDir;

    fn sample_state() -> ProjectState {
        let mut state = ProjectState::new("Sample");
        let asset = Asset::new("/media/a.mp4", AssetKind::Video).with_duration(20.0);
        let asset_id = asset.id.clone();
        state.assets.insert(asset_id.clone(), asset);

        let v0 = TrackRef::new(TrackKind::Video, 0);
        state
            .scene
            .add_clip(
                v0,
                Clip::new(TrackKind::Video, &asset_id, 20.0)
                    .with_id("a")
                    .with_interval(0.0, 5.0)
                    .with_asset(&asset_id),
            )
            .unwrap();
        state
            .scene
            .add_clip(
                v0,
                Clip::new(TrackKind::Video, &asset_id, 20.0)
                    .with_id("b")
                    .with_interval(5.0, 9.0),
            )
            .unwrap();
        state
            .scene
            .add_clip(
                TrackRef::new(TrackKind::Text, 0),
                Clip::new(TrackKind::Text, "", 3.0)
                    .with_id("t")
                    .with_properties(ClipProperties::text("Hello", 32, Color::white())),
            )
            .unwrap();
        // Leaves text row 0 empty
        state.scene.move_clip("t", 0.0, 1).unwrap();
        state
            .scene
            .add_transition("a", "b", TransitionType::Fade, 0.5)
            .unwrap();
        state.selection.set(&state.scene, &["b".to_string()]);
        state.playhead = 4.0;
        state
    }

    #[test]
    fn test_document_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.sniply.json");
        let state = sample_state();

        ProjectDocument::from_state(&state).save(&path).unwrap();
        let loaded = ProjectDocument::load(&path).unwrap().into_state().unwrap();

        assert_eq!(loaded.scene, state.scene);
        assert_eq!(loaded.selection.ids(), state.selection.ids());
        assert_eq!(loaded.assets, state.assets);
        assert_eq!(loaded.playhead, 4.0);
        // Empty text row 0 survives alongside row 1
        assert_eq!(loaded.scene.tracks(TrackKind::Text).len(), 2);
    }

    #[test]
    fn test_document_json_shape() {
        let json = serde_json::to_value(ProjectDocument::from_state(&sample_state())).unwrap();

        assert_eq!(json["version"], DOCUMENT_VERSION);
        assert_eq!(json["tracksByKind"]["video"][0]["clips"][1]["id"], "b");
        assert_eq!(json["transitions"][0]["type"], "fade");
    }

    #[test]
    fn test_overlapping_document_is_corrupted() {
        let mut doc = ProjectDocument::from_state(&sample_state());
        if let Some(rows) = doc.tracks_by_kind.get_mut(&TrackKind::Video) {
            rows[0].clips[1].start = 3.0;
        }

        assert!(matches!(
            doc.into_state(),
            Err(CoreError::ProjectCorrupted(_))
        ));
    }

    #[test]
    fn test_non_adjacent_transition_is_corrupted() {
        let mut doc = ProjectDocument::from_state(&sample_state());
        doc.transitions
            .push(Transition::new("b", "a", TransitionType::Blur, 1.0));

        assert!(matches!(
            doc.into_state(),
            Err(CoreError::ProjectCorrupted(_))
        ));
    }

    #[test]
    fn test_dangling_selection_is_corrupted() {
        let mut doc = ProjectDocument::from_state(&sample_state());
        doc.selection.push("ghost".to_string());

        assert!(matches!(
            doc.into_state(),
            Err(CoreError::ProjectCorrupted(_))
        ));
    }

    #[test]
    fn test_load_missing_and_garbage() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            ProjectDocument::load(&missing),
            Err(CoreError::ProjectNotFound(_))
        ));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(
            ProjectDocument::load(&garbage),
            Err(CoreError::ProjectCorrupted(_))
        ));
    }
}
