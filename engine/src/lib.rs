//! Sniply Core Library
//!
//! Timeline editing engine for short-form video: tracks, clips and
//! transitions kept consistent under pointer gestures, keyboard edits and
//! programmatic operations, with snapshot undo/redo.
//!
//! Media decoding, effect processing and encoding are left to the host,
//! which plugs in through the collaborator traits in `core::assets`,
//! `core::effects` and `core::render`.

pub mod core;

use std::path::PathBuf;

use tracing::info;

use crate::core::{
    project::{ProjectDocument, ProjectState},
    session::EditorSession,
    settings::EditorSettings,
    CoreResult,
};

// =============================================================================
// Active Project
// =============================================================================

/// A project document opened for editing
pub struct ActiveProject {
    /// Project document path
    pub path: PathBuf,
    /// Editing session (state, history, gesture)
    pub session: EditorSession,
}

impl ActiveProject {
    /// Creates a new empty project and writes its document
    pub fn create(name: &str, path: PathBuf, settings: EditorSettings) -> CoreResult<Self> {
        let state = ProjectState::new(name);
        ProjectDocument::from_state(&state).save(&path)?;
        info!("Created project '{}' at {}", name, path.display());

        Ok(Self {
            path,
            session: EditorSession::new(state, settings),
        })
    }

    /// Opens an existing project document. History starts empty.
    pub fn open(path: PathBuf, settings: EditorSettings) -> CoreResult<Self> {
        let state = ProjectDocument::load(&path)?.into_state()?;
        info!(
            clips = state.scene.clip_count(),
            assets = state.assets.len(),
            "Opened project '{}'",
            state.meta.name
        );

        Ok(Self {
            path,
            session: EditorSession::new(state, settings),
        })
    }

    /// Writes the current state back to the document
    pub fn save(&mut self) -> CoreResult<()> {
        ProjectDocument::from_state(self.session.state()).save(&self.path)?;
        self.session.mark_saved();
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        timeline::{Clip, TrackKind, TrackRef},
        CoreError,
    };
    use tempfile::TempDir;

    #[test]
    fn test_active_project_create() {
        let temp_dir = TempDir::new().unwrap();
        let project_path = temp_dir.path().join("demo.sniply.json");

        let project =
            ActiveProject::create("Demo", project_path.clone(), EditorSettings::default()).unwrap();

        assert_eq!(project.session.state().meta.name, "Demo");
        assert!(project_path.exists());
    }

    #[test]
    fn test_active_project_save_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let project_path = temp_dir.path().join("demo.sniply.json");

        let mut project =
            ActiveProject::create("Demo", project_path.clone(), EditorSettings::default()).unwrap();
        project
            .session
            .add_clip(
                TrackRef::new(TrackKind::Audio, 0),
                Clip::new(TrackKind::Audio, "song.wav", 12.0).with_id("music"),
            )
            .unwrap();
        assert!(project.session.state().is_dirty);
        project.save().unwrap();
        assert!(!project.session.state().is_dirty);

        let reopened = ActiveProject::open(project_path, EditorSettings::default()).unwrap();
        assert_eq!(reopened.session.scene(), project.session.scene());
        assert!(!reopened.session.can_undo());
    }

    #[test]
    fn test_active_project_open_missing() {
        let temp_dir = TempDir::new().unwrap();
        let result = ActiveProject::open(
            temp_dir.path().join("nope.json"),
            EditorSettings::default(),
        );
        assert!(matches!(result, Err(CoreError::ProjectNotFound(_))));
    }
}
