//! Edit scripts: a JSON array of tagged actions replayed against a session.
//!
//! Ids generated by the engine (assets, duplicates) are not known when a
//! script is written, so creating actions may bind the new id to a name
//! with `"as"`; any later id field may use that name instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, warn};

use sniply_lib::core::{
    assets::{KnownMediaInfo, MediaInfo},
    effects::{Effect, EffectProcessor, ProcessedSource},
    interaction::{GestureDelta, ResizeEdge},
    selection::SelectMode,
    session::EditorSession,
    timeline::{Keyframe, TransitionType},
    CoreResult, TimeSec, TrackIndex,
};

/// One scripted editor action
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Action {
    #[serde(rename_all = "camelCase")]
    ImportAsset {
        path: PathBuf,
        duration_sec: Option<TimeSec>,
        #[serde(default)]
        thumbnails: Vec<String>,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AddClipToTrack {
        asset_id: String,
        #[serde(default)]
        track_index: TrackIndex,
        start: TimeSec,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AddText {
        #[serde(default)]
        track_index: TrackIndex,
        start: TimeSec,
        content: String,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    MoveClip {
        clip_id: String,
        start: TimeSec,
        track_index: Option<TrackIndex>,
    },
    #[serde(rename_all = "camelCase")]
    ResizeClip {
        clip_id: String,
        start: TimeSec,
        end: TimeSec,
    },
    #[serde(rename_all = "camelCase")]
    SplitClip { clip_id: String, at: TimeSec },
    #[serde(rename_all = "camelCase")]
    DeleteClip { clip_id: String },
    #[serde(rename_all = "camelCase")]
    DuplicateClip {
        clip_id: String,
        #[serde(rename = "as")]
        alias: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    AddTransition {
        from: String,
        to: String,
        #[serde(rename = "type")]
        transition_type: TransitionType,
        duration_sec: TimeSec,
    },
    #[serde(rename_all = "camelCase")]
    RemoveTransition { from: String, to: String },
    #[serde(rename_all = "camelCase")]
    SetKeyframes {
        clip_id: String,
        keyframes: Vec<Keyframe>,
    },
    /// The processing backend runs outside the CLI; the script names its output.
    #[serde(rename_all = "camelCase")]
    ApplyEffect {
        clip_id: String,
        effect: Effect,
        output: String,
        duration_sec: TimeSec,
    },
    #[serde(rename_all = "camelCase")]
    SetPlayhead { time_sec: TimeSec },
    #[serde(rename_all = "camelCase")]
    SplitAtPlayhead { clip_id: String },
    #[serde(rename_all = "camelCase")]
    TrimStartAtPlayhead { clip_id: String },
    #[serde(rename_all = "camelCase")]
    TrimEndAtPlayhead { clip_id: String },
    #[serde(rename_all = "camelCase")]
    Select {
        clip_id: String,
        #[serde(default)]
        mode: SelectMode,
    },
    ClearSelection,
    #[serde(rename_all = "camelCase")]
    MoveSelection { delta_sec: TimeSec },
    DeleteSelection,
    /// Pointer drag replayed frame by frame
    #[serde(rename_all = "camelCase")]
    Drag {
        clip_id: String,
        frames: Vec<GestureDelta>,
    },
    #[serde(rename_all = "camelCase")]
    Resize {
        clip_id: String,
        edge: ResizeEdge,
        frames: Vec<GestureDelta>,
    },
    Undo,
    Redo,
}

/// Reads a script file
pub fn load_script(path: &Path) -> anyhow::Result<Vec<Action>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Processor that hands back the output the script declared
struct DeclaredOutput {
    output: ProcessedSource,
}

impl EffectProcessor for DeclaredOutput {
    fn process(&self, _source_ref: &str, _effect: &Effect) -> CoreResult<ProcessedSource> {
        Ok(self.output.clone())
    }
}

/// Replays actions against a session
pub struct ScriptRunner<'a> {
    session: &'a mut EditorSession,
    aliases: HashMap<String, String>,
    keep_going: bool,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(session: &'a mut EditorSession, keep_going: bool) -> Self {
        Self {
            session,
            aliases: HashMap::new(),
            keep_going,
        }
    }

    /// Runs every action; returns how many were rejected and skipped
    pub fn run(&mut self, actions: &[Action]) -> anyhow::Result<usize> {
        let mut skipped = 0;
        for (index, action) in actions.iter().enumerate() {
            match self.apply(action) {
                Ok(()) => debug!(index, ?action, "Applied action"),
                Err(e) if self.keep_going && e.is_rejection() => {
                    warn!(index, error = %e, "Skipping rejected action");
                    skipped += 1;
                }
                Err(e) => {
                    return Err(anyhow::anyhow!("Action #{index} failed: {e}"));
                }
            }
        }
        info!(applied = actions.len() - skipped, skipped, "Script finished");
        Ok(skipped)
    }

    fn id(&self, name: &str) -> String {
        self.aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    fn bind(&mut self, alias: &Option<String>, id: String) {
        if let Some(alias) = alias {
            self.aliases.insert(alias.clone(), id);
        }
    }

    fn apply(&mut self, action: &Action) -> CoreResult<()> {
        match action {
            Action::ImportAsset {
                path,
                duration_sec,
                thumbnails,
                alias,
            } => {
                let info = MediaInfo {
                    duration_sec: *duration_sec,
                    thumbnails: thumbnails.clone(),
                };
                let provider = KnownMediaInfo::new().with(&path.to_string_lossy(), info);
                let id = self.session.import_asset(path, &provider)?;
                self.bind(alias, id);
            }
            Action::AddClipToTrack {
                asset_id,
                track_index,
                start,
                alias,
            } => {
                let asset_id = self.id(asset_id);
                let id = self
                    .session
                    .add_clip_to_track(&asset_id, *track_index, *start)?;
                self.bind(alias, id);
            }
            Action::AddText {
                track_index,
                start,
                content,
                alias,
            } => {
                let id = self.session.add_text_clip(*track_index, *start, content)?;
                self.bind(alias, id);
            }
            Action::MoveClip {
                clip_id,
                start,
                track_index,
            } => {
                let clip_id = self.id(clip_id);
                self.session.move_clip(&clip_id, *start, *track_index)?;
            }
            Action::ResizeClip {
                clip_id,
                start,
                end,
            } => {
                let clip_id = self.id(clip_id);
                self.session.resize_clip(&clip_id, *start, *end)?;
            }
            Action::SplitClip { clip_id, at } => {
                let clip_id = self.id(clip_id);
                self.session.split_clip(&clip_id, *at)?;
            }
            Action::DeleteClip { clip_id } => {
                let clip_id = self.id(clip_id);
                self.session.delete_clip(&clip_id)?;
            }
            Action::DuplicateClip { clip_id, alias } => {
                let clip_id = self.id(clip_id);
                let id = self.session.duplicate_clip(&clip_id)?;
                self.bind(alias, id);
            }
            Action::AddTransition {
                from,
                to,
                transition_type,
                duration_sec,
            } => {
                let (from, to) = (self.id(from), self.id(to));
                self.session
                    .add_transition(&from, &to, *transition_type, *duration_sec)?;
            }
            Action::RemoveTransition { from, to } => {
                let (from, to) = (self.id(from), self.id(to));
                self.session.remove_transition(&from, &to)?;
            }
            Action::SetKeyframes { clip_id, keyframes } => {
                let clip_id = self.id(clip_id);
                self.session.set_keyframes(&clip_id, keyframes.clone())?;
            }
            Action::ApplyEffect {
                clip_id,
                effect,
                output,
                duration_sec,
            } => {
                let clip_id = self.id(clip_id);
                let processor = DeclaredOutput {
                    output: ProcessedSource {
                        source_ref: output.clone(),
                        duration_sec: *duration_sec,
                    },
                };
                self.session.apply_effect(&clip_id, effect, &processor)?;
            }
            Action::SetPlayhead { time_sec } => self.session.set_playhead(*time_sec)?,
            Action::SplitAtPlayhead { clip_id } => {
                let clip_id = self.id(clip_id);
                self.session.split_at_playhead(&clip_id)?;
            }
            Action::TrimStartAtPlayhead { clip_id } => {
                let clip_id = self.id(clip_id);
                self.session.trim_start_at_playhead(&clip_id)?;
            }
            Action::TrimEndAtPlayhead { clip_id } => {
                let clip_id = self.id(clip_id);
                self.session.trim_end_at_playhead(&clip_id)?;
            }
            Action::Select { clip_id, mode } => {
                let clip_id = self.id(clip_id);
                self.session.select(&clip_id, *mode)?;
            }
            Action::ClearSelection => self.session.clear_selection(),
            Action::MoveSelection { delta_sec } => self.session.move_selection(*delta_sec)?,
            Action::DeleteSelection => self.session.delete_selection()?,
            Action::Drag { clip_id, frames } => {
                let clip_id = self.id(clip_id);
                self.session.begin_drag(&clip_id)?;
                self.replay_frames(frames)?;
            }
            Action::Resize {
                clip_id,
                edge,
                frames,
            } => {
                let clip_id = self.id(clip_id);
                self.session.begin_resize(&clip_id, *edge)?;
                self.replay_frames(frames)?;
            }
            Action::Undo => self.session.undo()?,
            Action::Redo => self.session.redo()?,
        }
        Ok(())
    }

    /// Feeds gesture frames; rejected frames are skipped like a pointer
    /// hovering over an invalid spot.
    fn replay_frames(&mut self, frames: &[GestureDelta]) -> CoreResult<()> {
        for delta in frames {
            match self.session.update_gesture(*delta) {
                Ok(snapped_to) => debug!(?delta, ?snapped_to, "Frame accepted"),
                Err(e) if e.is_rejection() => debug!(?delta, error = %e, "Frame rejected"),
                Err(e) => {
                    self.session.cancel_gesture()?;
                    return Err(e);
                }
            }
        }
        self.session.end_gesture()?;
        Ok(())
    }
}
