//! Editor Session
//!
//! The command surface of the engine. A session owns one project state, its
//! undo history and the gesture in flight, and routes every user action
//! through validation before anything is committed.

use std::path::Path;

use tracing::{debug, info};

use crate::core::{
    assets::{Asset, AssetKind, MediaInfoProvider},
    commands::{
        AddClipCommand, AddTransitionCommand, ApplyEffectResultCommand, Command, CommandExecutor,
        CommandResult, DeleteClipsCommand, DuplicateClipCommand, ImportAssetCommand,
        InsertClipCommand, MoveClipCommand, MoveClipsCommand, RemoveTransitionCommand,
        ResizeClipCommand, SetClipPropertiesCommand, SetKeyframesCommand, SplitClipCommand,
    },
    effects::{Effect, EffectProcessor},
    interaction::{
        geometry_changed, gesture_candidate, split_point, trim_interval, Gesture, GestureDelta,
        GestureKind, InteractionContext, ResizeEdge, SnapConfig, TrimSide,
    },
    project::{HistorySnapshot, ProjectState},
    render::{export_segments, ExportEncoder, ExportPreset, ExportRequest, ExportSegment},
    selection::{SelectMode, Selection},
    settings::EditorSettings,
    timeline::{
        Clip, ClipPlacement, ClipProperties, Keyframe, Scene, TrackKind, TrackRef, TransitionType,
    },
    AssetId, ClipId, Color, CoreError, CoreResult, TimeSec, TrackIndex,
};

/// Font size given to new text clips
const DEFAULT_TEXT_FONT_SIZE: u32 = 48;

/// A gesture plus the state to record when it commits
struct ActiveGesture {
    gesture: Gesture,
    before: HistorySnapshot,
}

/// Editing session over one project
pub struct EditorSession {
    state: ProjectState,
    executor: CommandExecutor,
    settings: EditorSettings,
    gesture: Option<ActiveGesture>,
}

impl EditorSession {
    /// Opens a session over an existing project state
    pub fn new(state: ProjectState, settings: EditorSettings) -> Self {
        let executor = CommandExecutor::new().with_max_history(settings.max_history);
        Self {
            state,
            executor,
            settings,
            gesture: None,
        }
    }

    /// Session over a new empty project with default settings
    pub fn with_defaults(name: &str) -> Self {
        Self::new(ProjectState::new(name), EditorSettings::default())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> &ProjectState {
        &self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.state.scene
    }

    pub fn selection(&self) -> &Selection {
        &self.state.selection
    }

    pub fn playhead(&self) -> TimeSec {
        self.state.playhead
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn executor(&self) -> &CommandExecutor {
        &self.executor
    }

    pub fn can_undo(&self) -> bool {
        self.executor.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.executor.can_redo()
    }

    /// The gesture in flight, if any
    pub fn active_gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref().map(|g| &g.gesture)
    }

    /// Marks the state as saved
    pub fn mark_saved(&mut self) {
        self.state.is_dirty = false;
    }

    /// Applies new editor settings (snapping, zoom, history depth)
    pub fn set_settings(&mut self, settings: EditorSettings) {
        self.executor.set_max_history(settings.max_history);
        self.settings = settings;
    }

    pub fn into_state(self) -> ProjectState {
        self.state
    }

    /// Parameters the interaction engine computes frames with
    pub fn interaction_context(&self) -> InteractionContext {
        InteractionContext {
            playhead: self.state.playhead,
            snap: SnapConfig {
                enabled: self.settings.snapping_enabled,
                epsilon: self.settings.snap_epsilon_sec,
            },
            min_duration: self.settings.min_duration_sec(),
        }
    }

    fn ensure_idle(&self) -> CoreResult<()> {
        if self.gesture.is_some() {
            return Err(CoreError::GestureInProgress);
        }
        Ok(())
    }

    fn execute(&mut self, command: Box<dyn Command>) -> CoreResult<CommandResult> {
        self.ensure_idle()?;
        self.executor.execute(command, &mut self.state)
    }

    fn first_created(result: CommandResult) -> CoreResult<String> {
        result
            .created_ids
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::Internal("Command reported no created id".to_string()))
    }

    // =========================================================================
    // Assets
    // =========================================================================

    /// Probes a media file and adds it to the project
    pub fn import_asset(&mut self, path: &Path, provider: &dyn MediaInfoProvider) -> CoreResult<AssetId> {
        self.ensure_idle()?;
        let kind = AssetKind::from_path(path).ok_or_else(|| {
            CoreError::AssetImportFailed(format!("Unsupported media type: {}", path.display()))
        })?;
        let info = provider.probe(path)?;
        if kind != AssetKind::Image && info.duration_sec.is_none() {
            return Err(CoreError::AssetImportFailed(format!(
                "No duration reported for {}",
                path.display()
            )));
        }

        let mut asset = Asset::new(&path.to_string_lossy(), kind).with_thumbnails(info.thumbnails);
        asset.duration_sec = info.duration_sec;

        let result = self.execute(Box::new(ImportAssetCommand::new(asset)))?;
        Self::first_created(result)
    }

    // =========================================================================
    // Clip Edits
    // =========================================================================

    /// Places an imported asset on a row of its kind
    pub fn add_clip_to_track(
        &mut self,
        asset_id: &str,
        track_index: TrackIndex,
        start: TimeSec,
    ) -> CoreResult<ClipId> {
        let command = InsertClipCommand::new(asset_id, track_index, start)
            .with_image_duration(self.settings.default_image_duration_sec);
        let result = self.execute(Box::new(command))?;
        Self::first_created(result)
    }

    /// Adds a fully described clip
    pub fn add_clip(&mut self, track: TrackRef, clip: Clip) -> CoreResult<ClipId> {
        let result = self.execute(Box::new(AddClipCommand::new(track, clip)))?;
        Self::first_created(result)
    }

    /// Adds a text overlay clip of the default text duration
    pub fn add_text_clip(
        &mut self,
        track_index: TrackIndex,
        start: TimeSec,
        content: &str,
    ) -> CoreResult<ClipId> {
        let clip = Clip::new(TrackKind::Text, "", self.settings.default_text_duration_sec)
            .place_at(start)
            .with_properties(ClipProperties::text(
                content,
                DEFAULT_TEXT_FONT_SIZE,
                Color::white(),
            ));
        self.add_clip(TrackRef::new(TrackKind::Text, track_index), clip)
    }

    pub fn move_clip(
        &mut self,
        clip_id: &str,
        new_start: TimeSec,
        new_track_index: Option<TrackIndex>,
    ) -> CoreResult<()> {
        let mut command = MoveClipCommand::new(clip_id, new_start);
        command.new_track_index = new_track_index;
        self.execute(Box::new(command)).map(|_| ())
    }

    pub fn resize_clip(&mut self, clip_id: &str, new_start: TimeSec, new_end: TimeSec) -> CoreResult<()> {
        self.execute(Box::new(ResizeClipCommand::new(clip_id, new_start, new_end)))
            .map(|_| ())
    }

    /// Splits a clip, returning `(earlier, later)` child ids
    pub fn split_clip(&mut self, clip_id: &str, at_time: TimeSec) -> CoreResult<(ClipId, ClipId)> {
        let result = self.execute(Box::new(SplitClipCommand::new(clip_id, at_time)))?;
        Self::split_children(result)
    }

    fn split_children(result: CommandResult) -> CoreResult<(ClipId, ClipId)> {
        match <[String; 2]>::try_from(result.created_ids) {
            Ok([left, right]) => Ok((left, right)),
            Err(ids) => Err(CoreError::Internal(format!(
                "Split reported {} children",
                ids.len()
            ))),
        }
    }

    pub fn delete_clip(&mut self, clip_id: &str) -> CoreResult<()> {
        self.execute(Box::new(DeleteClipsCommand::single(clip_id)))
            .map(|_| ())
    }

    pub fn duplicate_clip(&mut self, clip_id: &str) -> CoreResult<ClipId> {
        let result = self.execute(Box::new(DuplicateClipCommand::new(clip_id)))?;
        Self::first_created(result)
    }

    pub fn set_keyframes(&mut self, clip_id: &str, keyframes: Vec<Keyframe>) -> CoreResult<()> {
        self.execute(Box::new(SetKeyframesCommand::new(clip_id, keyframes)))
            .map(|_| ())
    }

    pub fn set_clip_properties(&mut self, clip_id: &str, properties: ClipProperties) -> CoreResult<()> {
        self.execute(Box::new(SetClipPropertiesCommand::new(clip_id, properties)))
            .map(|_| ())
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    pub fn add_transition(
        &mut self,
        from: &str,
        to: &str,
        transition_type: TransitionType,
        duration_sec: TimeSec,
    ) -> CoreResult<()> {
        self.execute(Box::new(AddTransitionCommand::new(
            from,
            to,
            transition_type,
            duration_sec,
        )))
        .map(|_| ())
    }

    pub fn remove_transition(&mut self, from: &str, to: &str) -> CoreResult<()> {
        self.execute(Box::new(RemoveTransitionCommand::new(from, to)))
            .map(|_| ())
    }

    // =========================================================================
    // Effects
    // =========================================================================

    /// Runs an effect on a clip's source and points the clip at the result
    pub fn apply_effect(
        &mut self,
        clip_id: &str,
        effect: &Effect,
        processor: &dyn EffectProcessor,
    ) -> CoreResult<()> {
        self.ensure_idle()?;
        effect.validate()?;
        let source_ref = self.state.scene.get_clip(clip_id)?.source_ref.clone();

        let processed = processor
            .process(&source_ref, effect)
            .map_err(|e| match e {
                CoreError::EffectFailed(_) => e,
                other => CoreError::EffectFailed(other.to_string()),
            })?;
        info!(
            clip_id,
            processor = effect.processor_name(),
            output = %processed.source_ref,
            "Effect processed"
        );

        self.execute(Box::new(ApplyEffectResultCommand::new(
            clip_id,
            effect.processor_name(),
            processed,
        )))
        .map(|_| ())
    }

    // =========================================================================
    // Playhead Edits
    // =========================================================================

    pub fn set_playhead(&mut self, time_sec: TimeSec) -> CoreResult<()> {
        self.state.set_playhead(time_sec)
    }

    /// Splits a clip at the playhead; the later child becomes the selection
    pub fn split_at_playhead(&mut self, clip_id: &str) -> CoreResult<(ClipId, ClipId)> {
        let at_time = split_point(self.state.scene.get_clip(clip_id)?, self.state.playhead)?;
        let result = self.execute(Box::new(
            SplitClipCommand::new(clip_id, at_time).selecting_later(),
        ))?;
        Self::split_children(result)
    }

    /// Moves the clip start to the playhead. Returns false when that would
    /// leave an empty clip (or change nothing); no history entry is made then.
    pub fn trim_start_at_playhead(&mut self, clip_id: &str) -> CoreResult<bool> {
        self.trim_at_playhead(clip_id, TrimSide::Start)
    }

    /// Moves the clip end to the playhead; see [`Self::trim_start_at_playhead`]
    pub fn trim_end_at_playhead(&mut self, clip_id: &str) -> CoreResult<bool> {
        self.trim_at_playhead(clip_id, TrimSide::End)
    }

    fn trim_at_playhead(&mut self, clip_id: &str, side: TrimSide) -> CoreResult<bool> {
        self.ensure_idle()?;
        let clip = self.state.scene.get_clip(clip_id)?;
        let Some((start, end)) = trim_interval(clip, self.state.playhead, side) else {
            debug!(clip_id, playhead = self.state.playhead, ?side, "Trim at playhead is a no-op");
            return Ok(false);
        };

        self.execute(Box::new(ResizeClipCommand::trim(clip_id, start, end)))?;
        Ok(true)
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Applies a click on a clip
    pub fn select(&mut self, clip_id: &str, mode: SelectMode) -> CoreResult<()> {
        self.state.selection.apply(&self.state.scene, clip_id, mode)
    }

    /// Shift-click
    pub fn select_range(&mut self, clip_id: &str) -> CoreResult<()> {
        self.select(clip_id, SelectMode::Range)
    }

    /// Click on an empty area
    pub fn clear_selection(&mut self) {
        self.state.selection.clear();
    }

    /// Shifts every selected clip by `delta_sec` in one step
    pub fn move_selection(&mut self, delta_sec: TimeSec) -> CoreResult<()> {
        if !delta_sec.is_finite() {
            return Err(CoreError::ValidationError(
                "Move delta must be finite".to_string(),
            ));
        }
        let placements = self
            .state
            .selection
            .ids()
            .iter()
            .map(|id| {
                let clip = self.state.scene.get_clip(id)?;
                Ok(ClipPlacement::new(
                    id,
                    clip.start + delta_sec,
                    clip.end + delta_sec,
                    clip.track_index,
                ))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        self.execute(Box::new(MoveClipsCommand::new(placements)))
            .map(|_| ())
    }

    /// Deletes every selected clip in one step
    pub fn delete_selection(&mut self) -> CoreResult<()> {
        let ids = self.state.selection.ids().to_vec();
        self.execute(Box::new(DeleteClipsCommand::new(ids)))
            .map(|_| ())
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Starts dragging a clip. If it is part of a multi-selection the whole
    /// selection moves with it.
    pub fn begin_drag(&mut self, clip_id: &str) -> CoreResult<()> {
        self.ensure_idle()?;
        let selection = &self.state.selection;
        let group: Vec<ClipId> = if selection.len() > 1 && selection.contains(clip_id) {
            selection.ids().to_vec()
        } else {
            vec![]
        };

        let gesture = Gesture::drag(&self.state.scene, clip_id, &group)?;
        debug!(clip_id, members = gesture.members.len(), "Drag started");
        self.begin(gesture);
        Ok(())
    }

    /// Starts dragging one edge of a clip
    pub fn begin_resize(&mut self, clip_id: &str, edge: ResizeEdge) -> CoreResult<()> {
        self.ensure_idle()?;
        let gesture = Gesture::resize(&self.state.scene, clip_id, edge)?;
        debug!(clip_id, ?edge, "Resize started");
        self.begin(gesture);
        Ok(())
    }

    fn begin(&mut self, gesture: Gesture) {
        self.gesture = Some(ActiveGesture {
            gesture,
            before: self.state.snapshot(),
        });
    }

    /// Computes a frame for the pointer displacement since the gesture began.
    ///
    /// An accepted frame becomes the visible scene and reports the snap target
    /// it hit; a rejected frame returns the error and leaves the last accepted
    /// frame in place.
    pub fn update_gesture(&mut self, delta: GestureDelta) -> CoreResult<Option<TimeSec>> {
        let ctx = self.interaction_context();
        let active = self.gesture.as_ref().ok_or(CoreError::NoActiveGesture)?;

        let frame = gesture_candidate(&active.gesture, &delta, &ctx)?;
        self.state.scene = frame.scene;
        Ok(frame.snapped_to)
    }

    /// Finishes the gesture. Returns true if it moved anything, in which case
    /// exactly one history entry was recorded.
    pub fn end_gesture(&mut self) -> CoreResult<bool> {
        let active = self.gesture.take().ok_or(CoreError::NoActiveGesture)?;
        if !geometry_changed(&active.gesture, &self.state.scene) {
            debug!("Gesture ended without changes");
            return Ok(false);
        }

        let label = match active.gesture.kind {
            GestureKind::Drag if active.gesture.is_group() => "DragClips",
            GestureKind::Drag => "DragClip",
            GestureKind::Resize { .. } => "ResizeClip",
        };
        let op_id = ulid::Ulid::new().to_string();
        self.state.selection.retain_existing(&self.state.scene);
        self.executor
            .record(&op_id, label, active.before, &mut self.state);

        info!(command = label, op_id = %op_id, "Committed gesture");
        Ok(true)
    }

    /// Abandons the gesture and restores the scene it began from
    pub fn cancel_gesture(&mut self) -> CoreResult<()> {
        let active = self.gesture.take().ok_or(CoreError::NoActiveGesture)?;
        self.state.scene = active.gesture.origin;
        debug!("Gesture cancelled");
        Ok(())
    }

    // =========================================================================
    // History
    // =========================================================================

    pub fn undo(&mut self) -> CoreResult<()> {
        self.ensure_idle()?;
        self.executor.undo(&mut self.state)
    }

    pub fn redo(&mut self) -> CoreResult<()> {
        self.ensure_idle()?;
        self.executor.redo(&mut self.state)
    }

    // =========================================================================
    // Export
    // =========================================================================

    /// Flattened, ordered clip list for the renderer
    pub fn export_segments(&self) -> Vec<ExportSegment> {
        export_segments(&self.state.scene)
    }

    /// Builds an export request and hands it to the encoder
    pub fn export(&self, encoder: &dyn ExportEncoder, preset: ExportPreset) -> CoreResult<Vec<u8>> {
        let request = ExportRequest::build(&self.state.scene, preset)?;
        let bytes = encoder.encode(&request).map_err(|e| match e {
            CoreError::ExportFailed(_) => e,
            other => CoreError::ExportFailed(other.to_string()),
        })?;

        info!(
            preset = preset.label(),
            segments = request.segments.len(),
            bytes = bytes.len(),
            "Exported timeline"
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        assets::{KnownMediaInfo, MediaInfo},
        effects::ProcessedSource,
        render::ManifestEncoder,
    };

    fn v0() -> TrackRef {
        TrackRef::new(TrackKind::Video, 0)
    }

    fn video(id: &str, start: TimeSec, end: TimeSec) -> Clip {
        Clip::new(TrackKind::Video, "src.mp4", 60.0)
            .with_id(id)
            .with_interval(start, end)
    }

    fn session_with(clips: &[(&str, TimeSec, TimeSec)]) -> EditorSession {
        let mut session = EditorSession::with_defaults("Test");
        for (id, start, end) in clips {
            session.add_clip(v0(), video(id, *start, *end)).unwrap();
        }
        session
    }

    struct Renamer;

    impl EffectProcessor for Renamer {
        fn process(&self, source_ref: &str, effect: &Effect) -> CoreResult<ProcessedSource> {
            Ok(ProcessedSource {
                source_ref: format!("{source_ref}.{}", effect.processor_name()),
                duration_sec: 60.0,
            })
        }
    }

    struct Broken;

    impl EffectProcessor for Broken {
        fn process(&self, _source_ref: &str, _effect: &Effect) -> CoreResult<ProcessedSource> {
            Err(CoreError::Internal("backend offline".to_string()))
        }
    }

    #[test]
    fn test_import_and_place_asset() {
        let mut session = EditorSession::with_defaults("Test");
        let provider = KnownMediaInfo::new()
            .with("/m/a.mp4", MediaInfo::with_duration(4.0))
            .with("/m/logo.png", MediaInfo::still());

        let video_id = session.import_asset(Path::new("/m/a.mp4"), &provider).unwrap();
        let image_id = session
            .import_asset(Path::new("/m/logo.png"), &provider)
            .unwrap();

        let clip_id = session.add_clip_to_track(&video_id, 0, 1.0).unwrap();
        assert_eq!(session.scene().get_clip(&clip_id).unwrap().end, 5.0);

        let image_clip = session.add_clip_to_track(&image_id, 0, 0.0).unwrap();
        assert_eq!(session.scene().get_clip(&image_clip).unwrap().duration(), 5.0);
        assert_eq!(session.executor().undo_count(), 4);
    }

    #[test]
    fn test_import_rejects_unknown_media() {
        let mut session = EditorSession::with_defaults("Test");
        let provider = KnownMediaInfo::new();

        assert!(matches!(
            session.import_asset(Path::new("/m/notes.txt"), &provider),
            Err(CoreError::AssetImportFailed(_))
        ));
        assert!(matches!(
            session.import_asset(Path::new("/m/missing.mp4"), &provider),
            Err(CoreError::AssetImportFailed(_))
        ));
        assert!(!session.can_undo());
    }

    #[test]
    fn test_text_clip_uses_default_duration() {
        let mut session = EditorSession::with_defaults("Test");
        let id = session.add_text_clip(0, 2.0, "Title").unwrap();

        let clip = session.scene().get_clip(&id).unwrap();
        assert_eq!((clip.start, clip.end), (2.0, 5.0));
        assert_eq!(clip.kind, TrackKind::Text);
    }

    #[test]
    fn test_drag_commits_one_entry() {
        let mut session = session_with(&[("a", 0.0, 5.0), ("b", 10.0, 15.0)]);
        let history = session.executor().undo_count();

        session.begin_drag("a").unwrap();
        session.update_gesture(GestureDelta::horizontal(1.0)).unwrap();
        session.update_gesture(GestureDelta::horizontal(2.0)).unwrap();
        assert!(session.end_gesture().unwrap());

        assert_eq!(session.executor().undo_count(), history + 1);
        assert_eq!(session.executor().last_command_type(), Some("DragClip"));
        assert_eq!(session.scene().get_clip("a").unwrap().start, 2.0);

        session.undo().unwrap();
        assert_eq!(session.scene().get_clip("a").unwrap().start, 0.0);
    }

    #[test]
    fn test_rejected_frame_keeps_last_accepted() {
        let mut session = session_with(&[("a", 0.0, 5.0), ("b", 10.0, 15.0)]);

        session.begin_drag("a").unwrap();
        session.update_gesture(GestureDelta::horizontal(2.0)).unwrap();
        assert!(session.update_gesture(GestureDelta::horizontal(7.0)).is_err());
        assert_eq!(session.scene().get_clip("a").unwrap().start, 2.0);
        session.end_gesture().unwrap();
        assert_eq!(session.scene().get_clip("a").unwrap().start, 2.0);
    }

    #[test]
    fn test_gesture_without_change_records_nothing() {
        let mut session = session_with(&[("a", 0.0, 5.0)]);
        let history = session.executor().undo_count();

        session.begin_drag("a").unwrap();
        session.update_gesture(GestureDelta::horizontal(0.0)).unwrap();
        assert!(!session.end_gesture().unwrap());
        assert_eq!(session.executor().undo_count(), history);
    }

    #[test]
    fn test_cancel_restores_origin() {
        let mut session = session_with(&[("a", 0.0, 5.0)]);
        let before = session.scene().clone();

        session.begin_resize("a", ResizeEdge::End).unwrap();
        session.update_gesture(GestureDelta::horizontal(2.0)).unwrap();
        assert_eq!(session.scene().get_clip("a").unwrap().end, 7.0);

        session.cancel_gesture().unwrap();
        assert_eq!(session.scene(), &before);
        assert!(session.active_gesture().is_none());
    }

    #[test]
    fn test_gesture_lifecycle_errors() {
        let mut session = session_with(&[("a", 0.0, 5.0)]);

        assert!(matches!(
            session.update_gesture(GestureDelta::horizontal(1.0)),
            Err(CoreError::NoActiveGesture)
        ));
        assert!(matches!(session.end_gesture(), Err(CoreError::NoActiveGesture)));
        assert!(matches!(session.cancel_gesture(), Err(CoreError::NoActiveGesture)));

        session.begin_drag("a").unwrap();
        assert!(matches!(
            session.begin_resize("a", ResizeEdge::Start),
            Err(CoreError::GestureInProgress)
        ));
        assert!(matches!(session.undo(), Err(CoreError::GestureInProgress)));
        assert!(matches!(
            session.delete_clip("a"),
            Err(CoreError::GestureInProgress)
        ));
    }

    #[test]
    fn test_drag_of_selected_clip_moves_group() {
        let mut session = session_with(&[("a", 0.0, 5.0), ("b", 10.0, 15.0)]);
        session.select("a", SelectMode::Replace).unwrap();
        session.select("b", SelectMode::Toggle).unwrap();

        session.begin_drag("b").unwrap();
        session.update_gesture(GestureDelta::horizontal(3.0)).unwrap();
        session.end_gesture().unwrap();

        assert_eq!(session.scene().get_clip("a").unwrap().start, 3.0);
        assert_eq!(session.scene().get_clip("b").unwrap().start, 13.0);
        assert_eq!(session.executor().last_command_type(), Some("DragClips"));
    }

    #[test]
    fn test_resize_respects_minimum_duration() {
        let mut session = session_with(&[("a", 0.0, 5.0)]);

        session.begin_resize("a", ResizeEdge::End).unwrap();
        let result = session.update_gesture(GestureDelta::horizontal(-4.8));
        assert!(matches!(result, Err(CoreError::BelowMinimumDuration { .. })));
        session.update_gesture(GestureDelta::horizontal(-4.5)).unwrap();
        session.end_gesture().unwrap();

        assert_eq!(session.scene().get_clip("a").unwrap().end, 0.5);
    }

    #[test]
    fn test_split_at_playhead_selects_later_child() {
        let mut session = session_with(&[("a", 0.0, 5.0)]);
        session.set_playhead(2.0).unwrap();

        let (left, right) = session.split_at_playhead("a").unwrap();

        assert_eq!(left, "a.1");
        assert_eq!(right, "a.2");
        assert_eq!(session.selection().ids(), &["a.2".to_string()]);

        session.set_playhead(5.0).unwrap();
        assert!(matches!(
            session.split_at_playhead("a.2"),
            Err(CoreError::InvalidSplitPoint(_))
        ));
    }

    #[test]
    fn test_trim_at_playhead() {
        let mut session = session_with(&[("a", 2.0, 6.0)]);
        let history = session.executor().undo_count();

        session.set_playhead(3.0).unwrap();
        assert!(session.trim_start_at_playhead("a").unwrap());
        assert_eq!(session.scene().get_clip("a").unwrap().start, 3.0);

        session.set_playhead(1.0).unwrap();
        assert!(!session.trim_end_at_playhead("a").unwrap());
        assert_eq!(session.executor().undo_count(), history + 1);
        assert_eq!(session.executor().last_command_type(), Some("TrimClip"));
    }

    #[test]
    fn test_selection_does_not_create_history() {
        let mut session = session_with(&[("a", 0.0, 5.0), ("b", 5.0, 10.0)]);
        let history = session.executor().undo_count();

        session.select("a", SelectMode::Replace).unwrap();
        session.select_range("b").unwrap();
        assert_eq!(session.selection().len(), 2);
        session.clear_selection();

        assert_eq!(session.executor().undo_count(), history);
    }

    #[test]
    fn test_move_and_delete_selection() {
        let mut session = session_with(&[("a", 0.0, 5.0), ("b", 5.0, 10.0)]);
        assert!(matches!(
            session.delete_selection(),
            Err(CoreError::EmptySelection)
        ));

        session.select("a", SelectMode::Replace).unwrap();
        session.select_range("b").unwrap();
        session.move_selection(1.5).unwrap();
        assert_eq!(session.scene().get_clip("a").unwrap().start, 1.5);
        assert_eq!(session.scene().get_clip("b").unwrap().end, 11.5);

        session.delete_selection().unwrap();
        assert!(session.scene().is_empty());
        assert!(session.selection().is_empty());
    }

    #[test]
    fn test_apply_effect() {
        let mut session = session_with(&[("a", 0.0, 5.0)]);

        session
            .apply_effect("a", &Effect::NoiseReduction, &Renamer)
            .unwrap();
        assert_eq!(
            session.scene().get_clip("a").unwrap().source_ref,
            "src.mp4.noise_reduction"
        );

        let history = session.executor().undo_count();
        assert!(matches!(
            session.apply_effect("a", &Effect::Captions, &Broken),
            Err(CoreError::EffectFailed(_))
        ));
        assert_eq!(session.executor().undo_count(), history);
    }

    #[test]
    fn test_export() {
        let mut session = EditorSession::with_defaults("Test");
        assert!(matches!(
            session.export(&ManifestEncoder, ExportPreset::Youtube1080p),
            Err(CoreError::ExportFailed(_))
        ));

        session.add_clip(v0(), video("a", 0.0, 5.0)).unwrap();
        let bytes = session
            .export(&ManifestEncoder, ExportPreset::Youtube1080p)
            .unwrap();
        let manifest: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(manifest["segments"][0]["clipId"], "a");
        assert_eq!(session.export_segments().len(), 1);
    }
}
