//! History
//!
//! Runs edit commands against a working copy of the project, commits the copy
//! only if every invariant still holds, and keeps the pre-edit snapshots that
//! undo and redo swap back in.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::core::{
    commands::{Command, CommandResult},
    project::{HistorySnapshot, ProjectState},
    CoreError, CoreResult, OpId,
};

// =============================================================================
// History Entry
// =============================================================================

/// One undoable step
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Operation ID
    pub op_id: OpId,
    /// Command type name (or gesture label)
    pub label: String,
    /// State to return to when this entry is popped
    pub snapshot: HistorySnapshot,
    /// Timestamp when the entry was recorded
    pub timestamp: String,
}

impl HistoryEntry {
    fn new(op_id: &str, label: &str, snapshot: HistorySnapshot) -> Self {
        Self {
            op_id: op_id.to_string(),
            label: label.to_string(),
            snapshot,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

// =============================================================================
// Command Executor
// =============================================================================

/// Bounded undo/redo stacks of project snapshots
pub struct CommandExecutor {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    /// Oldest undo entries are dropped beyond this depth
    max_history_size: usize,
}

impl CommandExecutor {
    /// Creates a new command executor
    pub fn new() -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: 100,
        }
    }

    pub fn with_max_history(mut self, size: usize) -> Self {
        self.set_max_history(size);
        self
    }

    /// Changes the maximum history size, dropping the oldest entries if needed
    pub fn set_max_history(&mut self, size: usize) {
        self.max_history_size = size.max(1);
        self.trim_history();
    }

    pub fn max_history(&self) -> usize {
        self.max_history_size
    }

    /// Executes a command and adds it to history.
    ///
    /// The command runs on a working copy; on any error `state` is untouched
    /// and no history entry is created.
    pub fn execute(
        &mut self,
        mut command: Box<dyn Command>,
        state: &mut ProjectState,
    ) -> CoreResult<CommandResult> {
        let type_name = command.type_name();

        let mut working = state.clone();
        let result = command.execute(&mut working).inspect_err(|e| {
            debug!(command = type_name, payload = %command.to_json(), error = %e, "Command rejected")
        })?;
        working.selection.retain_existing(&working.scene);
        working
            .validate()
            .map_err(|e| CoreError::Internal(format!("{type_name} broke an invariant: {e}")))?;

        let before = state.snapshot();
        *state = working;
        self.record(&result.op_id, type_name, before, state);

        info!(command = type_name, op_id = %result.op_id, "Executed command");
        Ok(result)
    }

    /// Records an already-applied change (e.g. a finished gesture) as one entry
    pub fn record(&mut self, op_id: &str, label: &str, before: HistorySnapshot, state: &mut ProjectState) {
        self.redo_stack.clear();
        self.undo_stack
            .push_back(HistoryEntry::new(op_id, label, before));
        self.trim_history();

        state.is_dirty = true;
        state.meta.touch();
    }

    fn trim_history(&mut self) {
        while self.undo_stack.len() > self.max_history_size {
            self.undo_stack.pop_front();
        }
    }

    /// Undoes the last entry
    pub fn undo(&mut self, state: &mut ProjectState) -> CoreResult<()> {
        let entry = self.undo_stack.pop_back().ok_or(CoreError::NothingToUndo)?;

        let current = state.snapshot();
        state.restore(entry.snapshot);
        debug!(label = %entry.label, op_id = %entry.op_id, "Undo");

        self.redo_stack.push_back(HistoryEntry {
            snapshot: current,
            ..entry
        });
        Ok(())
    }

    /// Redoes the last undone entry
    pub fn redo(&mut self, state: &mut ProjectState) -> CoreResult<()> {
        let entry = self.redo_stack.pop_back().ok_or(CoreError::NothingToRedo)?;

        let current = state.snapshot();
        state.restore(entry.snapshot);
        debug!(label = %entry.label, op_id = %entry.op_id, "Redo");

        self.undo_stack.push_back(HistoryEntry {
            snapshot: current,
            timestamp: chrono::Utc::now().to_rfc3339(),
            ..entry
        });
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forgets every entry, e.g. after reopening a project
    pub fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Label of the entry `undo` would revert
    pub fn last_command_type(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.label.as_str())
    }

    /// Label of the entry `redo` would re-apply
    pub fn last_undone_command_type(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.label.as_str())
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        commands::{AddClipCommand, MoveClipCommand},
        timeline::{Clip, TrackKind, TrackRef},
    };

    fn v0() -> TrackRef {
        TrackRef::new(TrackKind::Video, 0)
    }

    fn place(id: &str, start: f64) -> Box<dyn Command> {
        Box::new(AddClipCommand::new(
            v0(),
            Clip::new(TrackKind::Video, "src.mp4", 60.0)
                .with_id(id)
                .with_interval(start, start + 2.0),
        ))
    }

    /// Adds a clip to the working copy, then fails
    struct AddsThenFails;

    impl Command for AddsThenFails {
        fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
            state
                .scene
                .add_clip(v0(), Clip::new(TrackKind::Video, "x", 1.0).place_at(30.0))?;
            Err(CoreError::EmptySelection)
        }

        fn type_name(&self) -> &'static str {
            "AddsThenFails"
        }

        fn to_json(&self) -> serde_json::Value {
            serde_json::json!({})
        }
    }

    #[test]
    fn test_execute_commits_and_labels() {
        let mut executor = CommandExecutor::new();
        let mut state = ProjectState::new("Test");

        let result = executor.execute(place("a", 0.0), &mut state).unwrap();

        assert_eq!(result.created_ids, vec!["a"]);
        assert_eq!(state.scene.clip_count(), 1);
        assert!(state.is_dirty);
        assert_eq!(executor.last_command_type(), Some("AddClip"));
    }

    #[test]
    fn test_failed_command_discards_working_copy() {
        let mut executor = CommandExecutor::new();
        let mut state = ProjectState::new("Test");
        executor.execute(place("a", 0.0), &mut state).unwrap();
        let before = state.snapshot();

        let result = executor.execute(Box::new(AddsThenFails), &mut state);

        assert!(matches!(result, Err(CoreError::EmptySelection)));
        assert_eq!(state.snapshot(), before);
        assert_eq!(executor.undo_count(), 1);
    }

    #[test]
    fn test_rejected_command_keeps_redo() {
        let mut executor = CommandExecutor::new();
        let mut state = ProjectState::new("Test");
        executor.execute(place("a", 0.0), &mut state).unwrap();
        executor.execute(place("b", 20.0), &mut state).unwrap();
        executor.undo(&mut state).unwrap();
        state
            .scene
            .add_clip(v0(), Clip::new(TrackKind::Video, "y", 2.0).with_id("y").place_at(10.0))
            .unwrap();

        let blocked = executor.execute(Box::new(MoveClipCommand::new("a", 9.0)), &mut state);
        assert!(matches!(blocked, Err(CoreError::Overlap { .. })));
        assert!(executor.can_redo());

        executor
            .execute(Box::new(MoveClipCommand::new("a", 30.0)), &mut state)
            .unwrap();
        assert!(!executor.can_redo());
    }

    #[test]
    fn test_undo_redo_empty_stacks() {
        let mut executor = CommandExecutor::new();
        let mut state = ProjectState::new("Test");

        assert!(matches!(
            executor.undo(&mut state),
            Err(CoreError::NothingToUndo)
        ));
        assert!(matches!(
            executor.redo(&mut state),
            Err(CoreError::NothingToRedo)
        ));
    }

    #[test]
    fn test_max_history_drops_oldest() {
        let mut executor = CommandExecutor::new().with_max_history(3);
        let mut state = ProjectState::new("Test");

        for i in 0..10 {
            executor
                .execute(place(&format!("c{i}"), i as f64 * 2.0), &mut state)
                .unwrap();
        }
        assert_eq!(executor.undo_count(), 3);

        while executor.can_undo() {
            executor.undo(&mut state).unwrap();
        }
        assert_eq!(state.scene.clip_count(), 7);
        assert_eq!(executor.redo_count(), 3);

        executor.set_max_history(0);
        assert_eq!(executor.max_history(), 1);
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut executor = CommandExecutor::new();
        let mut state = ProjectState::new("Test");
        let initial = state.snapshot();

        let mut snapshots = vec![];
        for (i, id) in ["a", "b", "c"].iter().enumerate() {
            executor
                .execute(place(id, i as f64 * 2.0), &mut state)
                .unwrap();
            snapshots.push(state.snapshot());
        }
        state.set_playhead(3.0).unwrap();

        while executor.can_undo() {
            executor.undo(&mut state).unwrap();
        }
        assert_eq!(state.snapshot(), initial);
        assert_eq!(state.playhead, 3.0);

        for expected in &snapshots {
            executor.redo(&mut state).unwrap();
            assert_eq!(&state.snapshot(), expected);
        }
    }

    #[test]
    fn test_record_gesture_commit() {
        let mut executor = CommandExecutor::new();
        let mut state = ProjectState::new("Test");
        executor.execute(place("a", 0.0), &mut state).unwrap();
        let before = state.snapshot();

        state.scene.move_clip("a", 4.0, 0).unwrap();
        executor.record("op_drag", "DragClip", before.clone(), &mut state);

        assert_eq!(executor.last_command_type(), Some("DragClip"));
        executor.undo(&mut state).unwrap();
        assert_eq!(state.snapshot(), before);
        assert_eq!(executor.last_undone_command_type(), Some("DragClip"));

        executor.clear_history();
        assert!(!executor.can_undo() && !executor.can_redo());
    }
}
