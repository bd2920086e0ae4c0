//! Transition Commands Module

use serde::{Deserialize, Serialize};

use crate::core::{
    commands::{Command, CommandResult, StateChange},
    project::ProjectState,
    timeline::TransitionType,
    ClipId, CoreResult, TimeSec,
};

// =============================================================================
// AddTransitionCommand
// =============================================================================

/// Command to place (or overwrite) a transition between two adjacent clips
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTransitionCommand {
    pub from_clip_id: ClipId,
    pub to_clip_id: ClipId,
    #[serde(rename = "type")]
    pub transition_type: TransitionType,
    pub duration_sec: TimeSec,
}

impl AddTransitionCommand {
    pub fn new(from: &str, to: &str, transition_type: TransitionType, duration_sec: TimeSec) -> Self {
        Self {
            from_clip_id: from.to_string(),
            to_clip_id: to.to_string(),
            transition_type,
            duration_sec,
        }
    }
}

impl Command for AddTransitionCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        state.scene.add_transition(
            &self.from_clip_id,
            &self.to_clip_id,
            self.transition_type,
            self.duration_sec,
        )?;

        Ok(CommandResult::new().with_change(StateChange::TransitionSet {
            from_clip_id: self.from_clip_id.clone(),
            to_clip_id: self.to_clip_id.clone(),
        }))
    }

    fn type_name(&self) -> &'static str {
        "AddTransition"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// =============================================================================
// RemoveTransitionCommand
// =============================================================================

/// Command to remove the transition of an ordered clip pair
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveTransitionCommand {
    pub from_clip_id: ClipId,
    pub to_clip_id: ClipId,
}

impl RemoveTransitionCommand {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from_clip_id: from.to_string(),
            to_clip_id: to.to_string(),
        }
    }
}

impl Command for RemoveTransitionCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        state
            .scene
            .remove_transition(&self.from_clip_id, &self.to_clip_id)?;

        Ok(CommandResult::new().with_change(StateChange::TransitionRemoved {
            from_clip_id: self.from_clip_id.clone(),
            to_clip_id: self.to_clip_id.clone(),
        }))
    }

    fn type_name(&self) -> &'static str {
        "RemoveTransition"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        commands::CommandExecutor,
        timeline::{Clip, TrackKind, TrackRef},
        CoreError,
    };

    fn state() -> ProjectState {
        let mut state = ProjectState::new("Test");
        let v0 = TrackRef::new(TrackKind::Video, 0);
        for (id, start, end) in [("a", 0.0, 5.0), ("b", 5.0, 10.0)] {
            state
                .scene
                .add_clip(
                    v0,
                    Clip::new(TrackKind::Video, "s.mp4", 30.0)
                        .with_id(id)
                        .with_interval(start, end),
                )
                .unwrap();
        }
        state
    }

    #[test]
    fn test_add_overwrite_remove_transition() {
        let mut executor = CommandExecutor::new();
        let mut state = state();

        executor
            .execute(
                Box::new(AddTransitionCommand::new("a", "b", TransitionType::Fade, 0.5)),
                &mut state,
            )
            .unwrap();
        executor
            .execute(
                Box::new(AddTransitionCommand::new("a", "b", TransitionType::Zoom, 1.0)),
                &mut state,
            )
            .unwrap();

        assert_eq!(state.scene.transitions().len(), 1);
        let t = state.scene.transitions().get("a", "b").unwrap();
        assert_eq!(t.transition_type, TransitionType::Zoom);

        executor
            .execute(Box::new(RemoveTransitionCommand::new("a", "b")), &mut state)
            .unwrap();
        assert!(state.scene.transitions().is_empty());

        executor.undo(&mut state).unwrap();
        executor.undo(&mut state).unwrap();
        let t = state.scene.transitions().get("a", "b").unwrap();
        assert_eq!(t.transition_type, TransitionType::Fade);
    }

    #[test]
    fn test_reversed_pair_rejected() {
        let mut executor = CommandExecutor::new();
        let mut state = state();

        let result = executor.execute(
            Box::new(AddTransitionCommand::new("b", "a", TransitionType::Blur, 0.5)),
            &mut state,
        );
        assert!(matches!(
            result,
            Err(CoreError::TransitionAdjacencyViolation { .. })
        ));
        assert!(!executor.can_undo());
    }
}
