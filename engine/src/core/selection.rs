//! Selection Manager
//!
//! Tracks the set of selected clips and the anchor used for range selection.

use serde::{Deserialize, Serialize};

use crate::core::{timeline::Scene, ClipId, CoreError, CoreResult};

/// How a click modifies the selection
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SelectMode {
    /// Plain click
    #[default]
    Replace,
    /// Ctrl/Cmd-click
    Toggle,
    /// Shift-click
    Range,
}

/// Selected clip ids in selection order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    ids: Vec<ClipId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anchor: Option<ClipId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> &[ClipId] {
        &self.ids
    }

    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    pub fn contains(&self, clip_id: &str) -> bool {
        self.ids.iter().any(|id| id == clip_id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Applies a click on `clip_id` with the given modifier
    pub fn apply(&mut self, scene: &Scene, clip_id: &str, mode: SelectMode) -> CoreResult<()> {
        scene.get_clip(clip_id)?;
        match mode {
            SelectMode::Replace => self.select_only(clip_id),
            SelectMode::Toggle => self.toggle(clip_id),
            SelectMode::Range => self.extend_to(scene, clip_id)?,
        }
        Ok(())
    }

    /// Selection becomes exactly `clip_id`, which also becomes the anchor
    pub fn select_only(&mut self, clip_id: &str) {
        self.ids = vec![clip_id.to_string()];
        self.anchor = Some(clip_id.to_string());
    }

    /// Flips membership of `clip_id`
    pub fn toggle(&mut self, clip_id: &str) {
        if let Some(pos) = self.ids.iter().position(|id| id == clip_id) {
            self.ids.remove(pos);
            if self.anchor.as_deref() == Some(clip_id) {
                self.anchor = self.ids.last().cloned();
            }
        } else {
            self.ids.push(clip_id.to_string());
            self.anchor = Some(clip_id.to_string());
        }
    }

    /// Adds the contiguous run between the anchor and `clip_id` (inclusive).
    ///
    /// Without an anchor on the same track this is a plain click.
    pub fn extend_to(&mut self, scene: &Scene, clip_id: &str) -> CoreResult<()> {
        let target = scene.get_clip(clip_id)?;
        let anchor = match self.anchor.as_deref().and_then(|id| scene.clip(id)) {
            Some(anchor) if anchor.track_ref() == target.track_ref() => anchor,
            _ => {
                self.select_only(clip_id);
                return Ok(());
            }
        };

        let run = scene.clips_on_track(target.track_ref());
        let position = |id: &str| {
            run.iter()
                .position(|c| c.id == id)
                .ok_or_else(|| CoreError::Internal(format!("Clip {id} missing from its track")))
        };
        let (a, b) = (position(&anchor.id)?, position(clip_id)?);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };

        for clip in &run[lo..=hi] {
            if !self.contains(&clip.id) {
                self.ids.push(clip.id.clone());
            }
        }
        Ok(())
    }

    /// Replaces the selection with the given ids (unknown ids are skipped)
    pub fn set(&mut self, scene: &Scene, ids: &[ClipId]) {
        self.ids.clear();
        for id in ids {
            if scene.contains_clip(id) && !self.contains(id) {
                self.ids.push(id.clone());
            }
        }
        self.anchor = self.ids.last().cloned();
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.anchor = None;
    }

    /// Drops ids whose clips no longer exist
    pub fn retain_existing(&mut self, scene: &Scene) {
        self.ids.retain(|id| scene.contains_clip(id));
        if self
            .anchor
            .as_deref()
            .is_some_and(|id| !scene.contains_clip(id))
        {
            self.anchor = None;
        }
    }
}
