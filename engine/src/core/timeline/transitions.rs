//! Transition Index
//!
//! Associates a transition effect with an ordered pair of clips. Adjacency is
//! validated by the scene before an entry reaches the index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{timeline::Transition, ClipId};

/// Transitions keyed by `(from_clip_id, to_clip_id)`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Transition>", into = "Vec<Transition>")]
pub struct TransitionIndex {
    entries: BTreeMap<(ClipId, ClipId), Transition>,
}

impl TransitionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or overwrites the entry for the ordered pair, returning the previous one
    pub fn upsert(&mut self, transition: Transition) -> Option<Transition> {
        let key = (
            transition.from_clip_id.clone(),
            transition.to_clip_id.clone(),
        );
        self.entries.insert(key, transition)
    }

    pub fn get(&self, from: &str, to: &str) -> Option<&Transition> {
        self.entries.get(&(from.to_string(), to.to_string()))
    }

    pub fn remove(&mut self, from: &str, to: &str) -> Option<Transition> {
        self.entries.remove(&(from.to_string(), to.to_string()))
    }

    /// Removes every entry that references the clip, returning them
    pub fn remove_referencing(&mut self, clip_id: &str) -> Vec<Transition> {
        let keys: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, t)| t.references(clip_id))
            .map(|(k, _)| k.clone())
            .collect();

        keys.into_iter()
            .filter_map(|k| self.entries.remove(&k))
            .collect()
    }

    /// Re-points entries after a clip was replaced by two children.
    ///
    /// Transitions coming into the old clip now end at `incoming`, transitions
    /// leaving it now start from `outgoing`.
    pub fn repoint(&mut self, old_id: &str, incoming: &str, outgoing: &str) {
        for mut transition in self.remove_referencing(old_id) {
            if transition.to_clip_id == old_id {
                transition.to_clip_id = incoming.to_string();
            }
            if transition.from_clip_id == old_id {
                transition.from_clip_id = outgoing.to_string();
            }
            self.upsert(transition);
        }
    }

    /// Keeps only the entries for which `keep` returns true; returns the dropped ones
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<Transition>
    where
        F: FnMut(&Transition) -> bool,
    {
        let dropped: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, t)| !keep(t))
            .map(|(k, _)| k.clone())
            .collect();

        dropped
            .into_iter()
            .filter_map(|k| self.entries.remove(&k))
            .collect()
    }

    /// Transition ending at the given clip, if any
    pub fn incoming(&self, clip_id: &str) -> Option<&Transition> {
        self.entries.values().find(|t| t.to_clip_id == clip_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<Transition>> for TransitionIndex {
    fn from(list: Vec<Transition>) -> Self {
        let mut index = Self::new();
        for transition in list {
            index.upsert(transition);
        }
        index
    }
}

impl From<TransitionIndex> for Vec<Transition> {
    fn from(index: TransitionIndex) -> Self {
        index.entries.into_values().collect()
    }
}
