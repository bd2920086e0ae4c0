//! Media Probing
//!
//! The host decodes media; the engine only asks it for durations and
//! thumbnails through [`MediaInfoProvider`].

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult, TimeSec};

/// What the media collaborator reports about a file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    /// Duration in seconds (absent for still images)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<TimeSec>,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

impl MediaInfo {
    pub fn with_duration(duration_sec: TimeSec) -> Self {
        Self {
            duration_sec: Some(duration_sec),
            thumbnails: vec![],
        }
    }

    pub fn still() -> Self {
        Self::default()
    }
}

/// Probes media files for import
pub trait MediaInfoProvider {
    fn probe(&self, path: &Path) -> CoreResult<MediaInfo>;
}

/// Provider answering from a fixed table, for hosts that already know their media
#[derive(Clone, Debug, Default)]
pub struct KnownMediaInfo {
    entries: HashMap<String, MediaInfo>,
}

impl KnownMediaInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, info: MediaInfo) {
        self.entries.insert(path.to_string(), info);
    }

    pub fn with(mut self, path: &str, info: MediaInfo) -> Self {
        self.insert(path, info);
        self
    }
}

impl MediaInfoProvider for KnownMediaInfo {
    fn probe(&self, path: &Path) -> CoreResult<MediaInfo> {
        let key = path.to_string_lossy();
        self.entries
            .get(key.as_ref())
            .cloned()
            .ok_or_else(|| CoreError::AssetImportFailed(format!("Unknown media: {key}")))
    }
}
