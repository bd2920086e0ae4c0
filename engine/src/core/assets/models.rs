//! Asset Model Definitions
//!
//! Defines the Asset struct and related types for imported media.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{timeline::TrackKind, AssetId, TimeSec};

/// Asset type enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssetKind {
    Video,
    Audio,
    Image,
}

impl AssetKind {
    /// Guesses the kind from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "mp4" | "mov" | "webm" | "mkv" | "avi" | "m4v" => Some(Self::Video),
            "mp3" | "wav" | "aac" | "m4a" | "ogg" | "flac" | "opus" => Some(Self::Audio),
            "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" => Some(Self::Image),
            _ => None,
        }
    }

    /// Track kind that clips of this asset are placed on
    pub fn track_kind(&self) -> TrackKind {
        match self {
            Self::Video => TrackKind::Video,
            Self::Audio => TrackKind::Audio,
            Self::Image => TrackKind::Image,
        }
    }
}

/// Imported media asset
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Unique identifier (ULID)
    pub id: AssetId,
    pub kind: AssetKind,
    /// Display name
    pub name: String,
    /// File path or URI
    pub path: String,
    /// Duration in seconds (absent for still images)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<TimeSec>,
    /// Thumbnail references produced by the media collaborator
    #[serde(default)]
    pub thumbnails: Vec<String>,
    /// Import timestamp (RFC 3339)
    pub imported_at: String,
}

impl Asset {
    /// Creates a new asset with generated ULID; the name defaults to the file name
    pub fn new(path: &str, kind: AssetKind) -> Self {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());

        Self {
            id: ulid::Ulid::new().to_string(),
            kind,
            name,
            path: path.to_string(),
            duration_sec: None,
            thumbnails: vec![],
            imported_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_duration(mut self, duration_sec: TimeSec) -> Self {
        self.duration_sec = Some(duration_sec);
        self
    }

    pub fn with_thumbnails(mut self, thumbnails: Vec<String>) -> Self {
        self.thumbnails = thumbnails;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(AssetKind::from_path(Path::new("/m/clip.MP4")), Some(AssetKind::Video));
        assert_eq!(AssetKind::from_path(Path::new("song.wav")), Some(AssetKind::Audio));
        assert_eq!(AssetKind::from_path(Path::new("logo.png")), Some(AssetKind::Image));
        assert_eq!(AssetKind::from_path(Path::new("notes.txt")), None);
        assert_eq!(AssetKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_asset_creation() {
        let asset = Asset::new("/media/intro.mp4", AssetKind::Video).with_duration(12.5);

        assert!(!asset.id.is_empty());
        assert_eq!(asset.name, "intro.mp4");
        assert_eq!(asset.duration_sec, Some(12.5));
        assert_eq!(asset.kind.track_kind(), TrackKind::Video);
    }

    #[test]
    fn test_asset_serialization() {
        let asset = Asset::new("logo.png", AssetKind::Image);
        let json = serde_json::to_value(&asset).unwrap();

        assert_eq!(json["kind"], "image");
        assert!(json.get("durationSec").is_none());
        assert!(json.get("importedAt").is_some());
    }
}
