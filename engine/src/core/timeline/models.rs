//! Timeline Model Definitions
//!
//! Defines Track, Clip, Transition and related types for timeline management.
//! Clips live in an arena owned by the scene; tracks hold only ordered ids.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::{
    AssetId, ClipId, Color, Point2D, SourceRef, TimeRange, TimeSec, TrackIndex,
};

// =============================================================================
// Track
// =============================================================================

/// Track type/kind enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackKind {
    Video,
    Audio,
    Text,
    Image,
}

impl TrackKind {
    pub const ALL: [TrackKind; 4] = [
        TrackKind::Video,
        TrackKind::Audio,
        TrackKind::Text,
        TrackKind::Image,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
            TrackKind::Text => "text",
            TrackKind::Image => "image",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one track row
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackRef {
    pub kind: TrackKind,
    pub index: TrackIndex,
}

impl TrackRef {
    pub fn new(kind: TrackKind, index: TrackIndex) -> Self {
        Self { kind, index }
    }
}

/// Track (an ordered lane of clip ids)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub kind: TrackKind,
    /// Clip ids sorted by start time
    pub clip_ids: Vec<ClipId>,
}

impl Track {
    /// Creates a new empty track of the given kind
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            clip_ids: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clip_ids.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clip_ids.len()
    }

    /// Returns true if the track holds the given clip id
    pub fn contains(&self, clip_id: &str) -> bool {
        self.clip_ids.iter().any(|id| id == clip_id)
    }

    /// Position of a clip id within the track order
    pub fn position(&self, clip_id: &str) -> Option<usize> {
        self.clip_ids.iter().position(|id| id == clip_id)
    }

    /// Removes a clip id, returning true if it was present
    pub fn remove(&mut self, clip_id: &str) -> bool {
        if let Some(pos) = self.position(clip_id) {
            self.clip_ids.remove(pos);
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Keyframes
// =============================================================================

/// Animated property value at a clip-local time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Offset from the clip start (seconds)
    pub time_sec: TimeSec,
    /// Property name (e.g. "opacity", "volume", "position.x")
    pub property: String,
    pub value: f64,
}

impl Keyframe {
    pub fn new(time_sec: TimeSec, property: &str, value: f64) -> Self {
        Self {
            time_sec,
            property: property.to_string(),
            value,
        }
    }
}

// =============================================================================
// Kind Properties
// =============================================================================

/// 2D Transform for visual clips
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transform {
    /// Position (normalized 0.0-1.0, center = 0.5, 0.5)
    pub position: Point2D,
    /// Scale (1.0 = 100%)
    pub scale: Point2D,
    /// Rotation in degrees
    pub rotation_deg: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Point2D::center(),
            scale: Point2D::new(1.0, 1.0),
            rotation_deg: 0.0,
        }
    }
}

/// Per-kind clip properties
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClipProperties {
    #[serde(rename_all = "camelCase")]
    Video {
        /// Opacity (0.0 - 1.0)
        opacity: f32,
        /// Volume of the embedded audio (0.0 - 2.0, 1.0 = 100%)
        volume: f32,
        transform: Transform,
    },
    #[serde(rename_all = "camelCase")]
    Audio { volume: f32, muted: bool },
    #[serde(rename_all = "camelCase")]
    Text {
        content: String,
        font_size: u32,
        color: Color,
        position: Point2D,
    },
    #[serde(rename_all = "camelCase")]
    Image { opacity: f32, transform: Transform },
}

impl ClipProperties {
    /// Default properties for a clip of the given kind
    pub fn default_for(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Video => Self::Video {
                opacity: 1.0,
                volume: 1.0,
                transform: Transform::default(),
            },
            TrackKind::Audio => Self::Audio {
                volume: 1.0,
                muted: false,
            },
            TrackKind::Text => Self::Text {
                content: String::new(),
                font_size: 48,
                color: Color::white(),
                position: Point2D::center(),
            },
            TrackKind::Image => Self::Image {
                opacity: 1.0,
                transform: Transform::default(),
            },
        }
    }

    /// Text overlay properties
    pub fn text(content: &str, font_size: u32, color: Color) -> Self {
        Self::Text {
            content: content.to_string(),
            font_size,
            color,
            position: Point2D::center(),
        }
    }

    /// The kind these properties belong to
    pub fn kind(&self) -> TrackKind {
        match self {
            Self::Video { .. } => TrackKind::Video,
            Self::Audio { .. } => TrackKind::Audio,
            Self::Text { .. } => TrackKind::Text,
            Self::Image { .. } => TrackKind::Image,
        }
    }
}

// =============================================================================
// Clip
// =============================================================================

/// Clip (media or text segment placed on a track)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: ClipId,
    pub kind: TrackKind,
    pub track_index: TrackIndex,
    /// Timeline start (inclusive, seconds)
    pub start: TimeSec,
    /// Timeline end (exclusive, seconds)
    pub end: TimeSec,
    pub source_ref: SourceRef,
    /// Length of the underlying media (seconds)
    pub source_duration: TimeSec,
    /// Offset into the source where the clip begins (seconds)
    #[serde(default)]
    pub source_in_sec: TimeSec,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
    pub properties: ClipProperties,
    /// Asset the clip was created from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<AssetId>,
    /// Root clip of a duplicate chain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_of: Option<ClipId>,
}

impl Clip {
    /// Creates a clip spanning the whole source, starting at 0 on track 0
    pub fn new(kind: TrackKind, source_ref: &str, source_duration: TimeSec) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            kind,
            track_index: 0,
            start: 0.0,
            end: source_duration,
            source_ref: source_ref.to_string(),
            source_duration,
            source_in_sec: 0.0,
            keyframes: vec![],
            properties: ClipProperties::default_for(kind),
            asset_id: None,
            duplicate_of: None,
        }
    }

    /// Overrides the generated id
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Sets the timeline interval
    pub fn with_interval(mut self, start: TimeSec, end: TimeSec) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Places the clip at a timeline position, keeping its duration
    pub fn place_at(mut self, start: TimeSec) -> Self {
        let duration = self.duration();
        self.start = start;
        self.end = start + duration;
        self
    }

    /// Sets the track row
    pub fn on_track(mut self, track_index: TrackIndex) -> Self {
        self.track_index = track_index;
        self
    }

    /// Links the clip to the asset it was created from
    pub fn with_asset(mut self, asset_id: &str) -> Self {
        self.asset_id = Some(asset_id.to_string());
        self
    }

    pub fn with_properties(mut self, properties: ClipProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Returns the duration on the timeline
    pub fn duration(&self) -> TimeSec {
        self.end - self.start
    }

    /// Returns the timeline interval
    pub fn interval(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Returns the track address
    pub fn track_ref(&self) -> TrackRef {
        TrackRef::new(self.kind, self.track_index)
    }

    /// Checks if this clip covers the given timeline position
    pub fn contains_time(&self, time_sec: TimeSec) -> bool {
        self.interval().contains(time_sec)
    }

    /// Root id of the duplicate chain this clip belongs to
    pub fn chain_root(&self) -> &str {
        self.duplicate_of.as_deref().unwrap_or(&self.id)
    }
}

// =============================================================================
// Transition
// =============================================================================

/// Transition effect type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionType {
    Fade,
    Zoom,
    Blur,
}

/// Directional transition between two time-adjacent clips
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub from_clip_id: ClipId,
    pub to_clip_id: ClipId,
    #[serde(rename = "type")]
    pub transition_type: TransitionType,
    pub duration_sec: TimeSec,
}

impl Transition {
    pub fn new(from: &str, to: &str, transition_type: TransitionType, duration_sec: TimeSec) -> Self {
        Self {
            from_clip_id: from.to_string(),
            to_clip_id: to.to_string(),
            transition_type,
            duration_sec,
        }
    }

    /// Returns true if the transition references the clip on either side
    pub fn references(&self, clip_id: &str) -> bool {
        self.from_clip_id == clip_id || self.to_clip_id == clip_id
    }
}

// =============================================================================
// Tests
// =============================================================================
