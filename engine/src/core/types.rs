//! Sniply Core Type Definitions
//!
//! Defines fundamental types used throughout the engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// ID Types
// =============================================================================

/// Asset unique identifier (ULID)
pub type AssetId = String;

/// Clip unique identifier (ULID, or a derived id such as `<id>.2` after a split)
pub type ClipId = String;

/// Operation unique identifier (ULID)
pub type OpId = String;

/// Reference to the media backing a clip (asset id, file path or processed output)
pub type SourceRef = String;

/// Row index of a track within its kind
pub type TrackIndex = usize;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Returns true if the value is usable as a timeline position.
pub fn is_valid_time_sec(value: TimeSec) -> bool {
    value.is_finite() && value >= 0.0
}

/// Half-open time interval `[start_sec, end_sec)`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
}

impl TimeRange {
    pub fn new(start_sec: TimeSec, end_sec: TimeSec) -> Self {
        Self { start_sec, end_sec }
    }

    /// Returns duration in seconds
    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    /// A usable clip interval: finite, non-negative start and `start < end`.
    pub fn is_valid(&self) -> bool {
        is_valid_time_sec(self.start_sec) && self.end_sec.is_finite() && self.start_sec < self.end_sec
    }

    /// Checks if a given time falls inside the half-open range
    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start_sec && time < self.end_sec
    }

    /// Checks if a given time lies strictly between start and end
    pub fn contains_strictly(&self, time: TimeSec) -> bool {
        time > self.start_sec && time < self.end_sec
    }

    /// Checks if two half-open ranges intersect (touching ranges do not)
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start_sec < other.end_sec && self.end_sec > other.start_sec
    }

    /// Returns the same range shifted by `delta` seconds
    pub fn shifted(&self, delta: TimeSec) -> Self {
        Self::new(self.start_sec + delta, self.end_sec + delta)
    }
}

// =============================================================================
// Spatial Types
// =============================================================================

/// 2D coordinates (normalized 0.0-1.0)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns center coordinates
    pub fn center() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::center()
    }
}

/// Color (RGBA)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red (0.0 ~ 1.0)
    pub r: f32,
    /// Green (0.0 ~ 1.0)
    pub g: f32,
    /// Blue (0.0 ~ 1.0)
    pub b: f32,
    /// Alpha (0.0 ~ 1.0, optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<f32>,
}

impl Color {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: None,
        }
    }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            a: Some(a.clamp(0.0, 1.0)),
            ..Self::rgb(r, g, b)
        }
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Parses a hex color string (`#RRGGBB` or `#RRGGBBAA`).
    pub fn try_from_hex(hex: &str) -> Result<Self, String> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return Err(format!("Invalid hex color length: {}", hex.len()));
        }

        let channel = |range: std::ops::Range<usize>| -> Result<f32, String> {
            let part = hex
                .get(range)
                .ok_or_else(|| "Invalid hex color".to_string())?;
            u8::from_str_radix(part, 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|e| e.to_string())
        };

        let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
        if hex.len() == 8 {
            Ok(Self::rgba(r, g, b, channel(6..8)?))
        } else {
            Ok(Self::rgb(r, g, b))
        }
    }

    /// Parses a hex color string, falling back to white on invalid input.
    pub fn from_hex(hex: &str) -> Self {
        match Self::try_from_hex(hex) {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to parse hex color '{}': {}, defaulting to white", hex, e);
                Self::white()
            }
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

// =============================================================================
// Tests
// =============================================================================
