//! Export Projection Module
//!
//! Flattens the scene into ordered segments and hands them, with the chosen
//! preset, to an [`ExportEncoder`]. Pixels are never touched here.

use serde::{Deserialize, Serialize};

use crate::core::{
    timeline::{ClipProperties, Keyframe, Scene, TrackKind, Transition},
    ClipId, CoreError, CoreResult, SourceRef, TimeSec, TrackIndex,
};

// =============================================================================
// Presets
// =============================================================================

/// Export preset type
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    /// YouTube (1920x1080, 16:9)
    #[default]
    Youtube1080p,
    /// Instagram (square 1080x1080)
    Instagram,
    /// TikTok (vertical 1080x1920)
    Tiktok,
    /// 1280x720, 16:9
    Hd720p,
    /// 854x480, 16:9
    Sd480p,
}

impl ExportPreset {
    pub const ALL: [ExportPreset; 5] = [
        ExportPreset::Youtube1080p,
        ExportPreset::Instagram,
        ExportPreset::Tiktok,
        ExportPreset::Hd720p,
        ExportPreset::Sd480p,
    ];

    /// Output size in pixels
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            ExportPreset::Youtube1080p => (1920, 1080),
            ExportPreset::Instagram => (1080, 1080),
            ExportPreset::Tiktok => (1080, 1920),
            ExportPreset::Hd720p => (1280, 720),
            ExportPreset::Sd480p => (854, 480),
        }
    }

    pub fn aspect(&self) -> &'static str {
        match self {
            ExportPreset::Instagram => "1:1",
            ExportPreset::Tiktok => "9:16",
            _ => "16:9",
        }
    }

    pub fn format(&self) -> &'static str {
        "mp4"
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportPreset::Youtube1080p => "YouTube (1080p, 16:9)",
            ExportPreset::Instagram => "Instagram (Square, 1080x1080)",
            ExportPreset::Tiktok => "TikTok (Vertical, 1080x1920)",
            ExportPreset::Hd720p => "HD (720p, 16:9)",
            ExportPreset::Sd480p => "SD (480p, 16:9)",
        }
    }
}

// =============================================================================
// Segments
// =============================================================================

/// One clip as the encoder sees it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSegment {
    pub clip_id: ClipId,
    pub kind: TrackKind,
    pub track_index: TrackIndex,
    pub start: TimeSec,
    pub end: TimeSec,
    pub source_ref: SourceRef,
    /// Offset into the source where playback begins
    pub source_in_sec: TimeSec,
    pub properties: ClipProperties,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keyframes: Vec<Keyframe>,
    /// Transition leading into this segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_in: Option<Transition>,
}

/// Flattens the scene into segments ordered by start, then kind, track and id
pub fn export_segments(scene: &Scene) -> Vec<ExportSegment> {
    let mut segments: Vec<ExportSegment> = scene
        .clips()
        .map(|clip| ExportSegment {
            clip_id: clip.id.clone(),
            kind: clip.kind,
            track_index: clip.track_index,
            start: clip.start,
            end: clip.end,
            source_ref: clip.source_ref.clone(),
            source_in_sec: clip.source_in_sec,
            properties: clip.properties.clone(),
            keyframes: clip.keyframes.clone(),
            transition_in: scene.transitions().incoming(&clip.id).cloned(),
        })
        .collect();

    segments.sort_by(|a, b| {
        a.start
            .total_cmp(&b.start)
            .then_with(|| a.kind.cmp(&b.kind))
            .then_with(|| a.track_index.cmp(&b.track_index))
            .then_with(|| a.clip_id.cmp(&b.clip_id))
    });
    segments
}

/// Uncovered stretch of the video picture
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineGap {
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
}

impl TimelineGap {
    pub fn duration_sec(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }
}

/// Detects spans from 0 to the last video segment that no video clip covers
pub fn detect_timeline_gaps(segments: &[ExportSegment]) -> Vec<TimelineGap> {
    let mut intervals: Vec<(TimeSec, TimeSec)> = segments
        .iter()
        .filter(|s| s.kind == TrackKind::Video)
        .map(|s| (s.start, s.end))
        .collect();
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut gaps = Vec::new();
    let mut covered_until = 0.0;
    for (start, end) in intervals {
        if start > covered_until + 0.001 {
            gaps.push(TimelineGap {
                start_sec: covered_until,
                end_sec: start,
            });
        }
        covered_until = f64::max(covered_until, end);
    }
    gaps
}

// =============================================================================
// Request & Encoder
// =============================================================================

/// Everything an encoder needs to produce the final file
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub preset: ExportPreset,
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub duration_sec: TimeSec,
    pub segments: Vec<ExportSegment>,
    /// Spans the encoder fills with black
    #[serde(default)]
    pub gaps: Vec<TimelineGap>,
}

impl ExportRequest {
    /// Builds a request for the scene; an empty timeline cannot be exported
    pub fn build(scene: &Scene, preset: ExportPreset) -> CoreResult<Self> {
        if scene.is_empty() {
            return Err(CoreError::ExportFailed(
                "Timeline has no clips to export".to_string(),
            ));
        }

        let segments = export_segments(scene);
        let gaps = detect_timeline_gaps(&segments);
        let (width, height) = preset.resolution();

        Ok(Self {
            preset,
            width,
            height,
            format: preset.format().to_string(),
            duration_sec: scene.duration(),
            segments,
            gaps,
        })
    }
}

/// Turns an export request into output bytes
pub trait ExportEncoder {
    fn encode(&self, request: &ExportRequest) -> CoreResult<Vec<u8>>;
}

/// Encoder that writes the request as a JSON render manifest
#[derive(Clone, Copy, Debug, Default)]
pub struct ManifestEncoder;

impl ExportEncoder for ManifestEncoder {
    fn encode(&self, request: &ExportRequest) -> CoreResult<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(request)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::{Clip, TrackRef, TransitionType};

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let v0 = TrackRef::new(TrackKind::Video, 0);
        let a0 = TrackRef::new(TrackKind::Audio, 0);
        scene
            .add_clip(v0, Clip::new(TrackKind::Video, "v.mp4", 5.0).with_id("v1"))
            .unwrap();
        scene
            .add_clip(
                v0,
                Clip::new(TrackKind::Video, "v.mp4", 5.0)
                    .with_id("v2")
                    .place_at(8.0),
            )
            .unwrap();
        scene
            .add_clip(a0, Clip::new(TrackKind::Audio, "m.mp3", 20.0).with_id("m"))
            .unwrap();
        scene
    }

    #[test]
    fn test_segments_ordered() {
        let segments = export_segments(&scene());
        let ids: Vec<_> = segments.iter().map(|s| s.clip_id.as_str()).collect();

        assert_eq!(ids, vec!["v1", "m", "v2"]);
    }

    #[test]
    fn test_segments_carry_incoming_transition() {
        let mut scene = scene();
        scene.resize_clip("v1", 0.0, 8.0).unwrap();
        scene
            .add_transition("v1", "v2", TransitionType::Fade, 1.0)
            .unwrap();

        let segments = export_segments(&scene);
        let v2 = segments.iter().find(|s| s.clip_id == "v2").unwrap();

        assert_eq!(v2.transition_in.as_ref().unwrap().from_clip_id, "v1");
    }

    #[test]
    fn test_detect_gaps() {
        let gaps = detect_timeline_gaps(&export_segments(&scene()));

        assert_eq!(gaps.len(), 1);
        assert_eq!(gaps[0].start_sec, 5.0);
        assert_eq!(gaps[0].end_sec, 8.0);
        assert_eq!(gaps[0].duration_sec(), 3.0);
    }

    #[test]
    fn test_build_request() {
        let request = ExportRequest::build(&scene(), ExportPreset::Tiktok).unwrap();

        assert_eq!((request.width, request.height), (1080, 1920));
        assert_eq!(request.duration_sec, 20.0);
        assert_eq!(request.segments.len(), 3);

        assert!(matches!(
            ExportRequest::build(&Scene::new(), ExportPreset::default()),
            Err(CoreError::ExportFailed(_))
        ));
    }

    #[test]
    fn test_manifest_encoder() {
        let request = ExportRequest::build(&scene(), ExportPreset::Instagram).unwrap();
        let bytes = ManifestEncoder.encode(&request).unwrap();

        let parsed: ExportRequest = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.preset, ExportPreset::Instagram);
        assert_eq!(parsed.segments.len(), 3);
    }
}
