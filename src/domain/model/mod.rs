// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ClipStudioError, ClipStudioResult};

#[cfg(test)]
mod tests;

/// Kind of media a source path holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
}

/// Immutable identity of a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaAsset {
    pub fn video(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Video,
        }
    }

    pub fn audio(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: MediaKind::Audio,
        }
    }
}

/// Timing and stream facts derived from a single probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFacts {
    pub duration_seconds: f64,
    pub has_video: bool,
    pub has_audio: bool,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub sample_rate: u32,
    pub channels: u32,
}

impl MediaFacts {
    pub const DEFAULT_FPS: f64 = 30.0;
    pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
    pub const DEFAULT_CHANNELS: u32 = 2;

    /// Duration if the probe could determine one
    pub fn known_duration(&self) -> Option<f64> {
        (self.duration_seconds.is_finite() && self.duration_seconds > 0.0)
            .then_some(self.duration_seconds)
    }

    /// "WxH", or "unknown" when the probe found no dimensions
    pub fn resolution_label(&self) -> String {
        if self.width == 0 || self.height == 0 {
            "unknown".to_string()
        } else {
            format!("{}x{}", self.width, self.height)
        }
    }
}

impl Default for MediaFacts {
    fn default() -> Self {
        Self {
            duration_seconds: 0.0,
            has_video: false,
            has_audio: false,
            width: 0,
            height: 0,
            fps: Self::DEFAULT_FPS,
            sample_rate: Self::DEFAULT_SAMPLE_RATE,
            channels: Self::DEFAULT_CHANNELS,
        }
    }
}

/// Time specification in seconds, parsed from user input
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Parse seconds (`12.5`), `MM:SS(.ms)` or `HH:MM:SS(.ms)`
    pub fn parse(time_str: &str) -> ClipStudioResult<Self> {
        let trimmed = time_str.trim();

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(ClipStudioError::invalid(format!(
                    "Time must be a finite, non-negative number of seconds: {}",
                    trimmed
                )));
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        let bad = |what: &str| {
            ClipStudioError::invalid(format!("Invalid {} in time '{}'", what, trimmed))
        };

        let (hours, minutes, seconds) = match parts.as_slice() {
            [m, s] => (0u32, m.parse::<u32>().map_err(|_| bad("minutes"))?, *s),
            [h, m, s] => {
                let hours = h.parse::<u32>().map_err(|_| bad("hours"))?;
                let minutes = m.parse::<u32>().map_err(|_| bad("minutes"))?;
                if minutes >= 60 {
                    return Err(bad("minutes"));
                }
                (hours, minutes, *s)
            }
            _ => {
                return Err(ClipStudioError::invalid(format!(
                    "Invalid time format '{}'. Supported formats: seconds (e.g., 123.45), MM:SS.ms (e.g., 2:30.5), HH:MM:SS.ms (e.g., 1:02:30.5)",
                    trimmed
                )))
            }
        };

        let seconds = seconds.parse::<f64>().map_err(|_| bad("seconds"))?;
        if !(0.0..60.0).contains(&seconds) {
            return Err(bad("seconds"));
        }

        Ok(Self::from_seconds(
            hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
        ))
    }

    /// Format as H:MM:SS.mmm or M:SS.mmm
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// How the inserted clip relates to the base timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Base is split at the point and the insert is placed between the halves
    Sequential,
    /// Insert replaces the base for its duration, base length is kept
    Overlay,
}

impl MergeMode {
    pub fn parse(mode_str: &str) -> ClipStudioResult<Self> {
        match mode_str.to_lowercase().as_str() {
            "sequential" | "insert" => Ok(MergeMode::Sequential),
            "overlay" | "replace" => Ok(MergeMode::Overlay),
            _ => Err(ClipStudioError::invalid(format!(
                "Invalid merge mode: {}. Valid modes: sequential, overlay",
                mode_str
            ))),
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Sequential => write!(f, "sequential"),
            MergeMode::Overlay => write!(f, "overlay"),
        }
    }
}

/// Where inserted audio plays on the video timeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioPlacement {
    FromStart,
    Custom { start: f64, end: f64 },
}

/// A user-level edit, validated by `domain::rules` before any work starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EditRequest {
    Cut {
        path: PathBuf,
        start: f64,
        end: f64,
    },
    Merge {
        base_path: PathBuf,
        insert_path: PathBuf,
        insertion_point: f64,
        mode: MergeMode,
    },
    SpeedChange {
        path: PathBuf,
        start: f64,
        end: f64,
        factor: f64,
    },
    AddAudio {
        video_path: PathBuf,
        audio_path: PathBuf,
        volume: f64,
        placement: AudioPlacement,
        looped: bool,
    },
}

impl EditRequest {
    /// Short feature name used in temp file names and logs
    pub fn feature(&self) -> &'static str {
        match self {
            EditRequest::Cut { .. } => "cut",
            EditRequest::Merge { .. } => "merge",
            EditRequest::SpeedChange { .. } => "speed",
            EditRequest::AddAudio { .. } => "audio",
        }
    }

    /// Source assets in the order the planner indexes them
    pub fn assets(&self) -> Vec<MediaAsset> {
        match self {
            EditRequest::Cut { path, .. } | EditRequest::SpeedChange { path, .. } => {
                vec![MediaAsset::video(path)]
            }
            EditRequest::Merge {
                base_path,
                insert_path,
                ..
            } => vec![MediaAsset::video(base_path), MediaAsset::video(insert_path)],
            EditRequest::AddAudio {
                video_path,
                audio_path,
                ..
            } => vec![MediaAsset::video(video_path), MediaAsset::audio(audio_path)],
        }
    }
}

/// Which canonical profile a job renders with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Preview,
    Export,
}

/// Encoder settings; one profile per job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    pub kind: ProfileKind,
    pub video_codec: &'static str,
    pub preset: &'static str,
    pub crf: u8,
    pub audio_codec: &'static str,
    pub audio_bitrate: &'static str,
    /// Move the moov atom to the front of the container
    pub fast_start: bool,
}

impl QualityProfile {
    pub const PREVIEW: QualityProfile = QualityProfile {
        kind: ProfileKind::Preview,
        video_codec: "libx264",
        preset: "ultrafast",
        crf: 28,
        audio_codec: "aac",
        audio_bitrate: "128k",
        fast_start: false,
    };

    pub const EXPORT: QualityProfile = QualityProfile {
        kind: ProfileKind::Export,
        video_codec: "libx264",
        preset: "medium",
        crf: 23,
        audio_codec: "aac",
        audio_bitrate: "192k",
        fast_start: true,
    };
}

/// Preview to a generated temp path, or export to a permanent one
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTarget {
    Preview,
    Export(PathBuf),
}

impl RenderTarget {
    pub fn export(path: impl Into<PathBuf>) -> Self {
        RenderTarget::Export(path.into())
    }

    pub fn profile(&self) -> QualityProfile {
        match self {
            RenderTarget::Preview => QualityProfile::PREVIEW,
            RenderTarget::Export(_) => QualityProfile::EXPORT,
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        matches!(self, RenderTarget::Preview)
    }
}

/// Unique job identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, enough to tell jobs apart in logs
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One invocation of an edit operation
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub request: EditRequest,
    pub profile: QualityProfile,
    pub output_path: PathBuf,
    pub is_ephemeral: bool,
}

impl Job {
    pub fn new(request: EditRequest, profile: QualityProfile, output_path: PathBuf) -> Self {
        Self {
            id: JobId::new(),
            is_ephemeral: profile.kind == ProfileKind::Preview,
            request,
            profile,
            output_path,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

/// Index into a plan's asset list, or a generated source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRef {
    Asset(usize),
    Generated,
}

/// What a segment does to its source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentRole {
    /// Source range kept as-is
    PassThrough,
    /// Source range rewritten by a transform
    Transformed(Transform),
    /// Generated silence
    Silence,
    /// Range taken from the inserted asset
    Inserted { gain: f64, looped: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    /// Video timestamps scaled by 1/factor, audio through the tempo chain
    Speed { factor: f64 },
    /// Source audio mixed with the inserted audio starting at its beginning
    Mix { gain: f64, looped: bool },
}

/// A planned sub-interval; `start_seconds` is an offset into `source`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub source: SourceRef,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    pub role: SegmentRole,
}

impl Segment {
    pub fn pass_through(asset: usize, start: f64, duration: f64) -> Self {
        Self {
            source: SourceRef::Asset(asset),
            start_seconds: start,
            duration_seconds: duration,
            role: SegmentRole::PassThrough,
        }
    }

    pub fn silence(duration: f64) -> Self {
        Self {
            source: SourceRef::Generated,
            start_seconds: 0.0,
            duration_seconds: duration,
            role: SegmentRole::Silence,
        }
    }

    pub fn end_seconds(&self) -> f64 {
        self.start_seconds + self.duration_seconds
    }

    /// Length this segment occupies on the output timeline
    pub fn output_duration(&self) -> f64 {
        match self.role {
            SegmentRole::Transformed(Transform::Speed { factor }) => {
                self.duration_seconds / factor
            }
            _ => self.duration_seconds,
        }
    }
}
