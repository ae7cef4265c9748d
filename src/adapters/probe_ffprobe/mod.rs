//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe` with JSON output and folds the stream list into
//! `MediaFacts`. Missing metadata falls back to defaults unless strict mode
//! is on.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::domain::model::MediaFacts;
use crate::error::{ClipStudioError, ClipStudioResult};
use crate::ports::ProbePort;

/// FFprobe-based probe adapter
pub struct FfprobeAdapter {
    binary: String,
    strict: bool,
}

impl FfprobeAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            strict: false,
        }
    }

    /// Fail instead of defaulting missing stream metadata
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    fn resolve_binary(&self) -> ClipStudioResult<PathBuf> {
        which::which(&self.binary).map_err(|_| ClipStudioError::ToolNotFound(self.binary.clone()))
    }
}

impl Default for FfprobeAdapter {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

#[async_trait]
impl ProbePort for FfprobeAdapter {
    async fn probe(&self, path: &Path) -> ClipStudioResult<MediaFacts> {
        if !path.is_file() {
            return Err(ClipStudioError::probe(path, "file does not exist"));
        }

        let binary = self.resolve_binary()?;
        let output = Command::new(&binary)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClipStudioError::probe(path, stderr.trim().to_string()));
        }

        let facts = parse_ffprobe_json(path, &output.stdout, self.strict)?;
        debug!("Probed {}: {:?}", path.display(), facts);
        Ok(facts)
    }
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u32>,
    duration: Option<String>,
    #[serde(default)]
    disposition: Disposition,
}

#[derive(Debug, Default, Deserialize)]
struct Disposition {
    #[serde(default)]
    attached_pic: u8,
}

impl FfprobeStream {
    fn is(&self, kind: &str) -> bool {
        self.codec_type.as_deref() == Some(kind)
    }
}

/// Turn ffprobe's JSON into `MediaFacts`
pub fn parse_ffprobe_json(path: &Path, json: &[u8], strict: bool) -> ClipStudioResult<MediaFacts> {
    let parsed: FfprobeOutput = serde_json::from_slice(json)
        .map_err(|e| ClipStudioError::probe(path, format!("unparsable probe output: {}", e)))?;

    // cover art shows up as a one-frame video stream
    let video = parsed
        .streams
        .iter()
        .find(|s| s.is("video") && s.disposition.attached_pic == 0);
    let audio = parsed.streams.iter().find(|s| s.is("audio"));

    let duration = parsed
        .format
        .as_ref()
        .and_then(|f| parse_seconds(f.duration.as_deref()))
        .or_else(|| {
            parsed
                .streams
                .iter()
                .filter_map(|s| parse_seconds(s.duration.as_deref()))
                .reduce(f64::max)
        });

    let mut facts = MediaFacts {
        duration_seconds: duration.unwrap_or(0.0),
        has_video: video.is_some(),
        has_audio: audio.is_some(),
        ..MediaFacts::default()
    };

    if strict && duration.is_none() {
        return Err(ClipStudioError::probe(path, "duration is missing"));
    }

    if let Some(video) = video {
        match (video.width, video.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => {
                facts.width = w;
                facts.height = h;
            }
            _ if strict => {
                return Err(ClipStudioError::probe(path, "video dimensions are missing"))
            }
            _ => {}
        }

        let fps = parse_frame_rate(video.r_frame_rate.as_deref())
            .or_else(|| parse_frame_rate(video.avg_frame_rate.as_deref()));
        match fps {
            Some(fps) => facts.fps = fps,
            None if strict => {
                return Err(ClipStudioError::probe(path, "frame rate is missing or malformed"))
            }
            None => {}
        }
    }

    if let Some(audio) = audio {
        if let Some(rate) = audio
            .sample_rate
            .as_deref()
            .and_then(|r| r.parse::<u32>().ok())
            .filter(|r| *r > 0)
        {
            facts.sample_rate = rate;
        }
        if let Some(channels) = audio.channels.filter(|c| *c > 0) {
            facts.channels = channels;
        }
    }

    Ok(facts)
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Parse "num/den" or a plain number; zero denominators yield None
fn parse_frame_rate(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    let fps = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => value.parse().ok()?,
    };
    (fps.is_finite() && fps > 0.0).then_some(fps)
}
