//! Filter expressions and concat lists

use std::path::PathBuf;

use crate::domain::rules::{CANONICAL_CHANNEL_LAYOUT, CANONICAL_SAMPLE_RATE};
use crate::planner::NormalizeTarget;
use crate::utils::path::escape_concat_path;
use crate::utils::time::{format_factor, format_seconds};

/// Presentation timestamps scaled by `1/factor`
pub fn video_speed(factor: f64) -> String {
    format!("setpts={}*PTS", format_factor(1.0 / factor))
}

/// Fit into the target canvas, letterbox with black, force fps
pub fn normalize_video(target: &NormalizeTarget) -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:-1:-1:color=black,fps={fps}",
        w = target.width,
        h = target.height,
        fps = format_factor(target.fps)
    )
}

/// Black frames standing in for a source without video
pub fn black_video(target: &NormalizeTarget, duration: f64) -> String {
    format!(
        "color=c=black:s={}x{}:r={}:d={}",
        target.width,
        target.height,
        format_factor(target.fps),
        format_seconds(duration)
    )
}

/// Canonical sample rate and channel layout
pub fn canonical_audio_format() -> String {
    format!(
        "aformat=sample_rates={}:channel_layouts={}",
        CANONICAL_SAMPLE_RATE, CANONICAL_CHANNEL_LAYOUT
    )
}

/// Generated silence of `duration` seconds
pub fn silence(duration: f64) -> String {
    format!(
        "anullsrc=channel_layout={}:sample_rate={},atrim=start=0:end={}",
        CANONICAL_CHANNEL_LAYOUT,
        CANONICAL_SAMPLE_RATE,
        format_seconds(duration)
    )
}

/// Cut `[start, start + duration)` out of an audio stream and rebase to zero
pub fn audio_trim(start: f64, duration: f64) -> String {
    format!(
        "atrim=start={}:end={},asetpts=PTS-STARTPTS",
        format_seconds(start),
        format_seconds(start + duration)
    )
}

/// Repeat the whole stream indefinitely
pub fn audio_loop() -> &'static str {
    "aloop=loop=-1:size=2147483647:start=0"
}

pub fn volume(gain: f64) -> String {
    format!("volume={}", format_factor(gain))
}

/// Two streams, longest wins, no implicit level normalization
pub fn mix_two() -> &'static str {
    "amix=inputs=2:duration=longest:dropout_transition=0:normalize=0"
}

/// Concat demuxer list: one `file '...'` line per path
pub fn concat_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|path| format!("file '{}'", escape_concat_path(path)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Join filters, falling back to the pass-through filter when empty
pub fn chain(filters: &[String], passthrough: &str) -> String {
    if filters.is_empty() {
        passthrough.to_string()
    } else {
        filters.join(",")
    }
}
