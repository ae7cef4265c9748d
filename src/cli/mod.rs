//! CLI module for ClipStudio
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};

use crate::engine::progress::{JsonProgress, LogProgress, NullProgress, ProgressSink};

pub mod args;
pub mod commands;

/// ClipStudio video editing pipeline
///
/// Cut, merge, speed-change and audio-mix video files through ffmpeg, either
/// as fast previews in the temp directory or as final exports.
#[derive(Parser, Debug)]
#[command(name = "clipstudio")]
#[command(about = "ClipStudio - cut, merge, retime and mix video from the command line")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Config file (default: clipstudio.toml or config/clipstudio.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// How stage progress is reported
    #[arg(long, global = true, value_enum, default_value_t = ProgressMode::Log)]
    pub progress: ProgressMode,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Keep only the range between two timestamps
    Cut(args::CutArgs),
    /// Insert one video into another
    Merge(args::MergeArgs),
    /// Change the playback speed of a range
    Speed(args::SpeedArgs),
    /// Mix an audio file into a video
    AddAudio(args::AddAudioArgs),
    /// Show duration and stream facts of a media file
    Probe(args::ProbeArgs),
    /// Render a 320x180 thumbnail of the first frame
    Thumbnail(args::ThumbnailArgs),
    /// Print audio loudness buckets
    Waveform(args::WaveformArgs),
    /// Check a file's duration against an expected value
    Verify(args::VerifyArgs),
}

/// Progress reporting mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProgressMode {
    /// No progress output
    None,
    /// Progress as log events
    Log,
    /// One JSON object per event on stderr
    Json,
}

impl ProgressMode {
    pub fn sink(self) -> Arc<dyn ProgressSink> {
        match self {
            ProgressMode::None => Arc::new(NullProgress),
            ProgressMode::Log => Arc::new(LogProgress),
            ProgressMode::Json => Arc::new(JsonProgress),
        }
    }
}
