//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::domain::model::{AudioPlacement, RenderTarget, TimeSpec};

/// Parse HH:MM:SS.ms, MM:SS.ms or plain seconds
fn parse_time(value: &str) -> Result<f64, String> {
    TimeSpec::parse(value)
        .map(|t| t.seconds)
        .map_err(|e| e.to_string())
}

/// Where an edit is written
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct OutputArgs {
    /// Export to this path with the export profile
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render a fast preview into the temp directory and print its path
    #[arg(long)]
    pub preview: bool,
}

impl OutputArgs {
    pub fn target(&self) -> RenderTarget {
        match &self.output {
            Some(path) => RenderTarget::export(path),
            None => RenderTarget::Preview,
        }
    }
}

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long, value_parser = parse_time)]
    pub start: f64,

    /// End time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long, value_parser = parse_time)]
    pub end: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Video that receives the insert
    #[arg(long)]
    pub base: PathBuf,

    /// Video to insert
    #[arg(long)]
    pub insert: PathBuf,

    /// Insertion point on the base timeline
    #[arg(long, value_parser = parse_time)]
    pub at: f64,

    /// sequential (splice in) or overlay (replace base footage)
    #[arg(long, default_value = "sequential")]
    pub mode: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the speed command
#[derive(Args, Debug)]
pub struct SpeedArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start of the retimed range
    #[arg(short, long, value_parser = parse_time)]
    pub start: f64,

    /// End of the retimed range
    #[arg(short, long, value_parser = parse_time)]
    pub end: f64,

    /// Speed factor; 2 plays twice as fast, 0.5 half as fast
    #[arg(short, long)]
    pub factor: f64,

    #[command(flatten)]
    pub output: OutputArgs,
}

/// Arguments for the add-audio command
#[derive(Args, Debug)]
pub struct AddAudioArgs {
    /// Video file path
    #[arg(long)]
    pub video: PathBuf,

    /// Audio file to mix in
    #[arg(long)]
    pub audio: PathBuf,

    /// Volume of the inserted audio, 0-100
    #[arg(long, default_value_t = 100.0)]
    pub volume: f64,

    /// Start of the placement window (default: start of the video)
    #[arg(long, value_parser = parse_time, requires = "end")]
    pub start: Option<f64>,

    /// End of the placement window
    #[arg(long, value_parser = parse_time, requires = "start")]
    pub end: Option<f64>,

    /// Repeat the audio to fill the window
    #[arg(long = "loop")]
    pub looped: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

impl AddAudioArgs {
    pub fn placement(&self) -> AudioPlacement {
        match (self.start, self.end) {
            (Some(start), Some(end)) => AudioPlacement::Custom { start, end },
            _ => AudioPlacement::FromStart,
        }
    }
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output format (text, json, yaml)
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Arguments for the thumbnail command
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Video file path
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the waveform command
#[derive(Args, Debug)]
pub struct WaveformArgs {
    /// Media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Number of buckets
    #[arg(long, default_value_t = crate::utils::waveform::DEFAULT_WAVEFORM_SAMPLES)]
    pub samples: usize,

    /// Print a JSON array
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the verify command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// File to check
    #[arg(short, long)]
    pub input: PathBuf,

    /// Expected duration
    #[arg(long, value_parser = parse_time)]
    pub expected: f64,

    /// Allowed drift in seconds
    #[arg(long, default_value_t = crate::app::verify_interactor::DEFAULT_TOLERANCE)]
    pub tolerance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_time_formats() {
        assert_eq!(parse_time("90"), Ok(90.0));
        assert_eq!(parse_time("01:30"), Ok(90.0));
        assert_eq!(parse_time("00:01:30.5"), Ok(90.5));
        assert!(parse_time("later").is_err());
    }

    #[test]
    fn test_output_target() {
        let preview = OutputArgs {
            output: None,
            preview: true,
        };
        assert_eq!(preview.target(), RenderTarget::Preview);

        let export = OutputArgs {
            output: Some(PathBuf::from("out/final.mp4")),
            preview: false,
        };
        assert_eq!(export.target(), RenderTarget::export("out/final.mp4"));
    }
}
