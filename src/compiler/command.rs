//! FFmpeg command builder

use std::path::{Path, PathBuf};

use crate::domain::model::QualityProfile;
use crate::utils::time::format_seconds;

/// One external encoder run, ready for an `EncoderPort`
#[derive(Debug, Clone, PartialEq)]
pub struct EncoderInvocation {
    /// Stage name used in logs and error reports
    pub label: String,
    /// Arguments after the global flags the runner adds itself
    pub args: Vec<String>,
    /// File the invocation must produce
    pub output: PathBuf,
    /// Expected media duration of the output, for progress reporting
    pub expected_duration: Option<f64>,
}

#[derive(Debug, Clone)]
struct Input {
    args: Vec<String>,
    path: PathBuf,
}

/// Builder for FFmpeg command lines with any number of inputs.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    inputs: Vec<Input>,
    output_args: Vec<String>,
    output: PathBuf,
}

impl FfmpegCommand {
    pub fn new(output: impl AsRef<Path>) -> Self {
        Self {
            inputs: Vec::new(),
            output_args: Vec::new(),
            output: output.as_ref().to_path_buf(),
        }
    }

    /// Add a plain input.
    pub fn input(self, path: impl AsRef<Path>) -> Self {
        self.input_with(Vec::<String>::new(), path)
    }

    /// Add an input preceded by its own options.
    pub fn input_with<I, S>(mut self, args: I, path: impl AsRef<Path>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.push(Input {
            args: args.into_iter().map(Into::into).collect(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Add an input read from `start` for `duration` seconds.
    pub fn input_range(self, path: impl AsRef<Path>, start: f64, duration: f64) -> Self {
        self.input_with(
            [
                "-ss".to_string(),
                format_seconds(start),
                "-t".to_string(),
                format_seconds(duration),
            ],
            path,
        )
    }

    /// Add an output argument.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Add multiple output arguments.
    pub fn output_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn filter_complex(self, graph: impl Into<String>) -> Self {
        self.output_arg("-filter_complex").output_arg(graph)
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    pub fn map(self, stream: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(stream)
    }

    /// Video encode settings of a profile.
    pub fn video_profile(self, profile: &QualityProfile) -> Self {
        let crf = profile.crf.to_string();
        self.output_args([
            "-c:v",
            profile.video_codec,
            "-preset",
            profile.preset,
            "-crf",
            crf.as_str(),
            "-pix_fmt",
            "yuv420p",
        ])
    }

    /// Audio encode settings of a profile.
    pub fn audio_profile(self, profile: &QualityProfile) -> Self {
        self.output_args([
            "-c:a",
            profile.audio_codec,
            "-b:a",
            profile.audio_bitrate,
        ])
    }

    pub fn frame_rate(self, fps: f64) -> Self {
        self.output_arg("-r").output_arg(crate::utils::time::format_factor(fps))
    }

    /// Copy every stream without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_args(["-c", "copy"])
    }

    /// Limit output duration.
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format_seconds(seconds))
    }

    pub fn threads(self, threads: Option<usize>) -> Self {
        match threads {
            Some(n) => self.output_arg("-threads").output_arg(n.to_string()),
            None => self,
        }
    }

    /// Append `-movflags +faststart` when the profile asks for it.
    pub fn fast_start(self, enabled: bool) -> Self {
        if enabled {
            self.output_args(["-movflags", "+faststart"])
        } else {
            self
        }
    }

    /// Extract single frame.
    pub fn single_frame(self) -> Self {
        self.output_args(["-vframes", "1"])
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::new();

        for input in &self.inputs {
            args.extend(input.args.iter().cloned());
            args.push("-i".to_string());
            args.push(input.path.to_string_lossy().to_string());
        }

        args.extend(self.output_args.iter().cloned());
        args.push(self.output.to_string_lossy().to_string());

        args
    }

    /// Finish into an invocation.
    pub fn into_invocation(
        self,
        label: impl Into<String>,
        expected_duration: Option<f64>,
    ) -> EncoderInvocation {
        EncoderInvocation {
            label: label.into(),
            args: self.build_args(),
            output: self.output,
            expected_duration,
        }
    }
}
