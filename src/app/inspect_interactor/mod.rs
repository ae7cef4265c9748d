// Inspect interactor - Media inspection, thumbnails and waveforms

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::compiler::FfmpegCommand;
use crate::domain::model::{JobId, MediaFacts};
use crate::engine::progress::EncoderProgress;
use crate::error::{ClipStudioError, ClipStudioResult};
use crate::output::naming::ArtifactNamer;
use crate::output::registry::{JobScope, TempArtifactRegistry};
use crate::output::verifier::verify_output_file;
use crate::ports::{EncoderPort, ProbePort};
use crate::utils::format_file_size;
use crate::utils::time::format_clock;
use crate::utils::waveform::{rms_buckets, WAVEFORM_SAMPLE_RATE};

/// Thumbnail canvas size
pub const THUMBNAIL_WIDTH: u32 = 320;
pub const THUMBNAIL_HEIGHT: u32 = 180;

/// Output format for inspection reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl ReportFormat {
    pub fn parse(format_str: &str) -> ClipStudioResult<Self> {
        match format_str.trim().to_lowercase().as_str() {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            "yaml" | "yml" => Ok(ReportFormat::Yaml),
            _ => Err(ClipStudioError::invalid(format!(
                "Unknown report format: {}. Valid formats: text, json, yaml",
                format_str
            ))),
        }
    }
}

/// Facts about one file plus display helpers
#[derive(Debug, Clone, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    pub facts: MediaFacts,
    pub duration_hms: String,
    pub resolution: String,
    pub file_size: u64,
}

impl InspectReport {
    pub fn render(&self, format: ReportFormat) -> ClipStudioResult<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            ReportFormat::Text => Ok(self.format_as_text()),
        }
    }

    fn format_as_text(&self) -> String {
        let facts = &self.facts;
        let mut output = String::new();

        output.push_str("Media File Information:\n");
        output.push_str(&format!("  File: {}\n", self.path.display()));
        output.push_str(&format!(
            "  Duration: {} ({:.3}s)\n",
            self.duration_hms, facts.duration_seconds
        ));
        output.push_str(&format!("  File Size: {}\n", format_file_size(self.file_size)));

        if facts.has_video {
            output.push_str(&format!(
                "  Video: {} @ {:.2}fps\n",
                self.resolution, facts.fps
            ));
        } else {
            output.push_str("  Video: none\n");
        }

        if facts.has_audio {
            output.push_str(&format!(
                "  Audio: {} channels, {} Hz\n",
                facts.channels, facts.sample_rate
            ));
        } else {
            output.push_str("  Audio: none\n");
        }

        output
    }
}

/// Interactor for media inspection
pub struct InspectInteractor {
    probe_port: Arc<dyn ProbePort>,
    encoder_port: Arc<dyn EncoderPort>,
    registry: Arc<TempArtifactRegistry>,
    temp_dir: PathBuf,
}

impl InspectInteractor {
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        encoder_port: Arc<dyn EncoderPort>,
        registry: Arc<TempArtifactRegistry>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            probe_port,
            encoder_port,
            registry,
            temp_dir,
        }
    }

    /// Probe a file and build its report
    pub async fn inspect(&self, path: &Path) -> ClipStudioResult<InspectReport> {
        info!("Inspecting {}", path.display());
        let facts = self.probe_port.probe(path).await?;
        let file_size = tokio::fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);

        Ok(InspectReport {
            path: path.to_path_buf(),
            duration_hms: format_clock(facts.duration_seconds),
            resolution: facts.resolution_label(),
            facts,
            file_size,
        })
    }

    /// Render the first frame into a letterboxed JPEG.
    ///
    /// The file is registered with caller lifetime; release it with
    /// `TempArtifactRegistry::unregister_and_delete`.
    pub async fn thumbnail(&self, path: &Path) -> ClipStudioResult<PathBuf> {
        let facts = self.probe_port.probe(path).await?;
        if !facts.has_video {
            return Err(ClipStudioError::invalid(format!(
                "{} has no video stream to take a thumbnail from",
                path.display()
            )));
        }

        let namer = ArtifactNamer::new(&self.temp_dir, "thumbnail");
        let output = namer.path("thumb", "jpg");
        let scope = JobScope::new(Arc::clone(&self.registry), JobId::new());
        scope.track(&output);

        let invocation = FfmpegCommand::new(&output)
            .input_with(["-ss", "0"], path)
            .video_filter(thumbnail_filter())
            .single_frame()
            .output_args(["-q:v", "2"])
            .into_invocation("thumbnail", None);

        self.encoder_port
            .run(&invocation, &|_: &EncoderProgress| {})
            .await?;
        verify_output_file("thumbnail", &output)?;

        scope.promote(&output);
        scope.close();
        debug!("Thumbnail for {} at {}", path.display(), output.display());
        Ok(output)
    }

    /// RMS loudness of `samples` equal slices of the audio track, in `[0, 1]`.
    ///
    /// A file without audio yields all zeros.
    pub async fn waveform(&self, path: &Path, samples: usize) -> ClipStudioResult<Vec<f32>> {
        if samples == 0 {
            return Err(ClipStudioError::invalid("waveform needs at least one sample"));
        }

        let facts = self.probe_port.probe(path).await?;
        if !facts.has_audio {
            return Ok(vec![0.0; samples]);
        }

        let namer = ArtifactNamer::new(&self.temp_dir, "waveform");
        let raw = namer.intermediate("pcm", "raw");
        let scope = JobScope::new(Arc::clone(&self.registry), JobId::new());
        scope.track(&raw);

        let invocation = FfmpegCommand::new(&raw)
            .input(path)
            .output_args(["-vn", "-ac", "1", "-ar"])
            .output_arg(WAVEFORM_SAMPLE_RATE.to_string())
            .output_args(["-f", "s16le"])
            .into_invocation("waveform", facts.known_duration());

        self.encoder_port
            .run(&invocation, &|_: &EncoderProgress| {})
            .await?;
        verify_output_file("waveform", &raw)?;

        let pcm = tokio::fs::read(&raw).await?;
        scope.close();
        Ok(rms_buckets(&pcm, samples))
    }
}

fn thumbnail_filter() -> String {
    format!(
        "scale={w}:{h}:force_original_aspect_ratio=decrease,pad={w}:{h}:(ow-iw)/2:(oh-ih)/2:color=black",
        w = THUMBNAIL_WIDTH,
        h = THUMBNAIL_HEIGHT
    )
}
