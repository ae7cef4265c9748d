// Edit interactor - Orchestrates the cut / merge / speed / audio use cases

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::compiler::FilterGraphCompiler;
use crate::domain::model::*;
use crate::domain::rules::RequestValidator;
use crate::engine::progress::ProgressSink;
use crate::engine::PipelineExecutor;
use crate::error::ClipStudioResult;
use crate::output::naming::ArtifactNamer;
use crate::output::registry::TempArtifactRegistry;
use crate::planner::{PlannedAsset, SegmentPlanner};
use crate::ports::{EncoderPort, ProbePort};
use crate::utils::path::ensure_parent_dir;

/// Result of a finished edit job
#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub job_id: JobId,
    pub output_path: PathBuf,
    pub expected_duration: f64,
    /// True for previews; the caller owns cleanup via `discard_preview`
    pub ephemeral: bool,
}

/// Interactor for the edit use cases
pub struct EditInteractor {
    probe_port: Arc<dyn ProbePort>,
    registry: Arc<TempArtifactRegistry>,
    executor: PipelineExecutor,
    temp_dir: PathBuf,
    threads: Option<usize>,
}

impl EditInteractor {
    /// Create new edit interactor with injected ports
    pub fn new(
        probe_port: Arc<dyn ProbePort>,
        encoder_port: Arc<dyn EncoderPort>,
        registry: Arc<TempArtifactRegistry>,
        progress: Arc<dyn ProgressSink>,
        temp_dir: PathBuf,
    ) -> Self {
        let executor = PipelineExecutor::new(encoder_port, Arc::clone(&registry), progress);
        Self {
            probe_port,
            registry,
            executor,
            temp_dir,
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    /// Run any edit request against a preview or export target
    pub async fn run(
        &self,
        request: EditRequest,
        target: RenderTarget,
    ) -> ClipStudioResult<EditOutcome> {
        RequestValidator::validate(&request)?;

        let feature = request.feature();
        info!("Starting {} job", feature);

        let mut assets = Vec::new();
        for asset in request.assets() {
            let facts = self.probe_port.probe(&asset.path).await?;
            assets.push(PlannedAsset::new(asset, facts));
        }

        let plan = SegmentPlanner::plan(&request, assets)?;

        let namer = ArtifactNamer::new(&self.temp_dir, feature);
        let profile = target.profile();
        let output = match &target {
            RenderTarget::Preview => namer.preview(),
            RenderTarget::Export(path) => {
                ensure_parent_dir(path)?;
                path.clone()
            }
        };

        let job = Job::new(request, profile, output);
        let compiled = FilterGraphCompiler::new(&namer, profile)
            .with_threads(self.threads)
            .compile(&plan, job.output_path())?;

        match self.executor.execute(&job, compiled).await {
            Ok(output_path) => {
                info!("{} job {} wrote {}", feature, job.id.short(), output_path.display());
                Ok(EditOutcome {
                    job_id: job.id,
                    output_path,
                    expected_duration: plan.expected_duration,
                    ephemeral: job.is_ephemeral,
                })
            }
            Err(e) => {
                error!("{} job {} failed: {}", feature, job.id.short(), e);
                Err(e)
            }
        }
    }

    pub async fn cut(
        &self,
        path: impl Into<PathBuf>,
        start: f64,
        end: f64,
        target: RenderTarget,
    ) -> ClipStudioResult<EditOutcome> {
        let request = EditRequest::Cut {
            path: path.into(),
            start,
            end,
        };
        self.run(request, target).await
    }

    pub async fn merge_sequential(
        &self,
        base_path: impl Into<PathBuf>,
        insert_path: impl Into<PathBuf>,
        insertion_point: f64,
        target: RenderTarget,
    ) -> ClipStudioResult<EditOutcome> {
        self.merge(base_path, insert_path, insertion_point, MergeMode::Sequential, target)
            .await
    }

    pub async fn merge_overlay(
        &self,
        base_path: impl Into<PathBuf>,
        insert_path: impl Into<PathBuf>,
        insertion_point: f64,
        target: RenderTarget,
    ) -> ClipStudioResult<EditOutcome> {
        self.merge(base_path, insert_path, insertion_point, MergeMode::Overlay, target)
            .await
    }

    async fn merge(
        &self,
        base_path: impl Into<PathBuf>,
        insert_path: impl Into<PathBuf>,
        insertion_point: f64,
        mode: MergeMode,
        target: RenderTarget,
    ) -> ClipStudioResult<EditOutcome> {
        let request = EditRequest::Merge {
            base_path: base_path.into(),
            insert_path: insert_path.into(),
            insertion_point,
            mode,
        };
        self.run(request, target).await
    }

    pub async fn change_speed(
        &self,
        path: impl Into<PathBuf>,
        start: f64,
        end: f64,
        factor: f64,
        target: RenderTarget,
    ) -> ClipStudioResult<EditOutcome> {
        let request = EditRequest::SpeedChange {
            path: path.into(),
            start,
            end,
            factor,
        };
        self.run(request, target).await
    }

    pub async fn add_audio(
        &self,
        video_path: impl Into<PathBuf>,
        audio_path: impl Into<PathBuf>,
        volume: f64,
        placement: AudioPlacement,
        looped: bool,
        target: RenderTarget,
    ) -> ClipStudioResult<EditOutcome> {
        let request = EditRequest::AddAudio {
            video_path: video_path.into(),
            audio_path: audio_path.into(),
            volume,
            placement,
            looped,
        };
        self.run(request, target).await
    }

    /// Delete a preview handed out earlier. Returns whether it was tracked.
    pub fn discard_preview(&self, path: &Path) -> bool {
        self.registry.unregister_and_delete(path)
    }

    /// Purge every artifact still registered
    pub fn shutdown(&self) -> usize {
        self.registry.purge_all()
    }
}
