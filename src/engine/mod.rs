//! Pipeline executor
//!
//! Runs the stages of a compiled plan in order. Every file a stage writes is
//! tracked against the job so that intermediates disappear whether the job
//! succeeds, fails or is dropped mid-way.

pub mod progress;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::compiler::{CompiledPlan, Stage};
use crate::domain::model::Job;
use crate::error::{ClipStudioError, ClipStudioResult};
use crate::output::registry::{JobScope, TempArtifactRegistry};
use crate::output::verifier::verify_output_file;
use crate::ports::EncoderPort;

use progress::{EncoderProgress, ProgressSink, StageInfo};

pub struct PipelineExecutor {
    encoder: Arc<dyn EncoderPort>,
    registry: Arc<TempArtifactRegistry>,
    progress: Arc<dyn ProgressSink>,
}

impl PipelineExecutor {
    pub fn new(
        encoder: Arc<dyn EncoderPort>,
        registry: Arc<TempArtifactRegistry>,
        progress: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            encoder,
            registry,
            progress,
        }
    }

    /// Run every stage of `plan` for `job` and return the output path.
    ///
    /// Preview outputs stay registered with caller lifetime; export outputs
    /// are never tracked, so a failed export leaves whatever the encoder
    /// wrote at the destination.
    pub async fn execute(&self, job: &Job, plan: CompiledPlan) -> ClipStudioResult<PathBuf> {
        let started = Instant::now();
        let scope = JobScope::new(Arc::clone(&self.registry), job.id);
        let total = plan.stages.len();

        info!(
            "Job {} ({}): running {} stage(s)",
            job.id.short(),
            job.request.feature(),
            total
        );

        for (index, stage) in plan.stages.iter().enumerate() {
            let writes_final = stage.output() == plan.output.as_path();
            if !writes_final || job.is_ephemeral {
                scope.track(stage.output());
            }

            let info = StageInfo {
                job_id: job.id,
                index,
                total,
                label: stage.label().to_string(),
                expected_duration: match stage {
                    Stage::Encode(invocation) => invocation.expected_duration,
                    Stage::WriteConcatList { .. } => None,
                },
            };

            self.progress.on_stage_start(&info);
            if let Err(e) = self.run_stage(stage, &info).await {
                self.progress.on_error(&info, &e.to_string());
                return Err(e);
            }
            self.progress.on_stage_complete(&info);
        }

        if job.is_ephemeral {
            scope.promote(&plan.output);
        }
        let purged = scope.close();
        debug!("Job {} purged {} intermediate(s)", job.id.short(), purged);

        info!(
            "Job {} finished in {:.2}s: {}",
            job.id.short(),
            started.elapsed().as_secs_f64(),
            plan.output.display()
        );
        Ok(plan.output)
    }

    async fn run_stage(&self, stage: &Stage, info: &StageInfo) -> ClipStudioResult<()> {
        match stage {
            Stage::Encode(invocation) => {
                let sink = Arc::clone(&self.progress);
                let on_progress = move |p: &EncoderProgress| sink.on_progress(info, p);
                self.encoder.run(invocation, &on_progress).await?;
            }
            Stage::WriteConcatList { path, contents, .. } => {
                tokio::fs::write(path, contents).await.map_err(ClipStudioError::Io)?;
            }
        }

        let size = verify_output_file(stage.label(), stage.output())?;
        debug!("Stage {} wrote {} bytes", stage.label(), size);
        Ok(())
    }
}
