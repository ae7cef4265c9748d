//! FFmpeg execution adapter
//!
//! Each invocation runs as one child process. Progress comes from
//! `-progress pipe:1` on stdout; stderr is collected as the diagnostic.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, error};

use crate::compiler::EncoderInvocation;
use crate::engine::progress::EncoderProgress;
use crate::error::{ClipStudioError, ClipStudioResult};
use crate::ports::{EncoderPort, ProgressFn};
use crate::utils::diagnostic_tail;

/// Lines of stderr kept in a failure report
const DIAGNOSTIC_LINES: usize = 20;

/// Arguments placed before every invocation's own
const BASE_ARGS: [&str; 8] = [
    "-hide_banner",
    "-nostdin",
    "-y",
    "-v",
    "error",
    "-nostats",
    "-progress",
    "pipe:1",
];

/// FFmpeg-based execution adapter
pub struct FfmpegAdapter {
    binary: String,
}

impl FfmpegAdapter {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn resolve_binary(&self) -> ClipStudioResult<PathBuf> {
        which::which(&self.binary).map_err(|_| ClipStudioError::ToolNotFound(self.binary.clone()))
    }
}

impl Default for FfmpegAdapter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

#[async_trait]
impl EncoderPort for FfmpegAdapter {
    async fn run(
        &self,
        invocation: &EncoderInvocation,
        on_progress: ProgressFn<'_>,
    ) -> ClipStudioResult<()> {
        let binary = self.resolve_binary()?;
        debug!(
            "Running {}: {} {}",
            invocation.label,
            self.binary,
            invocation.args.join(" ")
        );

        let mut child = Command::new(&binary)
            .args(BASE_ARGS)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut bytes = Vec::new();
                if let Err(e) = stderr.read_to_end(&mut bytes).await {
                    debug!("Reading encoder stderr stopped early: {}", e);
                }
                String::from_utf8_lossy(&bytes).into_owned()
            })
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            let mut progress = EncoderProgress::default();
            while let Some(line) = lines.next_line().await? {
                if progress.apply_line(&line) {
                    on_progress(&progress);
                }
            }
        }

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };

        if status.success() {
            return Ok(());
        }

        error!(
            "Stage {} exited with {:?}",
            invocation.label,
            status.code()
        );
        Err(ClipStudioError::TranscodeFailure {
            stage: invocation.label.clone(),
            exit_code: status.code(),
            diagnostic: diagnostic_tail(&stderr, DIAGNOSTIC_LINES),
        })
    }
}
