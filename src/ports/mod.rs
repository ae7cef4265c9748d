// Ports - Interface definitions (contracts)

use std::path::Path;

use async_trait::async_trait;

use crate::compiler::EncoderInvocation;
use crate::domain::model::MediaFacts;
use crate::engine::progress::EncoderProgress;
use crate::error::ClipStudioResult;

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    /// Probe a file for timing and stream facts
    async fn probe(&self, path: &Path) -> ClipStudioResult<MediaFacts>;
}

/// Callback invoked with every progress block the encoder reports
pub type ProgressFn<'a> = &'a (dyn Fn(&EncoderProgress) + Send + Sync);

/// Port for running the external encoder
#[async_trait]
pub trait EncoderPort: Send + Sync {
    /// Run one invocation to completion.
    ///
    /// A non-zero exit is a `TranscodeFailure` carrying the tool's diagnostic
    /// output. Checking that the output file exists is the caller's job.
    async fn run(
        &self,
        invocation: &EncoderInvocation,
        on_progress: ProgressFn<'_>,
    ) -> ClipStudioResult<()>;
}
