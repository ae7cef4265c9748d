//! ClipStudio Library
//!
//! Non-linear editing pipeline over ffmpeg: plans cut, merge, speed-change and
//! audio-mix edits, compiles them into encoder invocations and runs them while
//! tracking every temporary file a job creates.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod compiler;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, DefaultAppContainer, EditInteractor, EditOutcome};
pub use domain::model::{
    AudioPlacement, EditRequest, MediaFacts, MergeMode, QualityProfile, RenderTarget, TimeSpec,
};
pub use error::{ClipStudioError, ClipStudioResult};
pub use output::registry::TempArtifactRegistry;
