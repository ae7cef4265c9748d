//! Temp artifact naming, tracking and output verification

pub mod naming;
pub mod registry;
pub mod verifier;

pub use naming::ArtifactNamer;
pub use registry::{ArtifactLifetime, JobScope, TempArtifact, TempArtifactRegistry};
pub use verifier::verify_output_file;
