// Verify interactor - Compares a produced file against its expected duration

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::rules::RequestValidator;
use crate::error::{ClipStudioError, ClipStudioResult};
use crate::ports::ProbePort;

/// Default allowed drift between expected and actual duration, in seconds
pub const DEFAULT_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub path: PathBuf,
    pub expected: f64,
    pub actual: f64,
    /// `actual - expected`
    pub drift: f64,
    pub tolerance: f64,
    pub within_tolerance: bool,
}

impl VerificationReport {
    pub fn new(path: PathBuf, expected: f64, actual: f64, tolerance: f64) -> Self {
        let drift = actual - expected;
        Self {
            path,
            expected,
            actual,
            drift,
            tolerance,
            within_tolerance: drift.abs() <= tolerance,
        }
    }
}

/// Interactor for output verification use case
pub struct VerifyInteractor {
    probe_port: Arc<dyn ProbePort>,
}

impl VerifyInteractor {
    pub fn new(probe_port: Arc<dyn ProbePort>) -> Self {
        Self { probe_port }
    }

    /// Probe `path` and compare its duration with `expected`
    pub async fn verify(
        &self,
        path: &Path,
        expected: f64,
        tolerance: f64,
    ) -> ClipStudioResult<VerificationReport> {
        RequestValidator::validate_time("expected duration", expected)?;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ClipStudioError::invalid(format!(
                "tolerance must be a non-negative number, got {}",
                tolerance
            )));
        }

        let facts = self.probe_port.probe(path).await?;
        let report = VerificationReport::new(
            path.to_path_buf(),
            expected,
            facts.duration_seconds,
            tolerance,
        );

        if report.within_tolerance {
            info!(
                "{}: {:.3}s (expected {:.3}s)",
                path.display(),
                report.actual,
                expected
            );
        } else {
            warn!(
                "{}: duration {:.3}s drifts {:+.3}s from expected {:.3}s",
                path.display(),
                report.actual,
                report.drift,
                expected
            );
        }
        Ok(report)
    }
}
