// Domain rules - Request validation and shared timing policy

use crate::domain::model::*;
use crate::error::{ClipStudioError, ClipStudioResult};

#[cfg(test)]
mod tests;

/// Segments at or below this length are dropped from plans
pub const SEGMENT_EPSILON: f64 = 0.01;

/// Canonical audio format every concatenated segment is converted to
pub const CANONICAL_SAMPLE_RATE: u32 = 44_100;
pub const CANONICAL_CHANNEL_LAYOUT: &str = "stereo";

/// Canvas used when the base asset reports no dimensions
pub const FALLBACK_WIDTH: u32 = 1920;
pub const FALLBACK_HEIGHT: u32 = 1080;

/// Validation performed before any probe or subprocess
pub struct RequestValidator;

impl RequestValidator {
    /// Reject malformed requests synchronously
    pub fn validate(request: &EditRequest) -> ClipStudioResult<()> {
        match request {
            EditRequest::Cut { start, end, .. } => Self::validate_range("cut", *start, *end),
            EditRequest::Merge {
                insertion_point, ..
            } => Self::validate_time("insertion point", *insertion_point),
            EditRequest::SpeedChange {
                start, end, factor, ..
            } => {
                Self::validate_range("speed change", *start, *end)?;
                Self::validate_factor(*factor)
            }
            EditRequest::AddAudio {
                volume, placement, ..
            } => {
                Self::validate_volume(*volume)?;
                if let AudioPlacement::Custom { start, end } = placement {
                    Self::validate_range("audio placement", *start, *end)?;
                }
                Ok(())
            }
        }
    }

    /// A time value must be finite and non-negative
    pub fn validate_time(label: &str, seconds: f64) -> ClipStudioResult<()> {
        if !seconds.is_finite() {
            return Err(ClipStudioError::invalid(format!(
                "{} must be a finite number of seconds, got {}",
                label, seconds
            )));
        }
        if seconds < 0.0 {
            return Err(ClipStudioError::invalid(format!(
                "{} cannot be negative, got {}",
                label, seconds
            )));
        }
        Ok(())
    }

    /// Both ends valid and end strictly after start
    pub fn validate_range(label: &str, start: f64, end: f64) -> ClipStudioResult<()> {
        Self::validate_time(&format!("{} start", label), start)?;
        Self::validate_time(&format!("{} end", label), end)?;
        if end <= start {
            return Err(ClipStudioError::invalid(format!(
                "{} end ({}) must be greater than start ({})",
                label, end, start
            )));
        }
        Ok(())
    }

    pub fn validate_factor(factor: f64) -> ClipStudioResult<()> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ClipStudioError::invalid(format!(
                "Speed factor must be a finite number greater than 0, got {}",
                factor
            )));
        }
        Ok(())
    }

    pub fn validate_volume(volume: f64) -> ClipStudioResult<()> {
        if !volume.is_finite() || !(0.0..=100.0).contains(&volume) {
            return Err(ClipStudioError::invalid(format!(
                "Volume must be between 0 and 100, got {}",
                volume
            )));
        }
        Ok(())
    }
}

/// Linear gain applied to inserted audio
pub fn volume_to_gain(volume: f64) -> f64 {
    volume / 100.0
}

/// True when a span is long enough to deserve its own encoder pass
pub fn is_material(duration: f64) -> bool {
    duration > SEGMENT_EPSILON
}

/// Clamp `end` to a known source duration and reject starts past the end
pub fn clamp_range(
    label: &str,
    start: f64,
    end: f64,
    source_duration: Option<f64>,
) -> ClipStudioResult<(f64, f64)> {
    match source_duration {
        Some(total) => {
            if start >= total {
                return Err(ClipStudioError::invalid(format!(
                    "{} start ({}) is beyond the source duration ({})",
                    label, start, total
                )));
            }
            Ok((start, end.min(total)))
        }
        None => Ok((start, end)),
    }
}
