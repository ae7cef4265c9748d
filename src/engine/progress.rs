//! Progress reporting
//!
//! Progress is an observability hook only: sinks never influence the result
//! of a job.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::model::JobId;

/// State accumulated from the encoder's `-progress` key/value stream
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EncoderProgress {
    pub out_time_seconds: f64,
    pub frame: u64,
    pub fps: f64,
    pub speed: f64,
    pub finished: bool,
}

impl EncoderProgress {
    /// Fold one `key=value` line in. Returns true when a block is complete.
    pub fn apply_line(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.trim().split_once('=') else {
            return false;
        };
        let value = value.trim();

        match key {
            // out_time_ms is in microseconds as well
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.parse::<i64>() {
                    self.out_time_seconds = us.max(0) as f64 / 1_000_000.0;
                }
            }
            "frame" => {
                if let Ok(frame) = value.parse() {
                    self.frame = frame;
                }
            }
            "fps" => {
                if let Ok(fps) = value.parse() {
                    self.fps = fps;
                }
            }
            "speed" => {
                if let Some(speed) = value.strip_suffix('x').and_then(|s| s.trim().parse().ok()) {
                    self.speed = speed;
                }
            }
            "progress" => {
                self.finished = value == "end";
                return true;
            }
            _ => {}
        }
        false
    }

    /// Percentage of `expected` seconds written, capped at 100
    pub fn percent(&self, expected: Option<f64>) -> Option<f64> {
        let expected = expected.filter(|e| *e > 0.0)?;
        Some((self.out_time_seconds / expected * 100.0).clamp(0.0, 100.0))
    }
}

/// Where a stage sits in its job
#[derive(Debug, Clone, Serialize)]
pub struct StageInfo {
    pub job_id: JobId,
    pub index: usize,
    pub total: usize,
    pub label: String,
    pub expected_duration: Option<f64>,
}

/// Receives per-stage events from the executor
pub trait ProgressSink: Send + Sync {
    fn on_stage_start(&self, stage: &StageInfo);

    fn on_progress(&self, stage: &StageInfo, progress: &EncoderProgress);

    fn on_stage_complete(&self, stage: &StageInfo);

    fn on_error(&self, stage: &StageInfo, message: &str);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_stage_start(&self, _stage: &StageInfo) {}

    fn on_progress(&self, _stage: &StageInfo, _progress: &EncoderProgress) {}

    fn on_stage_complete(&self, _stage: &StageInfo) {}

    fn on_error(&self, _stage: &StageInfo, _message: &str) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn on_stage_start(&self, stage: &StageInfo) {
        info!(
            job = %stage.job_id.short(),
            "Stage {}/{}: {}",
            stage.index + 1,
            stage.total,
            stage.label
        );
    }

    fn on_progress(&self, stage: &StageInfo, progress: &EncoderProgress) {
        match progress.percent(stage.expected_duration) {
            Some(percent) => debug!(
                job = %stage.job_id.short(),
                "{}: {:.1}% ({:.2}s written, {:.2}x)",
                stage.label,
                percent,
                progress.out_time_seconds,
                progress.speed
            ),
            None => debug!(
                job = %stage.job_id.short(),
                "{}: {:.2}s written",
                stage.label,
                progress.out_time_seconds
            ),
        }
    }

    fn on_stage_complete(&self, stage: &StageInfo) {
        debug!(job = %stage.job_id.short(), "Stage {} complete", stage.label);
    }

    fn on_error(&self, stage: &StageInfo, message: &str) {
        warn!(job = %stage.job_id.short(), "Stage {} failed: {}", stage.label, message);
    }
}

/// Emits one JSON object per event on stderr
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonProgress;

impl JsonProgress {
    fn emit(event: &str, stage: &StageInfo, extra: serde_json::Value) {
        let mut record = serde_json::json!({
            "event": event,
            "job_id": stage.job_id.to_string(),
            "stage": stage.label,
            "index": stage.index,
            "total": stage.total,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        if let (Some(map), serde_json::Value::Object(extra)) = (record.as_object_mut(), extra) {
            map.extend(extra);
        }
        eprintln!("{}", record);
    }
}

impl ProgressSink for JsonProgress {
    fn on_stage_start(&self, stage: &StageInfo) {
        Self::emit("start", stage, serde_json::json!({}));
    }

    fn on_progress(&self, stage: &StageInfo, progress: &EncoderProgress) {
        Self::emit(
            "progress",
            stage,
            serde_json::json!({
                "out_time": progress.out_time_seconds,
                "frame": progress.frame,
                "speed": progress.speed,
                "percent": progress.percent(stage.expected_duration)
            }),
        );
    }

    fn on_stage_complete(&self, stage: &StageInfo) {
        Self::emit("complete", stage, serde_json::json!({}));
    }

    fn on_error(&self, stage: &StageInfo, message: &str) {
        Self::emit("error", stage, serde_json::json!({ "message": message }));
    }
}
