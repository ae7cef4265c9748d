//! AddAudio planning
//!
//! The inserted audio plays inside a window on the video timeline. The whole
//! timeline is laid out as: gap before the window, the played audio, and the
//! remainder after it. Gaps carry the video's own audio when it has any and
//! silence otherwise.

use crate::domain::model::*;
use crate::domain::rules;
use crate::error::{ClipStudioError, ClipStudioResult};

use super::{EditPlan, PlanLayout, PlannedAsset};

/// Index of the video asset in an AddAudio plan
pub const VIDEO: usize = 0;
/// Index of the inserted audio asset in an AddAudio plan
pub const AUDIO: usize = 1;

/// Resolved play window on the video timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioWindow {
    pub start: f64,
    pub end: f64,
}

impl AudioWindow {
    pub fn resolve(placement: AudioPlacement, video_duration: f64) -> ClipStudioResult<Self> {
        match placement {
            AudioPlacement::FromStart => Ok(Self {
                start: 0.0,
                end: video_duration,
            }),
            AudioPlacement::Custom { start, end } => {
                rules::RequestValidator::validate_range("audio placement", start, end)?;
                let (start, end) =
                    rules::clamp_range("audio placement", start, end, Some(video_duration))?;
                Ok(Self { start, end })
            }
        }
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

/// How long the inserted audio plays, and whether it loops to get there
pub fn play_duration(audio_duration: f64, window: f64, looped: bool) -> (f64, bool) {
    if looped && audio_duration < window {
        (window, true)
    } else {
        (audio_duration.min(window), false)
    }
}

pub fn plan_add_audio(
    video: PlannedAsset,
    audio: PlannedAsset,
    volume: f64,
    placement: AudioPlacement,
    looped: bool,
) -> ClipStudioResult<EditPlan> {
    rules::RequestValidator::validate_volume(volume)?;
    let video_duration = video.require_duration("video")?;
    let audio_duration = audio.require_duration("audio")?;
    if !audio.facts.has_audio {
        return Err(ClipStudioError::invalid(format!(
            "{} has no audio stream",
            audio.asset.path.display()
        )));
    }

    let window = AudioWindow::resolve(placement, video_duration)?;
    let (played, loop_engaged) = play_duration(audio_duration, window.length(), looped);
    let gain = rules::volume_to_gain(volume);
    let video_has_audio = video.facts.has_audio;

    let gap = |from: f64, to: f64| -> Option<Segment> {
        let length = to - from;
        if !rules::is_material(length) {
            return None;
        }
        Some(if video_has_audio {
            Segment::pass_through(VIDEO, from, length)
        } else {
            Segment::silence(length)
        })
    };

    let main = if video_has_audio {
        Segment {
            source: SourceRef::Asset(VIDEO),
            start_seconds: window.start,
            duration_seconds: played,
            role: SegmentRole::Transformed(Transform::Mix {
                gain,
                looped: loop_engaged,
            }),
        }
    } else {
        Segment {
            source: SourceRef::Asset(AUDIO),
            start_seconds: 0.0,
            duration_seconds: played,
            role: SegmentRole::Inserted {
                gain,
                looped: loop_engaged,
            },
        }
    };

    let segments: Vec<Segment> = gap(0.0, window.start)
        .into_iter()
        .chain(std::iter::once(main))
        .chain(gap(window.start + played, video_duration))
        .collect();

    Ok(EditPlan {
        assets: vec![video, audio],
        layout: PlanLayout::AudioTrack { segments },
        expected_duration: video_duration,
    })
}
