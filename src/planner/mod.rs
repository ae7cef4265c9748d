//! Segment planning
//!
//! Turns a validated edit request plus the probe facts of its inputs into an
//! ordered list of segments. Everything here is pure: no I/O and no encoder
//! knowledge beyond what a segment means.

pub mod audio;
pub mod merge;

use serde::Serialize;
use tracing::debug;

use crate::domain::model::*;
use crate::domain::rules::{self, RequestValidator};
use crate::error::{ClipStudioError, ClipStudioResult};

/// A source asset together with the facts probed for it
#[derive(Debug, Clone)]
pub struct PlannedAsset {
    pub asset: MediaAsset,
    pub facts: MediaFacts,
}

impl PlannedAsset {
    pub fn new(asset: MediaAsset, facts: MediaFacts) -> Self {
        Self { asset, facts }
    }

    /// Duration, or an error naming the role this asset plays in the edit
    pub fn require_duration(&self, role: &str) -> ClipStudioResult<f64> {
        self.facts.known_duration().ok_or_else(|| {
            ClipStudioError::invalid(format!(
                "{} {} has no known duration",
                role,
                self.asset.path.display()
            ))
        })
    }
}

/// Canvas every segment of a normalized sequence is fitted to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NormalizeTarget {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

impl NormalizeTarget {
    /// Target taken from the base asset; dimensions rounded down to even
    pub fn from_facts(facts: &MediaFacts) -> Self {
        let (width, height) = if facts.width == 0 || facts.height == 0 {
            (rules::FALLBACK_WIDTH, rules::FALLBACK_HEIGHT)
        } else {
            (facts.width, facts.height)
        };
        let fps = if facts.fps.is_finite() && facts.fps > 0.0 {
            facts.fps
        } else {
            MediaFacts::DEFAULT_FPS
        };
        Self {
            width: (width & !1).max(2),
            height: (height & !1).max(2),
            fps,
        }
    }
}

/// How the compiler should assemble the segments
#[derive(Debug, Clone, PartialEq)]
pub enum PlanLayout {
    /// Each segment rendered on its own, then joined end to end
    Sequence {
        segments: Vec<Segment>,
        normalize: Option<NormalizeTarget>,
    },
    /// Video of asset 0 copied, audio track assembled from the segments
    AudioTrack { segments: Vec<Segment> },
}

/// Output of the planner, consumed by the filter-graph compiler
#[derive(Debug, Clone)]
pub struct EditPlan {
    pub assets: Vec<PlannedAsset>,
    pub layout: PlanLayout,
    pub expected_duration: f64,
}

impl EditPlan {
    pub fn segments(&self) -> &[Segment] {
        match &self.layout {
            PlanLayout::Sequence { segments, .. } => segments,
            PlanLayout::AudioTrack { segments } => segments,
        }
    }

    pub fn asset(&self, index: usize) -> ClipStudioResult<&PlannedAsset> {
        self.assets.get(index).ok_or_else(|| {
            ClipStudioError::Compile(format!("segment refers to missing asset #{}", index))
        })
    }
}

/// Planner entry point
pub struct SegmentPlanner;

impl SegmentPlanner {
    /// Plan any request; `assets` must follow `EditRequest::assets` order
    pub fn plan(request: &EditRequest, assets: Vec<PlannedAsset>) -> ClipStudioResult<EditPlan> {
        RequestValidator::validate(request)?;

        let expected_assets = request.assets().len();
        if assets.len() != expected_assets {
            return Err(ClipStudioError::invalid(format!(
                "{} request needs {} probed inputs, got {}",
                request.feature(),
                expected_assets,
                assets.len()
            )));
        }

        let mut assets = assets.into_iter();
        let mut next = || {
            assets
                .next()
                .ok_or_else(|| ClipStudioError::invalid("missing probed input"))
        };

        let plan = match request {
            EditRequest::Cut { start, end, .. } => Self::plan_cut(next()?, *start, *end)?,
            EditRequest::Merge {
                insertion_point,
                mode,
                ..
            } => merge::plan_merge(next()?, next()?, *insertion_point, *mode)?,
            EditRequest::SpeedChange {
                start, end, factor, ..
            } => Self::plan_speed_change(next()?, *start, *end, *factor)?,
            EditRequest::AddAudio {
                volume,
                placement,
                looped,
                ..
            } => audio::plan_add_audio(next()?, next()?, *volume, *placement, *looped)?,
        };

        debug!(
            "Planned {} with {} segment(s), expected duration {:.3}s",
            request.feature(),
            plan.segments().len(),
            plan.expected_duration
        );
        Ok(plan)
    }

    /// One pass-through segment over the clamped range
    pub fn plan_cut(source: PlannedAsset, start: f64, end: f64) -> ClipStudioResult<EditPlan> {
        RequestValidator::validate_range("cut", start, end)?;
        let (start, end) = rules::clamp_range("cut", start, end, source.facts.known_duration())?;
        let duration = end - start;

        Ok(EditPlan {
            assets: vec![source],
            layout: PlanLayout::Sequence {
                segments: vec![Segment::pass_through(0, start, duration)],
                normalize: None,
            },
            expected_duration: duration,
        })
    }

    /// Untouched head, speed-mapped middle, untouched tail
    pub fn plan_speed_change(
        source: PlannedAsset,
        start: f64,
        end: f64,
        factor: f64,
    ) -> ClipStudioResult<EditPlan> {
        RequestValidator::validate_range("speed change", start, end)?;
        RequestValidator::validate_factor(factor)?;
        let total = source.require_duration("video")?;
        let (start, end) = rules::clamp_range("speed change", start, end, Some(total))?;

        let mut segments = Vec::with_capacity(3);
        if rules::is_material(start) {
            segments.push(Segment::pass_through(0, 0.0, start));
        }
        segments.push(Segment {
            source: SourceRef::Asset(0),
            start_seconds: start,
            duration_seconds: end - start,
            role: SegmentRole::Transformed(Transform::Speed { factor }),
        });
        if rules::is_material(total - end) {
            segments.push(Segment::pass_through(0, end, total - end));
        }

        let expected_duration = segments.iter().map(Segment::output_duration).sum();
        Ok(EditPlan {
            assets: vec![source],
            layout: PlanLayout::Sequence {
                segments,
                normalize: None,
            },
            expected_duration,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn video(path: &str, duration: f64, has_audio: bool) -> PlannedAsset {
        PlannedAsset::new(
            MediaAsset::video(path),
            MediaFacts {
                duration_seconds: duration,
                has_video: true,
                has_audio,
                width: 1280,
                height: 720,
                fps: 30.0,
                ..MediaFacts::default()
            },
        )
    }

    pub fn audio(path: &str, duration: f64) -> PlannedAsset {
        PlannedAsset::new(
            MediaAsset::audio(path),
            MediaFacts {
                duration_seconds: duration,
                has_audio: true,
                ..MediaFacts::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_cut_single_segment() {
        let plan = SegmentPlanner::plan_cut(video("in.mp4", 30.0, true), 5.0, 15.0).unwrap();
        assert_eq!(plan.segments(), &[Segment::pass_through(0, 5.0, 10.0)]);
        assert_eq!(plan.expected_duration, 10.0);
    }

    #[test]
    fn test_cut_clamps_to_source() {
        let plan = SegmentPlanner::plan_cut(video("in.mp4", 30.0, true), 20.0, 45.0).unwrap();
        assert_eq!(plan.expected_duration, 10.0);
    }

    #[test]
    fn test_cut_rejects_bad_ranges() {
        assert!(SegmentPlanner::plan_cut(video("in.mp4", 30.0, true), 15.0, 5.0).is_err());
        assert!(SegmentPlanner::plan_cut(video("in.mp4", 30.0, true), 30.0, 40.0).is_err());
        assert!(SegmentPlanner::plan_cut(video("in.mp4", 30.0, true), 1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_cut_unknown_duration_is_not_clamped() {
        let plan = SegmentPlanner::plan_cut(video("in.mp4", 0.0, true), 5.0, 15.0).unwrap();
        assert_eq!(plan.expected_duration, 10.0);
    }

    #[test]
    fn test_speed_change_three_segments() {
        let plan =
            SegmentPlanner::plan_speed_change(video("in.mp4", 60.0, true), 10.0, 20.0, 2.0)
                .unwrap();
        let segments = plan.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], Segment::pass_through(0, 0.0, 10.0));
        assert_eq!(
            segments[1].role,
            SegmentRole::Transformed(Transform::Speed { factor: 2.0 })
        );
        assert_eq!(segments[1].output_duration(), 5.0);
        assert_eq!(segments[2], Segment::pass_through(0, 20.0, 40.0));
        assert!((plan.expected_duration - 55.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_change_omits_epsilon_segments() {
        let plan =
            SegmentPlanner::plan_speed_change(video("in.mp4", 20.005, true), 0.005, 20.0, 0.5)
                .unwrap();
        let segments = plan.segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].duration_seconds, 20.0 - 0.005);
        assert!((plan.expected_duration - (20.0 - 0.005) * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_speed_change_rejects_bad_factor() {
        assert!(
            SegmentPlanner::plan_speed_change(video("in.mp4", 60.0, true), 1.0, 2.0, 0.0)
                .is_err()
        );
    }

    #[test]
    fn test_speed_change_needs_known_duration() {
        let err =
            SegmentPlanner::plan_speed_change(video("in.mp4", 0.0, true), 10.0, 20.0, 2.0)
                .unwrap_err();
        assert!(err.is_invalid_parameters());
        assert!(err.to_string().contains("no known duration"));
    }

    #[test]
    fn test_plan_requires_matching_inputs() {
        let request = EditRequest::Merge {
            base_path: "base.mp4".into(),
            insert_path: "insert.mp4".into(),
            insertion_point: 1.0,
            mode: MergeMode::Sequential,
        };
        let err = SegmentPlanner::plan(&request, vec![video("base.mp4", 10.0, true)]).unwrap_err();
        assert!(err.is_invalid_parameters());
    }

    #[test]
    fn test_normalize_target_fallbacks() {
        let target = NormalizeTarget::from_facts(&MediaFacts::default());
        assert_eq!((target.width, target.height, target.fps), (1920, 1080, 30.0));

        let odd = MediaFacts {
            width: 1281,
            height: 721,
            fps: 25.0,
            ..MediaFacts::default()
        };
        let target = NormalizeTarget::from_facts(&odd);
        assert_eq!((target.width, target.height, target.fps), (1280, 720, 25.0));
    }
}
