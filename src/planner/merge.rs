//! Merge planning: sequential insert and overlay replace

use crate::domain::model::*;
use crate::domain::rules::{self, RequestValidator};
use crate::error::{ClipStudioError, ClipStudioResult};

use super::{EditPlan, NormalizeTarget, PlanLayout, PlannedAsset};

/// Index of the base asset in a merge plan
pub const BASE: usize = 0;
/// Index of the inserted asset in a merge plan
pub const INSERT: usize = 1;

/// Length of insert actually played when overlaying at `point`
pub fn overlay_insert_duration(insert_duration: f64, base_duration: f64, point: f64) -> f64 {
    insert_duration.min(base_duration - point).max(0.0)
}

/// Split the base at `point` and place the insert according to `mode`
pub fn plan_merge(
    base: PlannedAsset,
    insert: PlannedAsset,
    point: f64,
    mode: MergeMode,
) -> ClipStudioResult<EditPlan> {
    RequestValidator::validate_time("insertion point", point)?;
    let base_duration = base.require_duration("base video")?;
    let insert_duration = insert.require_duration("inserted video")?;

    if point > base_duration {
        return Err(ClipStudioError::invalid(format!(
            "insertion point ({}) is beyond the base duration ({})",
            point, base_duration
        )));
    }

    let inserted = |duration: f64| Segment {
        source: SourceRef::Asset(INSERT),
        start_seconds: 0.0,
        duration_seconds: duration,
        role: SegmentRole::Inserted {
            gain: 1.0,
            looped: false,
        },
    };

    let mut segments = Vec::with_capacity(3);
    if rules::is_material(point) {
        segments.push(Segment::pass_through(BASE, 0.0, point));
    }

    let (resume_at, expected_duration) = match mode {
        MergeMode::Sequential => {
            segments.push(inserted(insert_duration));
            (point, base_duration + insert_duration)
        }
        MergeMode::Overlay => {
            let actual = overlay_insert_duration(insert_duration, base_duration, point);
            if rules::is_material(actual) {
                segments.push(inserted(actual));
            }
            (point + actual, base_duration)
        }
    };

    if rules::is_material(base_duration - resume_at) {
        segments.push(Segment::pass_through(
            BASE,
            resume_at,
            base_duration - resume_at,
        ));
    }

    let normalize = NormalizeTarget::from_facts(&base.facts);
    Ok(EditPlan {
        assets: vec![base, insert],
        layout: PlanLayout::Sequence {
            segments,
            normalize: Some(normalize),
        },
        expected_duration,
    })
}
