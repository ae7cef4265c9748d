//! Audio tempo chains
//!
//! A single `atempo` stage only accepts factors in `[0.5, 2.0]`, so larger
//! changes are split into a chain whose product is the requested factor.

use crate::utils::time::format_factor;

pub const ATEMPO_MIN: f64 = 0.5;
pub const ATEMPO_MAX: f64 = 2.0;

/// Stage factors for `factor`; the last stage carries the remainder.
///
/// `factor` must be finite and positive.
pub fn atempo_chain(factor: f64) -> Vec<f64> {
    let mut stages = Vec::new();
    let mut remaining = factor;

    while remaining > ATEMPO_MAX {
        stages.push(ATEMPO_MAX);
        remaining /= ATEMPO_MAX;
    }
    while remaining < ATEMPO_MIN {
        stages.push(ATEMPO_MIN);
        remaining /= ATEMPO_MIN;
    }
    stages.push(remaining);

    stages
}

/// `atempo=a,atempo=b,...`
pub fn atempo_filter(factor: f64) -> String {
    atempo_chain(factor)
        .into_iter()
        .map(|stage| format!("atempo={}", format_factor(stage)))
        .collect::<Vec<_>>()
        .join(",")
}
