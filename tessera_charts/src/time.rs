// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time ticks for domains measured in seconds.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::scale::{tick_count, ticks_with_step};

const STEPS: &[f64] = &[
    1.0,
    2.0,
    5.0,
    10.0,
    15.0,
    30.0,
    60.0,
    2.0 * 60.0,
    5.0 * 60.0,
    10.0 * 60.0,
    15.0 * 60.0,
    30.0 * 60.0,
    3600.0,
    2.0 * 3600.0,
    3.0 * 3600.0,
    6.0 * 3600.0,
    12.0 * 3600.0,
    24.0 * 3600.0,
];

/// Returns the smallest calendar-friendly step (in seconds) at least as large as `step`.
///
/// Past a day the step rounds up to whole days.
pub fn nice_time_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    STEPS
        .iter()
        .copied()
        .find(|s| *s >= step)
        .unwrap_or_else(|| (step / 86_400.0).ceil() * 86_400.0)
}

/// Returns roughly `count` tick values covering `[min, max]` (seconds), and the step used.
pub fn time_ticks(min: f64, max: f64, count: usize) -> (Vec<f64>, f64) {
    let Some((min, max)) = tick_count(min, max, count) else {
        return (Vec::new(), 0.0);
    };
    if min == max {
        return (alloc::vec![min], 0.0);
    }
    #[allow(
        clippy::cast_precision_loss,
        reason = "tick counts are small"
    )]
    let step = nice_time_step((max - min) / count as f64);
    (ticks_with_step(min, max, step), step)
}

/// Formats seconds as `s`, `m:ss` or `h:mm:ss`, choosing the form from the tick step.
pub fn format_time(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return alloc::format!("{v}");
    }
    let sign = if v < 0.0 { "-" } else { "" };
    #[allow(clippy::cast_possible_truncation, reason = "clamped to the i64 range")]
    let secs = v.abs().round().min(9.0e18) as i64;
    let (h, m, s) = (secs / 3600, (secs / 60) % 60, secs % 60);
    let step = step.abs();
    if step >= 3600.0 || h > 0 {
        alloc::format!("{sign}{h}:{m:02}:{s:02}")
    } else if step >= 60.0 || m > 0 {
        alloc::format!("{sign}{m}:{s:02}")
    } else {
        alloc::format!("{sign}{s}")
    }
}
