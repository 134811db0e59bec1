// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Continuous scales and tick generation.
//!
//! Tick generation picks "nice" steps (1, 2 or 5 times a power of ten, or calendar steps for
//! time) so axis labels stay readable.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use tessera_data::{AtomQuery, Cube, DataError, NodeId};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::time;

/// The kind of a continuous scale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleKind {
    /// Linear numbers.
    #[default]
    Linear,
    /// Seconds, ticked on calendar-friendly steps.
    Time,
}

impl ScaleKind {
    /// Returns roughly `count` ticks covering `domain`, and the step between them.
    pub fn ticks(self, domain: (f64, f64), count: usize) -> (Vec<f64>, f64) {
        match self {
            Self::Linear => linear_ticks(domain.0, domain.1, count),
            Self::Time => time::time_ticks(domain.0, domain.1, count),
        }
    }

    /// Formats one tick value.
    pub fn format(self, v: f64, step: f64) -> String {
        match self {
            Self::Linear => format_number(v, step),
            Self::Time => time::format_time(v, step),
        }
    }
}

/// Validates a tick request, returning the ordered domain.
pub(crate) fn tick_count(min: f64, max: f64, count: usize) -> Option<(f64, f64)> {
    if count == 0 || !min.is_finite() || !max.is_finite() {
        return None;
    }
    Some(if min <= max { (min, max) } else { (max, min) })
}

/// Ticks at multiples of `step` from `floor(min / step)` to `ceil(max / step)`.
pub(crate) fn ticks_with_step(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !step.is_finite() {
        return alloc::vec![min, max];
    }
    let start = (min / step).floor();
    let stop = (max / step).ceil();
    let n = (stop - start).round().clamp(0.0, 10_000.0);
    #[allow(
        clippy::cast_possible_truncation,
        reason = "clamped to a small non-negative range"
    )]
    let n = n as u32;
    (0..=n).map(|i| (start + f64::from(i)) * step).collect()
}

/// Returns the nice step for a raw step: 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let base = 10_f64.powf(step.log10().floor());
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// Returns roughly `count` nicely spaced ticks covering `[min, max]`, and the step.
pub fn linear_ticks(min: f64, max: f64, count: usize) -> (Vec<f64>, f64) {
    let Some((min, max)) = tick_count(min, max, count) else {
        return (Vec::new(), 0.0);
    };
    if min == max {
        return (alloc::vec![min], 0.0);
    }
    #[allow(clippy::cast_precision_loss, reason = "tick counts are small")]
    let step = nice_step((max - min) / count as f64);
    (ticks_with_step(min, max, step), step)
}

/// Formats a number with just enough decimals to tell ticks `step` apart.
pub fn format_number(v: f64, step: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    let step = step.abs();
    if step == 0.0 || step >= 1.0 || !step.is_finite() {
        if v.fract() == 0.0 {
            return alloc::format!("{v:.0}");
        }
        return alloc::format!("{v}");
    }
    let decimals = (-step.log10().floor()).clamp(0.0, 12.0);
    #[allow(clippy::cast_possible_truncation, reason = "clamped to 0..=12")]
    let decimals = decimals as usize;
    alloc::format!("{v:.decimals$}")
}

/// Returns the numeric extent of a dimension within `node`'s subtree.
///
/// Returns `None` when the subtree holds no numeric values.
pub fn numeric_domain(
    cube: &Cube,
    node: NodeId,
    dimension: &str,
) -> Result<Option<(f64, f64)>, DataError> {
    let atoms = cube.atoms(dimension, AtomQuery::within(node))?;
    let dim = cube.dataset().dimension_id(dimension)?;
    let dim = cube.dataset().dimension(dim);
    Ok(atoms
        .iter()
        .filter_map(|a| dim.atom(*a).value.as_f64())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        }))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use tessera_data::{DimensionSpec, GroupingSpec, Row};

    use super::*;

    #[test]
    fn nice_steps_snap_to_one_two_five() {
        assert_eq!(nice_step(0.8), 1.0);
        assert_eq!(nice_step(17.0), 20.0);
        assert_eq!(nice_step(40.0), 50.0);
        assert_eq!(nice_step(-1.0), 0.0);
    }

    #[test]
    fn linear_ticks_cover_the_domain() {
        let (ticks, step) = linear_ticks(3.0, 97.0, 5);
        assert_eq!(step, 20.0);
        assert_eq!(ticks, vec![0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
        assert_eq!(linear_ticks(5.0, 5.0, 4).0, vec![5.0]);
        assert!(linear_ticks(0.0, 1.0, 0).0.is_empty());
    }

    #[test]
    fn numbers_format_to_the_step_precision() {
        assert_eq!(format_number(20.0, 20.0), "20");
        assert_eq!(format_number(0.30000000000000004, 0.1), "0.3");
        assert_eq!(format_number(-0.0, 1.0), "0");
        assert_eq!(format_number(2.5, 5.0), "2.5");
        assert_eq!(format_number(-40.0, 10.0), "-40");
        assert_eq!(ScaleKind::Time.format(90.0, 30.0), "1:30");
    }

    #[test]
    fn domains_come_from_the_subtree() {
        let rows = [
            Row::new().with("g", "a").with("v", 4.0),
            Row::new().with("g", "a").with("v", -2.0),
            Row::new().with("g", "b").with("v", 9.0),
            Row::new().with("g", "b"),
        ];
        let cube = Cube::from_rows(
            [DimensionSpec::text("g"), DimensionSpec::number("v")],
            &rows,
            &GroupingSpec::path(["g"]),
        )
        .unwrap();
        assert_eq!(numeric_domain(&cube, NodeId::ROOT, "v").unwrap(), Some((-2.0, 9.0)));
        let a = cube.node(NodeId::ROOT).children()[0];
        assert_eq!(numeric_domain(&cube, a, "v").unwrap(), Some((-2.0, 4.0)));
        assert_eq!(numeric_domain(&cube, NodeId::ROOT, "g").unwrap(), None);
    }
}
