// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Text measurement hooks for panel content.
//!
//! Shaping is a backend concern, so the layout engine asks a [`TextMeasurer`] for rough text
//! extents when sizing titles, axes and legends.

use kurbo::Size;

/// A minimal text measurement interface used by the layout engine.
pub trait TextMeasurer {
    /// Returns the extent of a single line of `text` at `font_size`.
    fn measure(&self, text: &str, font_size: f64) -> Size;

    /// Returns the widest and tallest extents over several labels.
    fn measure_max<'a>(&self, labels: &mut dyn Iterator<Item = &'a str>, font_size: f64) -> Size {
        labels.fold(Size::ZERO, |acc, label| {
            let s = self.measure(label, font_size);
            Size::new(acc.width.max(s.width), acc.height.max(s.height))
        })
    }
}

/// A heuristic measurer for tests and demos.
///
/// It assumes an average glyph width of 0.6em and a line height of 1.2em.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicTextMeasurer;

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font_size: f64) -> Size {
        #[allow(
            clippy::cast_precision_loss,
            reason = "label lengths are far below 2^52 characters"
        )]
        let chars = text.chars().count() as f64;
        Size::new(0.6 * font_size * chars, 1.2 * font_size)
    }
}
