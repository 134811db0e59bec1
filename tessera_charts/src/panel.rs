// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Panels: the rectangular nodes of a chart's visual tree.
//!
//! A panel docks to an edge of its parent (or fills what is left), declares optional sizes per
//! axis, and carries measurable [`Content`]. Panels are plain data; the layout engine reads them
//! through the [`Sizeable`], [`Anchorable`] and [`Styleable`] capabilities.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Insets, Size};
use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;
use crate::measure::TextMeasurer;
use crate::scale::ScaleKind;
use crate::scene::SceneTree;

/// An absolute length, or a percentage of the parent's content size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Pixels.
    Abs(f64),
    /// Percent of the parent's resolved content size on the same axis.
    Percent(f64),
}

impl Length {
    /// Resolves against `base`. Percentages stay unresolved without a base.
    pub fn resolve(self, base: Option<f64>) -> Option<f64> {
        match self {
            Self::Abs(v) => Some(v),
            Self::Percent(p) => base.map(|b| b * p / 100.0),
        }
    }

    /// Returns `true` for percentages.
    pub fn is_percent(self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

impl From<f64> for Length {
    fn from(v: f64) -> Self {
        Self::Abs(v)
    }
}

/// One layout axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Widths.
    Horizontal,
    /// Heights.
    Vertical,
}

impl Axis {
    /// Both axes, horizontal first.
    pub const BOTH: [Self; 2] = [Self::Horizontal, Self::Vertical];

    /// Returns the other axis.
    pub fn cross(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// Returns the component of `size` along this axis.
    pub fn of(self, size: Size) -> f64 {
        match self {
            Self::Horizontal => size.width,
            Self::Vertical => size.height,
        }
    }

    /// Returns the total inset along this axis.
    pub fn insets(self, insets: Insets) -> f64 {
        match self {
            Self::Horizontal => insets.x0 + insets.x1,
            Self::Vertical => insets.y0 + insets.y1,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }
}

/// Where a panel docks within its parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Takes the space left after docked siblings.
    #[default]
    Fill,
    /// Consumes height from the top edge.
    Top,
    /// Consumes height from the bottom edge.
    Bottom,
    /// Consumes width from the left edge.
    Left,
    /// Consumes width from the right edge.
    Right,
}

impl Anchor {
    /// Returns the axis a docked panel consumes, `None` for fill.
    pub fn axis(self) -> Option<Axis> {
        match self {
            Self::Fill => None,
            Self::Top | Self::Bottom => Some(Axis::Vertical),
            Self::Left | Self::Right => Some(Axis::Horizontal),
        }
    }
}

/// Placement on an axis where the panel is smaller than its slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    /// Left or top.
    Start,
    /// Centered.
    Center,
    /// Right or bottom.
    End,
    /// Fills the slot unless a size is declared, then behaves like `Start`.
    #[default]
    Stretch,
}

/// Optional lengths per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent {
    /// Width.
    pub width: Option<Length>,
    /// Height.
    pub height: Option<Length>,
}

impl Extent {
    /// Returns the length on `axis`.
    pub fn get(&self, axis: Axis) -> Option<Length> {
        match axis {
            Axis::Horizontal => self.width,
            Axis::Vertical => self.height,
        }
    }

    /// Sets the length on `axis`.
    pub fn set(&mut self, axis: Axis, length: Option<Length>) {
        match axis {
            Axis::Horizontal => self.width = length,
            Axis::Vertical => self.height = length,
        }
    }
}

/// A reference from panel content to one role of one plot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    /// Plot name.
    pub plot: Arc<str>,
    /// Role name.
    pub role: Arc<str>,
}

impl Binding {
    /// Binds `role` of `plot`.
    pub fn new(plot: impl Into<Arc<str>>, role: impl Into<Arc<str>>) -> Self {
        Self {
            plot: plot.into(),
            role: role.into(),
        }
    }
}

/// A text title.
#[derive(Clone, Debug, PartialEq)]
pub struct TitleContent {
    /// Title text.
    pub text: Arc<str>,
    /// Font size.
    pub font_size: f64,
    /// Padding around the text on every side.
    pub padding: f64,
}

impl TitleContent {
    /// A title with default styling.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            font_size: 14.0,
            padding: 4.0,
        }
    }

    fn measure(&self, measurer: &dyn TextMeasurer) -> Size {
        let pad = 2.0 * self.padding.max(0.0);
        let text = measurer.measure(&self.text, self.font_size);
        Size::new(text.width + pad, text.height + pad)
    }
}

/// The ticks an axis labels.
#[derive(Clone, Debug)]
pub enum AxisScale {
    /// Fixed tick scenes, one per category.
    Discrete(Arc<SceneTree>),
    /// Ticks generated for the axis length on each layout pass.
    Continuous {
        /// Linear or time ticks.
        kind: ScaleKind,
        /// The data domain.
        domain: (f64, f64),
    },
}

/// Axis labels along a panel edge.
#[derive(Clone, Debug)]
pub struct AxisContent {
    /// The plot role the axis shows. Resolved into `scale` when a chart is built.
    pub binding: Option<Binding>,
    /// Tick source. An axis without one measures as empty.
    pub scale: Option<AxisScale>,
    /// Label font size.
    pub font_size: f64,
    /// Tick length.
    pub tick_size: f64,
    /// Gap between tick and label.
    pub label_padding: f64,
    /// Minimum distance between continuous ticks.
    pub tick_spacing: f64,
}

impl AxisContent {
    fn with_scale(binding: Option<Binding>, scale: Option<AxisScale>) -> Self {
        Self {
            binding,
            scale,
            font_size: 10.0,
            tick_size: 5.0,
            label_padding: 3.0,
            tick_spacing: 40.0,
        }
    }

    /// An axis for a plot role, resolved at chart build time.
    pub fn bound(binding: Binding) -> Self {
        Self::with_scale(Some(binding), None)
    }

    /// An axis over fixed tick scenes.
    pub fn discrete(ticks: Arc<SceneTree>) -> Self {
        Self::with_scale(None, Some(AxisScale::Discrete(ticks)))
    }

    /// An axis over a continuous domain.
    pub fn continuous(kind: ScaleKind, domain: (f64, f64)) -> Self {
        Self::with_scale(None, Some(AxisScale::Continuous { kind, domain }))
    }

    /// Sets the label font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the minimum tick spacing.
    pub fn with_tick_spacing(mut self, spacing: f64) -> Self {
        self.tick_spacing = spacing;
        self
    }

    /// Returns how many continuous ticks fit in `length`.
    pub fn tick_count(&self, length: Option<f64>) -> usize {
        let Some(length) = length else {
            return 10;
        };
        let n = (length / self.tick_spacing.max(1.0)).floor().clamp(2.0, 20.0);
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "clamped to 2..=20"
        )]
        let n = n as usize;
        n
    }

    /// Builds the tick scenes for an axis of `length` pixels.
    pub fn ticks(&self, length: Option<f64>) -> Option<Arc<SceneTree>> {
        match self.scale.as_ref()? {
            AxisScale::Discrete(tree) => Some(tree.clone()),
            AxisScale::Continuous { kind, domain } => Some(Arc::new(
                SceneTree::continuous_ticks(*kind, *domain, self.tick_count(length)),
            )),
        }
    }

    fn measure(
        &self,
        axis: Axis,
        available: Option<Size>,
        measurer: &dyn TextMeasurer,
    ) -> Measured {
        let length = available.map(|a| axis.cross().of(a));
        let Some(ticks) = self.ticks(length) else {
            return Measured::fixed(Size::ZERO);
        };
        let labels = measurer.measure_max(&mut ticks.entry_labels(), self.font_size);
        let depth = self.tick_size.abs() + self.label_padding.max(0.0);
        let size = match axis {
            Axis::Horizontal => Size::new(depth + labels.width, 0.0),
            Axis::Vertical => Size::new(0.0, depth + labels.height),
        };
        Measured {
            size,
            uses_available: matches!(self.scale, Some(AxisScale::Continuous { .. })),
        }
    }
}

/// Color swatches with labels.
#[derive(Clone, Debug)]
pub struct LegendContent {
    /// The plot role the legend shows. Resolved into `entries` when a chart is built.
    pub binding: Option<Binding>,
    /// Legend entry scenes.
    pub entries: Option<Arc<SceneTree>>,
    /// Label font size.
    pub font_size: f64,
    /// Swatch square size.
    pub swatch_size: f64,
    /// Gap between rows.
    pub row_gap: f64,
    /// Gap between swatch and label.
    pub label_dx: f64,
    /// Gap between columns.
    pub column_gap: f64,
}

impl LegendContent {
    fn with_entries(binding: Option<Binding>, entries: Option<Arc<SceneTree>>) -> Self {
        Self {
            binding,
            entries,
            font_size: 10.0,
            swatch_size: 10.0,
            row_gap: 6.0,
            label_dx: 6.0,
            column_gap: 12.0,
        }
    }

    /// A legend for a plot role, resolved at chart build time.
    pub fn bound(binding: Binding) -> Self {
        Self::with_entries(Some(binding), None)
    }

    /// A legend over fixed entry scenes.
    pub fn new(entries: Arc<SceneTree>) -> Self {
        Self::with_entries(None, Some(entries))
    }

    /// Lays entries top to bottom, wrapping into columns when `available` height runs out.
    /// Top and bottom legends wrap into rows by available width instead.
    fn measure(
        &self,
        anchor: Anchor,
        available: Option<Size>,
        measurer: &dyn TextMeasurer,
    ) -> Measured {
        let Some(entries) = &self.entries else {
            return Measured::fixed(Size::ZERO);
        };
        let count = entries.scene(entries.root()).children().len();
        if count == 0 {
            return Measured::fixed(Size::ZERO);
        }
        let labels = measurer.measure_max(&mut entries.entry_labels(), self.font_size);
        let row_h = self.swatch_size.max(labels.height);
        let item_w = self.swatch_size + self.label_dx + labels.width;

        let fit = |space: f64, item: f64, gap: f64| -> usize {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_precision_loss,
                clippy::cast_sign_loss,
                reason = "clamped to 1..=count before the cast"
            )]
            let n = ((space + gap) / (item + gap)).floor().clamp(1.0, count as f64) as usize;
            n
        };
        let (columns, rows) = match (anchor, available) {
            (Anchor::Top | Anchor::Bottom, Some(a)) => {
                let columns = fit(a.width, item_w, self.column_gap);
                (columns, count.div_ceil(columns))
            }
            (_, Some(a)) => {
                let rows = fit(a.height, row_h, self.row_gap);
                (count.div_ceil(rows), rows)
            }
            (Anchor::Top | Anchor::Bottom, None) => (count, 1),
            (_, None) => (1, count),
        };
        #[allow(clippy::cast_precision_loss, reason = "entry counts are small")]
        let (columns, rows) = (columns as f64, rows as f64);
        Measured {
            size: Size::new(
                columns * item_w + (columns - 1.0) * self.column_gap,
                rows * row_h + (rows - 1.0) * self.row_gap,
            ),
            uses_available: true,
        }
    }
}

/// What a panel shows, for measuring.
#[derive(Clone, Debug, Default)]
pub enum Content {
    /// Nothing; the panel's natural size comes from its children.
    #[default]
    None,
    /// A fixed natural size.
    Fixed(Size),
    /// A title.
    Title(TitleContent),
    /// Axis labels.
    Axis(AxisContent),
    /// A legend.
    Legend(LegendContent),
    /// The marks of a plot. Measures as empty and takes the space it is given.
    Plot(Arc<str>),
}

/// A natural size, and whether it depended on the space received in the previous pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Measured {
    pub(crate) size: Size,
    pub(crate) uses_available: bool,
}

impl Measured {
    pub(crate) fn fixed(size: Size) -> Self {
        Self {
            size,
            uses_available: false,
        }
    }
}

impl Content {
    /// Measures the content's natural size.
    ///
    /// `available` is the content rectangle this panel received in the previous pass.
    pub(crate) fn measure(
        &self,
        anchor: Anchor,
        available: Option<Size>,
        measurer: &dyn TextMeasurer,
    ) -> Measured {
        match self {
            Self::None | Self::Plot(_) => Measured::fixed(Size::ZERO),
            Self::Fixed(size) => Measured::fixed(*size),
            Self::Title(title) => Measured::fixed(title.measure(measurer)),
            Self::Axis(axis) => {
                let along = anchor.axis().unwrap_or(Axis::Vertical);
                axis.measure(along, available, measurer)
            }
            Self::Legend(legend) => legend.measure(anchor, available, measurer),
        }
    }
}

/// Access to a panel's box model.
pub trait Sizeable {
    /// Declared size per axis.
    fn size(&self) -> Extent;
    /// Minimum size per axis.
    fn min_size(&self) -> Extent;
    /// Maximum size per axis.
    fn max_size(&self) -> Extent;
    /// Space outside the panel.
    fn margins(&self) -> Insets;
    /// Space between the panel edge and its children.
    fn paddings(&self) -> Insets;
}

/// Access to a panel's docking.
pub trait Anchorable {
    /// Docking edge.
    fn anchor(&self) -> Anchor;
    /// Cross-axis alignment.
    fn align(&self) -> Align;
}

/// Access to a panel's style cascade.
pub trait Styleable {
    /// Extension ids, most specific first.
    fn extension_ids(&self) -> &[Arc<str>];
    /// Whether the panel takes part in layout.
    fn visible(&self) -> bool;
}

/// A panel of the visual tree.
///
/// The default panel is an unnamed, visible fill panel.
#[derive(Clone, Debug)]
pub struct Panel {
    /// Name, unique within a chart by convention.
    pub name: Arc<str>,
    /// Docking edge.
    pub anchor: Anchor,
    /// Declared size.
    pub size: Extent,
    /// Minimum size.
    pub min_size: Extent,
    /// Maximum size.
    pub max_size: Extent,
    /// Margins.
    pub margins: Insets,
    /// Paddings.
    pub paddings: Insets,
    /// Cross-axis alignment.
    pub align: Align,
    /// Visibility.
    pub visible: bool,
    /// Measurable content.
    pub content: Content,
    /// Extension ids, most specific first.
    pub extension_ids: SmallVec<[Arc<str>; 2]>,
    /// Attached scene subtree.
    pub scene: Option<Arc<SceneTree>>,
    /// Children in declaration order.
    pub children: Vec<Panel>,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            name: Arc::from(""),
            anchor: Anchor::Fill,
            size: Extent::default(),
            min_size: Extent::default(),
            max_size: Extent::default(),
            margins: Insets::ZERO,
            paddings: Insets::ZERO,
            align: Align::Stretch,
            visible: true,
            content: Content::None,
            extension_ids: SmallVec::new(),
            scene: None,
            children: Vec::new(),
        }
    }
}

impl Panel {
    /// A visible fill panel with no content.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the anchor.
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sets the declared width.
    pub fn with_width(mut self, width: impl Into<Length>) -> Self {
        self.size.width = Some(width.into());
        self
    }

    /// Sets the declared height.
    pub fn with_height(mut self, height: impl Into<Length>) -> Self {
        self.size.height = Some(height.into());
        self
    }

    /// Sets the declared size along the docking axis (height for fill panels).
    pub fn with_size(mut self, size: impl Into<Length>) -> Self {
        let axis = self.anchor.axis().unwrap_or(Axis::Vertical);
        self.size.set(axis, Some(size.into()));
        self
    }

    /// Sets the minimum size on `axis`.
    pub fn with_min(mut self, axis: Axis, min: impl Into<Length>) -> Self {
        self.min_size.set(axis, Some(min.into()));
        self
    }

    /// Sets the maximum size on `axis`.
    pub fn with_max(mut self, axis: Axis, max: impl Into<Length>) -> Self {
        self.max_size.set(axis, Some(max.into()));
        self
    }

    /// Sets the margins.
    pub fn with_margins(mut self, margins: Insets) -> Self {
        self.margins = margins;
        self
    }

    /// Sets the paddings.
    pub fn with_paddings(mut self, paddings: Insets) -> Self {
        self.paddings = paddings;
        self
    }

    /// Sets the cross-axis alignment.
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    /// Hides the panel.
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Sets the content.
    pub fn with_content(mut self, content: Content) -> Self {
        self.content = content;
        self
    }

    /// Appends an extension id. Add the most specific id first.
    pub fn with_extension_id(mut self, id: impl Into<Arc<str>>) -> Self {
        self.extension_ids.push(id.into());
        self
    }

    /// Attaches a scene subtree.
    pub fn with_scene(mut self, scene: Arc<SceneTree>) -> Self {
        self.scene = Some(scene);
        self
    }

    /// Appends a child.
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Iterates over this panel and its descendants in pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Self> {
        let mut stack = alloc::vec![self];
        core::iter::from_fn(move || {
            let panel = stack.pop()?;
            stack.extend(panel.children.iter().rev());
            Some(panel)
        })
    }

    /// Visits this panel and its descendants mutably in pre-order.
    pub fn visit_mut<E>(
        &mut self,
        f: &mut impl FnMut(&mut Self) -> Result<(), E>,
    ) -> Result<(), E> {
        f(self)?;
        for child in &mut self.children {
            child.visit_mut(f)?;
        }
        Ok(())
    }
}

impl Sizeable for Panel {
    fn size(&self) -> Extent {
        self.size
    }

    fn min_size(&self) -> Extent {
        self.min_size
    }

    fn max_size(&self) -> Extent {
        self.max_size
    }

    fn margins(&self) -> Insets {
        self.margins
    }

    fn paddings(&self) -> Insets {
        self.paddings
    }
}

impl Anchorable for Panel {
    fn anchor(&self) -> Anchor {
        self.anchor
    }

    fn align(&self) -> Align {
        self.align
    }
}

impl Styleable for Panel {
    fn extension_ids(&self) -> &[Arc<str>] {
        &self.extension_ids
    }

    fn visible(&self) -> bool {
        self.visible
    }
}
