// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-pass dock layout for panel trees.
//!
//! Each pass has two phases:
//! - **Measure** (bottom-up): every visible panel computes a natural size from its content and
//!   its children, using the content rectangle it received in the previous pass.
//! - **Distribute** (top-down): docked children consume their size from an edge of the parent's
//!   content rectangle in declaration order; fill children share what remains.
//!
//! Passes repeat until the geometry stops changing or [`LayoutOptions::max_passes`] is reached.
//! The last geometry is always returned; [`LayoutResult::converged`] says whether it settled.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::{Insets, Rect, Size};

use crate::extension::{Extensions, Override, Property, RenderContext};
use crate::log::{debug, warn};
use crate::measure::TextMeasurer;
use crate::panel::{
    Align, Anchor, Anchorable, Axis, Content, Extent, Length, Panel, Sizeable, Styleable,
};
use crate::scene::SceneTree;

const SETTLE_EPSILON: f64 = 1e-6;

/// Bounds for the layout iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Maximum measure/distribute passes. At least one pass always runs.
    pub max_passes: usize,
    /// Maximum iterations when solving a percentage inside an auto-sized parent.
    pub percent_iterations: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_passes: 5,
            percent_iterations: 64,
        }
    }
}

impl LayoutOptions {
    /// Sets the pass bound.
    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    /// Sets the percentage iteration ceiling.
    pub fn with_percent_iterations(mut self, iterations: usize) -> Self {
        self.percent_iterations = iterations;
        self
    }
}

/// The placement of one panel.
#[derive(Clone, Debug)]
pub struct PanelGeometry {
    /// Panel name.
    pub name: Arc<str>,
    /// Nesting depth; the root is 0.
    pub depth: usize,
    /// Index of the parent in [`LayoutResult::panels`].
    pub parent: Option<usize>,
    /// The panel's rectangle, margins excluded.
    pub rect: Rect,
    /// `rect` minus paddings: the space handed to children.
    pub content: Rect,
    /// What was left of `content` after docked children.
    pub remainder: Rect,
    /// Whether the panel took part in layout.
    pub visible: bool,
    /// Scenes drawn by the panel: axis ticks for the final length, legend entries, or the
    /// attached scene subtree.
    pub scenes: Option<Arc<SceneTree>>,
}

/// Panel geometry in top-down order, plus iteration diagnostics.
#[derive(Clone, Debug)]
pub struct LayoutResult {
    /// Every panel in pre-order, root first.
    pub panels: Vec<PanelGeometry>,
    /// Passes run.
    pub passes: usize,
    /// Whether the last pass reproduced its input geometry.
    pub converged: bool,
}

impl LayoutResult {
    /// Returns the first panel named `name`.
    pub fn get(&self, name: &str) -> Option<&PanelGeometry> {
        self.panels.iter().find(|p| &*p.name == name)
    }

    /// Returns the root geometry.
    pub fn root(&self) -> Option<&PanelGeometry> {
        self.panels.first()
    }

    /// Iterates over the children of the panel at `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = &PanelGeometry> {
        self.panels.iter().filter(move |p| p.parent == Some(index))
    }
}

/// Lays out `root` on a canvas of `canvas` size.
pub fn layout(
    root: &Panel,
    canvas: Size,
    extensions: &Extensions,
    measurer: &dyn TextMeasurer,
    options: &LayoutOptions,
) -> LayoutResult {
    let mut engine = Engine::new(root, extensions, measurer, options);
    let canvas = Size::new(canvas.width.max(0.0), canvas.height.max(0.0));
    let mut passes = 0;
    let mut converged = false;
    while passes < options.max_passes.max(1) {
        let previous = engine.snapshot();
        engine.pass(canvas);
        passes += 1;
        if !engine.dependent || (passes > 1 && previous == engine.snapshot()) {
            converged = true;
            break;
        }
    }
    if converged {
        debug!(passes, panels = engine.nodes.len(), "layout converged");
    } else {
        warn!(passes, "layout did not converge; keeping the last pass");
    }
    LayoutResult {
        panels: engine.geometry(),
        passes,
        converged,
    }
}

/// A panel's box model after extension overrides.
#[derive(Clone, Copy, Debug, Default)]
struct Props {
    size: Extent,
    min_size: Extent,
    max_size: Extent,
    margins: Insets,
    paddings: Insets,
    visible: bool,
    align: Align,
    dynamic: bool,
}

impl Props {
    fn resolve(panel: &Panel, extensions: &Extensions, rect: Rect) -> Self {
        let mut props = Self {
            size: panel.size(),
            min_size: panel.min_size(),
            max_size: panel.max_size(),
            margins: panel.margins(),
            paddings: panel.paddings(),
            visible: panel.visible(),
            align: panel.align(),
            dynamic: false,
        };
        let ids = panel.extension_ids();
        if extensions.is_empty() || ids.is_empty() {
            return props;
        }
        let mut ctx = RenderContext::new(&panel.name, rect);
        if let Some(scenes) = &panel.scene {
            ctx = ctx.with_scene(scenes, scenes.root());
        }
        let mut get = |property: Property| {
            let o = extensions.lookup(ids, &property)?;
            props.dynamic |= matches!(o, Override::Function(_));
            Some(o.evaluate(&ctx))
        };
        let docking = panel.anchor().axis().unwrap_or(Axis::Vertical);
        let size = get(Property::Size).and_then(|v| v.as_length());
        let width = get(Property::Width).and_then(|v| v.as_length());
        let height = get(Property::Height).and_then(|v| v.as_length());
        let min = get(Property::MinSize).and_then(|v| v.as_length());
        let max = get(Property::MaxSize).and_then(|v| v.as_length());
        let margins = get(Property::Margins).and_then(|v| v.as_insets());
        let paddings = get(Property::Paddings).and_then(|v| v.as_insets());
        let visible = get(Property::Visible).and_then(|v| v.as_bool());
        let align = get(Property::Align).and_then(|v| v.as_align());

        if size.is_some() {
            props.size.set(docking, size);
        }
        if width.is_some() {
            props.size.width = width;
        }
        if height.is_some() {
            props.size.height = height;
        }
        if min.is_some() {
            props.min_size.set(docking, min);
        }
        if max.is_some() {
            props.max_size.set(docking, max);
        }
        props.margins = margins.unwrap_or(props.margins);
        props.paddings = paddings.unwrap_or(props.paddings);
        props.visible = visible.unwrap_or(props.visible);
        props.align = align.unwrap_or(props.align);
        props
    }

    fn has_percent(&self) -> bool {
        [self.size, self.min_size, self.max_size]
            .iter()
            .flat_map(|e| [e.width, e.height])
            .flatten()
            .any(Length::is_percent)
    }

    /// Resolves a length on `axis`, falling back to `natural`, then clamps to `[min, max]`.
    fn length(&self, axis: Axis, base: Option<f64>, natural: f64) -> f64 {
        let candidate = self
            .size
            .get(axis)
            .and_then(|l| l.resolve(base))
            .unwrap_or(natural);
        self.clamp(axis, candidate, base)
    }

    fn clamp(&self, axis: Axis, v: f64, base: Option<f64>) -> f64 {
        let mut v = v;
        if let Some(max) = self.max_size.get(axis).and_then(|l| l.resolve(base)) {
            v = v.min(max);
        }
        if let Some(min) = self.min_size.get(axis).and_then(|l| l.resolve(base)) {
            v = v.max(min);
        }
        v.max(0.0)
    }
}

struct Node<'a> {
    panel: &'a Panel,
    parent: Option<usize>,
    depth: usize,
    children: Vec<usize>,
}

struct Engine<'a> {
    nodes: Vec<Node<'a>>,
    extensions: &'a Extensions,
    measurer: &'a dyn TextMeasurer,
    options: &'a LayoutOptions,
    props: Vec<Props>,
    natural: Vec<Size>,
    /// Percent lengths solved inside auto-sized parents, per axis.
    solved: Vec<[Option<f64>; 2]>,
    /// Content sizes from the previous pass.
    received: Vec<Option<Size>>,
    rects: Vec<Rect>,
    contents: Vec<Rect>,
    remainders: Vec<Rect>,
    shown: Vec<bool>,
    /// Set when this pass read anything the previous pass produced.
    dependent: bool,
}

impl<'a> Engine<'a> {
    fn new(
        root: &'a Panel,
        extensions: &'a Extensions,
        measurer: &'a dyn TextMeasurer,
        options: &'a LayoutOptions,
    ) -> Self {
        let mut nodes = Vec::new();
        flatten(root, None, 0, &mut nodes);
        let n = nodes.len();
        Self {
            nodes,
            extensions,
            measurer,
            options,
            props: alloc::vec![Props::default(); n],
            natural: alloc::vec![Size::ZERO; n],
            solved: alloc::vec![[None; 2]; n],
            received: alloc::vec![None; n],
            rects: alloc::vec![Rect::ZERO; n],
            contents: alloc::vec![Rect::ZERO; n],
            remainders: alloc::vec![Rect::ZERO; n],
            shown: alloc::vec![false; n],
            dependent: false,
        }
    }

    fn snapshot(&self) -> (Vec<Rect>, Vec<Rect>, Vec<bool>) {
        (self.rects.clone(), self.contents.clone(), self.shown.clone())
    }

    fn pass(&mut self, canvas: Size) {
        self.dependent = false;
        for i in 0..self.nodes.len() {
            let props = Props::resolve(self.nodes[i].panel, self.extensions, self.rects[i]);
            self.dependent |= props.dynamic;
            self.props[i] = props;
        }
        for (received, content) in self.received.iter_mut().zip(&self.contents) {
            *received = Some(content.size());
        }
        if self.props[0].visible {
            self.measure(0);
            self.place(0, canvas.to_rect(), canvas, None);
        } else {
            self.hide(0, kurbo::Point::ZERO);
        }
    }

    /// Computes the natural size of panel `i`, paddings included and margins excluded.
    fn measure(&mut self, i: usize) -> Size {
        let panel = self.nodes[i].panel;
        let props = self.props[i];
        let first = self.rects[i] == Rect::ZERO && !self.shown[i];
        let available = if first { None } else { self.received[i] };
        let measured = panel
            .content
            .measure(panel.anchor(), available, self.measurer);
        self.dependent |= measured.uses_available;

        let children: Vec<usize> = self.nodes[i]
            .children
            .iter()
            .copied()
            .filter(|c| self.props[*c].visible)
            .collect();
        let naturals: Vec<Size> = children.iter().map(|c| self.measure(*c)).collect();

        let mut natural = [0.0; 2];
        for axis in Axis::BOTH {
            let k = axis.index();
            let auto = i != 0 && self.auto_sized(i, axis);
            let base = if auto || first {
                None
            } else {
                self.received[i].map(|s| axis.of(s))
            };
            for c in &children {
                self.solved[*c][k] = None;
                self.dependent |= !auto && self.props[*c].has_percent();
            }
            let percent: Vec<usize> = (0..children.len())
                .filter(|j| {
                    self.props[children[*j]]
                        .size
                        .get(axis)
                        .is_some_and(Length::is_percent)
                })
                .collect();
            if auto
                && !percent.is_empty()
                && !self.solve_percentages(axis, &children, &naturals, &percent, measured.size)
            {
                warn!(
                    panel = %self.nodes[i].panel.name,
                    ?axis,
                    "percentage inside an auto-sized panel did not settle; using 0"
                );
            }
            let lengths: Vec<(Anchor, f64)> = children
                .iter()
                .zip(&naturals)
                .map(|(c, n)| (self.nodes[*c].panel.anchor(), self.outer(*c, axis, base, *n)))
                .collect();
            natural[k] = axis.of(measured.size).max(dock_length(axis, &lengths))
                + axis.insets(props.paddings);
        }
        let size = Size::new(natural[0], natural[1]);
        self.natural[i] = size;
        size
    }

    /// Solves `x = p% * content(x)` for percentage children of an auto-sized panel.
    ///
    /// Returns `false`, with every solved length reset to 0, when the iteration does not settle.
    fn solve_percentages(
        &mut self,
        axis: Axis,
        children: &[usize],
        naturals: &[Size],
        percent: &[usize],
        own: Size,
    ) -> bool {
        let k = axis.index();
        for j in percent {
            self.solved[children[*j]][k] = Some(0.0);
        }
        let mut settled = false;
        for _ in 0..self.options.percent_iterations {
            let lengths: Vec<(Anchor, f64)> = children
                .iter()
                .zip(naturals)
                .map(|(c, n)| (self.nodes[*c].panel.anchor(), self.outer(*c, axis, None, *n)))
                .collect();
            let content = axis.of(own).max(dock_length(axis, &lengths));
            let mut delta: f64 = 0.0;
            for j in percent {
                let c = children[*j];
                let next = self.props[c].length(axis, Some(content), axis.of(naturals[*j]));
                let prev = self.solved[c][k].unwrap_or(0.0);
                delta = delta.max((next - prev).abs());
                self.solved[c][k] = Some(next);
            }
            if delta < SETTLE_EPSILON {
                settled = true;
                break;
            }
        }
        if !settled {
            for j in percent {
                self.solved[children[*j]][k] = Some(0.0);
            }
        }
        settled
    }

    /// Whether panel `i` takes its size on `axis` from its children.
    fn auto_sized(&self, i: usize, axis: Axis) -> bool {
        let props = &self.props[i];
        props.size.get(axis).is_none()
            && (self.nodes[i].panel.anchor().axis() == Some(axis) || props.align != Align::Stretch)
    }

    /// The length child `c` asks for on `axis`, margins included.
    fn outer(&self, c: usize, axis: Axis, base: Option<f64>, natural: Size) -> f64 {
        let props = &self.props[c];
        let len = self.solved[c][axis.index()]
            .unwrap_or_else(|| props.length(axis, base, axis.of(natural)));
        len + axis.insets(props.margins)
    }

    /// Places child `c` in `slot`. `docked` is the axis already sized by the parent.
    fn place(&mut self, c: usize, slot: Rect, base: Size, docked: Option<Axis>) {
        let props = self.props[c];
        let inner = inset(slot, props.margins);
        let mut origin = [inner.x0, inner.y0];
        let mut extent = [inner.width(), inner.height()];
        for axis in Axis::BOTH {
            let k = axis.index();
            if docked == Some(axis) {
                continue;
            }
            let room = extent[k];
            let sized = props.size.get(axis).is_some()
                || props.align != Align::Stretch
                || self.solved[c][k].is_some();
            let len = if sized {
                self.solved[c][k].unwrap_or_else(|| {
                    props.length(axis, Some(axis.of(base)), axis.of(self.natural[c]))
                })
            } else {
                props.clamp(axis, room, Some(axis.of(base)))
            };
            let len = len.min(room).max(0.0);
            origin[k] += match props.align {
                Align::Center => (room - len) / 2.0,
                Align::End => room - len,
                Align::Start | Align::Stretch => 0.0,
            };
            extent[k] = len;
        }
        let rect = Rect::new(
            origin[0],
            origin[1],
            origin[0] + extent[0],
            origin[1] + extent[1],
        );
        self.arrange(c, rect);
    }

    fn arrange(&mut self, i: usize, rect: Rect) {
        self.rects[i] = rect;
        self.shown[i] = true;
        let content = inset(rect, self.props[i].paddings);
        self.contents[i] = content;
        let base = content.size();
        let mut rem = content;
        let children = self.nodes[i].children.clone();
        for c in &children {
            if !self.props[*c].visible {
                self.hide(*c, rem.origin());
                continue;
            }
            let anchor = self.nodes[*c].panel.anchor();
            let Some(axis) = anchor.axis() else {
                continue;
            };
            let want = self.outer(*c, axis, Some(axis.of(base)), self.natural[*c]);
            let take = want.min(axis.of(rem.size())).max(0.0);
            let slot = match anchor {
                Anchor::Top => {
                    rem.y0 += take;
                    Rect::new(rem.x0, rem.y0 - take, rem.x1, rem.y0)
                }
                Anchor::Bottom => {
                    rem.y1 -= take;
                    Rect::new(rem.x0, rem.y1, rem.x1, rem.y1 + take)
                }
                Anchor::Left => {
                    rem.x0 += take;
                    Rect::new(rem.x0 - take, rem.y0, rem.x0, rem.y1)
                }
                Anchor::Right => {
                    rem.x1 -= take;
                    Rect::new(rem.x1, rem.y0, rem.x1 + take, rem.y1)
                }
                Anchor::Fill => continue,
            };
            self.place(*c, slot, base, Some(axis));
        }
        for c in &children {
            if self.props[*c].visible && self.nodes[*c].panel.anchor() == Anchor::Fill {
                self.place(*c, rem, base, None);
            }
        }
        self.remainders[i] = rem;
    }

    fn hide(&mut self, i: usize, at: kurbo::Point) {
        let rect = Rect::from_origin_size(at, Size::ZERO);
        self.rects[i] = rect;
        self.contents[i] = rect;
        self.remainders[i] = rect;
        self.shown[i] = false;
        let children = self.nodes[i].children.clone();
        for c in children {
            self.hide(c, at);
        }
    }

    fn geometry(&self) -> Vec<PanelGeometry> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                let panel = node.panel;
                let content = self.contents[i];
                let scenes = match &panel.content {
                    Content::Axis(axis) => {
                        let along = panel.anchor().axis().unwrap_or(Axis::Vertical).cross();
                        axis.ticks(Some(along.of(content.size())))
                    }
                    Content::Legend(legend) => legend.entries.clone(),
                    _ => panel.scene.clone(),
                };
                PanelGeometry {
                    name: panel.name.clone(),
                    depth: node.depth,
                    parent: node.parent,
                    rect: self.rects[i],
                    content,
                    remainder: self.remainders[i],
                    visible: self.shown[i],
                    scenes,
                }
            })
            .collect()
    }
}

fn flatten<'a>(panel: &'a Panel, parent: Option<usize>, depth: usize, out: &mut Vec<Node<'a>>) {
    let index = out.len();
    out.push(Node {
        panel,
        parent,
        depth,
        children: Vec::new(),
    });
    for child in &panel.children {
        let c = out.len();
        out[index].children.push(c);
        flatten(child, Some(index), depth + 1, out);
    }
}

/// The length docked children need on `axis`, nested in declaration order around the fills.
fn dock_length(axis: Axis, children: &[(Anchor, f64)]) -> f64 {
    let fill = children
        .iter()
        .filter(|(a, _)| *a == Anchor::Fill)
        .fold(0.0_f64, |acc, (_, len)| acc.max(*len));
    children
        .iter()
        .rev()
        .filter(|(a, _)| *a != Anchor::Fill)
        .fold(fill, |acc, (anchor, len)| {
            if anchor.axis() == Some(axis) {
                acc + len
            } else {
                acc.max(*len)
            }
        })
}

/// Shrinks `rect` by `insets`, never past zero size.
fn inset(rect: Rect, insets: Insets) -> Rect {
    let x0 = rect.x0 + insets.x0;
    let y0 = rect.y0 + insets.y0;
    let x1 = (rect.x1 - insets.x1).max(x0);
    let y1 = (rect.y1 - insets.y1).max(y0);
    Rect::new(x0, y0, x1, y1)
}
