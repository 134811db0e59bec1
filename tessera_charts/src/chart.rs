// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart composition: rows in, scenes and panel geometry out.
//!
//! [`Chart::build`] runs the whole pipeline once:
//! 1. load rows into a shared [`Dataset`],
//! 2. resolve each plot's roles and group a [`Cube`] by its grouping roles,
//! 3. project every cube into a [`SceneTree`],
//! 4. bind axis, legend and plot panels to those scenes,
//! 5. lay out the panel tree.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

use kurbo::Size;
use peniko::Color;
use tessera_data::{Cube, Dataset, DimensionSpec, Predicate, Row, ValueKind};

use crate::error::Error;
use crate::extension::Extensions;
use crate::layout::{LayoutOptions, LayoutResult, PanelGeometry, layout};
use crate::log::debug;
use crate::measure::TextMeasurer;
use crate::panel::{AxisScale, Binding, Content, Panel};
use crate::registry::{PlotKind, PlotRegistry, PlotType};
use crate::role::{BoundRole, RoleSpec, RoleSpecs, resolve_all};
use crate::scale::ScaleKind;
use crate::scene::{DEFAULT_PALETTE, SceneTree, grouping_for};

/// One plot of a chart.
#[derive(Clone, Debug)]
pub struct PlotConfig {
    /// Plot name, referenced by panel content.
    pub name: Arc<str>,
    /// Registry tag of the plot type.
    pub plot_type: Arc<str>,
    /// Per-plot role specs. These win over chart-level specs.
    pub roles: RoleSpecs,
    /// Restricts the plot to matching datums.
    pub filter: Option<Predicate>,
}

impl PlotConfig {
    /// A plot of type `plot_type`.
    pub fn new(name: impl Into<Arc<str>>, plot_type: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            plot_type: plot_type.into(),
            roles: RoleSpecs::new(),
            filter: None,
        }
    }

    /// Sets a role spec.
    pub fn with_role(mut self, role: &str, spec: impl Into<RoleSpec>) -> Self {
        self.roles = self.roles.with(role, spec);
        self
    }

    /// Sets the datum filter.
    pub fn with_filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(predicate);
        self
    }
}

/// Everything needed to build a chart.
#[derive(Clone, Debug)]
pub struct ChartConfig {
    /// Dimension declarations.
    pub dimensions: Vec<DimensionSpec>,
    /// Source rows.
    pub rows: Vec<Row>,
    /// Chart-level role specs, shared by every plot.
    pub roles: RoleSpecs,
    /// Plots in declaration order.
    pub plots: Vec<PlotConfig>,
    /// The panel tree.
    pub root: Panel,
    /// Style and size overrides.
    pub extensions: Extensions,
    /// Canvas size.
    pub canvas: Size,
    /// Layout iteration bounds.
    pub layout: LayoutOptions,
    /// Plot types.
    pub registry: PlotRegistry,
    /// Legend colors, assigned in entry order.
    pub palette: Vec<Color>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            dimensions: Vec::new(),
            rows: Vec::new(),
            roles: RoleSpecs::new(),
            plots: Vec::new(),
            root: Panel::new("root"),
            extensions: Extensions::default(),
            canvas: Size::new(640.0, 480.0),
            layout: LayoutOptions::default(),
            registry: PlotRegistry::builtin(),
            palette: DEFAULT_PALETTE.to_vec(),
        }
    }
}

impl ChartConfig {
    /// An empty configuration with the built-in plot types.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a dimension.
    pub fn with_dimension(mut self, spec: DimensionSpec) -> Self {
        self.dimensions.push(spec);
        self
    }

    /// Appends rows.
    pub fn with_rows(mut self, rows: impl IntoIterator<Item = Row>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Sets a chart-level role spec.
    pub fn with_role(mut self, role: &str, spec: impl Into<RoleSpec>) -> Self {
        self.roles = self.roles.with(role, spec);
        self
    }

    /// Appends a plot.
    pub fn with_plot(mut self, plot: PlotConfig) -> Self {
        self.plots.push(plot);
        self
    }

    /// Sets the panel tree.
    pub fn with_root(mut self, root: Panel) -> Self {
        self.root = root;
        self
    }

    /// Sets the overrides.
    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    /// Sets the canvas size.
    pub fn with_canvas(mut self, canvas: Size) -> Self {
        self.canvas = canvas;
        self
    }

    /// Sets the layout options.
    pub fn with_layout(mut self, options: LayoutOptions) -> Self {
        self.layout = options;
        self
    }

    /// Replaces the plot registry.
    pub fn with_registry(mut self, registry: PlotRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Replaces the legend palette.
    pub fn with_palette(mut self, palette: impl IntoIterator<Item = Color>) -> Self {
        self.palette = palette.into_iter().collect();
        self
    }
}

/// A built plot.
#[derive(Clone, Debug)]
pub struct Plot {
    name: Arc<str>,
    plot_type: PlotType,
    cube: Cube,
    roles: Vec<BoundRole>,
    scenes: Arc<SceneTree>,
}

impl Plot {
    /// Returns the plot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the plot type.
    pub fn plot_type(&self) -> &PlotType {
        &self.plot_type
    }

    /// Returns the plot's cube, filtered when the plot has a filter.
    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    /// Returns the resolved roles in declaration order.
    pub fn roles(&self) -> &[BoundRole] {
        &self.roles
    }

    /// Returns a resolved role.
    pub fn role(&self, name: &str) -> Option<&BoundRole> {
        self.roles.iter().find(|r| r.name() == name)
    }

    /// Returns the data scenes.
    pub fn scenes(&self) -> &Arc<SceneTree> {
        &self.scenes
    }

    /// The extent of a measure role over leaf scenes. Bars and sectors include zero.
    fn measure_domain(&self, role: &str) -> Option<(f64, f64)> {
        let values = self
            .scenes
            .leaves()
            .filter_map(|id| self.scenes.var(id, role)?.value.as_f64());
        let seed = match self.plot_type.kind {
            PlotKind::Bar | PlotKind::Pie => Some((0.0, 0.0)),
            _ => None,
        };
        values.fold(seed, |acc, v| match acc {
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            None => Some((v, v)),
        })
    }
}

/// A chart built from a [`ChartConfig`].
#[derive(Clone, Debug)]
pub struct Chart {
    dataset: Arc<Dataset>,
    plots: Vec<Plot>,
    root: Panel,
    extensions: Extensions,
    options: LayoutOptions,
    layout: LayoutResult,
}

impl Chart {
    /// Runs the pipeline and lays the chart out on the configured canvas.
    pub fn build(config: ChartConfig, measurer: &dyn TextMeasurer) -> Result<Self, Error> {
        let ChartConfig {
            dimensions,
            rows,
            roles,
            plots,
            mut root,
            extensions,
            canvas,
            layout: options,
            registry,
            palette,
        } = config;

        let dataset = Arc::new(Dataset::from_rows(dimensions, &rows)?);
        let plots = plots
            .iter()
            .map(|p| build_plot(p, &roles, &registry, &dataset))
            .collect::<Result<Vec<_>, _>>()?;

        root.visit_mut(&mut |panel: &mut Panel| bind_panel(panel, &plots, &palette))?;

        let layout = layout(&root, canvas, &extensions, measurer, &options);
        Ok(Self {
            dataset,
            plots,
            root,
            extensions,
            options,
            layout,
        })
    }

    /// Lays the chart out again for a new canvas size.
    pub fn relayout(&mut self, canvas: Size, measurer: &dyn TextMeasurer) -> &LayoutResult {
        self.layout = layout(
            &self.root,
            canvas,
            &self.extensions,
            measurer,
            &self.options,
        );
        &self.layout
    }

    /// Returns the shared dataset.
    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Returns the plots in declaration order.
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    /// Returns a plot by name.
    pub fn plot(&self, name: &str) -> Option<&Plot> {
        self.plots.iter().find(|p| p.name() == name)
    }

    /// Returns the panel tree with bound content.
    pub fn root(&self) -> &Panel {
        &self.root
    }

    /// Returns the overrides.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns the latest layout.
    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    /// Returns the geometry of a panel.
    pub fn geometry(&self, panel: &str) -> Option<&PanelGeometry> {
        self.layout.get(panel)
    }
}

fn build_plot(
    config: &PlotConfig,
    chart_roles: &RoleSpecs,
    registry: &PlotRegistry,
    dataset: &Arc<Dataset>,
) -> Result<Plot, Error> {
    let plot_type = registry.get(&config.plot_type)?.clone();
    let roles = resolve_all(
        &plot_type.roles,
        &config.roles,
        chart_roles,
        &plot_type.defaults,
        dataset,
    )?;
    let mut cube = Cube::build(dataset.clone(), &grouping_for(&roles))?;
    if let Some(filter) = &config.filter {
        cube = cube.filter(filter.clone())?;
    }
    let scenes = Arc::new(SceneTree::build(&cube, &roles));
    debug!(
        plot = %config.name,
        plot_type = %plot_type.tag,
        scenes = scenes.len(),
        "built plot"
    );
    Ok(Plot {
        name: config.name.clone(),
        plot_type,
        cube,
        roles,
        scenes,
    })
}

fn find<'a>(
    panel: &Panel,
    plots: &'a [Plot],
    binding: &Binding,
) -> Result<(&'a Plot, &'a BoundRole), Error> {
    let missing = |what, name: &Arc<str>| Error::UnknownReference {
        panel: panel.name.clone(),
        what,
        name: name.clone(),
    };
    let plot = plots
        .iter()
        .find(|p| p.name == binding.plot)
        .ok_or_else(|| missing("plot", &binding.plot))?;
    let role = plot
        .role(&binding.role)
        .ok_or_else(|| missing("role", &binding.role))?;
    Ok((plot, role))
}

/// Turns plot and role references into scenes.
fn bind_panel(panel: &mut Panel, plots: &[Plot], palette: &[Color]) -> Result<(), Error> {
    match &panel.content {
        Content::Plot(name) => {
            let plot = plots.iter().find(|p| p.name == *name).ok_or_else(|| {
                Error::UnknownReference {
                    panel: panel.name.clone(),
                    what: "plot",
                    name: name.clone(),
                }
            })?;
            panel.scene = Some(plot.scenes.clone());
        }
        Content::Axis(axis) => {
            let Some(binding) = &axis.binding else {
                return Ok(());
            };
            let (plot, role) = find(panel, plots, binding)?;
            let scale = axis_scale(plot, role)?;
            if let Content::Axis(axis) = &mut panel.content {
                axis.scale = scale;
            }
        }
        Content::Legend(legend) => {
            let Some(binding) = &legend.binding else {
                return Ok(());
            };
            let (plot, role) = find(panel, plots, binding)?;
            let entries = match role.dimensions().last() {
                Some(dim) => {
                    let name = plot.cube.dataset().dimension(*dim).name();
                    Some(Arc::new(SceneTree::legend(
                        &plot.cube,
                        name,
                        role.name(),
                        palette,
                    )?))
                }
                None => None,
            };
            if let Content::Legend(legend) = &mut panel.content {
                legend.entries = entries;
            }
        }
        Content::None | Content::Fixed(_) | Content::Title(_) => {}
    }
    Ok(())
}

/// Discrete roles tick their last dimension's atoms; measure roles tick their value range.
fn axis_scale(plot: &Plot, role: &BoundRole) -> Result<Option<AxisScale>, Error> {
    let Some(dim) = role.dimensions().last() else {
        return Ok(None);
    };
    let dimension = plot.cube.dataset().dimension(*dim);
    if dimension.spec().discrete {
        let ticks = SceneTree::discrete_ticks(&plot.cube, dimension.name())?;
        return Ok(Some(AxisScale::Discrete(Arc::new(ticks))));
    }
    let kind = match dimension.spec().kind {
        ValueKind::Time => ScaleKind::Time,
        _ => ScaleKind::Linear,
    };
    Ok(plot
        .measure_domain(role.name())
        .map(|domain| AxisScale::Continuous { kind, domain }))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use kurbo::Rect;
    use tessera_data::{CompareOp, Value};

    use super::*;
    use crate::measure::HeuristicTextMeasurer;
    use crate::panel::{Anchor, AxisContent, LegendContent, TitleContent};
    use crate::role::RoleSource;
    use crate::scene::TICK_VAR;

    fn sales() -> ChartConfig {
        ChartConfig::new()
            .with_dimension(DimensionSpec::text("region"))
            .with_dimension(DimensionSpec::text("product"))
            .with_dimension(DimensionSpec::number("sales"))
            .with_rows([
                Row::new().with("region", "N").with("product", "a").with("sales", 10.0),
                Row::new().with("region", "S").with("product", "a").with("sales", 20.0),
                Row::new().with("region", "N").with("product", "b").with("sales", 5.0),
            ])
            .with_role("value", "sales")
    }

    fn panels() -> Panel {
        Panel::new("root")
            .with_child(
                Panel::new("title")
                    .with_anchor(Anchor::Top)
                    .with_content(Content::Title(TitleContent::new("Sales"))),
            )
            .with_child(
                Panel::new("legend")
                    .with_anchor(Anchor::Right)
                    .with_content(Content::Legend(LegendContent::bound(Binding::new(
                        "bars", "series",
                    )))),
            )
            .with_child(
                Panel::new("x")
                    .with_anchor(Anchor::Bottom)
                    .with_content(Content::Axis(AxisContent::bound(Binding::new(
                        "bars", "category",
                    )))),
            )
            .with_child(
                Panel::new("y")
                    .with_anchor(Anchor::Left)
                    .with_content(Content::Axis(AxisContent::bound(Binding::new(
                        "bars", "value",
                    )))),
            )
            .with_child(Panel::new("plot").with_content(Content::Plot("bars".into())))
    }

    fn labels(tree: &SceneTree, role: &str) -> Vec<std::string::String> {
        tree.leaves()
            .filter_map(|id| tree.var(id, role).map(|v| v.label.to_string()))
            .collect()
    }

    #[test]
    fn builds_scenes_and_geometry() {
        let config = sales()
            .with_plot(
                PlotConfig::new("bars", "bar")
                    .with_role("category", "region")
                    .with_role("series", "product"),
            )
            .with_root(panels())
            .with_canvas(Size::new(600.0, 400.0));
        let chart = Chart::build(config, &HeuristicTextMeasurer).unwrap();
        let bars = chart.plot("bars").unwrap();
        assert_eq!(bars.role("value").unwrap().source(), RoleSource::Chart);
        assert_eq!(bars.role("category").unwrap().source(), RoleSource::Plot);
        assert_eq!(labels(bars.scenes(), "category"), ["N", "N", "S"]);
        assert_eq!(labels(bars.scenes(), "series"), ["a", "b", "a"]);

        let layout: &LayoutResult = chart.layout();
        assert_eq!(layout.root().unwrap().rect, Rect::new(0.0, 0.0, 600.0, 400.0));
        let plot = chart.geometry("plot").unwrap();
        let x = chart.geometry("x").unwrap();
        let y = chart.geometry("y").unwrap();
        assert_eq!(plot.rect.y1, x.rect.y0);
        assert_eq!(plot.rect.x0, y.rect.x1);
        assert!(plot.scenes.is_some());

        let x_ticks = x.scenes.as_ref().unwrap();
        assert_eq!(labels(x_ticks, TICK_VAR), ["N", "S"]);
        let legend = chart.geometry("legend").unwrap().scenes.as_ref().unwrap();
        assert_eq!(labels(legend, "series"), ["a", "b"]);
        assert!(legend.scene(legend.leaves().next().unwrap()).color().is_some());
        // Bars start at zero and reach the largest leaf sum.
        let y_ticks = y.scenes.as_ref().unwrap();
        assert_eq!(labels(y_ticks, TICK_VAR).first().map(|s| &**s), Some("0"));
    }

    #[test]
    fn filters_restrict_plot_datums() {
        let config = sales().with_plot(
            PlotConfig::new("big", "bar")
                .with_role("category", "region")
                .with_filter(Predicate::compare("sales", CompareOp::Ge, 10.0)),
        );
        let chart = Chart::build(config, &HeuristicTextMeasurer).unwrap();
        let big = chart.plot("big").unwrap();
        assert_eq!(big.cube().node(big.cube().root()).datums().len(), 2);
        let sums: Vec<Value> = big
            .scenes()
            .leaves()
            .map(|id| big.scenes().var(id, "value").unwrap().value.clone())
            .collect();
        assert_eq!(sums, vec![Value::Number(10.0), Value::Number(20.0)]);
    }

    #[test]
    fn unknown_references_are_rejected() {
        let config = sales()
            .with_plot(PlotConfig::new("bars", "bar").with_role("category", "region"))
            .with_root(Panel::new("root").with_child(
                Panel::new("legend").with_content(Content::Legend(LegendContent::bound(
                    Binding::new("bars", "colour"),
                ))),
            ));
        let err = Chart::build(config, &HeuristicTextMeasurer).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownReference {
                panel: "legend".into(),
                what: "role",
                name: "colour".into(),
            }
        );
        assert!(err.is_configuration());

        let config = sales().with_root(
            Panel::new("root")
                .with_child(Panel::new("p").with_content(Content::Plot("nope".into()))),
        );
        assert!(matches!(
            Chart::build(config, &HeuristicTextMeasurer),
            Err(Error::UnknownReference { what: "plot", .. })
        ));

        let config = sales().with_plot(PlotConfig::new("r", "radar"));
        assert_eq!(
            Chart::build(config, &HeuristicTextMeasurer).unwrap_err(),
            Error::UnknownPlotType("radar".into())
        );
    }

    #[test]
    fn role_errors_surface_from_build() {
        let config =
            sales().with_plot(PlotConfig::new("bars", "bar").with_role("category", "sales"));
        assert!(matches!(
            Chart::build(config, &HeuristicTextMeasurer),
            Err(Error::Role(_))
        ));
    }

    #[test]
    fn relayout_follows_the_canvas() {
        let config = sales()
            .with_plot(PlotConfig::new("bars", "bar").with_role("category", "region"))
            .with_root(panels().with_child(Panel::new("spare").hidden()))
            .with_role("series", RoleSpec::Null);
        let mut chart = Chart::build(config, &HeuristicTextMeasurer).unwrap();
        assert!(!chart.plot("bars").unwrap().role("series").unwrap().is_bound());
        // The legend binds an unbound role and measures as empty.
        assert_eq!(chart.geometry("legend").unwrap().rect.width(), 0.0);

        let first = chart.geometry("plot").unwrap().rect;
        let wide = chart.relayout(Size::new(1200.0, 400.0), &HeuristicTextMeasurer).clone();
        assert!(wide.get("plot").unwrap().rect.width() > first.width());
        let again = chart.relayout(Size::new(1200.0, 400.0), &HeuristicTextMeasurer);
        let rects = |r: &LayoutResult| r.panels.iter().map(|p| p.rect).collect::<Vec<_>>();
        assert_eq!(rects(&wide), rects(again));
    }
}
