// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Example binary for `tessera_charts`.
//!
//! Builds a small bar chart, prints its scenes and panel geometry, then lays it out again on a
//! narrower canvas. Set `RUST_LOG=debug` to see pipeline events.

use kurbo::{Insets, Rect, Size};
use peniko::color::palette::css;
use tessera_charts::{
    Anchor, AxisContent, Binding, Chart, ChartConfig, Content, Error, ExtensionValue, Extensions,
    HeuristicTextMeasurer, LayoutResult, LegendContent, Length, Panel, PlotConfig, Property,
    RenderContext, SceneTree, TitleContent,
};
use tessera_data::{CompareOp, DimensionSpec, Predicate, Row};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let rows = [
        ("N", "2023", 120.0),
        ("N", "2024", 140.0),
        ("S", "2023", 90.0),
        ("S", "2024", 60.0),
        ("E", "2024", 75.0),
    ]
    .map(|(region, year, sales)| {
        Row::new()
            .with("region", region)
            .with("year", year)
            .with("sales", sales)
    });

    let extensions = Extensions::builder()
        .import("title_size", 32.0)?
        .set("legend", Property::MaxSize, Length::Percent(30.0))
        .set("plot", Property::Paddings, Insets::uniform(4.0))
        .set_fn("bar", Property::FillStyle, |ctx| {
            let big = ctx
                .var("value")
                .and_then(|v| v.value.as_f64())
                .is_some_and(|v| v > 100.0);
            ExtensionValue::Color(if big { css::FIREBRICK } else { css::STEEL_BLUE })
        })
        .build();

    let root = Panel::new("root")
        .with_paddings(Insets::uniform(8.0))
        .with_child(
            Panel::new("title")
                .with_anchor(Anchor::Top)
                .with_extension_id("title")
                .with_content(Content::Title(TitleContent::new("Sales by region"))),
        )
        .with_child(
            Panel::new("legend")
                .with_anchor(Anchor::Right)
                .with_extension_id("legend")
                .with_content(Content::Legend(LegendContent::bound(Binding::new(
                    "bars", "series",
                )))),
        )
        .with_child(
            Panel::new("x")
                .with_anchor(Anchor::Bottom)
                .with_extension_id("xAxis")
                .with_extension_id("axis")
                .with_content(Content::Axis(AxisContent::bound(Binding::new(
                    "bars", "category",
                )))),
        )
        .with_child(
            Panel::new("y")
                .with_anchor(Anchor::Left)
                .with_extension_id("yAxis")
                .with_extension_id("axis")
                .with_content(Content::Axis(AxisContent::bound(Binding::new("bars", "value")))),
        )
        .with_child(
            Panel::new("plot")
                .with_extension_id("plot")
                .with_content(Content::Plot("bars".into())),
        );

    let config = ChartConfig::new()
        .with_dimension(DimensionSpec::text("region"))
        .with_dimension(DimensionSpec::text("year"))
        .with_dimension(
            DimensionSpec::number("sales").with_formatter(|v| format!("${v}")),
        )
        .with_rows(rows)
        .with_role("value", "sales")
        .with_plot(
            PlotConfig::new("bars", "bar")
                .with_role("category", "region")
                .with_role("series", "year")
                .with_filter(Predicate::compare("sales", CompareOp::Gt, 0.0)),
        )
        .with_root(root)
        .with_extensions(extensions)
        .with_canvas(Size::new(640.0, 400.0));

    let mut chart = Chart::build(config, &HeuristicTextMeasurer)?;

    for plot in chart.plots() {
        println!("plot `{}` ({})", plot.name(), plot.plot_type().tag);
        for role in plot.roles() {
            println!("  role {:<9} {:?}", role.name(), role.source());
        }
        print_scenes(plot.scenes(), chart.extensions());
    }

    print_layout(chart.layout());
    let narrow = chart.relayout(Size::new(320.0, 400.0), &HeuristicTextMeasurer);
    println!("relayout at 320x400:");
    print_layout(narrow);
    Ok(())
}

fn print_scenes(tree: &SceneTree, extensions: &Extensions) {
    for id in tree.leaves() {
        let scene = tree.scene(id);
        let label = |role: &str| tree.var(id, role).map_or("-", |v| &*v.label).to_owned();
        let ctx = RenderContext::new("plot", Rect::ZERO).with_scene(tree, id);
        let fill = extensions
            .resolve(&["bar"], &Property::FillStyle, &ctx)
            .and_then(|v| v.as_color());
        println!(
            "  scene #{:<2} category={:<2} series={:<5} value={:<6} fill={:?}",
            scene.index(),
            label("category"),
            label("series"),
            label("value"),
            fill,
        );
    }
}

fn print_layout(layout: &LayoutResult) {
    println!(
        "layout: {} passes, converged = {}",
        layout.passes, layout.converged
    );
    for panel in &layout.panels {
        let r = panel.rect;
        let ticks = panel.scenes.as_ref().map_or(0, |s| s.leaves().count());
        println!(
            "  {:indent$}{:<8} [{:>6.1}, {:>6.1}, {:>6.1}, {:>6.1}] scenes={ticks}{}",
            "",
            panel.name,
            r.x0,
            r.y0,
            r.x1,
            r.y1,
            if panel.visible { "" } else { " (hidden)" },
            indent = panel.depth * 2,
        );
    }
}
