// Copyright 2025 the Tessera Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Declarative chart building blocks on top of `tessera_data`.
//!
//! This crate turns grouped data into render-ready structure:
//! - **Roles** bind abstract chart concepts (`category`, `series`, `value`) to dimensions.
//! - **Scenes** project a cube into a tree of role values, plus synthetic tick and legend trees.
//! - **Extensions** override panel and mark properties through a most-specific-first cascade.
//! - **Panels** dock around each other and are sized by a bounded multi-pass layout.
//!
//! [`Chart::build`] runs the whole pipeline from a [`ChartConfig`]. Drawing is out of scope:
//! backends walk the scene trees and panel geometry.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod chart;
mod error;
mod extension;
#[cfg(not(feature = "std"))]
mod float;
mod layout;
mod log;
mod measure;
mod panel;
mod registry;
mod role;
mod scale;
mod scene;
mod time;

pub use chart::{Chart, ChartConfig, Plot, PlotConfig};
pub use error::{Error, ExtensionError, RoleError};
pub use extension::{
    ExtensionValue, Extensions, ExtensionsBuilder, Override, OverrideFn, Property, RenderContext,
};
pub use layout::{LayoutOptions, LayoutResult, PanelGeometry, layout};
pub use measure::{HeuristicTextMeasurer, TextMeasurer};
pub use panel::{
    Align, Anchor, Anchorable, Axis, AxisContent, AxisScale, Binding, Content, Extent,
    LegendContent, Length, Panel, Sizeable, Styleable, TitleContent,
};
pub use registry::{PlotKind, PlotRegistry, PlotType};
pub use role::{
    BoundRole, RoleDecl, RoleSource, RoleSources, RoleSpec, RoleSpecs, resolve, resolve_all,
};
pub use scale::{ScaleKind, format_number, linear_ticks, nice_step, numeric_domain};
pub use scene::{DEFAULT_PALETTE, Scene, SceneId, SceneTree, TICK_VAR, Var, grouping_for};
pub use time::{format_time, nice_time_step, time_ticks};
